use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::items::{BookFields, MovieFields};
use crate::list::{BookStatus, ListEntry, MovieStatus};

/// Envelope for every successful JSON response.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ApiResponse<T> {
    pub status: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub data: Option<T>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Bearer token handed out by register and login.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AuthToken {
    pub username: String,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Body of destructive or data-revealing requests that re-confirm the
/// caller's password.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PasswordConfirmation {
    pub password: String,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AddBookRequest {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub fields: BookFields,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub entry: ListEntry<BookStatus>,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AddMovieRequest {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub fields: MovieFields,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub entry: ListEntry<MovieStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShareCreated {
    pub share_id: String,
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn add_book_request_reads_flat_json() {
        let request: AddBookRequest = serde_json::from_value(serde_json::json!({
            "title": "Dune",
            "pages": 412,
            "status": "completed",
            "score": 9
        }))
        .unwrap();

        assert_eq!(request.fields.title, "Dune");
        assert_eq!(request.fields.pages, Some(412));
        assert_eq!(request.entry.status, BookStatus::Completed);
        assert_eq!(request.entry.score, Some(9));
    }

    #[test]
    fn success_envelope_omits_message() {
        let json = serde_json::to_value(ApiResponse::success(1)).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "success", "data": 1 }));
    }
}
