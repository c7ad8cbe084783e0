use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use tracing::error;

use reelshelf_core::CoreError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub details: Vec<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut error = json!({
            "message": self.message,
            "status": self.status.as_u16(),
        });
        if !self.details.is_empty() {
            error["details"] = json!(self.details);
        }

        (self.status, Json(json!({ "error": error }))).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(details) => {
                Self::bad_request("Validation failed").with_details(details)
            }
            CoreError::NotEnoughItems
            | CoreError::InvalidCredentials
            | CoreError::ShareNotFound => Self::unprocessable(err.to_string()),
            CoreError::NotFound(_) => Self::not_found(err.to_string()),
            CoreError::Conflict(_) => Self::conflict(err.to_string()),
            CoreError::Unauthorized => Self::unauthorized(err.to_string()),
            CoreError::AccountDisabled => Self::forbidden(err.to_string()),
            CoreError::ImportFailed => Self::internal(err.to_string()),
            CoreError::Storage(_)
            | CoreError::Render(_)
            | CoreError::Internal(_) => {
                error!(error = %err, "request failed");
                Self::internal("Internal server error")
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        error!(error = ?err, "request failed");
        Self::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_statuses() {
        let cases = [
            (CoreError::validation("title: must not be empty"), StatusCode::BAD_REQUEST),
            (CoreError::NotEnoughItems, StatusCode::UNPROCESSABLE_ENTITY),
            (CoreError::InvalidCredentials, StatusCode::UNPROCESSABLE_ENTITY),
            (CoreError::ShareNotFound, StatusCode::UNPROCESSABLE_ENTITY),
            (CoreError::NotFound("user ada".into()), StatusCode::NOT_FOUND),
            (CoreError::Conflict("username".into()), StatusCode::CONFLICT),
            (CoreError::Unauthorized, StatusCode::UNAUTHORIZED),
            (CoreError::AccountDisabled, StatusCode::FORBIDDEN),
            (CoreError::ImportFailed, StatusCode::INTERNAL_SERVER_ERROR),
            (CoreError::Storage("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status, status);
        }
    }

    #[test]
    fn validation_details_are_carried() {
        let err = AppError::from(CoreError::validation("title: must not be empty"));
        assert_eq!(err.details, vec!["title: must not be empty".to_string()]);
    }

    #[test]
    fn internal_messages_are_not_leaked() {
        let err = AppError::from(CoreError::Internal("relation books does not exist".into()));
        assert_eq!(err.message, "Internal server error");
    }
}
