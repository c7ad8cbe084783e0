use reelshelf_model::ModelError;
use thiserror::Error;

/// Single failure type returned by every core operation.
///
/// The HTTP layer maps each variant onto a status code; nothing below that
/// layer knows about HTTP.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input rejected before any side effect, one message per offending field.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("not enough items to generate a share image")]
    NotEnoughItems,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("share not found")]
    ShareNotFound,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("account disabled")]
    AccountDisabled,

    /// Opaque on purpose: the cause is logged where the transaction aborted.
    #[error("import failed")]
    ImportFailed,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(vec![message.into()])
    }
}

impl From<ModelError> for CoreError {
    fn from(err: ModelError) -> Self {
        CoreError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
