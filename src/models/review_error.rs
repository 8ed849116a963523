//! Failures a review session can run into while talking to the server.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("Your session has expired. Please log in again.")]
    Authentication,

    #[error("Flashcard was not found.")]
    NotFound,

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Server error: {0}")]
    TransientServer(String),

    #[error("Received invalid data from the server: {0}")]
    MalformedResponse(String),
}

impl ReviewError {
    /// Only an expired login ends the session. Everything else can be retried or skipped.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ReviewError::Authentication)
    }

    /// Maps a non-success HTTP status to the error it stands for.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => ReviewError::Authentication,
            404 => ReviewError::NotFound,
            400 | 422 => ReviewError::Validation(message),
            _ => ReviewError::TransientServer(message),
        }
    }
}
