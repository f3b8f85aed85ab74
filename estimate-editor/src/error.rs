use crate::models::ItemId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    /// The request never completed (connection refused, reset, DNS, ...).
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The document store answered with a non-success status.
    #[error("Request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Superseded by a newer request. Never shown to the user.
    #[error("Request cancelled")]
    Cancelled,

    #[error("Invalid reorder: {0}")]
    InvalidReorder(String),

    #[error("Line item not found: {0}")]
    NotFound(ItemId),

    #[error("Rejected: {0}")]
    Rejected(String),

    /// A quantity or amount too large to price.
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] askama::Error),
}

impl EditorError {
    /// Whether the failure should be surfaced to the user at all.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, EditorError::Cancelled | EditorError::InvalidReorder(_))
    }
}

impl From<reqwest::Error> for EditorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return EditorError::InvalidResponse(err.to_string());
        }
        match err.status() {
            Some(status) => EditorError::RequestFailed {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => EditorError::NetworkFailure(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(err: serde_json::Error) -> Self {
        EditorError::InvalidResponse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;
