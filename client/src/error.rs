use thiserror::Error;
use udhaar_storage::StorageError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered 401; the stored session has been cleared.
    #[error("session expired, please log in again")]
    AuthExpired,

    #[error("backend unreachable: {0}")]
    Network(String),

    #[error("request failed ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid response from backend: {0}")]
    InvalidResponse(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// Whether the backend could not be reached at all.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
