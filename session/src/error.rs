use thiserror::Error;
use udhaar_client::ClientError;
use udhaar_storage::StorageError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not signed in")]
    NotSignedIn,

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// Whether the session ended because the server rejected the token.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Client(ClientError::AuthExpired))
    }
}
