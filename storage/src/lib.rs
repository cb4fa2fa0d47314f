//! Durable client storage.
//!
//! The client persists exactly two keys: [`TOKEN_KEY`] (a bearer token, or
//! the [`DEMO_TOKEN`] sentinel) and [`USER_KEY`] (the serialized user).
//! Every backend (file on disk, in-memory for testing) implements
//! [`ClientStorage`]; the rest of the workspace depends only on the trait.

pub mod error;
pub mod file;
pub mod session;

pub use error::StorageError;
pub use file::FileStorage;
pub use session::{clear_session, load_session, save_session, save_user, StoredSession};

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Key holding the serialized [`udhaar_types::User`].
pub const USER_KEY: &str = "user";

/// Sentinel token marking a demo-mode session.
pub const DEMO_TOKEN: &str = "demo-token";

/// A string key/value store that survives restarts.
pub trait ClientStorage: Send + Sync {
    /// Read a key. Missing keys are `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a key, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Whether the stored token marks a demo session.
pub fn is_demo_session(storage: &dyn ClientStorage) -> Result<bool, StorageError> {
    Ok(storage.get(TOKEN_KEY)?.as_deref() == Some(DEMO_TOKEN))
}
