//! Reading and writing the persisted session (token + user).

use crate::error::StorageError;
use crate::{ClientStorage, TOKEN_KEY, USER_KEY};
use udhaar_types::User;

/// What durable storage holds about the current session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoredSession {
    pub token: Option<String>,
    pub user: Option<User>,
}

/// Load the persisted session.
///
/// A stored user that no longer parses (unknown role, contradictory flags)
/// is dropped with a warning rather than failing startup; the caller then
/// re-fetches the profile with the token.
pub fn load_session(storage: &dyn ClientStorage) -> Result<StoredSession, StorageError> {
    let token = storage.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
    let user = match storage.get(USER_KEY)? {
        Some(json) => match serde_json::from_str::<User>(&json) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("discarding unreadable stored user: {e}");
                None
            }
        },
        None => None,
    };
    Ok(StoredSession { token, user })
}

/// Persist a freshly authenticated session.
pub fn save_session(
    storage: &dyn ClientStorage,
    token: &str,
    user: &User,
) -> Result<(), StorageError> {
    storage.set(TOKEN_KEY, token)?;
    save_user(storage, user)
}

/// Persist an updated user, keeping the token.
pub fn save_user(storage: &dyn ClientStorage, user: &User) -> Result<(), StorageError> {
    let json =
        serde_json::to_string(user).map_err(|e| StorageError::Serialization(e.to_string()))?;
    storage.set(USER_KEY, &json)
}

/// Remove both session keys.
pub fn clear_session(storage: &dyn ClientStorage) -> Result<(), StorageError> {
    storage.remove(TOKEN_KEY)?;
    storage.remove(USER_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{is_demo_session, FileStorage, DEMO_TOKEN};
    use udhaar_types::Role;

    fn storage() -> (tempfile::TempDir, FileStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session.json"));
        (dir, storage)
    }

    #[test]
    fn save_then_load() {
        let (_dir, storage) = storage();
        let user = User::new("demo-lender-001", Role::Lender, "l@x.demo", "Priya", "Sharma");
        save_session(&storage, DEMO_TOKEN, &user).unwrap();

        let loaded = load_session(&storage).unwrap();
        assert_eq!(loaded.token.as_deref(), Some(DEMO_TOKEN));
        assert_eq!(loaded.user, Some(user));
        assert!(is_demo_session(&storage).unwrap());
    }

    #[test]
    fn clear_removes_both_keys() {
        let (_dir, storage) = storage();
        let user = User::new("u1", Role::Borrower, "b@x", "A", "B");
        save_session(&storage, "real-token", &user).unwrap();
        clear_session(&storage).unwrap();
        assert_eq!(load_session(&storage).unwrap(), StoredSession::default());
    }

    #[test]
    fn unreadable_user_is_dropped() {
        let (_dir, storage) = storage();
        storage.set(TOKEN_KEY, "t").unwrap();
        storage
            .set(USER_KEY, r#"{"id":"x","role":"auditor"}"#)
            .unwrap();
        let loaded = load_session(&storage).unwrap();
        assert_eq!(loaded.token.as_deref(), Some("t"));
        assert_eq!(loaded.user, None);
    }

    #[test]
    fn empty_token_counts_as_missing() {
        let (_dir, storage) = storage();
        storage.set(TOKEN_KEY, "").unwrap();
        assert_eq!(load_session(&storage).unwrap().token, None);
    }
}
