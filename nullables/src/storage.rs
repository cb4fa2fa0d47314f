//! Nullable storage: in-memory key/value store for testing.

use std::collections::HashMap;
use std::sync::Mutex;
use udhaar_storage::{ClientStorage, StorageError};

/// An in-memory [`ClientStorage`].
/// Thread-safe for use with tokio's multi-threaded runtime.
#[derive(Debug, Default)]
pub struct NullStorage {
    entries: Mutex<HashMap<String, String>>,
    writes: Mutex<u64>,
}

impl NullStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key.
    pub fn with(self, key: &str, value: &str) -> Self {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Number of `set`/`remove` calls observed.
    pub fn write_count(&self) -> u64 {
        *self.writes.lock().unwrap()
    }

    /// Snapshot of all stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl ClientStorage for NullStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().unwrap().remove(key);
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use udhaar_storage::{is_demo_session, DEMO_TOKEN, TOKEN_KEY, USER_KEY};

    #[test]
    fn behaves_like_a_map() {
        let storage = NullStorage::new().with(TOKEN_KEY, DEMO_TOKEN);
        assert!(is_demo_session(&storage).unwrap());
        storage.set(USER_KEY, "{}").unwrap();
        assert_eq!(storage.keys(), vec![TOKEN_KEY.to_string(), USER_KEY.to_string()]);
        storage.remove(TOKEN_KEY).unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.write_count(), 2);
    }
}
