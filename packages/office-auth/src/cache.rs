//! Device-local credential cache.
//!
//! Persists the last successful mobile+password pair and the last user record
//! so a returning user can get in while the backend is unreachable. Storage is
//! an injected [`KeyValueStore`]; the flow never touches ambient global state.
//!
//! The password is kept in plaintext because the offline check compares it
//! verbatim. Replacing it with a one-way hash would need a salted
//! hash-compare scheme first.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::User;

pub const CREDENTIALS_KEY: &str = "lawyerAppLastUserCredentials";
pub const LAST_USER_KEY: &str = "lawyerAppLastUser";
pub const LOGGED_OUT_KEY: &str = "lawyerAppLoggedOut";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),

    #[error("storage lock poisoned")]
    Poisoned,

    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Synchronous string key/value storage, atomic per key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

// =============================================================================
// In-memory store
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// File store
// =============================================================================

/// One file per key inside a directory. Writes go to a temp file that is
/// renamed over the target, so a reader never sees a half-written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path(key)?;
        let tmp = self.dir.join(format!(".{key}.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Credential cache
// =============================================================================

/// Last mobile+password pair that logged in online. Stored as one JSON value
/// so the pair is written together or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedCredentials {
    pub mobile: String,
    pub password: String,
}

impl CachedCredentials {
    pub fn is_complete(&self) -> bool {
        !self.mobile.is_empty() && !self.password.is_empty()
    }
}

/// Typed access to the cache keys on top of a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct CredentialCache<S> {
    store: S,
}

impl<S: KeyValueStore> CredentialCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load_credentials(&self) -> Option<CachedCredentials> {
        self.load_json(CREDENTIALS_KEY)
    }

    pub fn load_last_user(&self) -> Option<User> {
        self.load_json(LAST_USER_KEY)
    }

    /// Remember a successful online login.
    ///
    /// The old credentials are dropped before the user record changes and the
    /// new ones written last, so a failure at any step leaves no pair that
    /// unlocks someone else's record.
    pub fn save_login(&self, credentials: &CachedCredentials, user: &User) -> Result<(), StoreError> {
        let user_json = serde_json::to_string(user).map_err(io::Error::from)?;
        let credentials_json = serde_json::to_string(credentials).map_err(io::Error::from)?;

        self.store.remove(CREDENTIALS_KEY)?;
        self.store.set(LAST_USER_KEY, &user_json)?;
        self.store.set(CREDENTIALS_KEY, &credentials_json)?;
        debug!(user_id = %user.id, "cached last successful login");
        Ok(())
    }

    pub fn is_logged_out(&self) -> bool {
        matches!(self.store.get(LOGGED_OUT_KEY), Ok(Some(_)))
    }

    pub fn mark_logged_out(&self) -> Result<(), StoreError> {
        self.store.set(LOGGED_OUT_KEY, "true")
    }

    pub fn clear_logged_out(&self) -> Result<(), StoreError> {
        self.store.remove(LOGGED_OUT_KEY)
    }

    /// Read and decode one key. Unreadable or corrupt entries count as
    /// absent; corrupt ones are removed so they cannot fail again.
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "failed to read cache entry");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                error!(key, error = %e, "failed to load cached entry, removing it");
                if let Err(e) = self.store.remove(key) {
                    warn!(key, error = %e, "failed to remove corrupt cache entry");
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user() -> User {
        serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "email": "sy963912345678@email.com"
        }))
        .unwrap()
    }

    fn credentials() -> CachedCredentials {
        CachedCredentials {
            mobile: "0912345678".to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn test_empty_cache_has_nothing() {
        let cache = CredentialCache::new(MemoryStore::new());
        assert!(cache.load_credentials().is_none());
        assert!(cache.load_last_user().is_none());
        assert!(!cache.is_logged_out());
    }

    #[test]
    fn test_save_login_writes_both_entries() {
        let cache = CredentialCache::new(MemoryStore::new());
        let user = user();

        cache.save_login(&credentials(), &user).unwrap();

        assert_eq!(cache.load_credentials(), Some(credentials()));
        assert_eq!(cache.load_last_user(), Some(user));
    }

    #[test]
    fn test_save_login_overwrites_previous_login() {
        let cache = CredentialCache::new(MemoryStore::new());
        cache.save_login(&credentials(), &user()).unwrap();

        let newer = CachedCredentials {
            mobile: "0998877665".to_string(),
            password: "other".to_string(),
        };
        let newer_user = user();
        cache.save_login(&newer, &newer_user).unwrap();

        assert_eq!(cache.load_credentials(), Some(newer));
        assert_eq!(cache.load_last_user(), Some(newer_user));
    }

    #[test]
    fn test_corrupt_entry_is_removed() {
        let store = Arc::new(MemoryStore::new());
        store.set(CREDENTIALS_KEY, "{not json").unwrap();
        let cache = CredentialCache::new(store.clone());

        assert!(cache.load_credentials().is_none());
        assert_eq!(store.get(CREDENTIALS_KEY).unwrap(), None);
    }

    #[test]
    fn test_logged_out_flag() {
        let cache = CredentialCache::new(MemoryStore::new());

        cache.mark_logged_out().unwrap();
        assert!(cache.is_logged_out());

        cache.clear_logged_out().unwrap();
        assert!(!cache.is_logged_out());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("cache")).unwrap();

        assert_eq!(store.get(CREDENTIALS_KEY).unwrap(), None);
        store.set(CREDENTIALS_KEY, "{\"a\":1}").unwrap();
        assert_eq!(store.get(CREDENTIALS_KEY).unwrap().as_deref(), Some("{\"a\":1}"));

        store.remove(CREDENTIALS_KEY).unwrap();
        store.remove(CREDENTIALS_KEY).unwrap();
        assert_eq!(store.get(CREDENTIALS_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let user = user();

        let cache = CredentialCache::new(FileStore::open(dir.path()).unwrap());
        cache.save_login(&credentials(), &user).unwrap();

        let reopened = CredentialCache::new(FileStore::open(dir.path()).unwrap());
        assert_eq!(reopened.load_credentials(), Some(credentials()));
        assert_eq!(reopened.load_last_user(), Some(user));
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert!(matches!(
            store.set("../escape", "x"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(StoreError::InvalidKey(_))));
    }
}
