//! Offline login fallback.
//!
//! When the backend cannot be reached, the last user who logged in online on
//! this device may still get in by re-entering the same mobile and password.
//! No network, constant work.

use tracing::{info, warn};

use crate::cache::{CachedCredentials, CredentialCache, KeyValueStore};
use crate::error::AuthError;
use crate::mobile::last_nine_digits;
use crate::User;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OfflineLoginError {
    #[error("no cached account on this device")]
    NoCachedAccount,

    #[error("credentials do not match the cached account")]
    CredentialsMismatch,
}

impl From<OfflineLoginError> for AuthError {
    fn from(err: OfflineLoginError) -> Self {
        match err {
            OfflineLoginError::NoCachedAccount => AuthError::NoCachedAccount,
            OfflineLoginError::CredentialsMismatch => AuthError::OfflineCredentialsMismatch,
        }
    }
}

/// Compare submitted credentials with the cached pair.
///
/// Mobiles match on their last nine digits, passwords must be identical.
pub fn check_offline_login(
    mobile: &str,
    password: &str,
    cached: Option<&CachedCredentials>,
    last_user: Option<&User>,
) -> Result<User, OfflineLoginError> {
    let (Some(cached), Some(last_user)) = (cached, last_user) else {
        return Err(OfflineLoginError::NoCachedAccount);
    };

    if last_nine_digits(&cached.mobile) == last_nine_digits(mobile) && cached.password == password {
        Ok(last_user.clone())
    } else {
        Err(OfflineLoginError::CredentialsMismatch)
    }
}

/// Run the offline check against the device cache. On success the
/// logged-out marker is cleared so the session restores on next start.
pub fn attempt_offline_login<S: KeyValueStore>(
    cache: &CredentialCache<S>,
    mobile: &str,
    password: &str,
) -> Result<User, OfflineLoginError> {
    let credentials = cache.load_credentials();
    let last_user = cache.load_last_user();

    let user = check_offline_login(mobile, password, credentials.as_ref(), last_user.as_ref())?;

    if let Err(e) = cache.clear_logged_out() {
        warn!(error = %e, "failed to clear logged-out marker");
    }
    info!(user_id = %user.id, "offline login accepted");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryStore, StoreError, CREDENTIALS_KEY};
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use uuid::Uuid;

    fn user() -> User {
        serde_json::from_value(serde_json::json!({ "id": Uuid::new_v4() })).unwrap()
    }

    fn cached(mobile: &str, password: &str) -> CachedCredentials {
        CachedCredentials {
            mobile: mobile.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_missing_cache_is_no_cached_account() {
        let creds = cached("0912345678", "secret");
        let user = user();

        assert_eq!(
            check_offline_login("0912345678", "secret", None, None),
            Err(OfflineLoginError::NoCachedAccount)
        );
        assert_eq!(
            check_offline_login("0912345678", "secret", Some(&creds), None),
            Err(OfflineLoginError::NoCachedAccount)
        );
        assert_eq!(
            check_offline_login("0912345678", "secret", None, Some(&user)),
            Err(OfflineLoginError::NoCachedAccount)
        );
    }

    #[test]
    fn test_mobile_matches_on_last_nine_digits() {
        let creds = cached("0912345678", "secret");
        let user = user();

        for submitted in ["0912345678", "+963912345678", "963 912 345 678", "912345678"] {
            assert_eq!(
                check_offline_login(submitted, "secret", Some(&creds), Some(&user)),
                Ok(user.clone()),
                "submitted {submitted}"
            );
        }
    }

    #[test]
    fn test_password_must_match_exactly() {
        let creds = cached("0912345678", "Secret");
        let user = user();

        for password in ["secret", "Secret ", "", "Secret1"] {
            assert_eq!(
                check_offline_login("0912345678", password, Some(&creds), Some(&user)),
                Err(OfflineLoginError::CredentialsMismatch),
                "password {password:?}"
            );
        }
    }

    #[test]
    fn test_different_mobile_is_mismatch() {
        let creds = cached("0912345678", "secret");
        let user = user();

        assert_eq!(
            check_offline_login("0912345679", "secret", Some(&creds), Some(&user)),
            Err(OfflineLoginError::CredentialsMismatch)
        );
    }

    #[test]
    fn test_attempt_clears_logged_out_marker() {
        let cache = CredentialCache::new(MemoryStore::new());
        let user = user();
        cache.save_login(&cached("0912345678", "secret"), &user).unwrap();
        cache.mark_logged_out().unwrap();

        let restored = attempt_offline_login(&cache, "+963 912 345 678", "secret").unwrap();

        assert_eq!(restored, user);
        assert!(!cache.is_logged_out());
    }

    #[test]
    fn test_failed_attempt_keeps_logged_out_marker() {
        let cache = CredentialCache::new(MemoryStore::new());
        cache.save_login(&cached("0912345678", "secret"), &user()).unwrap();
        cache.mark_logged_out().unwrap();

        let err = attempt_offline_login(&cache, "0912345678", "wrong").unwrap_err();

        assert_eq!(err, OfflineLoginError::CredentialsMismatch);
        assert!(cache.is_logged_out());
    }

    /// Memory store whose writes to one key fail.
    struct FailingStore {
        inner: MemoryStore,
        failing_key: &'static str,
        fail: AtomicBool,
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if key == self.failing_key && self.fail.load(Ordering::SeqCst) {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full").into());
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_interrupted_save_does_not_hand_over_the_new_account() {
        let store = Arc::new(FailingStore {
            inner: MemoryStore::new(),
            failing_key: CREDENTIALS_KEY,
            fail: AtomicBool::new(false),
        });
        let cache = CredentialCache::new(store.clone());
        let alice = user();
        cache.save_login(&cached("0911111111", "alice"), &alice).unwrap();

        store.fail.store(true, Ordering::SeqCst);
        let bob = user();
        assert!(cache.save_login(&cached("0922222222", "bob"), &bob).is_err());

        assert_eq!(
            attempt_offline_login(&cache, "0911111111", "alice"),
            Err(OfflineLoginError::NoCachedAccount)
        );
        assert_eq!(
            attempt_offline_login(&cache, "0922222222", "bob"),
            Err(OfflineLoginError::NoCachedAccount)
        );
    }

    #[test]
    fn test_errors_map_to_distinct_auth_errors() {
        assert_eq!(
            AuthError::from(OfflineLoginError::NoCachedAccount),
            AuthError::NoCachedAccount
        );
        assert_eq!(
            AuthError::from(OfflineLoginError::CredentialsMismatch),
            AuthError::OfflineCredentialsMismatch
        );
    }
}
