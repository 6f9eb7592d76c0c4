//! Shared fixtures for the auth flow tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use office_auth::{
    AuthBackend, AuthFlow, BackendError, CachedCredentials, CredentialCache, FlowOptions,
    KeyValueStore, MemoryStore, Profile, SignUpMetadata, User,
};
use uuid::Uuid;

/// Backend call as seen by the mock, passwords included.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    SignIn { email: String, password: String },
    SignUp {
        email: String,
        password: String,
        metadata: SignUpMetadata,
    },
    CheckMobile { mobile: String },
    GenerateOtp { user_id: Uuid },
    VerifyOtp { mobile: String, code: String },
    FetchProfile { user_id: Uuid },
}

/// Queued responses per backend operation; unqueued calls fall back to a
/// harmless default.
#[derive(Clone, Default)]
pub struct MockBackend {
    sign_in: Arc<Mutex<VecDeque<Result<User, BackendError>>>>,
    sign_up: Arc<Mutex<VecDeque<Result<Option<User>, BackendError>>>>,
    mobile_exists: Arc<Mutex<VecDeque<Result<bool, BackendError>>>>,
    generate: Arc<Mutex<VecDeque<Result<String, BackendError>>>>,
    verify: Arc<Mutex<VecDeque<Result<bool, BackendError>>>>,
    profiles: Arc<Mutex<VecDeque<Result<Option<Profile>, BackendError>>>>,
    calls: Arc<Mutex<Vec<BackendCall>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sign_in(self, response: Result<User, BackendError>) -> Self {
        self.sign_in.lock().unwrap().push_back(response);
        self
    }

    pub fn with_sign_up(self, response: Result<Option<User>, BackendError>) -> Self {
        self.sign_up.lock().unwrap().push_back(response);
        self
    }

    pub fn with_mobile_exists(self, response: Result<bool, BackendError>) -> Self {
        self.mobile_exists.lock().unwrap().push_back(response);
        self
    }

    pub fn with_generated_otp(self, response: Result<String, BackendError>) -> Self {
        self.generate.lock().unwrap().push_back(response);
        self
    }

    pub fn with_verify(self, response: Result<bool, BackendError>) -> Self {
        self.verify.lock().unwrap().push_back(response);
        self
    }

    pub fn with_profile(self, response: Result<Option<Profile>, BackendError>) -> Self {
        self.profiles.lock().unwrap().push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }
}

fn next<T>(queue: &Mutex<VecDeque<T>>, default: impl FnOnce() -> T) -> T {
    queue.lock().unwrap().pop_front().unwrap_or_else(default)
}

#[async_trait]
impl AuthBackend for MockBackend {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, BackendError> {
        self.record(BackendCall::SignIn {
            email: email.to_string(),
            password: password.to_string(),
        });
        next(&self.sign_in, || Err(BackendError::InvalidCredentials))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<Option<User>, BackendError> {
        self.record(BackendCall::SignUp {
            email: email.to_string(),
            password: password.to_string(),
            metadata: metadata.clone(),
        });
        next(&self.sign_up, || Ok(Some(user())))
    }

    async fn check_if_mobile_exists(&self, mobile: &str) -> Result<bool, BackendError> {
        self.record(BackendCall::CheckMobile {
            mobile: mobile.to_string(),
        });
        next(&self.mobile_exists, || Ok(false))
    }

    async fn generate_mobile_otp(&self, user_id: Uuid) -> Result<String, BackendError> {
        self.record(BackendCall::GenerateOtp { user_id });
        next(&self.generate, || Ok("123456".to_string()))
    }

    async fn verify_mobile_otp(&self, mobile: &str, code: &str) -> Result<bool, BackendError> {
        self.record(BackendCall::VerifyOtp {
            mobile: mobile.to_string(),
            code: code.to_string(),
        });
        next(&self.verify, || Ok(false))
    }

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, BackendError> {
        self.record(BackendCall::FetchProfile { user_id });
        next(&self.profiles, || Ok(None))
    }
}

pub fn user() -> User {
    serde_json::from_value(serde_json::json!({
        "id": Uuid::new_v4(),
        "email": "sy963912345678@email.com"
    }))
    .unwrap()
}

pub fn unverified_profile(user: &User) -> Profile {
    Profile {
        id: Some(user.id),
        mobile_verified: Some(false),
        role: Some("lawyer".to_string()),
    }
}

pub fn network_error() -> BackendError {
    BackendError::Network("TypeError: Failed to fetch".to_string())
}

/// Flow, its backend and the store behind its cache.
pub struct Harness {
    pub flow: AuthFlow,
    pub backend: MockBackend,
    pub store: Arc<MemoryStore>,
}

impl Harness {
    pub fn new(backend: MockBackend, options: FlowOptions) -> Self {
        Self::with_store(backend, Arc::new(MemoryStore::new()), options)
    }

    pub fn with_store(backend: MockBackend, store: Arc<MemoryStore>, options: FlowOptions) -> Self {
        let flow = AuthFlow::new(
            Arc::new(backend.clone()),
            store.clone() as Arc<dyn KeyValueStore>,
            options,
        );
        Self {
            flow,
            backend,
            store,
        }
    }

    pub fn cache(&self) -> CredentialCache<Arc<MemoryStore>> {
        CredentialCache::new(self.store.clone())
    }
}

/// Store that already remembers one successful login.
pub fn store_with_login(mobile: &str, password: &str, user: &User) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    CredentialCache::new(store.clone())
        .save_login(
            &CachedCredentials {
                mobile: mobile.to_string(),
                password: password.to_string(),
            },
            user,
        )
        .unwrap();
    store
}
