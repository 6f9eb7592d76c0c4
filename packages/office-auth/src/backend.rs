//! Auth/database collaborator.
//!
//! [`AuthBackend`] is the seam the flow talks to; [`SupabaseAdapter`] wraps
//! the HTTP client and turns its errors into [`BackendError`] categories.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use supabase::{SupabaseError, SupabaseService};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::{Profile, User};

/// Failure categories of backend calls. Classification is text based because
/// both GoTrue and the SQL functions report errors as messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),

    #[error("invalid login credentials")]
    InvalidCredentials,

    #[error("email not confirmed")]
    EmailNotConfirmed,

    #[error("user already registered")]
    AlreadyRegistered,

    #[error("database is not configured: {0}")]
    NotConfigured(String),

    #[error("function does not exist: {0}")]
    FunctionMissing(String),

    #[error("no OTP found")]
    NoCodeOnRecord,

    #[error("user not found")]
    UserNotFound,

    #[error("{0}")]
    Other(String),
}

impl BackendError {
    pub fn classify(message: &str, code: Option<&str>) -> Self {
        let lower = message.to_lowercase();
        let code = code.unwrap_or_default();

        if lower.contains("failed to fetch") || lower.contains("networkerror") {
            BackendError::Network(message.to_string())
        } else if code == "invalid_credentials"
            || lower.contains("invalid login credentials")
            || lower.contains("invalid credentials")
        {
            BackendError::InvalidCredentials
        } else if code == "email_not_confirmed" || lower.contains("email not confirmed") {
            BackendError::EmailNotConfirmed
        } else if code == "user_already_exists" || lower.contains("user already registered") {
            BackendError::AlreadyRegistered
        } else if lower.contains("database is not configured") {
            BackendError::NotConfigured(message.to_string())
        } else if code == "PGRST202"
            || code == "42883"
            || (lower.contains("function") && lower.contains("not exist"))
        {
            BackendError::FunctionMissing(message.to_string())
        } else if code == "42P01" || (lower.contains("relation") && lower.contains("does not exist"))
        {
            BackendError::NotConfigured(message.to_string())
        } else if lower.contains("no otp found") {
            BackendError::NoCodeOnRecord
        } else if lower.contains("user not found") {
            BackendError::UserNotFound
        } else {
            BackendError::Other(message.to_string())
        }
    }

    /// Message as the backend would phrase it.
    pub fn message(&self) -> String {
        match self {
            BackendError::Network(message)
            | BackendError::NotConfigured(message)
            | BackendError::FunctionMissing(message)
            | BackendError::Other(message) => message.clone(),
            BackendError::NoCodeOnRecord => "No OTP found.".to_string(),
            BackendError::UserNotFound => "User not found.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<SupabaseError> for BackendError {
    fn from(err: SupabaseError) -> Self {
        if err.is_network() {
            return BackendError::Network(err.message());
        }
        BackendError::classify(&err.message(), err.code())
    }
}

/// `raw_user_meta_data` sent on sign-up; the backend trigger copies it into
/// the new profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignUpMetadata {
    pub full_name: String,
    pub mobile_number: String,
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<User, BackendError>;

    /// `Ok(None)` when the backend accepted the request but returned no user.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<Option<User>, BackendError>;

    async fn check_if_mobile_exists(&self, mobile: &str) -> Result<bool, BackendError>;

    /// Returns the generated code (privileged; the administrator relays it).
    async fn generate_mobile_otp(&self, user_id: Uuid) -> Result<String, BackendError>;

    async fn verify_mobile_otp(&self, mobile: &str, code: &str) -> Result<bool, BackendError>;

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, BackendError>;
}

// =============================================================================
// SupabaseService Adapter (implements AuthBackend trait)
// =============================================================================

/// Wrapper around SupabaseService that keeps the session token of the last
/// sign-in for subsequent RPC and table calls.
pub struct SupabaseAdapter {
    service: Arc<SupabaseService>,
    access_token: RwLock<Option<String>>,
}

impl SupabaseAdapter {
    pub fn new(service: Arc<SupabaseService>) -> Self {
        Self {
            service,
            access_token: RwLock::new(None),
        }
    }

    pub async fn sign_out(&self) {
        *self.access_token.write().await = None;
    }
}

#[async_trait]
impl AuthBackend for SupabaseAdapter {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, BackendError> {
        let session = self.service.sign_in_with_password(email, password).await?;
        *self.access_token.write().await = Some(session.access_token);
        info!(user_id = %session.user.id, "signed in");
        Ok(session.user)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<Option<User>, BackendError> {
        Ok(self.service.sign_up(email, password, metadata).await?)
    }

    async fn check_if_mobile_exists(&self, mobile: &str) -> Result<bool, BackendError> {
        let token = self.access_token.read().await.clone();
        Ok(self
            .service
            .rpc(
                "check_if_mobile_exists",
                &json!({ "mobile_to_check": mobile }),
                token.as_deref(),
            )
            .await?)
    }

    async fn generate_mobile_otp(&self, user_id: Uuid) -> Result<String, BackendError> {
        let token = self.access_token.read().await.clone();
        Ok(self
            .service
            .rpc(
                "generate_mobile_otp",
                &json!({ "target_user_id": user_id }),
                token.as_deref(),
            )
            .await?)
    }

    async fn verify_mobile_otp(&self, mobile: &str, code: &str) -> Result<bool, BackendError> {
        let token = self.access_token.read().await.clone();
        Ok(self
            .service
            .rpc(
                "verify_mobile_otp",
                &json!({ "target_mobile": mobile, "code_to_check": code }),
                token.as_deref(),
            )
            .await?)
    }

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>, BackendError> {
        let token = self.access_token.read().await.clone();
        Ok(self.service.fetch_profile(user_id, token.as_deref()).await?)
    }
}
