//! Thin Supabase client for the office app.
//!
//! Covers password sign-in and sign-up against GoTrue, PostgREST RPC calls
//! and the single-profile lookup used after login. Nothing here knows about
//! mobile numbers or OTP semantics; callers classify failures.

pub mod models;

use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{user_from_signup, ApiErrorBody, AuthSession, Profile, User};

pub use reqwest::StatusCode;

#[derive(Debug, Clone)]
pub struct SupabaseOptions {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    #[error("request to Supabase failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Supabase returned {status}: {message}")]
    Api {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
}

impl SupabaseError {
    /// True when the request never got an answer from the server.
    pub fn is_network(&self) -> bool {
        match self {
            SupabaseError::Transport(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            SupabaseError::Api { .. } => false,
        }
    }

    pub fn message(&self) -> String {
        match self {
            SupabaseError::Transport(e) => e.to_string(),
            SupabaseError::Api { message, .. } => message.clone(),
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            SupabaseError::Transport(_) => None,
            SupabaseError::Api { code, .. } => code.as_deref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SupabaseService {
    options: SupabaseOptions,
    client: Client,
}

impl SupabaseService {
    pub fn new(options: SupabaseOptions) -> Self {
        Self {
            options,
            client: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.options.url.trim_end_matches('/'), path)
    }

    fn headers(&self, access_token: Option<&str>) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        let bearer = format!("Bearer {}", access_token.unwrap_or(&self.options.anon_key));
        if let Ok(value) = header::HeaderValue::from_str(&self.options.anon_key) {
            headers.insert("apikey", value);
        }
        if let Ok(value) = header::HeaderValue::from_str(&bearer) {
            headers.insert(header::AUTHORIZATION, value);
        }
        headers
    }

    /// `POST /auth/v1/token?grant_type=password`
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SupabaseError> {
        let url = self.endpoint("/auth/v1/token?grant_type=password");
        debug!(email = %email, "signing in with password");

        let response = self
            .client
            .post(url)
            .headers(self.headers(None))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        read_json(response).await
    }

    /// `POST /auth/v1/signup`
    ///
    /// `data` ends up in the user's `raw_user_meta_data`. Returns `None` when
    /// the response carries no user record.
    pub async fn sign_up<D: Serialize + ?Sized>(
        &self,
        email: &str,
        password: &str,
        data: &D,
    ) -> Result<Option<User>, SupabaseError> {
        let url = self.endpoint("/auth/v1/signup");
        debug!(email = %email, "signing up");

        let response = self
            .client
            .post(url)
            .headers(self.headers(None))
            .json(&json!({ "email": email, "password": password, "data": data }))
            .send()
            .await?;

        let body: Value = read_json(response).await?;
        Ok(user_from_signup(body))
    }

    /// `POST /rest/v1/rpc/{function}`
    pub async fn rpc<A, T>(
        &self,
        function: &str,
        args: &A,
        access_token: Option<&str>,
    ) -> Result<T, SupabaseError>
    where
        A: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(&format!("/rest/v1/rpc/{function}"));
        debug!(function, "calling rpc");

        let response = self
            .client
            .post(url)
            .headers(self.headers(access_token))
            .json(args)
            .send()
            .await?;

        read_json(response).await
    }

    /// Load `mobile_verified` and `role` for one profile.
    pub async fn fetch_profile(
        &self,
        user_id: Uuid,
        access_token: Option<&str>,
    ) -> Result<Option<Profile>, SupabaseError> {
        let url = self.endpoint(&format!(
            "/rest/v1/profiles?select=id,mobile_verified,role&id=eq.{user_id}"
        ));

        let response = self
            .client
            .get(url)
            .headers(self.headers(access_token))
            .send()
            .await?;

        let rows: Vec<Profile> = read_json(response).await?;
        Ok(rows.into_iter().next())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, SupabaseError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or_default();
        let message = body.message().unwrap_or_else(|| {
            if text.is_empty() {
                status.to_string()
            } else {
                text.clone()
            }
        });
        warn!(status = %status, message = %message, "Supabase returned an error");
        return Err(SupabaseError::Api {
            status,
            code: body.code(),
            message,
        });
    }

    Ok(response.json::<T>().await?)
}
