use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Auth user record as returned by GoTrue.
///
/// Only the fields the office app reads are typed; everything else is
/// dropped on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

/// Response of `POST /auth/v1/token?grant_type=password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: User,
}

/// Row of `public.profiles` restricted to the columns the login flow reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub mobile_verified: Option<bool>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Error payload shared by GoTrue and PostgREST.
///
/// GoTrue answers with either `error`/`error_description` or
/// `error_code`/`msg`; PostgREST uses `code`/`message`/`details`/`hint`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl ApiErrorBody {
    /// Best human-readable message in the payload.
    pub fn message(&self) -> Option<String> {
        self.msg
            .clone()
            .or_else(|| self.message.clone())
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
    }

    /// Machine-readable code (`error_code` for GoTrue, `code` for PostgREST).
    pub fn code(&self) -> Option<String> {
        if let Some(code) = &self.error_code {
            return Some(code.clone());
        }
        match &self.code {
            Some(Value::String(code)) => Some(code.clone()),
            _ => None,
        }
    }
}

/// Extract the user from a sign-up response.
///
/// With auto-confirm enabled GoTrue returns a full session wrapping the user,
/// otherwise the bare user object.
pub fn user_from_signup(body: Value) -> Option<User> {
    let user = match body {
        Value::Object(mut map) => match map.remove("user") {
            Some(user) => user,
            None => Value::Object(map),
        },
        _ => return None,
    };
    serde_json::from_value(user).ok()
}
