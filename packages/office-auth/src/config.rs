use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

use supabase::SupabaseOptions;

use crate::mobile::DEFAULT_EMAIL_DOMAIN;
use crate::state::AuthStep;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// Domain of the synthetic login emails.
    pub email_domain: String,
    /// Directory of the device-local credential cache.
    pub cache_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            supabase_url: env::var("SUPABASE_URL").context("SUPABASE_URL must be set")?,
            supabase_anon_key: env::var("SUPABASE_ANON_KEY")
                .context("SUPABASE_ANON_KEY must be set")?,
            email_domain: env::var("AUTH_EMAIL_DOMAIN")
                .unwrap_or_else(|_| DEFAULT_EMAIL_DOMAIN.to_string()),
            cache_dir: env::var("OFFICE_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".office-auth")),
        })
    }

    pub fn supabase_options(&self) -> SupabaseOptions {
        SupabaseOptions {
            url: self.supabase_url.clone(),
            anon_key: self.supabase_anon_key.clone(),
        }
    }
}

/// Per-screen options supplied by the caller of the flow.
#[derive(Debug, Clone)]
pub struct FlowOptions {
    pub initial_step: AuthStep,
    /// Mobile of an already known user; wins over the cached one.
    pub current_mobile: Option<String>,
    pub email_domain: String,
    /// The caller reacts to a verified mobile itself.
    pub handles_verification: bool,
    /// The caller handles "back" on the OTP step as a logout.
    pub handles_logout: bool,
    pub online: bool,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            initial_step: AuthStep::Login,
            current_mobile: None,
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
            handles_verification: false,
            handles_logout: false,
            online: true,
        }
    }
}
