//! Authentication core of the law-office app.
//!
//! Architecture (machine / effect split):
//!   front end → AuthFlow::submit → AuthMachine::decide(event) → AuthCommand
//!   → effects::execute → fact AuthEvent → decide … → Finish(outcome)
//!
//! Responsibilities:
//! - Mobile number normalization into the backend's canonical forms
//! - Login, sign-up and mobile OTP verification steps
//! - Offline login from the device credential cache

pub mod backend;
pub mod cache;
pub mod commands;
pub mod config;
pub mod effects;
pub mod error;
pub mod events;
pub mod flow;
pub mod machines;
pub mod messages;
pub mod mobile;
pub mod offline;
pub mod otp;
pub mod state;

pub use supabase::models::{Profile, User};

pub use backend::{AuthBackend, BackendError, SignUpMetadata, SupabaseAdapter};
pub use cache::{CachedCredentials, CredentialCache, FileStore, KeyValueStore, MemoryStore};
pub use commands::{AuthCommand, AuthOutcome};
pub use config::{Config, FlowOptions};
pub use error::{AuthError, Misconfiguration, RecoveryAction};
pub use events::AuthEvent;
pub use flow::AuthFlow;
pub use machines::AuthMachine;
pub use mobile::MobileNumber;
pub use otp::{OtpCode, OtpOrigin};
pub use state::{AuthState, AuthStep, Field, FormState};
