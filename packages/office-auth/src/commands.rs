use uuid::Uuid;

use crate::backend::SignUpMetadata;
use crate::cache::CachedCredentials;
use crate::error::AuthError;
use crate::otp::VerificationRequest;
use crate::User;

/// Auth commands - work the machine asks the effects to perform
#[derive(Debug, Clone)]
pub enum AuthCommand {
    SignIn { email: String, password: String },
    FetchProfile { user_id: Uuid },
    CacheLogin { credentials: CachedCredentials, user: User },
    OfflineLogin { mobile: String, password: String },
    CheckMobile { mobile: String },
    SignUp {
        email: String,
        password: String,
        metadata: SignUpMetadata,
    },
    IssueOtp { user_id: Uuid },
    VerifyOtp { request: VerificationRequest },
    /// Fresh sign-in after a successful verification.
    Reauthenticate { email: String, password: String },
    /// Submission settled; nothing left to execute.
    Finish(Result<AuthOutcome, AuthError>),
}

/// How a submission ended when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// Session established. `offline` marks a login served from the cache.
    LoggedIn { user: User, offline: bool },
    /// Unverified account; the OTP step is now shown.
    VerificationRequired,
    /// New account created; the OTP step is now shown.
    AccountCreated,
    /// Mobile verified; the caller's verification handler takes over.
    Verified,
    /// Back on the login step.
    ReturnedToLogin,
    /// The caller's logout handler takes over.
    LoggedOut,
    /// Nothing happened: a submission was already in flight or the action
    /// does not apply to the current step.
    Ignored,
}
