use uuid::Uuid;

use crate::backend::BackendError;
use crate::cache::CachedCredentials;
use crate::offline::OfflineLoginError;
use crate::state::Field;
use crate::{Profile, User};

/// Auth events - user input plus facts reported back by the effects
#[derive(Debug, Clone)]
pub enum AuthEvent {
    // =========================================================================
    // Input events (from the front end)
    // =========================================================================
    /// Cached credentials found on this device at start-up.
    CacheLoaded { credentials: CachedCredentials },

    FieldChanged { field: Field, value: String },

    /// Raw OTP input, sanitized by the machine.
    OtpCodeChanged { input: String },

    PasswordVisibilityToggled,

    ModeToggled,

    NetworkChanged { online: bool },

    /// Primary button on the login or signup step.
    SubmitRequested,

    OtpSubmitRequested,

    /// "Back" on the OTP step.
    LeaveOtpRequested,

    // =========================================================================
    // Fact events (from effects)
    // =========================================================================
    SignedIn { user: User },

    SignInFailed { error: BackendError },

    /// `None` when the profile row is absent or could not be read.
    ProfileLoaded { profile: Option<Profile> },

    LoginCached { user: User },

    OfflineLoginChecked { result: Result<User, OfflineLoginError> },

    MobileChecked { exists: bool },

    SignedUp { user: Option<User> },

    SignUpFailed { error: BackendError },

    /// Code generation finished; failures are only logged.
    OtpIssued { user_id: Uuid },

    OtpChecked { verified: bool },

    OtpCheckFailed { error: BackendError },

    Reauthenticated { user: User },

    ReauthenticationFailed { error: BackendError },
}
