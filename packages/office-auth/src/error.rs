use std::fmt;

use crate::messages;

/// Which part of the backend setup is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Misconfiguration {
    /// Tables/triggers not installed ("database is not configured").
    Database,
    /// `verify_mobile_otp` does not exist.
    VerificationFunction,
}

impl fmt::Display for Misconfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Misconfiguration::Database => f.write_str("database is not configured"),
            Misconfiguration::VerificationFunction => {
                f.write_str("mobile verification function is missing")
            }
        }
    }
}

/// Action the front end offers next to an error instead of plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Open the setup screen so the database scripts can be (re)installed.
    OpenSetup,
    /// Only an administrator can fix this.
    ContactAdministrator,
}

impl RecoveryAction {
    pub fn label(&self) -> &'static str {
        match self {
            RecoveryAction::OpenSetup => messages::OPEN_SETUP,
            RecoveryAction::ContactAdministrator => messages::CONTACT_ADMINISTRATOR,
        }
    }
}

/// Every failure the login/signup/OTP flow can surface.
///
/// `Display` is English and meant for logs; [`AuthError::user_message`] is the
/// Arabic text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("mobile number is not a valid local number")]
    InvalidMobile,

    #[error("invalid login credentials")]
    InvalidCredentials,

    #[error("account is not activated")]
    AccountNotActivated,

    #[error("backend is unreachable")]
    NetworkUnreachable,

    #[error("backend is misconfigured: {0}")]
    BackendMisconfigured(Misconfiguration),

    #[error("cannot create an account while offline")]
    OfflineSignup,

    #[error("no cached account on this device")]
    NoCachedAccount,

    #[error("credentials do not match the cached account")]
    OfflineCredentialsMismatch,

    #[error("mobile number is already registered")]
    MobileAlreadyRegistered,

    #[error("account is already registered")]
    AlreadyRegistered,

    #[error("sign up failed: {0}")]
    SignUpFailed(String),

    #[error("verification code must be exactly 6 digits")]
    InvalidOtpCode,

    #[error("verification code is incorrect")]
    VerificationMismatch,

    #[error("no verification code on record")]
    NoCodeOnRecord,

    #[error("verification failed: {0}")]
    VerificationFailed(String),

    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl AuthError {
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidMobile => messages::INVALID_MOBILE.to_string(),
            AuthError::InvalidCredentials => messages::INVALID_CREDENTIALS.to_string(),
            AuthError::AccountNotActivated => messages::ACCOUNT_NOT_ACTIVATED.to_string(),
            AuthError::NetworkUnreachable => messages::NETWORK_UNREACHABLE.to_string(),
            AuthError::BackendMisconfigured(Misconfiguration::Database) => {
                messages::DATABASE_NOT_CONFIGURED.to_string()
            }
            AuthError::BackendMisconfigured(Misconfiguration::VerificationFunction) => {
                messages::VERIFICATION_FUNCTION_MISSING.to_string()
            }
            AuthError::OfflineSignup => messages::OFFLINE_SIGNUP.to_string(),
            AuthError::NoCachedAccount => messages::NO_CACHED_ACCOUNT.to_string(),
            AuthError::OfflineCredentialsMismatch => {
                messages::OFFLINE_CREDENTIALS_MISMATCH.to_string()
            }
            AuthError::MobileAlreadyRegistered => messages::MOBILE_ALREADY_REGISTERED.to_string(),
            AuthError::AlreadyRegistered => messages::ACCOUNT_ALREADY_REGISTERED.to_string(),
            AuthError::SignUpFailed(reason) => format!("{}{reason}", messages::SIGNUP_FAILED_PREFIX),
            AuthError::InvalidOtpCode => messages::INVALID_OTP_CODE.to_string(),
            AuthError::VerificationMismatch => messages::WRONG_OTP_CODE.to_string(),
            AuthError::NoCodeOnRecord => messages::NO_CODE_ON_RECORD.to_string(),
            AuthError::VerificationFailed(_) => messages::VERIFICATION_FAILED.to_string(),
            AuthError::Unknown(_) => messages::UNEXPECTED.to_string(),
        }
    }

    /// Misconfiguration must be shown with a way out, not just text.
    pub fn recovery(&self) -> Option<RecoveryAction> {
        match self {
            AuthError::BackendMisconfigured(Misconfiguration::Database) => {
                Some(RecoveryAction::OpenSetup)
            }
            AuthError::BackendMisconfigured(Misconfiguration::VerificationFunction) => {
                Some(RecoveryAction::ContactAdministrator)
            }
            _ => None,
        }
    }

    /// Whether the mobile/password inputs should be highlighted as invalid.
    pub fn flags_inputs(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidMobile
                | AuthError::InvalidCredentials
                | AuthError::NoCachedAccount
                | AuthError::OfflineCredentialsMismatch
                | AuthError::MobileAlreadyRegistered
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_misconfiguration_has_recovery() {
        assert_eq!(
            AuthError::BackendMisconfigured(Misconfiguration::Database).recovery(),
            Some(RecoveryAction::OpenSetup)
        );
        assert_eq!(
            AuthError::BackendMisconfigured(Misconfiguration::VerificationFunction).recovery(),
            Some(RecoveryAction::ContactAdministrator)
        );
        assert_eq!(AuthError::InvalidCredentials.recovery(), None);
        assert_eq!(AuthError::Unknown("boom".into()).recovery(), None);
    }

    #[test]
    fn test_offline_and_online_credential_errors_differ() {
        assert_ne!(
            AuthError::InvalidCredentials.user_message(),
            AuthError::OfflineCredentialsMismatch.user_message()
        );
    }

    #[test]
    fn test_no_code_on_record_is_not_generic() {
        let msg = AuthError::NoCodeOnRecord.user_message();
        assert_eq!(msg, messages::NO_CODE_ON_RECORD);
        assert_ne!(msg, AuthError::VerificationMismatch.user_message());
        assert_ne!(msg, messages::VERIFICATION_FAILED);
    }

    #[test]
    fn test_signup_failure_keeps_backend_reason() {
        let msg = AuthError::SignUpFailed("Password should be at least 6 characters".into())
            .user_message();
        assert!(msg.starts_with(messages::SIGNUP_FAILED_PREFIX));
        assert!(msg.ends_with("Password should be at least 6 characters"));
    }

    #[test]
    fn test_verification_failure_shows_localized_text() {
        for reason in ["", " ", "User not found.", "permission denied for function"] {
            let err = AuthError::VerificationFailed(reason.into());
            assert_eq!(err.user_message(), messages::VERIFICATION_FAILED, "reason {reason:?}");
            assert!(err.to_string().contains(reason));
        }
    }

    #[test]
    fn test_unknown_hides_internal_detail() {
        let err = AuthError::Unknown("pg: relation \"x\" does not exist".into());
        assert_eq!(err.user_message(), messages::UNEXPECTED);
        assert!(err.to_string().contains("relation"));
    }
}
