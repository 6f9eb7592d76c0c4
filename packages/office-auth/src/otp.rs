//! Mobile OTP verification sub-flow.
//!
//! Codes are six digits, handed out manually by an administrator and checked
//! server-side by `verify_mobile_otp`. The backend never expires a code; it
//! stays valid until consumed. That is a product decision kept as-is.

use crate::backend::BackendError;
use crate::error::{AuthError, Misconfiguration};
use crate::mobile::MobileNumber;

pub const OTP_LEN: usize = 6;

/// Digits-only code input, never longer than [`OTP_LEN`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Keep the digits of `input`, truncated to six.
    pub fn sanitize(input: &str) -> Self {
        Self(
            input
                .chars()
                .filter(char::is_ascii_digit)
                .take(OTP_LEN)
                .collect(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_complete(&self) -> bool {
        self.0.len() == OTP_LEN
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Step the user came from when the OTP screen was shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpOrigin {
    /// Password login of an unverified account.
    Login,
    /// Freshly created account.
    Signup,
    /// The caller opened the flow directly on the OTP step.
    External,
}

/// What happens once the backend confirmed the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterVerification {
    /// Hand control back to the caller's verification handler.
    Report,
    /// Sign in again with the form password to get a fresh session.
    Reauthenticate,
    /// Show the login form.
    ReturnToLogin,
}

pub fn after_verification(
    origin: OtpOrigin,
    has_verification_handler: bool,
    has_password: bool,
) -> AfterVerification {
    match origin {
        OtpOrigin::Login if has_password => AfterVerification::Reauthenticate,
        OtpOrigin::Login => AfterVerification::ReturnToLogin,
        _ if has_verification_handler => AfterVerification::Report,
        OtpOrigin::Signup => AfterVerification::ReturnToLogin,
        OtpOrigin::External if has_password => AfterVerification::Reauthenticate,
        OtpOrigin::External => AfterVerification::ReturnToLogin,
    }
}

/// Submit control gating: exactly six digits and nothing in flight.
pub fn can_submit(code: &OtpCode, loading: bool) -> bool {
    !loading && code.is_complete()
}

/// Validated arguments for `verify_mobile_otp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    /// Local-DB form, matching `profiles.mobile_number`.
    pub mobile: String,
    pub code: String,
}

impl VerificationRequest {
    pub fn new(raw_mobile: &str, code: &OtpCode) -> Result<Self, AuthError> {
        if !code.is_complete() {
            return Err(AuthError::InvalidOtpCode);
        }
        let mobile = MobileNumber::parse(raw_mobile).ok_or(AuthError::InvalidMobile)?;
        Ok(Self {
            mobile: mobile.local_db(),
            code: code.as_str().trim().to_string(),
        })
    }
}

/// Translate a failed `verify_mobile_otp` call.
pub fn verification_error(err: &BackendError) -> AuthError {
    match err {
        BackendError::FunctionMissing(_) => {
            AuthError::BackendMisconfigured(Misconfiguration::VerificationFunction)
        }
        BackendError::NoCodeOnRecord => AuthError::NoCodeOnRecord,
        BackendError::Network(_) => AuthError::NetworkUnreachable,
        other => AuthError::VerificationFailed(other.message()),
    }
}
