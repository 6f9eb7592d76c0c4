//! Screen state of the auth flow: which step is shown, what the form holds,
//! and the notices rendered above it.

use crate::error::AuthError;
use crate::messages;
use crate::otp::{self, OtpCode};
use crate::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStep {
    #[default]
    Login,
    Signup,
    Otp,
}

impl AuthStep {
    pub fn title(&self) -> &'static str {
        match self {
            AuthStep::Login => "تسجيل الدخول",
            AuthStep::Signup => "إنشاء حساب جديد",
            AuthStep::Otp => "التحقق من رقم الجوال",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FullName,
    Mobile,
    Password,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub full_name: String,
    pub mobile: String,
    pub password: String,
}

impl FormState {
    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::FullName => self.full_name = value,
            Field::Mobile => self.mobile = value,
            Field::Password => self.password = value,
        }
    }
}

/// Everything a front end needs to render the current screen.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub step: AuthStep,
    pub form: FormState,
    pub otp_code: OtpCode,
    pub show_password: bool,
    pub loading: bool,
    pub online: bool,
    pub error: Option<AuthError>,
    /// Informational notice, e.g. after account creation.
    pub message: Option<String>,
    /// Connectivity notice.
    pub info: Option<String>,
    /// Highlight the mobile and password inputs.
    pub inputs_invalid: bool,
}

impl AuthState {
    pub fn new(step: AuthStep, online: bool) -> Self {
        Self {
            step,
            form: FormState::default(),
            otp_code: OtpCode::default(),
            show_password: false,
            loading: false,
            online,
            error: None,
            message: None,
            info: offline_info(online),
            inputs_invalid: false,
        }
    }

    /// Primary button gating. Sign-up cannot be submitted offline.
    pub fn can_submit(&self) -> bool {
        match self.step {
            AuthStep::Login => !self.loading,
            AuthStep::Signup => !self.loading && self.online,
            AuthStep::Otp => otp::can_submit(&self.otp_code, self.loading),
        }
    }

    pub fn can_toggle_mode(&self) -> bool {
        !self.loading && self.step != AuthStep::Otp
    }

    pub(crate) fn clear_notices(&mut self) {
        self.error = None;
        self.message = None;
        self.inputs_invalid = false;
        self.info = offline_info(self.online);
    }
}

pub(crate) fn offline_info(online: bool) -> Option<String> {
    (!online).then(|| messages::OFFLINE_NOTICE.to_string())
}

/// Non-admin accounts whose profile says the mobile is unverified must pass
/// the OTP step. A missing profile or flag counts as verified.
pub fn needs_verification(profile: Option<&Profile>) -> bool {
    profile.is_some_and(|p| {
        p.mobile_verified == Some(false) && p.role.as_deref() != Some("admin")
    })
}
