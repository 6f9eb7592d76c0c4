//! Auth machine - turns events into commands and owns the screen state.
//!
//! `decide` never performs I/O. The effects execute each command and feed the
//! resulting fact back in, until the machine answers with
//! [`AuthCommand::Finish`].

use tracing::debug;

use crate::backend::{BackendError, SignUpMetadata};
use crate::cache::CachedCredentials;
use crate::commands::{AuthCommand, AuthOutcome};
use crate::config::FlowOptions;
use crate::error::{AuthError, Misconfiguration};
use crate::events::AuthEvent;
use crate::messages;
use crate::mobile::MobileNumber;
use crate::otp::{self, AfterVerification, OtpCode, OtpOrigin, VerificationRequest};
use crate::state::{needs_verification, offline_info, AuthState, AuthStep, FormState};
use crate::User;

#[derive(Debug, Clone)]
pub struct AuthMachine {
    state: AuthState,
    options: FlowOptions,
    otp_origin: OtpOrigin,
    /// Signed-in user waiting for the profile check.
    pending_user: Option<User>,
    /// Mobile of the sign-up in flight.
    pending_mobile: Option<MobileNumber>,
}

impl AuthMachine {
    pub fn new(options: FlowOptions) -> Self {
        let mut state = AuthState::new(options.initial_step, options.online);
        if let Some(mobile) = &options.current_mobile {
            state.form.mobile = mobile.clone();
        }

        Self {
            state,
            otp_origin: OtpOrigin::External,
            options,
            pending_user: None,
            pending_mobile: None,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn options(&self) -> &FlowOptions {
        &self.options
    }

    pub fn otp_origin(&self) -> OtpOrigin {
        self.otp_origin
    }

    pub fn decide(&mut self, event: &AuthEvent) -> Option<AuthCommand> {
        match event {
            // Input events
            AuthEvent::CacheLoaded { credentials } => {
                self.prefill(credentials);
                None
            }
            AuthEvent::FieldChanged { field, value } => {
                self.state.form.set(*field, value.clone());
                self.state.error = None;
                self.state.inputs_invalid = false;
                None
            }
            AuthEvent::OtpCodeChanged { input } => {
                self.state.otp_code = OtpCode::sanitize(input);
                None
            }
            AuthEvent::PasswordVisibilityToggled => {
                self.state.show_password = !self.state.show_password;
                None
            }
            AuthEvent::ModeToggled => {
                self.toggle_mode();
                None
            }
            AuthEvent::NetworkChanged { online } => {
                self.state.online = *online;
                self.state.info = offline_info(*online);
                None
            }
            AuthEvent::SubmitRequested if self.state.loading => None,
            AuthEvent::SubmitRequested => match self.state.step {
                AuthStep::Login => self.submit_login(),
                AuthStep::Signup => self.submit_signup(),
                AuthStep::Otp => self.submit_otp(),
            },
            AuthEvent::OtpSubmitRequested if self.state.loading => None,
            AuthEvent::OtpSubmitRequested if self.state.step != AuthStep::Otp => None,
            AuthEvent::OtpSubmitRequested => self.submit_otp(),
            AuthEvent::LeaveOtpRequested => self.leave_otp(),

            // Login facts
            AuthEvent::SignedIn { user } => {
                self.pending_user = Some(user.clone());
                Some(AuthCommand::FetchProfile { user_id: user.id })
            }
            AuthEvent::SignInFailed { error } => self.sign_in_failed(error),
            AuthEvent::ProfileLoaded { profile } => {
                if needs_verification(profile.as_ref()) {
                    self.pending_user = None;
                    self.enter_otp(OtpOrigin::Login, messages::VERIFY_MOBILE_TO_CONTINUE);
                    return self.finish(AuthOutcome::VerificationRequired);
                }
                match self.pending_user.take() {
                    Some(user) => Some(self.cache_login(user)),
                    None => self.fail(AuthError::Unknown("profile loaded without a user".into())),
                }
            }
            AuthEvent::LoginCached { user } => self.finish(AuthOutcome::LoggedIn {
                user: user.clone(),
                offline: false,
            }),
            AuthEvent::OfflineLoginChecked { result } => match result {
                Ok(user) => self.finish(AuthOutcome::LoggedIn {
                    user: user.clone(),
                    offline: true,
                }),
                Err(e) => self.fail(e.clone().into()),
            },

            // Sign-up facts
            AuthEvent::MobileChecked { exists: true } => {
                self.pending_mobile = None;
                self.fail(AuthError::MobileAlreadyRegistered)
            }
            AuthEvent::MobileChecked { exists: false } => self.sign_up(),
            AuthEvent::SignedUp { user: Some(user) } => {
                self.pending_mobile = None;
                Some(AuthCommand::IssueOtp { user_id: user.id })
            }
            AuthEvent::SignedUp { user: None } => {
                self.pending_mobile = None;
                self.fail(AuthError::SignUpFailed(messages::NO_USER_RETURNED.to_string()))
            }
            AuthEvent::SignUpFailed { error } => {
                self.pending_mobile = None;
                self.fail(match error {
                    BackendError::AlreadyRegistered => AuthError::AlreadyRegistered,
                    BackendError::Network(_) => AuthError::NetworkUnreachable,
                    other => AuthError::SignUpFailed(other.message()),
                })
            }
            AuthEvent::OtpIssued { .. } => {
                self.enter_otp(OtpOrigin::Signup, messages::ACCOUNT_CREATED);
                self.finish(AuthOutcome::AccountCreated)
            }

            // Verification facts
            AuthEvent::OtpChecked { verified: false } => self.fail(AuthError::VerificationMismatch),
            AuthEvent::OtpChecked { verified: true } => self.verified(),
            AuthEvent::OtpCheckFailed { error } => self.fail(otp::verification_error(error)),
            AuthEvent::Reauthenticated { user } => Some(self.cache_login(user.clone())),
            AuthEvent::ReauthenticationFailed { .. } => {
                self.enter_step(AuthStep::Login);
                self.state.message = Some(messages::MOBILE_VERIFIED.to_string());
                self.finish(AuthOutcome::ReturnedToLogin)
            }
        }
    }

    fn prefill(&mut self, credentials: &CachedCredentials) {
        if !credentials.is_complete() {
            return;
        }
        if self.options.current_mobile.is_none() {
            self.state.form.mobile = credentials.mobile.clone();
        }
        self.state.form.password = credentials.password.clone();
    }

    fn toggle_mode(&mut self) {
        let next = match self.state.step {
            _ if self.state.loading => return,
            AuthStep::Login => AuthStep::Signup,
            AuthStep::Signup => AuthStep::Login,
            AuthStep::Otp => return,
        };
        debug!(from = ?self.state.step, to = ?next, "toggling auth mode");
        self.enter_step(next);
        self.state.form = FormState {
            mobile: self.options.current_mobile.clone().unwrap_or_default(),
            ..FormState::default()
        };
    }

    fn submit_login(&mut self) -> Option<AuthCommand> {
        self.begin();
        let Some(mobile) = MobileNumber::parse(&self.state.form.mobile) else {
            return self.fail(AuthError::InvalidMobile);
        };

        if !self.state.online {
            debug!("offline, checking cached credentials");
            return Some(self.offline_login());
        }

        Some(AuthCommand::SignIn {
            email: mobile.synthetic_email(&self.options.email_domain),
            password: self.state.form.password.clone(),
        })
    }

    fn sign_in_failed(&mut self, error: &BackendError) -> Option<AuthCommand> {
        self.pending_user = None;
        match error {
            BackendError::Network(_) => {
                self.state.info = Some(messages::TRYING_OFFLINE.to_string());
                Some(self.offline_login())
            }
            BackendError::InvalidCredentials => self.fail(AuthError::InvalidCredentials),
            BackendError::EmailNotConfirmed => self.fail(AuthError::AccountNotActivated),
            BackendError::NotConfigured(_) | BackendError::FunctionMissing(_) => {
                self.fail(AuthError::BackendMisconfigured(Misconfiguration::Database))
            }
            other => self.fail(AuthError::Unknown(other.message())),
        }
    }

    fn offline_login(&self) -> AuthCommand {
        AuthCommand::OfflineLogin {
            mobile: self.state.form.mobile.clone(),
            password: self.state.form.password.clone(),
        }
    }

    fn cache_login(&self, user: User) -> AuthCommand {
        AuthCommand::CacheLogin {
            credentials: CachedCredentials {
                mobile: self.state.form.mobile.clone(),
                password: self.state.form.password.clone(),
            },
            user,
        }
    }

    fn submit_signup(&mut self) -> Option<AuthCommand> {
        self.begin();
        let Some(mobile) = MobileNumber::parse(&self.state.form.mobile) else {
            return self.fail(AuthError::InvalidMobile);
        };
        if !self.state.online {
            return self.fail(AuthError::OfflineSignup);
        }

        let local = mobile.local_db();
        self.pending_mobile = Some(mobile);
        Some(AuthCommand::CheckMobile { mobile: local })
    }

    fn sign_up(&mut self) -> Option<AuthCommand> {
        let Some(mobile) = self.pending_mobile.clone() else {
            return self.fail(AuthError::Unknown("mobile check without a sign-up".into()));
        };

        Some(AuthCommand::SignUp {
            email: mobile.synthetic_email(&self.options.email_domain),
            password: self.state.form.password.clone(),
            metadata: SignUpMetadata {
                full_name: self.state.form.full_name.trim().to_string(),
                mobile_number: mobile.local_db(),
            },
        })
    }

    fn submit_otp(&mut self) -> Option<AuthCommand> {
        self.state.loading = true;
        self.state.error = None;
        match VerificationRequest::new(&self.state.form.mobile, &self.state.otp_code) {
            Ok(request) => Some(AuthCommand::VerifyOtp { request }),
            Err(e) => self.fail(e),
        }
    }

    fn verified(&mut self) -> Option<AuthCommand> {
        self.state.otp_code.clear();
        let has_password = !self.state.form.password.is_empty();

        match otp::after_verification(
            self.otp_origin,
            self.options.handles_verification,
            has_password,
        ) {
            AfterVerification::Report => self.finish(AuthOutcome::Verified),
            AfterVerification::Reauthenticate => {
                let Some(mobile) = MobileNumber::parse(&self.state.form.mobile) else {
                    return self.fail(AuthError::InvalidMobile);
                };
                self.state.message = Some(messages::MOBILE_VERIFIED_SIGNING_IN.to_string());
                Some(AuthCommand::Reauthenticate {
                    email: mobile.synthetic_email(&self.options.email_domain),
                    password: self.state.form.password.clone(),
                })
            }
            AfterVerification::ReturnToLogin => {
                self.enter_step(AuthStep::Login);
                self.state.message = Some(messages::MOBILE_VERIFIED.to_string());
                self.finish(AuthOutcome::ReturnedToLogin)
            }
        }
    }

    fn leave_otp(&mut self) -> Option<AuthCommand> {
        if self.state.step != AuthStep::Otp || self.state.loading {
            return None;
        }
        if self.options.handles_logout {
            return self.finish(AuthOutcome::LoggedOut);
        }
        self.state.otp_code.clear();
        self.enter_step(AuthStep::Login);
        self.finish(AuthOutcome::ReturnedToLogin)
    }

    fn enter_otp(&mut self, origin: OtpOrigin, message: &str) {
        self.otp_origin = origin;
        self.state.otp_code.clear();
        self.enter_step(AuthStep::Otp);
        self.state.message = Some(message.to_string());
    }

    fn enter_step(&mut self, step: AuthStep) {
        self.state.step = step;
        self.state.clear_notices();
    }

    fn begin(&mut self) {
        self.state.loading = true;
        self.state.clear_notices();
    }

    fn finish(&mut self, outcome: AuthOutcome) -> Option<AuthCommand> {
        self.state.loading = false;
        Some(AuthCommand::Finish(Ok(outcome)))
    }

    fn fail(&mut self, error: AuthError) -> Option<AuthCommand> {
        debug!(error = %error, step = ?self.state.step, "auth submission failed");
        self.state.loading = false;
        self.state.inputs_invalid = error.flags_inputs();
        self.state.error = Some(error.clone());
        Some(AuthCommand::Finish(Err(error)))
    }
}

/// Pure transition: hand the machine an event, get it back with the next
/// command.
pub fn transition(
    mut machine: AuthMachine,
    event: &AuthEvent,
) -> (AuthMachine, Option<AuthCommand>) {
    let command = machine.decide(event);
    (machine, command)
}
