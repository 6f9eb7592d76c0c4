//! Auth flow controller.
//!
//! Owns the [`AuthMachine`] and runs its commands through the effects until
//! a submission settles. Taking `&mut self` for every submission keeps at
//! most one backend round-trip in flight.

use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backend::AuthBackend;
use crate::cache::{KeyValueStore, StoreError};
use crate::commands::AuthOutcome;
use crate::config::FlowOptions;
use crate::effects::{self, AuthDeps};
use crate::error::AuthError;
use crate::events::AuthEvent;
use crate::machines::AuthMachine;
use crate::otp::OtpOrigin;
use crate::state::{AuthState, Field};

pub struct AuthFlow {
    machine: AuthMachine,
    deps: AuthDeps,
}

impl AuthFlow {
    /// Build the flow and prefill the form from the device cache.
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        store: Arc<dyn KeyValueStore>,
        options: FlowOptions,
    ) -> Self {
        let deps = AuthDeps::new(backend, store);
        let mut machine = AuthMachine::new(options);

        if let Some(credentials) = deps.cache.load_credentials() {
            debug!("prefilling form from cached credentials");
            machine.decide(&AuthEvent::CacheLoaded { credentials });
        }

        Self { machine, deps }
    }

    pub fn state(&self) -> &AuthState {
        self.machine.state()
    }

    pub fn otp_origin(&self) -> OtpOrigin {
        self.machine.otp_origin()
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.machine.decide(&AuthEvent::FieldChanged {
            field,
            value: value.into(),
        });
    }

    pub fn set_otp_code(&mut self, input: &str) {
        self.machine.decide(&AuthEvent::OtpCodeChanged {
            input: input.to_string(),
        });
    }

    pub fn toggle_password_visibility(&mut self) {
        self.machine.decide(&AuthEvent::PasswordVisibilityToggled);
    }

    pub fn toggle_mode(&mut self) {
        self.machine.decide(&AuthEvent::ModeToggled);
    }

    /// Feed a connectivity change from the platform.
    pub fn set_online(&mut self, online: bool) {
        if online != self.state().online {
            info!(online, "network status changed");
        }
        self.machine.decide(&AuthEvent::NetworkChanged { online });
    }

    /// Submit the login or sign-up form, or the OTP step's code.
    pub async fn submit(&mut self) -> Result<AuthOutcome, AuthError> {
        self.run(AuthEvent::SubmitRequested).await
    }

    pub async fn submit_otp(&mut self) -> Result<AuthOutcome, AuthError> {
        self.run(AuthEvent::OtpSubmitRequested).await
    }

    /// "Back" on the OTP step.
    pub async fn leave_otp(&mut self) -> Result<AuthOutcome, AuthError> {
        self.run(AuthEvent::LeaveOtpRequested).await
    }

    /// Remember an explicit logout so the session is not restored on the
    /// next start. Cached credentials stay for the offline fallback.
    pub fn logout(&self) -> Result<(), StoreError> {
        info!("marking device as logged out");
        self.deps.cache.mark_logged_out()
    }

    async fn run(&mut self, event: AuthEvent) -> Result<AuthOutcome, AuthError> {
        let step = self.state().step;
        let mut next = self.machine.decide(&event);
        if next.is_none() {
            debug!(?step, ?event, "event ignored");
            return Ok(AuthOutcome::Ignored);
        }

        while let Some(command) = next {
            match effects::execute(command, &self.deps).await {
                ControlFlow::Break(result) => {
                    match &result {
                        Ok(outcome) => info!(?step, ?outcome, "auth submission finished"),
                        Err(e) => warn!(?step, error = %e, "auth submission failed"),
                    }
                    return result;
                }
                ControlFlow::Continue(fact) => next = self.machine.decide(&fact),
            }
        }

        // Every fact answers with a command; reaching here means the
        // machine dropped a submission.
        warn!(?step, "auth submission ended without an outcome");
        Ok(AuthOutcome::Ignored)
    }
}
