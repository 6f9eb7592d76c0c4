use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::backend::AuthBackend;
use crate::cache::{CredentialCache, KeyValueStore};
use crate::commands::{AuthCommand, AuthOutcome};
use crate::error::AuthError;
use crate::events::AuthEvent;
use crate::offline;

/// Collaborators the auth effect needs
#[derive(Clone)]
pub struct AuthDeps {
    pub backend: Arc<dyn AuthBackend>,
    pub cache: CredentialCache<Arc<dyn KeyValueStore>>,
}

impl AuthDeps {
    pub fn new(backend: Arc<dyn AuthBackend>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            cache: CredentialCache::new(store),
        }
    }
}

/// Auth effect - executes commands and reports the outcome as a fact event
///
/// Backend failures become fact events; the machine decides what they mean.
/// `Finish` breaks out with the settled result.
pub async fn execute(
    command: AuthCommand,
    deps: &AuthDeps,
) -> ControlFlow<Result<AuthOutcome, AuthError>, AuthEvent> {
    let event = match command {
        AuthCommand::Finish(result) => return ControlFlow::Break(result),

        AuthCommand::SignIn { email, password } => {
            match deps.backend.sign_in_with_password(&email, &password).await {
                Ok(user) => AuthEvent::SignedIn { user },
                Err(error) => {
                    warn!(email = %email, error = %error, "sign in failed");
                    AuthEvent::SignInFailed { error }
                }
            }
        }

        AuthCommand::FetchProfile { user_id } => match deps.backend.fetch_profile(user_id).await {
            Ok(profile) => AuthEvent::ProfileLoaded { profile },
            Err(e) => {
                // Treated like a missing row: the user is let through.
                warn!(user_id = %user_id, error = %e, "failed to load profile");
                AuthEvent::ProfileLoaded { profile: None }
            }
        },

        AuthCommand::CacheLogin { credentials, user } => {
            if let Err(e) = deps.cache.save_login(&credentials, &user) {
                error!(user_id = %user.id, error = %e, "failed to cache login");
            }
            AuthEvent::LoginCached { user }
        }

        AuthCommand::OfflineLogin { mobile, password } => AuthEvent::OfflineLoginChecked {
            result: offline::attempt_offline_login(&deps.cache, &mobile, &password),
        },

        AuthCommand::CheckMobile { mobile } => {
            match deps.backend.check_if_mobile_exists(&mobile).await {
                Ok(exists) => AuthEvent::MobileChecked { exists },
                Err(e) => {
                    warn!(error = %e, "mobile existence check failed, continuing with sign up");
                    AuthEvent::MobileChecked { exists: false }
                }
            }
        }

        AuthCommand::SignUp {
            email,
            password,
            metadata,
        } => match deps.backend.sign_up(&email, &password, &metadata).await {
            Ok(user) => AuthEvent::SignedUp { user },
            Err(error) => {
                warn!(email = %email, error = %error, "sign up failed");
                AuthEvent::SignUpFailed { error }
            }
        },

        AuthCommand::IssueOtp { user_id } => {
            match deps.backend.generate_mobile_otp(user_id).await {
                Ok(_) => info!(user_id = %user_id, "verification code generated"),
                Err(e) => error!(user_id = %user_id, error = %e, "failed to generate initial OTP"),
            }
            AuthEvent::OtpIssued { user_id }
        }

        AuthCommand::VerifyOtp { request } => {
            debug!(mobile = %request.mobile, "verifying mobile");
            match deps
                .backend
                .verify_mobile_otp(&request.mobile, &request.code)
                .await
            {
                Ok(verified) => AuthEvent::OtpChecked { verified },
                Err(error) => {
                    warn!(error = %error, "verify_mobile_otp failed");
                    AuthEvent::OtpCheckFailed { error }
                }
            }
        }

        AuthCommand::Reauthenticate { email, password } => {
            match deps.backend.sign_in_with_password(&email, &password).await {
                Ok(user) => AuthEvent::Reauthenticated { user },
                Err(error) => {
                    warn!(error = %error, "sign in after verification failed");
                    AuthEvent::ReauthenticationFailed { error }
                }
            }
        }
    };

    ControlFlow::Continue(event)
}
