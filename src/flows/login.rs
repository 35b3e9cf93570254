//! Login flow

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{classify, AuthError};
use crate::flows::FlowState;
use crate::guard::{destination_for, Destination};
use crate::session::{Role, Session, SessionProjection};
use crate::traits::{IdentityProvider, ProfileStore, ProjectionCache};
use crate::AuthResult;

/// Login form input
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful login: the constructed session and where to navigate.
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    /// The session built from identity and profile
    pub session: Session,

    /// The session role's own area
    pub destination: Destination,
}

/// Login state machine. One instance per form; `submit` consumes one attempt.
pub struct LoginFlow {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn ProfileStore>,
    projection: Arc<dyn ProjectionCache>,
    state: FlowState,
}

impl LoginFlow {
    /// Create a login flow over the injected collaborators
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn ProfileStore>,
        projection: Arc<dyn ProjectionCache>,
    ) -> Self {
        Self {
            provider,
            store,
            projection,
            state: FlowState::Idle,
        }
    }

    /// Current state of the last (or running) attempt
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Run one login attempt.
    ///
    /// Validation failures never reach the provider. A provider identity
    /// with a missing profile or an unrecognized role is signed out again
    /// and surfaces as [`AuthError::Conflict`]; a disabled account as
    /// [`AuthError::Disabled`]. On success the projection cache is written
    /// and the destination is the session role's own area.
    pub async fn submit(&mut self, input: LoginInput) -> AuthResult<LoginSuccess> {
        self.state = FlowState::Validating;

        let email = input.email.trim().to_string();
        if email.is_empty() || input.password.is_empty() {
            return Err(self.fail(AuthError::invalid_input("Please complete all fields")));
        }

        self.state = FlowState::Submitting;

        let identity = match self.provider.sign_in(&email, &input.password).await {
            Ok(identity) => identity,
            Err(e) => return Err(self.fail(classify(&e))),
        };

        if !identity.email_verified {
            // Unverified emails are allowed through; worth knowing about.
            debug!(subject_id = %identity.subject_id, "login with unverified email");
        }

        let profile = match self.store.get(&identity.subject_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                warn!(
                    subject_id = %identity.subject_id,
                    "sign-in succeeded but no profile document exists, signing out"
                );
                self.sign_out_quietly().await;
                return Err(self.fail(AuthError::conflict(
                    "Your account is not provisioned. Contact the administrator",
                )));
            }
            Err(e) => return Err(self.fail(e)),
        };

        let Some(role) = Role::parse(&profile.role) else {
            warn!(
                subject_id = %identity.subject_id,
                role = %profile.role,
                "profile carries an unrecognized role, signing out"
            );
            self.sign_out_quietly().await;
            return Err(self.fail(AuthError::conflict(
                "Your account role is not recognized. Contact the administrator",
            )));
        };

        if !profile.active {
            warn!(subject_id = %identity.subject_id, "account is disabled, signing out");
            self.sign_out_quietly().await;
            return Err(self.fail(AuthError::disabled(
                "Your account has been deactivated. Contact the administrator",
            )));
        }

        self.projection.set(SessionProjection {
            role,
            display_name: profile.full_name.clone(),
        });

        let session = Session {
            subject_id: identity.subject_id,
            email: identity.email,
            role,
            display_name: profile.full_name,
            active: profile.active,
        };

        debug!(subject_id = %session.subject_id, %role, "login succeeded");
        self.state = FlowState::Succeeded;
        Ok(LoginSuccess {
            destination: destination_for(role),
            session,
        })
    }

    fn fail(&mut self, err: AuthError) -> AuthError {
        self.state = FlowState::Failed(err.clone());
        err
    }

    /// Corrective sign-out; failure is logged, the login error stands.
    async fn sign_out_quietly(&self) {
        if let Err(e) = self.provider.sign_out().await {
            warn!(code = %e.code, "corrective sign-out failed");
        }
        self.projection.clear();
    }
}
