//! Registration flow

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ValidationConfig;
use crate::error::{classify, AuthError};
use crate::flows::{is_valid_email, FlowState};
use crate::guard::Destination;
use crate::session::{Role, SessionProjection};
use crate::traits::{IdentityProvider, NewProfile, ProfileStore, ProjectionCache};
use crate::AuthResult;

/// Registration form input
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub accepted_terms: bool,
}

/// Successful registration: the new subject and where to navigate.
#[derive(Debug, Clone)]
pub struct RegisterSuccess {
    /// Subject id minted by the identity provider
    pub subject_id: String,

    /// Always the client area; registration never creates an admin
    pub destination: Destination,
}

/// Registration state machine.
pub struct RegisterFlow {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn ProfileStore>,
    projection: Arc<dyn ProjectionCache>,
    validation: ValidationConfig,
    state: FlowState,
}

impl RegisterFlow {
    /// Create a registration flow over the injected collaborators
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn ProfileStore>,
        projection: Arc<dyn ProjectionCache>,
        validation: ValidationConfig,
    ) -> Self {
        Self {
            provider,
            store,
            projection,
            validation,
            state: FlowState::Idle,
        }
    }

    /// Current state of the last (or running) attempt
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Run one registration attempt.
    ///
    /// Validation is fail-fast: the first failing rule is reported and no
    /// collaborator is called. On provider success exactly one profile
    /// document is created with role `client` and server-clock timestamps.
    /// A failure between identity creation and document creation leaves an
    /// account with no profile; the next login detects that and surfaces
    /// [`AuthError::Conflict`] — there is no automatic retry here.
    pub async fn submit(&mut self, input: RegisterInput) -> AuthResult<RegisterSuccess> {
        self.state = FlowState::Validating;

        let full_name = input.full_name.trim().to_string();
        let email = input.email.trim().to_string();
        let phone = input.phone.trim().to_string();

        // Character counts, not byte length: "ñ" is one character.
        if full_name.chars().count() < self.validation.min_full_name_length {
            return Err(self.fail(AuthError::invalid_input(format!(
                "The name must have at least {} characters",
                self.validation.min_full_name_length
            ))));
        }

        if !is_valid_email(&email) {
            return Err(self.fail(AuthError::invalid_input("Please enter a valid email")));
        }

        if input.password.chars().count() < self.validation.min_password_length {
            return Err(self.fail(AuthError::invalid_input(format!(
                "The password must have at least {} characters",
                self.validation.min_password_length
            ))));
        }

        if input.password != input.confirm_password {
            return Err(self.fail(AuthError::invalid_input("The passwords do not match")));
        }

        if !input.accepted_terms {
            return Err(self.fail(AuthError::invalid_input(
                "You must accept the terms and conditions",
            )));
        }

        self.state = FlowState::Submitting;

        let identity = match self.provider.sign_up(&email, &input.password).await {
            Ok(identity) => identity,
            Err(e) => return Err(self.fail(classify(&e))),
        };

        let profile = NewProfile {
            full_name_normalized: full_name.to_lowercase(),
            full_name: full_name.clone(),
            email,
            phone,
            // Registration can never mint an admin.
            role: Role::Client,
            active: true,
        };

        if let Err(e) = self.store.create(&identity.subject_id, profile).await {
            // Known inconsistency window: the identity now exists with no
            // profile document. Recovery happens at the next login.
            warn!(
                subject_id = %identity.subject_id,
                "identity created but profile creation failed"
            );
            return Err(self.fail(e));
        }

        self.projection.set(SessionProjection {
            role: Role::Client,
            display_name: full_name,
        });

        debug!(subject_id = %identity.subject_id, "registration succeeded");
        self.state = FlowState::Succeeded;
        Ok(RegisterSuccess {
            subject_id: identity.subject_id,
            destination: Destination::ClientArea,
        })
    }

    fn fail(&mut self, err: AuthError) -> AuthError {
        self.state = FlowState::Failed(err.clone());
        err
    }
}
