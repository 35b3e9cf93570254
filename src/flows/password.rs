//! Password change flow (re-authenticate, then update)

use std::sync::Arc;

use tracing::debug;

use crate::config::ValidationConfig;
use crate::error::{classify, AuthError};
use crate::flows::FlowState;
use crate::traits::IdentityProvider;
use crate::AuthResult;

/// Password-change form input. The email comes from the resolved session,
/// never from the projection cache.
#[derive(Debug, Clone)]
pub struct ChangePasswordInput {
    pub email: String,
    pub current_password: String,
    pub new_password: String,
}

/// Password change state machine. Requires re-authentication with the
/// current password before the update.
pub struct ChangePasswordFlow {
    provider: Arc<dyn IdentityProvider>,
    validation: ValidationConfig,
    state: FlowState,
}

impl ChangePasswordFlow {
    /// Create a password-change flow
    pub fn new(provider: Arc<dyn IdentityProvider>, validation: ValidationConfig) -> Self {
        Self {
            provider,
            validation,
            state: FlowState::Idle,
        }
    }

    /// Current state of the last (or running) attempt
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Run one password change.
    ///
    /// A rejected current password surfaces as
    /// [`AuthError::WrongCredential`] with a message naming the current
    /// password, so the user corrects the right field.
    pub async fn submit(&mut self, input: ChangePasswordInput) -> AuthResult<()> {
        self.state = FlowState::Validating;

        // Character count, not byte length.
        if input.new_password.chars().count() < self.validation.min_password_length {
            return Err(self.fail(AuthError::invalid_input(format!(
                "The new password must have at least {} characters",
                self.validation.min_password_length
            ))));
        }

        self.state = FlowState::Submitting;

        if let Err(e) = self
            .provider
            .reauthenticate(&input.email, &input.current_password)
            .await
        {
            let err = match e.code.as_str() {
                "wrong-password" | "invalid-credential" => {
                    AuthError::wrong_credential("The current password is incorrect")
                }
                _ => classify(&e),
            };
            return Err(self.fail(err));
        }

        if let Err(e) = self.provider.update_password(&input.new_password).await {
            let err = match e.code.as_str() {
                "weak-password" => AuthError::invalid_input("The new password is too weak"),
                _ => classify(&e),
            };
            return Err(self.fail(err));
        }

        debug!("password updated");
        self.state = FlowState::Succeeded;
        Ok(())
    }

    fn fail(&mut self, err: AuthError) -> AuthError {
        self.state = FlowState::Failed(err.clone());
        err
    }
}
