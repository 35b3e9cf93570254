//! Password-reset request flow

use std::sync::Arc;

use tracing::debug;

use crate::error::{classify, AuthError};
use crate::flows::{is_valid_email, FlowState};
use crate::traits::IdentityProvider;
use crate::AuthResult;

/// The one notice this flow ever shows on success. Deliberately identical
/// whether or not the address is registered: the reset path must not
/// disclose account existence.
pub const RESET_NOTICE: &str =
    "If an account exists for this email, you will receive instructions to reset your password. \
     Check your inbox and your spam folder";

/// Password-reset form input
#[derive(Debug, Clone)]
pub struct ForgotPasswordInput {
    pub email: String,
}

/// Confirmation that a reset request was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetDispatched {
    /// The non-disclosing notice to render
    pub message: String,
}

/// Password-reset request state machine.
///
/// Terminal on success: further submissions return the same dispatched
/// notice without touching the provider, matching the form that disables
/// itself after sending.
pub struct ForgotPasswordFlow {
    provider: Arc<dyn IdentityProvider>,
    return_url: String,
    state: FlowState,
}

impl ForgotPasswordFlow {
    /// Create a reset flow dispatching with the given return URL
    pub fn new(provider: Arc<dyn IdentityProvider>, return_url: impl Into<String>) -> Self {
        Self {
            provider,
            return_url: return_url.into(),
            state: FlowState::Idle,
        }
    }

    /// Current state of the last (or running) attempt
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Run one reset request.
    ///
    /// An unregistered address succeeds with the same notice as a registered
    /// one. Other provider failures (rate limit, network) are classified and
    /// reported normally.
    pub async fn submit(&mut self, input: ForgotPasswordInput) -> AuthResult<ResetDispatched> {
        if self.state == FlowState::Succeeded {
            return Ok(ResetDispatched {
                message: RESET_NOTICE.to_string(),
            });
        }

        self.state = FlowState::Validating;

        let email = input.email.trim().to_string();
        if !is_valid_email(&email) {
            return Err(self.fail(AuthError::invalid_input("Please enter a valid email")));
        }

        self.state = FlowState::Submitting;

        match self
            .provider
            .send_password_reset(&email, &self.return_url)
            .await
        {
            Ok(()) => {}
            // Do not disclose that the account does not exist.
            Err(e) if e.code == "user-not-found" => {
                debug!("reset requested for unknown address, reporting success");
            }
            Err(e) => return Err(self.fail(classify(&e))),
        }

        self.state = FlowState::Succeeded;
        Ok(ResetDispatched {
            message: RESET_NOTICE.to_string(),
        })
    }

    fn fail(&mut self, err: AuthError) -> AuthError {
        self.state = FlowState::Failed(err.clone());
        err
    }
}
