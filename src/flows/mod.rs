//! Credential flow state machines
//!
//! Login, registration, password reset, and password change share one shape:
//! `Idle -> Validating -> Submitting -> Succeeded | Failed`. Each flow is a
//! per-form value whose `submit` takes `&mut self`, so the borrow checker
//! itself enforces at-most-one in-flight attempt per form. State is
//! per-attempt: every `submit` starts the machine over.

mod forgot;
mod login;
mod password;
mod register;

pub use forgot::{ForgotPasswordFlow, ForgotPasswordInput, ResetDispatched, RESET_NOTICE};
pub use login::{LoginFlow, LoginInput, LoginSuccess};
pub use password::{ChangePasswordFlow, ChangePasswordInput};
pub use register::{RegisterFlow, RegisterInput, RegisterSuccess};

use crate::error::AuthError;

/// State of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    /// No attempt in progress
    Idle,

    /// Local validation running; no collaborator call has been made
    Validating,

    /// Suspended on a collaborator call
    Submitting,

    /// Terminal success
    Succeeded,

    /// Terminal failure carrying the classified error
    Failed(AuthError),
}

/// Simple two-part email shape check: a non-empty local part, an `@`, and a
/// domain containing a dot, with no whitespace anywhere.
pub(crate) fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let Some(domain) = parts.next() else {
        return false;
    };

    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}
