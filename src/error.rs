//! Authentication error taxonomy and provider-failure classification

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw failure reported by a collaborator (identity provider).
///
/// The `code` is an opaque string from the provider's own vocabulary and must
/// never be shown to a user; pass the failure through [`classify`] first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("provider failure {code}: {message}")]
pub struct ProviderError {
    /// Opaque provider failure code (e.g. `user-not-found`)
    pub code: String,

    /// Raw provider message, used only as a fallback for unmapped codes
    pub message: String,
}

impl ProviderError {
    /// Create a new provider failure
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Authentication and authorization errors
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthError {
    /// Local validation failure; no collaborator call was made
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Credentials were rejected by the identity provider
    #[error("Wrong credential: {message}")]
    WrongCredential { message: String },

    /// The referenced account or document does not exist
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The account (or operation) is disabled
    #[error("Disabled: {message}")]
    Disabled { message: String },

    /// Too many attempts in a short window
    #[error("Rate limited")]
    RateLimited,

    /// Network failure while reaching a collaborator
    #[error("Network failure")]
    NetworkFailure,

    /// Inconsistent state: an authenticated identity with a missing or
    /// invalid profile, or a uniqueness clash
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// No authenticated session is present
    #[error("Unauthenticated")]
    Unauthenticated,

    /// The session lacks the role required for the operation
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Unmapped provider failure; message carries the provider's raw text
    #[error("Unknown error: {message}")]
    Unknown { message: String },
}

impl AuthError {
    /// Stable error code for logs and API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidInput { .. } => "INVALID_INPUT",
            AuthError::WrongCredential { .. } => "WRONG_CREDENTIAL",
            AuthError::NotFound { .. } => "NOT_FOUND",
            AuthError::Disabled { .. } => "DISABLED",
            AuthError::RateLimited => "RATE_LIMITED",
            AuthError::NetworkFailure => "NETWORK_FAILURE",
            AuthError::Conflict { .. } => "CONFLICT",
            AuthError::Unauthenticated => "UNAUTHENTICATED",
            AuthError::Forbidden { .. } => "FORBIDDEN",
            AuthError::Unknown { .. } => "UNKNOWN",
        }
    }

    /// Human-readable message safe to render to the user
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidInput { message }
            | AuthError::WrongCredential { message }
            | AuthError::NotFound { message }
            | AuthError::Disabled { message }
            | AuthError::Conflict { message }
            | AuthError::Forbidden { message }
            | AuthError::Unknown { message } => message.clone(),
            AuthError::RateLimited => "Too many attempts. Try again later".to_string(),
            AuthError::NetworkFailure => {
                "Connection error. Check your internet connection".to_string()
            }
            AuthError::Unauthenticated => "You must log in to continue".to_string(),
        }
    }

    /// Create an invalid-input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a wrong-credential error
    pub fn wrong_credential(message: impl Into<String>) -> Self {
        Self::WrongCredential {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a disabled error
    pub fn disabled(message: impl Into<String>) -> Self {
        Self::Disabled {
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create an unknown error
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }
}

/// Map a raw provider failure onto the closed [`AuthError`] taxonomy.
///
/// Pure function; the returned error's [`AuthError::user_message`] is the only
/// text that may reach the UI. Unmapped codes fall back to the provider's raw
/// message under [`AuthError::Unknown`].
pub fn classify(failure: &ProviderError) -> AuthError {
    match failure.code.as_str() {
        "invalid-email" => AuthError::invalid_input("The email address is not valid"),
        "user-disabled" => AuthError::disabled("This account has been disabled"),
        "user-not-found" => AuthError::not_found("No account exists with this email"),
        "wrong-password" => AuthError::wrong_credential("Incorrect password"),
        "invalid-credential" => {
            AuthError::wrong_credential("Invalid credentials. Check your email and password")
        }
        "too-many-requests" => AuthError::RateLimited,
        "network-request-failed" => AuthError::NetworkFailure,
        "email-already-in-use" => {
            AuthError::conflict("This email is already registered. Please log in")
        }
        "weak-password" => {
            AuthError::invalid_input("The password is too weak. Use at least 6 characters")
        }
        "operation-not-allowed" => AuthError::disabled("Sign-ups are temporarily disabled"),
        _ => AuthError::unknown(failure.message.clone()),
    }
}
