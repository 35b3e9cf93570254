//! Collaborator interfaces and the document types they exchange
//!
//! The identity provider and the profile store are external collaborators.
//! They are injected into every component that needs them, so tests can
//! substitute the in-memory implementations from [`crate::memory`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::session::{Role, SessionProjection};
use crate::AuthResult;

/// The provider's authenticated-subject record, independent of any
/// application role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable, unique provider-issued identifier
    pub subject_id: String,

    /// Email address the identity was created with
    pub email: String,

    /// Whether the provider has verified the email address
    pub email_verified: bool,
}

/// Application-owned profile record keyed by subject id.
///
/// The `role` field is raw text at this boundary; only session construction
/// parses it into [`Role`], so documents with out-of-enum roles remain
/// representable and can be rejected with a corrective sign-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDocument {
    /// Subject id of the owning identity
    pub subject_id: String,

    /// Full display name
    pub full_name: String,

    /// Lowercase-folded name for case-insensitive matching
    pub full_name_normalized: String,

    /// Email address, mirrored from the identity
    pub email: String,

    /// Contact phone, may be empty
    #[serde(default)]
    pub phone: String,

    /// Raw role string; parse with [`Role::parse`]
    pub role: String,

    /// Whether the account may hold a session
    pub active: bool,

    /// Server-clock creation timestamp
    pub created_at: DateTime<Utc>,

    /// Server-clock last-update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a profile document. Timestamps are stamped by the
/// store from its own clock, never by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    /// Full display name
    pub full_name: String,

    /// Lowercase-folded name for case-insensitive matching
    pub full_name_normalized: String,

    /// Email address
    pub email: String,

    /// Contact phone, may be empty
    pub phone: String,

    /// Role to create the document with
    pub role: Role,

    /// Initial activation flag
    pub active: bool,
}

/// Partial update of a profile document. `None` fields are left untouched;
/// the store bumps `updated_at` from its own clock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New full name (also refreshes the normalized form)
    pub full_name: Option<String>,

    /// New contact phone
    pub phone: Option<String>,

    /// New role
    pub role: Option<Role>,

    /// New activation flag
    pub active: Option<bool>,
}

impl ProfileUpdate {
    /// Update that only toggles the activation flag
    pub fn set_active(active: bool) -> Self {
        Self {
            active: Some(active),
            ..Self::default()
        }
    }

    /// Update that only changes the role
    pub fn set_role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }
}

/// Identity provider collaborator (credential verification, token issuance,
/// password storage all live behind this interface).
///
/// Failures carry the provider's raw code; classify them with
/// [`crate::error::classify`] before anything reaches a user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Suspend until the provider's first state notification, then report
    /// the identity known at that point.
    ///
    /// This is the one asynchronous checkpoint that replaces any synchronous
    /// "current identity" read: before the first notification the provider's
    /// state is indeterminate, and reading it early treats a logged-in user
    /// as anonymous. One-shot per call site; the resolver memoizes it.
    async fn first_known_identity(&self) -> Result<Option<Identity>, ProviderError>;

    /// Authenticate with email and password
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ProviderError>;

    /// Create a new identity with email and password
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, ProviderError>;

    /// Terminate the provider-side session
    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Dispatch a password-reset message with the given return URL
    async fn send_password_reset(&self, email: &str, return_url: &str)
        -> Result<(), ProviderError>;

    /// Re-verify the current credential before a sensitive change
    async fn reauthenticate(
        &self,
        email: &str,
        current_password: &str,
    ) -> Result<(), ProviderError>;

    /// Replace the current identity's password
    async fn update_password(&self, new_password: &str) -> Result<(), ProviderError>;
}

/// Profile document store collaborator.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a document by subject id
    async fn get(&self, subject_id: &str) -> AuthResult<Option<ProfileDocument>>;

    /// Create a document, stamping `created_at`/`updated_at` from the
    /// store's clock. Fails with a conflict if the document already exists.
    async fn create(&self, subject_id: &str, profile: NewProfile) -> AuthResult<()>;

    /// Apply a partial update, bumping `updated_at` from the store's clock.
    /// Fails with not-found if the document is absent.
    async fn update(&self, subject_id: &str, update: ProfileUpdate) -> AuthResult<()>;

    /// Documents holding the given role, newest first
    async fn query_by_role(&self, role: Role) -> AuthResult<Vec<ProfileDocument>>;

    /// Documents whose normalized name equals the given (already folded)
    /// name, newest first
    async fn query_by_normalized_name(&self, name: &str) -> AuthResult<Vec<ProfileDocument>>;
}

/// Tab-scoped cache of the session projection, for UI display only.
///
/// Never a source of truth for authorization; cleared on every sign-out.
pub trait ProjectionCache: Send + Sync {
    /// Store the projection for the current tab
    fn set(&self, projection: SessionProjection);

    /// Read the cached projection, if any
    fn get(&self) -> Option<SessionProjection>;

    /// Drop the cached projection
    fn clear(&self);
}
