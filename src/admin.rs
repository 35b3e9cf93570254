//! Admin directory operations over profile documents
//!
//! Every operation re-validates the acting session's role here; the
//! projection cache is never consulted for authorization.

use std::sync::Arc;

use tracing::debug;

use crate::error::AuthError;
use crate::session::{Role, Session};
use crate::traits::{ProfileDocument, ProfileStore, ProfileUpdate};
use crate::AuthResult;

/// Directory of profile documents with role-checked mutations.
pub struct AdminDirectory {
    store: Arc<dyn ProfileStore>,
}

impl AdminDirectory {
    /// Create a directory over the injected store
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// All client profiles, newest first
    pub async fn list_clients(&self, acting: &Session) -> AuthResult<Vec<ProfileDocument>> {
        self.ensure_admin(acting)?;
        self.store.query_by_role(Role::Client).await
    }

    /// A single client profile. Fails with [`AuthError::NotFound`] if the
    /// document is absent and [`AuthError::Conflict`] if it is not a client.
    pub async fn client(&self, acting: &Session, subject_id: &str) -> AuthResult<ProfileDocument> {
        self.ensure_admin(acting)?;

        let Some(doc) = self.store.get(subject_id).await? else {
            return Err(AuthError::not_found("Client not found"));
        };

        if Role::parse(&doc.role) != Some(Role::Client) {
            return Err(AuthError::conflict("The user is not a client"));
        }

        Ok(doc)
    }

    /// Client profiles matching a name, case-insensitively, newest first
    pub async fn find_by_name(
        &self,
        acting: &Session,
        name: &str,
    ) -> AuthResult<Vec<ProfileDocument>> {
        self.ensure_admin(acting)?;
        self.store
            .query_by_normalized_name(&name.trim().to_lowercase())
            .await
    }

    /// Activate or deactivate an account
    pub async fn set_active(
        &self,
        acting: &Session,
        subject_id: &str,
        active: bool,
    ) -> AuthResult<()> {
        self.ensure_admin(acting)?;

        if self.store.get(subject_id).await?.is_none() {
            return Err(AuthError::not_found("User not found"));
        }

        debug!(subject_id, active, "toggling account status");
        self.store
            .update(subject_id, ProfileUpdate::set_active(active))
            .await
    }

    /// Change an account's role. The typed [`Role`] argument makes
    /// out-of-enum roles unrepresentable here.
    pub async fn change_role(
        &self,
        acting: &Session,
        subject_id: &str,
        role: Role,
    ) -> AuthResult<()> {
        self.ensure_admin(acting)?;

        if self.store.get(subject_id).await?.is_none() {
            return Err(AuthError::not_found("User not found"));
        }

        debug!(subject_id, %role, "changing account role");
        self.store
            .update(subject_id, ProfileUpdate::set_role(role))
            .await
    }

    /// Apply a partial profile update. Admins may update anyone; other
    /// sessions only their own document.
    pub async fn update_profile(
        &self,
        acting: &Session,
        subject_id: &str,
        update: ProfileUpdate,
    ) -> AuthResult<()> {
        if acting.role != Role::Admin && acting.subject_id != subject_id {
            return Err(AuthError::forbidden(
                "You may only update your own profile",
            ));
        }

        // Role and activation changes stay admin-only even on own profile.
        if acting.role != Role::Admin && (update.role.is_some() || update.active.is_some()) {
            return Err(AuthError::forbidden(
                "Only an administrator can change roles or account status",
            ));
        }

        self.store.update(subject_id, update).await
    }

    fn ensure_admin(&self, acting: &Session) -> AuthResult<()> {
        if acting.role != Role::Admin {
            return Err(AuthError::forbidden("Administrator access required"));
        }
        Ok(())
    }
}
