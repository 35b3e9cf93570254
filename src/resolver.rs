//! Session resolution
//!
//! The identity provider only learns "who is logged in" after an
//! asynchronous one-time initialization event. [`SessionResolver`] turns that
//! into a single deterministic checkpoint: it awaits the provider's first
//! state notification, resolves role data exactly once per page load, and
//! memoizes the outcome so repeated calls neither re-subscribe nor repeat
//! side effects.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::error::{classify, AuthError};
use crate::session::{Role, Session};
use crate::traits::{IdentityProvider, ProfileStore, ProjectionCache};
use crate::AuthResult;

/// Outcome of one session resolution.
#[derive(Debug, Clone)]
pub enum SessionOutcome {
    /// A valid, active, role-bearing session
    Authenticated(Session),

    /// The provider reported no identity
    Anonymous,

    /// An identity was present but could not become a session (missing
    /// profile, disabled account, unrecognized role). The corrective
    /// sign-out has already been performed.
    Denied(AuthError),
}

impl SessionOutcome {
    /// The session, if this outcome carries one
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionOutcome::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

/// Resolves the current session once per page load.
pub struct SessionResolver {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn ProfileStore>,
    projection: Arc<dyn ProjectionCache>,
    outcome: OnceCell<SessionOutcome>,
}

impl SessionResolver {
    /// Create a resolver over the injected collaborators
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn ProfileStore>,
        projection: Arc<dyn ProjectionCache>,
    ) -> Self {
        Self {
            provider,
            store,
            projection,
            outcome: OnceCell::new(),
        }
    }

    /// Resolve the current session.
    ///
    /// Suspends until the provider's first state notification has fired; the
    /// provider's state must never be read synchronously before that. The
    /// whole outcome, including any corrective sign-out, is computed at most
    /// once per resolver; later calls return the memoized result. Store
    /// failures are returned without being memoized, so a retry is possible.
    pub async fn resolve(&self) -> AuthResult<SessionOutcome> {
        let outcome = self
            .outcome
            .get_or_try_init(|| self.resolve_uncached())
            .await?;
        Ok(outcome.clone())
    }

    /// Resolve and require an authenticated session.
    ///
    /// Fails with [`AuthError::Unauthenticated`] when anonymous, or with the
    /// denial error when an identity was rejected.
    pub async fn require(&self) -> AuthResult<Session> {
        match self.resolve().await? {
            SessionOutcome::Authenticated(session) => Ok(session),
            SessionOutcome::Anonymous => Err(AuthError::Unauthenticated),
            SessionOutcome::Denied(err) => Err(err),
        }
    }

    /// Sign out the current identity and clear the projection cache.
    pub async fn logout(&self) -> AuthResult<()> {
        let result = self.provider.sign_out().await;
        // The projection must not outlive the provider-side session even if
        // the sign-out call itself failed.
        self.projection.clear();
        result.map_err(|e| classify(&e))
    }

    async fn resolve_uncached(&self) -> AuthResult<SessionOutcome> {
        let identity = self
            .provider
            .first_known_identity()
            .await
            .map_err(|e| classify(&e))?;

        let Some(identity) = identity else {
            debug!("no identity at first state notification");
            return Ok(SessionOutcome::Anonymous);
        };

        let Some(profile) = self.store.get(&identity.subject_id).await? else {
            warn!(
                subject_id = %identity.subject_id,
                "authenticated identity has no profile document, signing out"
            );
            self.corrective_sign_out().await;
            return Ok(SessionOutcome::Denied(AuthError::conflict(
                "Your account is not provisioned. Contact the administrator",
            )));
        };

        if !profile.active {
            warn!(subject_id = %identity.subject_id, "account is disabled, signing out");
            self.corrective_sign_out().await;
            return Ok(SessionOutcome::Denied(AuthError::disabled(
                "Your account has been deactivated. Contact the administrator",
            )));
        }

        let Some(role) = Role::parse(&profile.role) else {
            warn!(
                subject_id = %identity.subject_id,
                role = %profile.role,
                "profile carries an unrecognized role, signing out"
            );
            self.corrective_sign_out().await;
            return Ok(SessionOutcome::Denied(AuthError::conflict(
                "Your account role is not recognized. Contact the administrator",
            )));
        };

        debug!(subject_id = %identity.subject_id, %role, "session resolved");
        Ok(SessionOutcome::Authenticated(Session {
            subject_id: identity.subject_id,
            email: identity.email,
            role,
            display_name: profile.full_name,
            active: profile.active,
        }))
    }

    /// Best-effort sign-out used when an identity must not become a session.
    /// A failure here is logged and swallowed; the denial verdict stands.
    async fn corrective_sign_out(&self) {
        if let Err(e) = self.provider.sign_out().await {
            warn!(code = %e.code, "corrective sign-out failed");
        }
        self.projection.clear();
    }
}
