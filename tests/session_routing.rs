//! Session resolution and routing integration tests

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use tienda_auth::memory::{MemoryIdentityProvider, MemoryProfileStore};
use tienda_auth::projection::MemoryProjectionCache;
use tienda_auth::traits::{
    Identity, IdentityProvider, NewProfile, ProfileStore, ProjectionCache,
};
use tienda_auth::{
    guard, guard_entry, AuthError, Destination, ProviderError, Role, SessionOutcome,
    SessionProjection, SessionResolver,
};

struct Harness {
    provider: Arc<MemoryIdentityProvider>,
    store: Arc<MemoryProfileStore>,
    projection: Arc<MemoryProjectionCache>,
}

impl Harness {
    fn new() -> Self {
        Self {
            provider: Arc::new(MemoryIdentityProvider::new()),
            store: Arc::new(MemoryProfileStore::new()),
            projection: Arc::new(MemoryProjectionCache::new()),
        }
    }

    fn resolver(&self) -> SessionResolver {
        SessionResolver::new(
            self.provider.clone(),
            self.store.clone(),
            self.projection.clone(),
        )
    }

    async fn provision(&self, email: &str, password: &str, name: &str, role: Role) -> String {
        let identity = self.provider.add_user(email, password);
        self.store
            .create(
                &identity.subject_id,
                NewProfile {
                    full_name: name.to_string(),
                    full_name_normalized: name.to_lowercase(),
                    email: email.to_string(),
                    phone: String::new(),
                    role,
                    active: true,
                },
            )
            .await
            .unwrap();
        identity.subject_id
    }
}

/// Provider whose first state notification only fires when the test releases
/// the gate. Everything else delegates to the memory provider.
struct GatedProvider {
    inner: Arc<MemoryIdentityProvider>,
    gate: watch::Receiver<bool>,
}

impl GatedProvider {
    fn new(inner: Arc<MemoryIdentityProvider>) -> (Arc<Self>, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        (Arc::new(Self { inner, gate: rx }), tx)
    }
}

#[async_trait]
impl IdentityProvider for GatedProvider {
    async fn first_known_identity(&self) -> Result<Option<Identity>, ProviderError> {
        let mut rx = self.gate.clone();
        while !*rx.borrow() {
            rx.changed()
                .await
                .map_err(|_| ProviderError::new("network-request-failed", "gate closed"))?;
        }
        self.inner.first_known_identity().await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        self.inner.sign_in(email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        self.inner.sign_up(email, password).await
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.inner.sign_out().await
    }

    async fn send_password_reset(
        &self,
        email: &str,
        return_url: &str,
    ) -> Result<(), ProviderError> {
        self.inner.send_password_reset(email, return_url).await
    }

    async fn reauthenticate(
        &self,
        email: &str,
        current_password: &str,
    ) -> Result<(), ProviderError> {
        self.inner.reauthenticate(email, current_password).await
    }

    async fn update_password(&self, new_password: &str) -> Result<(), ProviderError> {
        self.inner.update_password(new_password).await
    }
}

#[tokio::test]
async fn resolve_suspends_until_first_state_notification() {
    let h = Harness::new();
    h.provision("ana@example.com", "secret1", "Ana Torres", Role::Client)
        .await;
    h.provider.set_signed_in("ana@example.com");

    let (gated, gate) = GatedProvider::new(h.provider.clone());
    let resolver = Arc::new(SessionResolver::new(
        gated.clone(),
        h.store.clone(),
        h.projection.clone(),
    ));

    // Before the notification fires the resolver must suspend, not report
    // the user as anonymous.
    let premature =
        tokio::time::timeout(Duration::from_millis(50), resolver.resolve()).await;
    assert!(premature.is_err(), "resolver completed before first state notification");

    gate.send(true).unwrap();
    let outcome = resolver.resolve().await.unwrap();
    let session = outcome.session().expect("signed-in user resolved as anonymous");
    assert_eq!(session.email, "ana@example.com");
    assert_eq!(session.role, Role::Client);
}

#[tokio::test]
async fn resolve_is_memoized_to_one_subscription() {
    let h = Harness::new();
    h.provision("ana@example.com", "secret1", "Ana Torres", Role::Client)
        .await;
    h.provider.set_signed_in("ana@example.com");

    let resolver = h.resolver();
    let first = resolver.resolve().await.unwrap();
    let second = resolver.resolve().await.unwrap();

    assert_eq!(h.provider.first_state_subscription_count(), 1);
    assert_eq!(first.session().unwrap(), second.session().unwrap());
}

#[tokio::test]
async fn resolve_without_identity_is_anonymous() {
    let h = Harness::new();
    let resolver = h.resolver();

    let outcome = resolver.resolve().await.unwrap();
    assert!(matches!(outcome, SessionOutcome::Anonymous));

    let err = resolver.require().await.unwrap_err();
    assert_eq!(err, AuthError::Unauthenticated);
}

#[tokio::test]
async fn resolve_with_missing_profile_signs_out_and_denies() {
    let h = Harness::new();
    h.provider.add_user("ghost@example.com", "secret1");
    h.provider.set_signed_in("ghost@example.com");
    h.projection.set(SessionProjection {
        role: Role::Client,
        display_name: "Stale".to_string(),
    });

    let resolver = h.resolver();
    let outcome = resolver.resolve().await.unwrap();
    match outcome {
        SessionOutcome::Denied(err) => assert_eq!(err.error_code(), "CONFLICT"),
        other => panic!("expected denial, got {other:?}"),
    }
    assert_eq!(h.provider.sign_out_count(), 1);
    assert!(h.provider.current_identity().is_none());
    // The stale projection must not survive the corrective sign-out.
    assert!(h.projection.get().is_none());
}

#[tokio::test]
async fn resolve_with_disabled_account_signs_out_once() {
    let h = Harness::new();
    let subject_id = h
        .provision("ana@example.com", "secret1", "Ana Torres", Role::Client)
        .await;
    let mut doc = h.store.get(&subject_id).await.unwrap().unwrap();
    doc.active = false;
    h.store.insert_raw(doc);
    h.provider.set_signed_in("ana@example.com");
    h.projection.set(SessionProjection {
        role: Role::Client,
        display_name: "Ana Torres".to_string(),
    });

    let resolver = h.resolver();
    let outcome = resolver.resolve().await.unwrap();
    match outcome {
        SessionOutcome::Denied(err) => assert_eq!(err.error_code(), "DISABLED"),
        other => panic!("expected denial, got {other:?}"),
    }
    // The corrective sign-out drops the cached projection with the session.
    assert!(h.projection.get().is_none());

    // Memoization covers the side effect: a second resolve neither
    // re-subscribes nor signs out again.
    resolver.resolve().await.unwrap();
    assert_eq!(h.provider.sign_out_count(), 1);
    assert_eq!(h.provider.first_state_subscription_count(), 1);

    let err = resolver.require().await.unwrap_err();
    assert_eq!(err.error_code(), "DISABLED");
}

#[tokio::test]
async fn resolve_with_unrecognized_role_denies() {
    let h = Harness::new();
    let subject_id = h
        .provision("odd@example.com", "secret1", "Odd Role", Role::Client)
        .await;
    let mut doc = h.store.get(&subject_id).await.unwrap().unwrap();
    doc.role = "superuser".to_string();
    h.store.insert_raw(doc);
    h.provider.set_signed_in("odd@example.com");

    let resolver = h.resolver();
    let outcome = resolver.resolve().await.unwrap();
    assert!(matches!(outcome, SessionOutcome::Denied(_)));
    assert_eq!(h.provider.sign_out_count(), 1);
}

#[tokio::test]
async fn logout_clears_projection_and_provider_session() {
    let h = Harness::new();
    h.provision("ana@example.com", "secret1", "Ana Torres", Role::Client)
        .await;
    h.provider.set_signed_in("ana@example.com");
    h.projection.set(SessionProjection {
        role: Role::Client,
        display_name: "Ana Torres".to_string(),
    });

    let resolver = h.resolver();
    resolver.logout().await.unwrap();

    assert_eq!(h.provider.sign_out_count(), 1);
    assert!(h.provider.current_identity().is_none());
    assert!(h.projection.get().is_none());
}

#[tokio::test]
async fn boot_sequence_routes_resolved_sessions() {
    let h = Harness::new();
    h.provision("admin@example.com", "secret1", "Marco Ruiz", Role::Admin)
        .await;
    h.provider.set_signed_in("admin@example.com");

    let resolver = h.resolver();
    let outcome = resolver.resolve().await.unwrap();
    let session = outcome.session();

    // Admin page: stay. Client page: sent to their own area. Entry page:
    // sent away from the form.
    assert_eq!(guard(session, Some(Role::Admin)), Destination::Stay);
    assert_eq!(guard(session, Some(Role::Client)), Destination::AdminArea);
    assert_eq!(guard_entry(session), Destination::AdminArea);
}

#[tokio::test]
async fn boot_sequence_routes_anonymous_to_login() {
    let h = Harness::new();
    let resolver = h.resolver();
    let outcome = resolver.resolve().await.unwrap();
    let session = outcome.session();

    assert!(session.is_none());
    assert_eq!(guard(session, Some(Role::Client)), Destination::LoginEntry);
    assert_eq!(guard(session, None), Destination::LoginEntry);
    assert_eq!(guard_entry(session), Destination::Stay);
}
