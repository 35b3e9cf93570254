//! In-memory collaborators for tests and local development
//!
//! [`MemoryIdentityProvider`] reproduces the hosted provider's failure codes
//! so the flows and the classifier can be exercised end to end, and counts
//! the calls the testable properties care about (sign-outs, first-state
//! subscriptions, reset dispatches). Credential storage policy is the real
//! provider's concern; passwords are kept verbatim here.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{AuthError, ProviderError};
use crate::session::Role;
use crate::traits::{
    Identity, IdentityProvider, NewProfile, ProfileDocument, ProfileStore, ProfileUpdate,
};
use crate::AuthResult;

#[derive(Debug, Clone)]
struct UserRecord {
    identity: Identity,
    password: String,
    disabled: bool,
}

/// A password-reset dispatch recorded by the memory provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetRequest {
    pub email: String,
    pub return_url: String,
}

/// In-memory identity provider.
#[derive(Default)]
pub struct MemoryIdentityProvider {
    users: Mutex<HashMap<String, UserRecord>>,
    current: Mutex<Option<Identity>>,
    sign_outs: AtomicUsize,
    first_state_subscriptions: AtomicUsize,
    reset_requests: Mutex<Vec<ResetRequest>>,
}

impl MemoryIdentityProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user directly, returning its minted identity
    pub fn add_user(&self, email: &str, password: &str) -> Identity {
        let identity = Identity {
            subject_id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            email_verified: false,
        };
        self.users.lock().unwrap().insert(
            email.to_string(),
            UserRecord {
                identity: identity.clone(),
                password: password.to_string(),
                disabled: false,
            },
        );
        identity
    }

    /// Mark a user as disabled at the provider level
    pub fn disable_user(&self, email: &str) {
        if let Some(record) = self.users.lock().unwrap().get_mut(email) {
            record.disabled = true;
        }
    }

    /// Make the given user the current identity, as if a prior page had
    /// signed them in
    pub fn set_signed_in(&self, email: &str) {
        let identity = self
            .users
            .lock()
            .unwrap()
            .get(email)
            .map(|record| record.identity.clone());
        *self.current.lock().unwrap() = identity;
    }

    /// Number of sign-out calls observed
    pub fn sign_out_count(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    /// Number of first-state subscriptions observed
    pub fn first_state_subscription_count(&self) -> usize {
        self.first_state_subscriptions.load(Ordering::SeqCst)
    }

    /// Password-reset dispatches recorded so far
    pub fn reset_requests(&self) -> Vec<ResetRequest> {
        self.reset_requests.lock().unwrap().clone()
    }

    /// The current identity slot (test observability)
    pub fn current_identity(&self) -> Option<Identity> {
        self.current.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn first_known_identity(&self) -> Result<Option<Identity>, ProviderError> {
        self.first_state_subscriptions.fetch_add(1, Ordering::SeqCst);
        // The memory provider's state is known immediately; the delayed
        // boot-notification fake lives in the integration tests.
        Ok(self.current.lock().unwrap().clone())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        let users = self.users.lock().unwrap();
        let Some(record) = users.get(email) else {
            return Err(ProviderError::new("user-not-found", "no user record"));
        };
        if record.disabled {
            return Err(ProviderError::new("user-disabled", "account disabled"));
        }
        if record.password != password {
            return Err(ProviderError::new("wrong-password", "password mismatch"));
        }
        let identity = record.identity.clone();
        drop(users);
        *self.current.lock().unwrap() = Some(identity.clone());
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        if !email.contains('@') {
            return Err(ProviderError::new("invalid-email", "malformed email"));
        }
        if password.chars().count() < 6 {
            return Err(ProviderError::new("weak-password", "password below minimum"));
        }

        let mut users = self.users.lock().unwrap();
        if users.contains_key(email) {
            return Err(ProviderError::new(
                "email-already-in-use",
                "email already registered",
            ));
        }

        let identity = Identity {
            subject_id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            email_verified: false,
        };
        users.insert(
            email.to_string(),
            UserRecord {
                identity: identity.clone(),
                password: password.to_string(),
                disabled: false,
            },
        );
        drop(users);

        // Signing up also signs in, matching the hosted provider.
        *self.current.lock().unwrap() = Some(identity.clone());
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        *self.current.lock().unwrap() = None;
        Ok(())
    }

    async fn send_password_reset(
        &self,
        email: &str,
        return_url: &str,
    ) -> Result<(), ProviderError> {
        if !self.users.lock().unwrap().contains_key(email) {
            // The hosted provider discloses this; the forgot flow hides it.
            return Err(ProviderError::new("user-not-found", "no user record"));
        }
        self.reset_requests.lock().unwrap().push(ResetRequest {
            email: email.to_string(),
            return_url: return_url.to_string(),
        });
        Ok(())
    }

    async fn reauthenticate(
        &self,
        email: &str,
        current_password: &str,
    ) -> Result<(), ProviderError> {
        let users = self.users.lock().unwrap();
        let Some(record) = users.get(email) else {
            return Err(ProviderError::new("user-not-found", "no user record"));
        };
        if record.password != current_password {
            return Err(ProviderError::new("wrong-password", "password mismatch"));
        }
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), ProviderError> {
        if new_password.chars().count() < 6 {
            return Err(ProviderError::new("weak-password", "password below minimum"));
        }
        let current = self.current.lock().unwrap().clone();
        let Some(identity) = current else {
            return Err(ProviderError::new("user-not-found", "no current identity"));
        };
        if let Some(record) = self.users.lock().unwrap().get_mut(&identity.email) {
            record.password = new_password.to_string();
        }
        Ok(())
    }
}

/// In-memory profile store. Stamps timestamps from its own clock, which is
/// the "server clock" as far as callers are concerned.
#[derive(Default)]
pub struct MemoryProfileStore {
    docs: Mutex<HashMap<String, ProfileDocument>>,
}

impl MemoryProfileStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document directly, bypassing create semantics (test setup)
    pub fn insert_raw(&self, doc: ProfileDocument) {
        self.docs
            .lock()
            .unwrap()
            .insert(doc.subject_id.clone(), doc);
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.docs.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, subject_id: &str) -> AuthResult<Option<ProfileDocument>> {
        Ok(self.docs.lock().unwrap().get(subject_id).cloned())
    }

    async fn create(&self, subject_id: &str, profile: NewProfile) -> AuthResult<()> {
        let mut docs = self.docs.lock().unwrap();
        if docs.contains_key(subject_id) {
            return Err(AuthError::conflict("Profile document already exists"));
        }
        let now = Utc::now();
        docs.insert(
            subject_id.to_string(),
            ProfileDocument {
                subject_id: subject_id.to_string(),
                full_name: profile.full_name,
                full_name_normalized: profile.full_name_normalized,
                email: profile.email,
                phone: profile.phone,
                role: profile.role.as_str().to_string(),
                active: profile.active,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn update(&self, subject_id: &str, update: ProfileUpdate) -> AuthResult<()> {
        let mut docs = self.docs.lock().unwrap();
        let Some(doc) = docs.get_mut(subject_id) else {
            return Err(AuthError::not_found("Profile document not found"));
        };

        if let Some(full_name) = update.full_name {
            doc.full_name_normalized = full_name.to_lowercase();
            doc.full_name = full_name;
        }
        if let Some(phone) = update.phone {
            doc.phone = phone;
        }
        if let Some(role) = update.role {
            doc.role = role.as_str().to_string();
        }
        if let Some(active) = update.active {
            doc.active = active;
        }
        doc.updated_at = Utc::now();
        Ok(())
    }

    async fn query_by_role(&self, role: Role) -> AuthResult<Vec<ProfileDocument>> {
        let mut docs: Vec<ProfileDocument> = self
            .docs
            .lock()
            .unwrap()
            .values()
            .filter(|doc| doc.role == role.as_str())
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(docs)
    }

    async fn query_by_normalized_name(&self, name: &str) -> AuthResult<Vec<ProfileDocument>> {
        let mut docs: Vec<ProfileDocument> = self
            .docs
            .lock()
            .unwrap()
            .values()
            .filter(|doc| doc.full_name_normalized == name)
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_profile(name: &str, email: &str, role: Role) -> NewProfile {
        NewProfile {
            full_name: name.to_string(),
            full_name_normalized: name.to_lowercase(),
            email: email.to_string(),
            phone: String::new(),
            role,
            active: true,
        }
    }

    #[tokio::test]
    async fn test_sign_in_failure_codes() {
        let provider = MemoryIdentityProvider::new();
        provider.add_user("ana@example.com", "secret1");

        let err = provider.sign_in("nobody@example.com", "x").await.unwrap_err();
        assert_eq!(err.code, "user-not-found");

        let err = provider.sign_in("ana@example.com", "bad").await.unwrap_err();
        assert_eq!(err.code, "wrong-password");

        provider.disable_user("ana@example.com");
        let err = provider.sign_in("ana@example.com", "secret1").await.unwrap_err();
        assert_eq!(err.code, "user-disabled");
    }

    #[tokio::test]
    async fn test_sign_up_rejects_duplicates_and_weak_passwords() {
        let provider = MemoryIdentityProvider::new();
        provider.add_user("ana@example.com", "secret1");

        let err = provider.sign_up("ana@example.com", "secret1").await.unwrap_err();
        assert_eq!(err.code, "email-already-in-use");

        let err = provider.sign_up("new@example.com", "abc12").await.unwrap_err();
        assert_eq!(err.code, "weak-password");

        // Five characters in six bytes is still weak.
        let err = provider.sign_up("new@example.com", "señor").await.unwrap_err();
        assert_eq!(err.code, "weak-password");

        let identity = provider.sign_up("new@example.com", "abc123").await.unwrap();
        assert_eq!(identity.email, "new@example.com");
        // Signing up signs in.
        assert_eq!(provider.current_identity().unwrap().email, "new@example.com");
    }

    #[tokio::test]
    async fn test_update_password_counts_characters() {
        let provider = MemoryIdentityProvider::new();
        provider.add_user("ana@example.com", "secret1");
        provider.set_signed_in("ana@example.com");

        let err = provider.update_password("señor").await.unwrap_err();
        assert_eq!(err.code, "weak-password");

        provider.update_password("señora").await.unwrap();
        assert!(provider.sign_in("ana@example.com", "señora").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_rejects_missing_document() {
        let store = MemoryProfileStore::new();
        let err = store
            .update("missing", ProfileUpdate::set_active(false))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_create_rejects_existing_document() {
        let store = MemoryProfileStore::new();
        store
            .create("s1", new_profile("Ana", "ana@example.com", Role::Client))
            .await
            .unwrap();
        let err = store
            .create("s1", new_profile("Ana", "ana@example.com", Role::Client))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFLICT");
    }

    #[tokio::test]
    async fn test_queries_order_newest_first() {
        let store = MemoryProfileStore::new();
        for (id, name) in [("s1", "Ana"), ("s2", "Luz"), ("s3", "Rosa")] {
            store
                .create(id, new_profile(name, &format!("{id}@example.com"), Role::Client))
                .await
                .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let clients = store.query_by_role(Role::Client).await.unwrap();
        let ids: Vec<&str> = clients.iter().map(|d| d.subject_id.as_str()).collect();
        assert_eq!(ids, vec!["s3", "s2", "s1"]);
    }

    #[tokio::test]
    async fn test_update_refreshes_normalized_name() {
        let store = MemoryProfileStore::new();
        store
            .create("s1", new_profile("Ana", "ana@example.com", Role::Client))
            .await
            .unwrap();
        store
            .update(
                "s1",
                ProfileUpdate {
                    full_name: Some("Ana Torres".to_string()),
                    ..ProfileUpdate::default()
                },
            )
            .await
            .unwrap();
        let doc = store.get("s1").await.unwrap().unwrap();
        assert_eq!(doc.full_name_normalized, "ana torres");
    }
}
