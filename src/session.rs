//! Session and role types
//!
//! A [`Session`] is the validated, role-bearing union of a provider identity
//! and its profile document, resolved once per page lifetime. It is never
//! persisted; only the display-oriented [`SessionProjection`] survives across
//! pages, via the projection cache.

use serde::{Deserialize, Serialize};

/// Application role, controlling destination routing. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
}

impl Role {
    /// Parse a raw role string from a profile document.
    ///
    /// Profile documents carry the role as raw text; anything outside the
    /// closed set yields `None` and must be rejected before a [`Session`] is
    /// constructed.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "admin" => Some(Role::Admin),
            "client" => Some(Role::Client),
            _ => None,
        }
    }

    /// Canonical string form, as stored in profile documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "client",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved identity for the current page lifetime.
///
/// Only ever constructed from a non-null provider identity and an existing,
/// active profile document with a recognized role. Discarded on navigation;
/// never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque provider-issued subject identifier
    pub subject_id: String,

    /// Provider-verified email address
    pub email: String,

    /// Application role parsed from the profile document
    pub role: Role,

    /// Display name from the profile document
    pub display_name: String,

    /// Account activation flag (always true for a constructed session)
    pub active: bool,
}

/// Display-oriented projection of a session, cached across pages.
///
/// Advisory only: never use this for an authorization decision. Re-validate
/// against the session resolver instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProjection {
    /// Role at the time the projection was written
    pub role: Role,

    /// Display name for UI chrome
    pub display_name: String,
}
