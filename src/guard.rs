//! Role-gated routing decisions
//!
//! One decision function per page boot. Earlier variants of the portal
//! scattered redirect logic across several boot-time listeners, which could
//! issue duplicate or conflicting redirects; everything funnels through
//! [`guard`] now.

use crate::config::RouteConfig;
use crate::session::{Role, Session};

/// The single authoritative next navigation target for a page boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// No navigation; the caller may render the page
    Stay,

    /// The login entry point, always reachable without a session
    LoginEntry,

    /// The admin area
    AdminArea,

    /// The client area
    ClientArea,
}

impl Destination {
    /// Resolve the destination to a configured path. `None` means stay.
    pub fn path<'a>(&self, routes: &'a RouteConfig) -> Option<&'a str> {
        match self {
            Destination::Stay => None,
            Destination::LoginEntry => Some(&routes.login_path),
            Destination::AdminArea => Some(&routes.admin_area_path),
            Destination::ClientArea => Some(&routes.client_area_path),
        }
    }
}

/// The static role->destination table. Total over the role enum and a
/// bijection onto the role areas, which is what makes redirect loops
/// impossible: a session of role R is only ever sent to R's own area, and
/// that area's guard yields [`Destination::Stay`] for R.
pub fn destination_for(role: Role) -> Destination {
    match role {
        Role::Admin => Destination::AdminArea,
        Role::Client => Destination::ClientArea,
    }
}

/// Decide the navigation target for a role-restricted page.
///
/// * No session: the login entry point.
/// * A session of the wrong role: that session's own area, never the page it
///   lacks permission for. No "access denied" dead ends.
/// * Otherwise: stay.
pub fn guard(session: Option<&Session>, required: Option<Role>) -> Destination {
    let Some(session) = session else {
        return Destination::LoginEntry;
    };

    match required {
        Some(role) if session.role != role => {
            tracing::debug!(
                have = %session.role,
                required = %role,
                "role mismatch, routing to own area"
            );
            destination_for(session.role)
        }
        _ => Destination::Stay,
    }
}

/// Decide the navigation target for an authentication-entry page
/// (login/register): an already-authenticated visitor is sent to their own
/// area, an anonymous one stays on the form.
pub fn guard_entry(session: Option<&Session>) -> Destination {
    match session {
        Some(session) => destination_for(session.role),
        None => Destination::Stay,
    }
}
