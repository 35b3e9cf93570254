//! # tienda-auth: session resolution and role-gated routing
//!
//! Client-side session and access-control layer for a role-gated portal:
//! credential flows (login, registration, password reset and change), a
//! session resolver that hides the identity provider's asynchronous
//! initialization behind one deterministic checkpoint, and a router that
//! decides the single authoritative navigation target per page boot.
//!
//! The identity provider and the profile document store are collaborators
//! behind the traits in [`traits`]; in-memory implementations for tests and
//! local development live in [`memory`].

pub mod admin;
pub mod config;
pub mod error;
pub mod flows;
pub mod guard;
pub mod memory;
pub mod projection;
pub mod resolver;
pub mod session;
pub mod traits;

// Error handling
pub use error::{classify, AuthError, ProviderError};

// Core session types
pub use session::{Role, Session, SessionProjection};

// Resolution and routing
pub use guard::{destination_for, guard, guard_entry, Destination};
pub use resolver::{SessionOutcome, SessionResolver};

// Credential flows
pub use flows::{
    ChangePasswordFlow, ChangePasswordInput, FlowState, ForgotPasswordFlow, ForgotPasswordInput,
    LoginFlow, LoginInput, LoginSuccess, RegisterFlow, RegisterInput, RegisterSuccess,
    ResetDispatched,
};

// Configuration
pub use config::{AuthConfig, RouteConfig, ValidationConfig};

// Collaborator interfaces
pub use traits::{
    Identity, IdentityProvider, NewProfile, ProfileDocument, ProfileStore, ProfileUpdate,
    ProjectionCache,
};

/// Authentication result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
