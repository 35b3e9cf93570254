//! Authentication configuration types and utilities

use serde::{Deserialize, Serialize};

/// Main authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Route destinations and reset return URL
    pub routes: RouteConfig,

    /// Input validation policy for the credential flows
    pub validation: ValidationConfig,
}

/// Route destinations used by the role-gated router
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Login entry point, always reachable without a session
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Destination for admin-role sessions
    #[serde(default = "default_admin_area_path")]
    pub admin_area_path: String,

    /// Destination for client-role sessions
    #[serde(default = "default_client_area_path")]
    pub client_area_path: String,

    /// Return URL embedded in password-reset dispatches
    #[serde(default = "default_reset_return_url")]
    pub reset_return_url: String,
}

/// Input validation policy for the credential flows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Minimum password length
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,

    /// Minimum full-name length for registration
    #[serde(default = "default_min_full_name_length")]
    pub min_full_name_length: usize,
}

// Default value functions
fn default_login_path() -> String {
    "/login".to_string()
}
fn default_admin_area_path() -> String {
    "/admin/dashboard".to_string()
}
fn default_client_area_path() -> String {
    "/client/dashboard".to_string()
}
fn default_reset_return_url() -> String {
    "/login".to_string()
}
fn default_min_password_length() -> usize {
    6
}
fn default_min_full_name_length() -> usize {
    3
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            admin_area_path: default_admin_area_path(),
            client_area_path: default_client_area_path(),
            reset_return_url: default_reset_return_url(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_password_length: default_min_password_length(),
            min_full_name_length: default_min_full_name_length(),
        }
    }
}

impl AuthConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.routes.login_path.is_empty() {
            return Err("Login path must not be empty".to_string());
        }

        if self.routes.admin_area_path.is_empty() || self.routes.client_area_path.is_empty() {
            return Err("Role area paths must not be empty".to_string());
        }

        // Distinct areas keep the role->destination table a bijection, which
        // is what rules out redirect loops in the router.
        if self.routes.admin_area_path == self.routes.client_area_path {
            return Err("Admin and client areas must be distinct".to_string());
        }

        if self.routes.login_path == self.routes.admin_area_path
            || self.routes.login_path == self.routes.client_area_path
        {
            return Err("Login path must not coincide with a role area".to_string());
        }

        if self.routes.reset_return_url.is_empty() {
            return Err("Reset return URL must not be empty".to_string());
        }

        if self.validation.min_password_length < 1 {
            return Err("Minimum password length must be at least 1".to_string());
        }

        if self.validation.min_full_name_length < 1 {
            return Err("Minimum full-name length must be at least 1".to_string());
        }

        Ok(())
    }
}
