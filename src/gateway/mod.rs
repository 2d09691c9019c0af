//! Request types for the remote auth gateway.
//!
//! These are the wire-facing inputs of the seventeen remote operations.
//! Passwords, codes, and tokens are carried as [`SecretString`] and exposed
//! only at request encoding; none of these types implement `Serialize`
//! directly, the HTTP client builds JSON bodies itself.

mod http;

pub use http::AuthGateway;

use crate::session::UserRole;
use secrecy::SecretString;

/// Input for account registration.
#[derive(Debug)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

/// Email/password credentials for password login.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// Partial profile update; `None` fields are left unchanged by the server.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Old and new password for an authenticated password change.
#[derive(Debug)]
pub struct PasswordChange {
    pub current: SecretString,
    pub new: SecretString,
}

/// Reset token (from the recovery email) plus the replacement password.
#[derive(Debug)]
pub struct PasswordReset {
    pub token: SecretString,
    pub new_password: SecretString,
}

/// Target user and the role to assign.
#[derive(Debug)]
pub struct RoleChange {
    pub id: String,
    pub role: UserRole,
}
