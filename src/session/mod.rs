//! Session state and the signal reducer.
//!
//! One `SessionState` is the single source of truth for "who is the current
//! user and what is their session status". Every remote operation reports its
//! lifecycle as [`Signal`]s, and [`SessionState::reduce`] folds each signal
//! into the state synchronously, in arrival order. The state is owned
//! exclusively by [`client::SessionClient`]; everything else reads it through
//! a shared reference.
//!
//! The transient flags (`is_busy`, `has_error`, `has_succeeded`,
//! `last_message`) describe the most recently completed or in-flight
//! operation only. They are not cumulative history: whichever terminal signal
//! reduces last wins them.

pub mod client;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Substring of a login rejection that marks a new-device challenge.
///
/// The server rejects password logins from unrecognized clients with a
/// message containing this marker; the reducer turns that rejection into a
/// pending two-factor flag instead of a plain failure.
pub const NEW_DEVICE_MARKER: &str = "New browser";

/// Account roles known to the service.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Subscriber,
    Author,
    Admin,
    Suspended,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subscriber => "subscriber",
            Self::Author => "author",
            Self::Admin => "admin",
            Self::Suspended => "suspended",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "subscriber" => Ok(Self::Subscriber),
            "author" => Ok(Self::Author),
            "admin" => Ok(Self::Admin),
            "suspended" => Ok(Self::Suspended),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A user account as returned by the gateway.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Opaque server-issued identifier.
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub is_verified: bool,
}

/// The seventeen remote operations tracked by the session state machine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operation {
    Register,
    Login,
    GetLoginStatus,
    GetUser,
    UpdateUser,
    SendVerificationEmail,
    VerifyUser,
    ChangePassword,
    Logout,
    ForgotPassword,
    ResetPassword,
    GetUsers,
    DeleteUser,
    UpgradeUser,
    SendLoginCode,
    LoginWithCode,
    LoginWithGoogle,
}

impl Operation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Login => "login",
            Self::GetLoginStatus => "get_login_status",
            Self::GetUser => "get_user",
            Self::UpdateUser => "update_user",
            Self::SendVerificationEmail => "send_verification_email",
            Self::VerifyUser => "verify_user",
            Self::ChangePassword => "change_password",
            Self::Logout => "logout",
            Self::ForgotPassword => "forgot_password",
            Self::ResetPassword => "reset_password",
            Self::GetUsers => "get_users",
            Self::DeleteUser => "delete_user",
            Self::UpgradeUser => "upgrade_user",
            Self::SendLoginCode => "send_login_code",
            Self::LoginWithCode => "login_with_code",
            Self::LoginWithGoogle => "login_with_google",
        }
    }
}

/// Success payload of a remote operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// A user-identifying operation returned the account.
    Profile(UserProfile),
    /// The session-validity probe returned a boolean.
    LoggedIn(bool),
    /// The administrative user list.
    Roster(Vec<UserProfile>),
    /// A human-readable outcome from the server.
    Message(String),
}

/// A tagged lifecycle event reduced into the session state.
#[derive(Clone, Debug, PartialEq)]
pub enum Signal {
    /// An operation was issued; emitted exactly once, synchronously.
    Started(Operation),
    /// The gateway call resolved successfully.
    Succeeded(Operation, Payload),
    /// The gateway call was rejected or unreachable.
    Failed(Operation, String),
    /// Clear the transient flags; identity and roster are untouched.
    Reset,
    /// Recompute `verified_count` from the current roster.
    RecountVerified,
    /// Recompute `suspended_count` from the current roster.
    RecountSuspended,
}

/// The single authoritative session record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    pub is_logged_in: bool,
    pub current_user: Option<UserProfile>,
    /// Last successfully fetched user list; replaced wholesale on each fetch.
    pub roster: Vec<UserProfile>,
    /// Set when the server demanded a new-device login code.
    pub pending_two_factor: bool,
    pub has_error: bool,
    pub has_succeeded: bool,
    pub is_busy: bool,
    /// Outcome of the most recent operation, superseded by each next one.
    pub last_message: String,
    pub verified_count: usize,
    pub suspended_count: usize,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one signal. Runs synchronously; the caller serializes arrival
    /// order. The state always remains valid and further reducible.
    pub fn reduce(&mut self, signal: Signal) {
        match signal {
            Signal::Started(_) => {
                self.is_busy = true;
            }
            Signal::Succeeded(operation, payload) => {
                self.is_busy = false;
                self.has_succeeded = true;
                self.has_error = false;
                self.reduce_success(operation, payload);
            }
            Signal::Failed(operation, message) => {
                self.is_busy = false;
                self.has_error = true;
                self.has_succeeded = false;
                self.reduce_failure(operation, message);
            }
            Signal::Reset => {
                self.pending_two_factor = false;
                self.has_error = false;
                self.has_succeeded = false;
                self.is_busy = false;
                self.last_message = String::new();
            }
            Signal::RecountVerified => {
                self.verified_count = self.roster.iter().filter(|u| u.is_verified).count();
            }
            Signal::RecountSuspended => {
                self.suspended_count = self
                    .roster
                    .iter()
                    .filter(|u| u.role == UserRole::Suspended)
                    .count();
            }
        }
    }

    fn reduce_success(&mut self, operation: Operation, payload: Payload) {
        match (operation, payload) {
            (Operation::Register, Payload::Profile(user)) => {
                self.is_logged_in = true;
                self.current_user = Some(user);
                self.last_message = "Registration successful".to_string();
            }
            (Operation::Login, Payload::Profile(user)) => {
                self.is_logged_in = true;
                self.current_user = Some(user);
                self.last_message = "Login successful".to_string();
            }
            (Operation::UpdateUser, Payload::Profile(user)) => {
                self.is_logged_in = true;
                self.current_user = Some(user);
                self.last_message = "User updated".to_string();
            }
            (Operation::LoginWithCode, Payload::Profile(user)) => {
                self.is_logged_in = true;
                self.pending_two_factor = false;
                self.current_user = Some(user);
                self.last_message = "Login successful".to_string();
            }
            (Operation::LoginWithGoogle, Payload::Profile(user)) => {
                self.is_logged_in = true;
                self.current_user = Some(user);
                // Fixed text, not server-derived
                self.last_message = "Login successful".to_string();
            }
            (Operation::GetLoginStatus, Payload::LoggedIn(valid)) => {
                self.is_logged_in = valid;
            }
            (Operation::GetUser, Payload::Profile(user)) => {
                self.current_user = Some(user);
            }
            (Operation::GetUsers, Payload::Roster(users)) => {
                self.roster = users;
            }
            (Operation::Logout, Payload::Message(message)) => {
                self.is_logged_in = false;
                self.current_user = None;
                self.last_message = message;
            }
            (_, Payload::Message(message)) => {
                self.last_message = message;
            }
            // Payload kind did not match the operation; the generic success
            // flags are already set and nothing else is touched.
            (operation, payload) => {
                debug!(
                    operation = operation.as_str(),
                    ?payload,
                    "mismatched success payload"
                );
            }
        }
    }

    fn reduce_failure(&mut self, operation: Operation, message: String) {
        match operation {
            Operation::Login => {
                self.current_user = None;
                if message.contains(NEW_DEVICE_MARKER) {
                    self.pending_two_factor = true;
                }
            }
            Operation::Register | Operation::LoginWithCode | Operation::LoginWithGoogle => {
                self.current_user = None;
            }
            _ => {}
        }
        self.last_message = message;
    }
}
