//! Error taxonomy for client operations.
//!
//! Three kinds of failure reach callers:
//! - `Validation`: a caller-side precondition failed before any request was
//!   made. No signal is emitted and the session state is untouched.
//! - `Domain`: the gateway was reachable and rejected the request with a
//!   business reason (bad credentials, duplicate email, expired token).
//! - `Transport`: the gateway was unreachable or returned a body the client
//!   could not decode.
//!
//! None of these are fatal; every failed operation is recoverable by issuing
//! a new one.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),
    #[error("request failed ({status}): {message}")]
    Domain { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    /// Human-readable text surfaced through the session's `last_message`.
    ///
    /// Prefers the server-supplied message, falls back to the transport
    /// description, and finally to a generic string when the server sent an
    /// empty body.
    #[must_use]
    pub fn surface_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Domain { message, .. } => {
                if message.trim().is_empty() {
                    "Request failed".to_string()
                } else {
                    message.clone()
                }
            }
            Self::Transport(message) => format!("transport error: {message}"),
        }
    }

    /// True when the error never left the client.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
