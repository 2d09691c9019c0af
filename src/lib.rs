//! # Ingresso (Authentication Session Client)
//!
//! `ingresso` is a client for a multi-factor authentication service. It drives
//! registration, login (password, one-time email code, federated token), email
//! verification, password recovery, profile management, and administrative
//! user listing/role management.
//!
//! ## Session state machine
//!
//! Every remote operation is tracked through three phases (started, succeeded,
//! failed). Each phase is reduced into a single [`session::SessionState`],
//! the one source of truth for "who is the current user and what is their
//! session status". Reductions are serialized through exclusive ownership, so
//! overlapping operations can interleave but never race; the last terminal
//! signal to reduce wins the transient flags.
//!
//! ## Two-factor escalation
//!
//! A password login rejected because the server did not recognize the device
//! sets a pending two-factor flag instead of failing terminally. Callers then
//! request a one-time login code by email and complete the session with it.
//!
//! ## Derived views
//!
//! [`roster::RosterFilter`] produces filtered, paginated pages of the
//! administrative user list, and [`password::PasswordStrength`] classifies a
//! candidate password against four independent criteria. Both are pure.

pub mod cli;
pub mod error;
pub mod gateway;
pub mod password;
pub mod roster;
pub mod session;

pub use error::Error;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
