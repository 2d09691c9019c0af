//! Command-line argument dispatch.
//!
//! Maps validated CLI matches onto the action the binary will execute,
//! together with the global arguments shared by every action.

use crate::cli::{actions::Action, commands, globals::GlobalArgs};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<(GlobalArgs, Action)> {
    let api_url = matches
        .get_one::<String>(commands::ARG_API_URL)
        .cloned()
        .context("missing required argument: --api-url")?;

    let globals = GlobalArgs::new(api_url);

    let string_arg = |sub: &clap::ArgMatches, name: &str| -> Result<String> {
        sub.get_one::<String>(name)
            .cloned()
            .with_context(|| format!("missing required argument: --{name}"))
    };

    let action = match matches.subcommand() {
        Some(("register", sub)) => Action::Register {
            name: string_arg(sub, "name")?,
            email: string_arg(sub, "email")?,
            password: SecretString::from(string_arg(sub, "password")?),
            password_confirm: SecretString::from(string_arg(sub, "password-confirm")?),
        },
        Some(("login", sub)) => Action::Login {
            email: string_arg(sub, "email")?,
            password: SecretString::from(string_arg(sub, "password")?),
        },
        Some(("status", _)) => Action::Status,
        Some(("whoami", _)) => Action::Whoami,
        Some(("users", sub)) => Action::Users {
            search: sub.get_one::<String>("search").cloned(),
            page: sub.get_one::<usize>("page").copied().unwrap_or(0),
        },
        _ => anyhow::bail!("no subcommand provided"),
    };

    Ok((globals, action))
}
