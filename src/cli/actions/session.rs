//! Handle session actions against the auth service.

use crate::{
    cli::{actions::Action, globals::GlobalArgs},
    gateway::{AuthGateway, Credentials, RegisterRequest},
    roster::RosterFilter,
    session::client::SessionClient,
};
use anyhow::Result;
use secrecy::SecretString;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Execute one action. Each action is a fresh session client: the server's
/// cookie decides whether the process is authenticated.
///
/// # Errors
/// Returns an error if the gateway is unreachable, the server rejects the
/// request, or input validation fails.
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let gateway = AuthGateway::new(&globals.api_url)?;
    let mut client = SessionClient::new(gateway);

    match action {
        Action::Register {
            name,
            email,
            password,
            password_confirm,
        } => {
            let request = RegisterRequest {
                name,
                email,
                password,
            };
            client.register(&request, &password_confirm).await?;
            println!("{}", client.state().last_message);

            client.send_verification_email().await?;
            println!("{}", client.state().last_message);
        }
        Action::Login { email, password } => {
            let credentials = Credentials {
                email: email.clone(),
                password,
            };

            match client.login(&credentials).await {
                Ok(()) => println!("{}", client.state().last_message),
                Err(err) if client.state().pending_two_factor => {
                    debug!("new-device challenge: {}", err);
                    client.reset();

                    client.send_login_code(&email).await?;
                    println!("{}", client.state().last_message);

                    let code = prompt("Login code: ")?;
                    client
                        .login_with_code(&email, &SecretString::from(code))
                        .await?;
                    println!("{}", client.state().last_message);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Action::Status => {
            client.get_login_status().await?;
            if client.state().is_logged_in {
                println!("Session is valid");
            } else {
                println!("Not logged in");
            }
        }
        Action::Whoami => {
            client.get_user().await?;
            if let Some(user) = &client.state().current_user {
                println!("{} <{}>", user.name, user.email);
                println!("role: {}, verified: {}", user.role, user.is_verified);
            }
        }
        Action::Users { search, page } => {
            client.get_users().await?;
            client.recount_verified();
            client.recount_suspended();

            let mut filter = RosterFilter::new();
            if let Some(term) = search {
                filter.set_search(&term);
            }
            let filtered_len = filter.filtered(&client.state().roster).len();
            filter.select_page(page, filtered_len);
            let view = filter.page(&client.state().roster);

            for user in &view.items {
                println!(
                    "{}\t{}\t{}\t{}",
                    user.id, user.name, user.email, user.role
                );
            }
            println!(
                "page {}/{} ({} matching, {} verified, {} suspended)",
                if view.page_count == 0 { 0 } else { filter.offset() / crate::roster::PAGE_SIZE + 1 },
                view.page_count,
                view.filtered_len,
                client.state().verified_count,
                client.state().suspended_count,
            );
        }
    }

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
