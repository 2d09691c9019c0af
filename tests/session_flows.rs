//! End-to-end session flows against a mock auth service.

use anyhow::{anyhow, Result};
use ingresso::{
    gateway::{AuthGateway, Credentials, RegisterRequest},
    roster::{RosterFilter, PAGE_SIZE},
    session::client::SessionClient,
    session::UserRole,
};
use secrecy::SecretString;
use serde_json::json;
use std::net::TcpListener;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

fn profile_body(id: &str, name: &str, email: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "name": name,
        "email": email,
        "role": "subscriber",
        "isVerified": false
    })
}

async fn client_for(server: &MockServer) -> Result<SessionClient> {
    let gateway = AuthGateway::new(&server.uri())?;
    Ok(SessionClient::new(gateway))
}

#[tokio::test]
async fn password_login_updates_identity_and_flags() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/login"))
        .and(body_json(json!({
            "email": "ada@example.com",
            "password": "Sup3r$ecret"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(profile_body("u1", "Ada", "ada@example.com")),
        )
        .mount(&server)
        .await;

    let mut client = client_for(&server).await?;
    client
        .login(&Credentials {
            email: "ada@example.com".to_string(),
            password: SecretString::from("Sup3r$ecret"),
        })
        .await?;

    let state = client.state();
    assert!(state.is_logged_in);
    assert_eq!(state.current_user.as_ref().map(|u| u.id.as_str()), Some("u1"));
    assert!(state.has_succeeded && !state.has_error && !state.is_busy);
    assert_eq!(state.last_message, "Login successful");
    Ok(())
}

#[tokio::test]
async fn new_device_rejection_escalates_to_code_login() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/login"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "New browser or device detected"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/send-login-code"))
        .and(body_json(json!({ "email": "ada@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Login code sent to your email"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/login-with-code"))
        .and(body_json(json!({
            "email": "ada@example.com",
            "code": "482913"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(profile_body("u1", "Ada", "ada@example.com")),
        )
        .mount(&server)
        .await;

    let mut client = client_for(&server).await?;

    let err = client
        .login(&Credentials {
            email: "ada@example.com".to_string(),
            password: SecretString::from("Sup3r$ecret"),
        })
        .await
        .err()
        .ok_or_else(|| anyhow!("expected rejection"))?;
    assert!(err.to_string().contains("New browser"));
    assert!(client.state().pending_two_factor);
    assert!(!client.state().is_logged_in);

    // Reset clears the escalation flag too, so the caller keeps its own
    // note of it before driving the code flow.
    client.reset();
    assert!(!client.state().pending_two_factor);

    client.send_login_code("ada@example.com").await?;
    assert_eq!(client.state().last_message, "Login code sent to your email");

    client
        .login_with_code("ada@example.com", &SecretString::from("482913"))
        .await?;

    let state = client.state();
    assert!(state.is_logged_in);
    assert!(!state.pending_two_factor);
    assert_eq!(state.current_user.as_ref().map(|u| u.name.as_str()), Some("Ada"));
    Ok(())
}

#[tokio::test]
async fn registration_success_triggers_verification_email() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/register"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(profile_body("u9", "Grace", "grace@example.com")),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/resend-verification"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Verification email sent"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server).await?;
    let request = RegisterRequest {
        name: "Grace".to_string(),
        email: "grace@example.com".to_string(),
        password: SecretString::from("Abcdef1!"),
    };

    client.register(&request, &SecretString::from("Abcdef1!")).await?;
    assert!(client.state().is_logged_in);
    assert_eq!(client.state().last_message, "Registration successful");

    client.send_verification_email().await?;
    assert_eq!(client.state().last_message, "Verification email sent");
    Ok(())
}

#[tokio::test]
async fn failed_registration_never_requests_verification_email() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/register"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "Email already in use"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/resend-verification"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Verification email sent"
        })))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = client_for(&server).await?;
    let request = RegisterRequest {
        name: "Grace".to_string(),
        email: "grace@example.com".to_string(),
        password: SecretString::from("Abcdef1!"),
    };

    // The `?`-style sequencing of the composite flow: a failed register
    // returns early and the verification email is never requested.
    let flow = async {
        client.register(&request, &SecretString::from("Abcdef1!")).await?;
        client.send_verification_email().await
    };
    let err = flow.await.err().ok_or_else(|| anyhow!("expected rejection"))?;
    assert!(err.to_string().contains("Email already in use"));

    assert!(client.state().has_error);
    assert!(client.state().current_user.is_none());
    assert_eq!(client.state().last_message, "Email already in use");

    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn roster_fetch_feeds_recounts_and_paging() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    let users: Vec<serde_json::Value> = (0..12)
        .map(|i| {
            json!({
                "_id": format!("u{i}"),
                "name": format!("User {i}"),
                "email": format!("user{i}@example.com"),
                "role": if i % 4 == 0 { "suspended" } else { "subscriber" },
                "isVerified": i % 2 == 0
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(users)))
        .mount(&server)
        .await;

    let mut client = client_for(&server).await?;
    client.get_users().await?;
    assert_eq!(client.state().roster.len(), 12);

    client.recount_verified();
    client.recount_suspended();
    assert_eq!(client.state().verified_count, 6);
    assert_eq!(client.state().suspended_count, 3);
    assert_eq!(
        client
            .state()
            .roster
            .iter()
            .filter(|u| u.role == UserRole::Suspended)
            .count(),
        client.state().suspended_count
    );

    let mut filter = RosterFilter::new();
    let page = filter.page(&client.state().roster);
    assert_eq!(page.page_count, 3);
    assert_eq!(page.items.len(), PAGE_SIZE);

    filter.select_page(2, page.filtered_len);
    let last = filter.page(&client.state().roster);
    assert_eq!(last.items.len(), 2);
    assert_eq!(last.items[0].id, "u10");

    filter.set_search("user1");
    // "user1", "user10", "user11" match by email
    let narrowed = filter.page(&client.state().roster);
    assert_eq!(narrowed.filtered_len, 3);
    assert_eq!(narrowed.page_count, 1);
    Ok(())
}

#[tokio::test]
async fn logout_clears_identity_and_keeps_roster() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(profile_body("u1", "Ada", "ada@example.com")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/users"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(json!([profile_body("u1", "Ada", "ada@example.com")])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Logout successful"
        })))
        .mount(&server)
        .await;

    let mut client = client_for(&server).await?;
    client
        .login(&Credentials {
            email: "ada@example.com".to_string(),
            password: SecretString::from("Sup3r$ecret"),
        })
        .await?;
    client.get_users().await?;
    client.logout().await?;

    let state = client.state();
    assert!(!state.is_logged_in);
    assert!(state.current_user.is_none());
    assert_eq!(state.last_message, "Logout successful");
    // Roster is identity-independent and survives logout
    assert_eq!(state.roster.len(), 1);
    Ok(())
}
