//! HTTP client for the remote auth gateway.
//!
//! One method per remote operation, all JSON. Non-success statuses are decoded
//! as a structured `{ "message": ... }` body when possible, falling back to
//! the HTTP status text. The client keeps a cookie store so the server's
//! session cookie survives across calls; no session state is persisted
//! locally.

use crate::{
    error::Error,
    gateway::{Credentials, PasswordChange, PasswordReset, ProfileUpdate, RegisterRequest, RoleChange},
    session::UserProfile,
    APP_USER_AGENT,
};
use reqwest::{Client, Method, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info_span, Instrument};
use url::Url;

/// Request timeout applied to every gateway call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct MessageResponse {
    message: String,
}

/// Stateless request/response boundary to the auth service.
#[derive(Debug, Clone)]
pub struct AuthGateway {
    client: Client,
    base_url: String,
}

impl AuthGateway {
    /// Build a gateway rooted at `base_url`.
    ///
    /// # Errors
    /// Returns an error if `base_url` cannot be parsed, has no host, or uses
    /// a scheme other than http/https.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let url = Url::parse(base_url)
            .map_err(|err| Error::Validation(format!("invalid gateway URL: {err}")))?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(Error::Validation(format!(
                    "invalid gateway URL: unsupported scheme {scheme}"
                )))
            }
        }

        if url.host().is_none() {
            return Err(Error::Validation(
                "invalid gateway URL: no host specified".to_string(),
            ));
        }

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Response, Error> {
        let url = self.endpoint(path);

        debug!("endpoint URL: {}", url);

        let span = info_span!(
            "gateway.request",
            http.method = %method,
            url = %url
        );

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        Ok(request.send().instrument(span).await?)
    }

    async fn expect_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, Error> {
        let response = self.send(method, path, body).await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Self::domain_error(status, response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|err| Error::Transport(format!("failed to decode response: {err}")))
    }

    async fn expect_message(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<String, Error> {
        let response: MessageResponse = self.expect_json(method, path, body).await?;
        Ok(response.message)
    }

    async fn domain_error(status: reqwest::StatusCode, response: Response) -> Error {
        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("message")
                    .and_then(Value::as_str)
                    .map(ToString::to_string)
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });

        Error::Domain {
            status: status.as_u16(),
            message,
        }
    }

    /// Create an account. The new account is logged in on success.
    pub async fn register(&self, request: &RegisterRequest) -> Result<UserProfile, Error> {
        let body = json!({
            "name": request.name,
            "email": request.email,
            "password": request.password.expose_secret(),
        });
        self.expect_json(Method::POST, "/v1/auth/register", Some(body))
            .await
    }

    /// Password login. A rejection may carry the new-device marker.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile, Error> {
        let body = json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        });
        self.expect_json(Method::POST, "/v1/auth/login", Some(body))
            .await
    }

    /// Probe whether the server still considers the session valid.
    pub async fn login_status(&self) -> Result<bool, Error> {
        self.expect_json(Method::GET, "/v1/auth/status", None).await
    }

    /// Fetch the current account.
    pub async fn user(&self) -> Result<UserProfile, Error> {
        self.expect_json(Method::GET, "/v1/users/me", None).await
    }

    /// Apply a partial profile update and return the updated account.
    pub async fn update_user(&self, update: &ProfileUpdate) -> Result<UserProfile, Error> {
        let mut body = serde_json::Map::new();
        if let Some(name) = &update.name {
            body.insert("name".to_string(), Value::String(name.clone()));
        }
        if let Some(email) = &update.email {
            body.insert("email".to_string(), Value::String(email.clone()));
        }
        self.expect_json(Method::PATCH, "/v1/users/me", Some(Value::Object(body)))
            .await
    }

    /// Ask the server to email a verification link to the current account.
    pub async fn send_verification_email(&self) -> Result<String, Error> {
        self.expect_message(Method::POST, "/v1/auth/resend-verification", None)
            .await
    }

    /// Redeem an email verification token.
    pub async fn verify_user(&self, token: &SecretString) -> Result<String, Error> {
        let body = json!({ "token": token.expose_secret() });
        self.expect_message(Method::POST, "/v1/auth/verify-email", Some(body))
            .await
    }

    /// Change the password of the authenticated account.
    pub async fn change_password(&self, change: &PasswordChange) -> Result<String, Error> {
        let body = json!({
            "old_password": change.current.expose_secret(),
            "password": change.new.expose_secret(),
        });
        self.expect_message(Method::POST, "/v1/auth/change-password", Some(body))
            .await
    }

    /// Invalidate the server-side session.
    pub async fn logout(&self) -> Result<String, Error> {
        self.expect_message(Method::POST, "/v1/auth/logout", None)
            .await
    }

    /// Request a password-reset email.
    pub async fn forgot_password(&self, email: &str) -> Result<String, Error> {
        let body = json!({ "email": email });
        self.expect_message(Method::POST, "/v1/auth/forgot-password", Some(body))
            .await
    }

    /// Redeem a reset token with a replacement password.
    pub async fn reset_password(&self, reset: &PasswordReset) -> Result<String, Error> {
        let body = json!({
            "token": reset.token.expose_secret(),
            "password": reset.new_password.expose_secret(),
        });
        self.expect_message(Method::POST, "/v1/auth/reset-password", Some(body))
            .await
    }

    /// Fetch the administrative user list.
    pub async fn users(&self) -> Result<Vec<UserProfile>, Error> {
        self.expect_json(Method::GET, "/v1/users", None).await
    }

    /// Delete an account by id.
    pub async fn delete_user(&self, id: &str) -> Result<String, Error> {
        self.expect_message(Method::DELETE, &format!("/v1/users/{id}"), None)
            .await
    }

    /// Assign a new role to an account.
    pub async fn upgrade_user(&self, change: &RoleChange) -> Result<String, Error> {
        let body = json!({ "role": change.role.as_str() });
        self.expect_message(
            Method::PATCH,
            &format!("/v1/users/{}/role", change.id),
            Some(body),
        )
        .await
    }

    /// Ask the server to email a one-time login code.
    pub async fn send_login_code(&self, email: &str) -> Result<String, Error> {
        let body = json!({ "email": email });
        self.expect_message(Method::POST, "/v1/auth/send-login-code", Some(body))
            .await
    }

    /// Complete a new-device login with the emailed code.
    pub async fn login_with_code(
        &self,
        email: &str,
        code: &SecretString,
    ) -> Result<UserProfile, Error> {
        let body = json!({
            "email": email,
            "code": code.expose_secret(),
        });
        self.expect_json(Method::POST, "/v1/auth/login-with-code", Some(body))
            .await
    }

    /// Login with a federated identity token (already acquired by the caller).
    pub async fn login_with_google(&self, token: &SecretString) -> Result<UserProfile, Error> {
        let body = json!({ "token": token.expose_secret() });
        self.expect_json(Method::POST, "/v1/auth/login-with-google", Some(body))
            .await
    }
}
