//! Async operation layer over the gateway.
//!
//! `SessionClient` owns the gateway and the session state. Each operation
//! validates its input first (a validation failure returns synchronously,
//! emits no signal, and never touches `is_busy`), then emits exactly one
//! `Started` signal, calls the gateway, and emits exactly one terminal
//! signal — never zero, never both.
//!
//! Reductions are serialized through `&mut self`; overlapping operations are
//! a caller concern and the last terminal signal to reduce wins the transient
//! flags. Nothing here retries or cancels: a failed operation is retried only
//! by invoking it again.

use crate::{
    error::Error,
    gateway::{
        AuthGateway, Credentials, PasswordChange, PasswordReset, ProfileUpdate, RegisterRequest,
        RoleChange,
    },
    session::{Operation, Payload, SessionState, Signal},
};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};

/// Minimum accepted password length, shared with the strength indicator.
pub use crate::password::MIN_LENGTH as MIN_PASSWORD_CHARS;

/// Drives authentication operations and owns the session state.
#[derive(Debug)]
pub struct SessionClient {
    gateway: AuthGateway,
    state: SessionState,
}

impl SessionClient {
    #[must_use]
    pub fn new(gateway: AuthGateway) -> Self {
        Self {
            gateway,
            state: SessionState::new(),
        }
    }

    /// Read-only view of the session state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Clear the transient flags between user gestures.
    pub fn reset(&mut self) {
        self.state.reduce(Signal::Reset);
    }

    /// Recompute the verified-users aggregate from the current roster.
    pub fn recount_verified(&mut self) {
        self.state.reduce(Signal::RecountVerified);
    }

    /// Recompute the suspended-users aggregate from the current roster.
    pub fn recount_suspended(&mut self) {
        self.state.reduce(Signal::RecountSuspended);
    }

    fn settle<T>(
        &mut self,
        operation: Operation,
        result: Result<T, Error>,
        payload: impl FnOnce(T) -> Payload,
    ) -> Result<(), Error> {
        match result {
            Ok(value) => {
                self.state.reduce(Signal::Succeeded(operation, payload(value)));
                Ok(())
            }
            Err(err) => {
                self.state
                    .reduce(Signal::Failed(operation, err.surface_message()));
                Err(err)
            }
        }
    }

    /// Create an account. On success the new account is the current user.
    ///
    /// # Errors
    /// Validation: any empty field, an implausible email, a password under
    /// [`MIN_PASSWORD_CHARS`], or a mismatched confirmation.
    pub async fn register(
        &mut self,
        request: &RegisterRequest,
        password_confirm: &SecretString,
    ) -> Result<(), Error> {
        if request.name.trim().is_empty()
            || request.email.trim().is_empty()
            || request.password.expose_secret().is_empty()
        {
            return Err(Error::Validation("All fields are required".to_string()));
        }
        validate_new_password(&request.password)?;
        validate_email(&request.email)?;
        validate_confirmation(&request.password, password_confirm)?;

        self.state.reduce(Signal::Started(Operation::Register));
        let result = self.gateway.register(request).await;
        self.settle(Operation::Register, result, Payload::Profile)
    }

    /// Password login. A new-device rejection sets `pending_two_factor`; the
    /// caller is then expected to run [`Self::send_login_code`] and
    /// [`Self::login_with_code`].
    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), Error> {
        require(&credentials.email, "Email is required")?;
        require_secret(&credentials.password, "Password is required")?;
        validate_email(&credentials.email)?;

        self.state.reduce(Signal::Started(Operation::Login));
        let result = self.gateway.login(credentials).await;
        self.settle(Operation::Login, result, Payload::Profile)
    }

    /// Ask the server whether the session is still valid.
    pub async fn get_login_status(&mut self) -> Result<(), Error> {
        self.state.reduce(Signal::Started(Operation::GetLoginStatus));
        let result = self.gateway.login_status().await;
        self.settle(Operation::GetLoginStatus, result, Payload::LoggedIn)
    }

    /// Fetch the current account into `current_user`.
    pub async fn get_user(&mut self) -> Result<(), Error> {
        self.state.reduce(Signal::Started(Operation::GetUser));
        let result = self.gateway.user().await;
        self.settle(Operation::GetUser, result, Payload::Profile)
    }

    /// Apply a partial profile update.
    pub async fn update_user(&mut self, update: &ProfileUpdate) -> Result<(), Error> {
        if let Some(email) = &update.email {
            validate_email(email)?;
        }
        self.state.reduce(Signal::Started(Operation::UpdateUser));
        let result = self.gateway.update_user(update).await;
        self.settle(Operation::UpdateUser, result, Payload::Profile)
    }

    /// Ask the server to email a verification link to the current account.
    pub async fn send_verification_email(&mut self) -> Result<(), Error> {
        self.state
            .reduce(Signal::Started(Operation::SendVerificationEmail));
        let result = self.gateway.send_verification_email().await;
        self.settle(Operation::SendVerificationEmail, result, Payload::Message)
    }

    /// Redeem an email verification token.
    pub async fn verify_user(&mut self, token: &SecretString) -> Result<(), Error> {
        require_secret(token, "Verification token is required")?;

        self.state.reduce(Signal::Started(Operation::VerifyUser));
        let result = self.gateway.verify_user(token).await;
        self.settle(Operation::VerifyUser, result, Payload::Message)
    }

    /// Change the password of the authenticated account.
    pub async fn change_password(&mut self, change: &PasswordChange) -> Result<(), Error> {
        require_secret(&change.current, "Current password is required")?;
        require_secret(&change.new, "New password is required")?;
        validate_new_password(&change.new)?;

        self.state.reduce(Signal::Started(Operation::ChangePassword));
        let result = self.gateway.change_password(change).await;
        self.settle(Operation::ChangePassword, result, Payload::Message)
    }

    /// Invalidate the session; identity is cleared on success.
    pub async fn logout(&mut self) -> Result<(), Error> {
        self.state.reduce(Signal::Started(Operation::Logout));
        let result = self.gateway.logout().await;
        self.settle(Operation::Logout, result, Payload::Message)
    }

    /// Request a password-reset email.
    pub async fn forgot_password(&mut self, email: &str) -> Result<(), Error> {
        require(email, "Email is required")?;
        validate_email(email)?;

        self.state.reduce(Signal::Started(Operation::ForgotPassword));
        let result = self.gateway.forgot_password(email).await;
        self.settle(Operation::ForgotPassword, result, Payload::Message)
    }

    /// Redeem a reset token with a replacement password.
    pub async fn reset_password(
        &mut self,
        reset: &PasswordReset,
        password_confirm: &SecretString,
    ) -> Result<(), Error> {
        require_secret(&reset.token, "Reset token is required")?;
        validate_new_password(&reset.new_password)?;
        validate_confirmation(&reset.new_password, password_confirm)?;

        self.state.reduce(Signal::Started(Operation::ResetPassword));
        let result = self.gateway.reset_password(reset).await;
        self.settle(Operation::ResetPassword, result, Payload::Message)
    }

    /// Fetch the administrative user list; replaces the roster wholesale.
    pub async fn get_users(&mut self) -> Result<(), Error> {
        self.state.reduce(Signal::Started(Operation::GetUsers));
        let result = self.gateway.users().await;
        self.settle(Operation::GetUsers, result, Payload::Roster)
    }

    /// Delete an account by id.
    pub async fn delete_user(&mut self, id: &str) -> Result<(), Error> {
        require(id, "User id is required")?;

        self.state.reduce(Signal::Started(Operation::DeleteUser));
        let result = self.gateway.delete_user(id).await;
        self.settle(Operation::DeleteUser, result, Payload::Message)
    }

    /// Assign a new role to an account.
    pub async fn upgrade_user(&mut self, change: &RoleChange) -> Result<(), Error> {
        require(&change.id, "User id is required")?;

        self.state.reduce(Signal::Started(Operation::UpgradeUser));
        let result = self.gateway.upgrade_user(change).await;
        self.settle(Operation::UpgradeUser, result, Payload::Message)
    }

    /// Ask the server to email a one-time login code.
    pub async fn send_login_code(&mut self, email: &str) -> Result<(), Error> {
        require(email, "Email is required")?;
        validate_email(email)?;

        self.state.reduce(Signal::Started(Operation::SendLoginCode));
        let result = self.gateway.send_login_code(email).await;
        self.settle(Operation::SendLoginCode, result, Payload::Message)
    }

    /// Complete a new-device login with the emailed code; clears
    /// `pending_two_factor` on success.
    pub async fn login_with_code(
        &mut self,
        email: &str,
        code: &SecretString,
    ) -> Result<(), Error> {
        require(email, "Email is required")?;
        require_secret(code, "Login code is required")?;

        self.state.reduce(Signal::Started(Operation::LoginWithCode));
        let result = self.gateway.login_with_code(email, code).await;
        self.settle(Operation::LoginWithCode, result, Payload::Profile)
    }

    /// Login with a federated identity token acquired by the caller.
    pub async fn login_with_google(&mut self, token: &SecretString) -> Result<(), Error> {
        require_secret(token, "Identity token is required")?;

        self.state.reduce(Signal::Started(Operation::LoginWithGoogle));
        let result = self.gateway.login_with_google(token).await;
        self.settle(Operation::LoginWithGoogle, result, Payload::Profile)
    }
}

fn require(value: &str, message: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::Validation(message.to_string()));
    }
    Ok(())
}

fn require_secret(value: &SecretString, message: &str) -> Result<(), Error> {
    if value.expose_secret().is_empty() {
        return Err(Error::Validation(message.to_string()));
    }
    Ok(())
}

fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}

fn validate_email(email: &str) -> Result<(), Error> {
    if valid_email(email) {
        Ok(())
    } else {
        Err(Error::Validation("Please enter a valid email".to_string()))
    }
}

fn validate_new_password(password: &SecretString) -> Result<(), Error> {
    if password.expose_secret().chars().count() < MIN_PASSWORD_CHARS {
        return Err(Error::Validation(format!(
            "Password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    Ok(())
}

fn validate_confirmation(
    password: &SecretString,
    confirmation: &SecretString,
) -> Result<(), Error> {
    if password.expose_secret() != confirmation.expose_secret() {
        return Err(Error::Validation("Passwords do not match".to_string()));
    }
    Ok(())
}
