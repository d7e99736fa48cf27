//! Login / registration form

use crate::api::{Credentials, LoginOutcome, RegisterOutcome, WalletApi};
use crate::session::Session;
use crate::{Error, Result};
use std::fmt;

pub const LOGIN_SUCCESS: &str = "Logging you in...";
pub const REGISTER_SUCCESS: &str = "Registered successfully. Please log in.";
const LOGIN_ERROR: &str = "Error logging in";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

/// State of the auth form: which form is shown and the inline messages
#[derive(Debug, Default)]
pub struct AuthView {
    mode: AuthMode,
    email: String,
    error: Option<String>,
    success: Option<String>,
}

impl AuthView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    /// Switch between the login and register forms, dropping any message
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.error = None;
        self.success = None;
    }

    fn credentials(email: &str, password: &str) -> Result<Credentials> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "Email and password are required".to_string(),
            ));
        }
        Ok(Credentials::new(email.trim(), password))
    }

    /// Submit the login form; returns the new session when the API accepted
    /// the credentials. The success message waits for [`AuthView::login_persisted`].
    pub async fn submit_login(
        &mut self,
        api: &dyn WalletApi,
        email: &str,
        password: &str,
    ) -> Option<Session> {
        self.mode = AuthMode::Login;
        self.email = email.trim().to_string();
        self.error = None;
        self.success = None;

        let credentials = match Self::credentials(email, password) {
            Ok(credentials) => credentials,
            Err(e) => {
                self.error = Some(e.to_string());
                return None;
            }
        };

        match api.login(&credentials).await {
            Ok(LoginOutcome::LoggedIn(session)) => Some(session),
            Ok(LoginOutcome::Rejected { message }) => {
                tracing::info!(email = %credentials.email, "Login rejected");
                self.error = Some(message);
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "Error logging in");
                self.error = Some(LOGIN_ERROR.to_string());
                None
            }
        }
    }

    /// The session returned by [`AuthView::submit_login`] was stored
    pub fn login_persisted(&mut self) {
        self.error = None;
        self.success = Some(LOGIN_SUCCESS.to_string());
    }

    /// The session could not be stored; the user stays logged out
    pub fn login_not_persisted(&mut self) {
        self.success = None;
        self.error = Some(LOGIN_ERROR.to_string());
    }

    /// Submit the registration form; on success the login form is shown
    pub async fn submit_register(&mut self, api: &dyn WalletApi, email: &str, password: &str) {
        self.mode = AuthMode::Register;
        self.email = email.trim().to_string();
        self.error = None;
        self.success = None;

        let credentials = match Self::credentials(email, password) {
            Ok(credentials) => credentials,
            Err(e) => {
                self.error = Some(e.to_string());
                return;
            }
        };

        match api.register(&credentials).await {
            Ok(RegisterOutcome::Registered) => {
                tracing::info!(email = %credentials.email, "Registered");
                self.mode = AuthMode::Login;
                self.success = Some(REGISTER_SUCCESS.to_string());
            }
            Ok(RegisterOutcome::Rejected { message }) => {
                self.error = Some(message);
            }
            Err(e) => {
                tracing::error!(error = %e, "Network error during registration");
                self.error = Some("Error registering".to_string());
            }
        }
    }
}

impl fmt::Display for AuthView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (title, switch_hint) = match self.mode {
            AuthMode::Login => ("Login", "Don't have an account? Use `register`."),
            AuthMode::Register => ("Register", "Already have an account? Use `login`."),
        };
        writeln!(f, "== {} ==", title)?;
        if !self.email.is_empty() {
            writeln!(f, "Email: {}", self.email)?;
        }
        if let Some(success) = &self.success {
            writeln!(f, "[ok] {}", success)?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "[error] {}", error)?;
        }
        write!(f, "{}", switch_hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RegisterOutcome;
    use crate::views::fakes::{FakeApi, Script};

    #[tokio::test]
    async fn login_success_returns_session() {
        let api = FakeApi::default();
        let mut view = AuthView::new();

        let session = view
            .submit_login(&api, "alice@example.com", "pw")
            .await
            .expect("session");

        assert_eq!(session.token(), "tok-1");
        assert!(view.success().is_none());
        assert!(view.error().is_none());

        view.login_persisted();
        assert_eq!(view.success(), Some(LOGIN_SUCCESS));
    }

    #[tokio::test]
    async fn login_rejection_shows_server_message() {
        let api = FakeApi::default();
        *api.login.lock().unwrap() = Script::Reply(Err("invalid credentials".to_string()));
        let mut view = AuthView::new();

        assert!(view.submit_login(&api, "alice@example.com", "bad").await.is_none());
        assert_eq!(view.error(), Some("invalid credentials"));
        assert!(view.to_string().contains("[error] invalid credentials"));
    }

    #[tokio::test]
    async fn login_transport_failure_is_generic() {
        let api = FakeApi::default();
        *api.login.lock().unwrap() = Script::Transport;
        let mut view = AuthView::new();

        assert!(view.submit_login(&api, "alice@example.com", "pw").await.is_none());
        assert_eq!(view.error(), Some("Error logging in"));
    }

    #[tokio::test]
    async fn empty_fields_rejected_without_request() {
        let api = FakeApi::default();
        let mut view = AuthView::new();

        assert!(view.submit_login(&api, "  ", "pw").await.is_none());
        view.submit_register(&api, "alice@example.com", "").await;

        assert_eq!(api.calls(), 0);
        assert_eq!(view.error(), Some("Email and password are required"));
    }

    #[tokio::test]
    async fn register_success_switches_to_login() {
        let api = FakeApi::default();
        let mut view = AuthView::new();
        view.toggle_mode();
        assert_eq!(view.mode(), AuthMode::Register);

        view.submit_register(&api, "new@example.com", "pw").await;

        assert_eq!(view.mode(), AuthMode::Login);
        assert_eq!(view.success(), Some(REGISTER_SUCCESS));
    }

    #[tokio::test]
    async fn register_rejection_shows_field_errors() {
        let api = FakeApi::default();
        *api.register.lock().unwrap() = Script::Reply(RegisterOutcome::Rejected {
            message: "email taken".to_string(),
        });
        let mut view = AuthView::new();

        view.submit_register(&api, "alice@example.com", "pw").await;

        assert_eq!(view.mode(), AuthMode::Register);
        assert_eq!(view.error(), Some("email taken"));
    }

    #[tokio::test]
    async fn register_transport_failure_is_generic() {
        let api = FakeApi::default();
        *api.register.lock().unwrap() = Script::Transport;
        let mut view = AuthView::new();

        view.submit_register(&api, "alice@example.com", "pw").await;
        assert_eq!(view.error(), Some("Error registering"));
    }

    #[tokio::test]
    async fn toggle_clears_messages() {
        let api = FakeApi::default();
        *api.login.lock().unwrap() = Script::Reply(Err("invalid credentials".to_string()));
        let mut view = AuthView::new();
        view.submit_login(&api, "alice@example.com", "bad").await;
        assert!(view.error().is_some());

        view.toggle_mode();
        assert!(view.error().is_none());
        assert!(view.success().is_none());

        view.submit_register(&api, "alice@example.com", "pw").await;
        assert!(view.success().is_some());
        view.toggle_mode();
        assert!(view.success().is_none());
    }
}
