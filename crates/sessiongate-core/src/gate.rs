//! The session gate.
//!
//! `SessionGate` owns the `Session` and the `AuthBackend`. Each operation
//! takes the `ViewModel` it should update and performs at most one backend
//! request. Backend failures end up as notices on the view; only token storage
//! failures are returned to the caller.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::{ApiError, AuthBackend};
use crate::auth::{Credentials, Session};
use crate::config::{BackendKind, Config};
use crate::view::{NoticeKind, ViewModel};

/// Shown when a request gets no response at all.
pub const SERVER_UNREACHABLE_MESSAGE: &str = "Server not reachable. Please try again later.";

/// Shown when login is rejected without an `error` text.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";

/// Shown when signup is rejected without an `error` text.
pub const SIGNUP_FAILED_MESSAGE: &str = "Signup failed";

/// Shown after signup when the server sent no `message`.
pub const SIGNUP_SUCCESS_MESSAGE: &str = "Account created successfully";

pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful";

/// Outcome of `check_session`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// No usable token; the login panel is showing.
    RedirectToLogin,
    /// Token present; the dashboard is showing.
    Proceed,
}

pub struct SessionGate {
    backend: AuthBackend,
    session: Session,
}

impl SessionGate {
    pub fn new(backend: AuthBackend, session: Session) -> Self {
        Self { backend, session }
    }

    /// Build the backend and open the token store named in the config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = AuthBackend::from_config(config).context("Failed to create auth backend")?;
        let session = Session::from_config(config).context("Failed to open token store")?;
        Ok(Self::new(backend, session))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Guard the protected view.
    ///
    /// Without an access token the login panel is shown and nothing is
    /// requested. With one, the dashboard is shown and its content loaded.
    pub async fn check_session(&mut self, view: &mut ViewModel) -> Result<GateDecision> {
        if self.session.access_token()?.is_none() {
            debug!("No access token, redirecting to login");
            view.welcome = None;
            view.show_login();
            return Ok(GateDecision::RedirectToLogin);
        }

        view.show_dashboard();
        self.load_protected_resource(view).await?;

        // A 401 while loading logs out and sends us back to login
        if self.session.is_authenticated() {
            Ok(GateDecision::Proceed)
        } else {
            Ok(GateDecision::RedirectToLogin)
        }
    }

    /// Exchange credentials for tokens, persist them and open the dashboard.
    ///
    /// Nothing is written to the store unless the login succeeds.
    pub async fn login(&mut self, view: &mut ViewModel, credentials: Credentials) -> Result<()> {
        if let Err(message) = credentials.validate() {
            view.notify(NoticeKind::Error, message);
            return Ok(());
        }

        view.pending = true;
        let result = self.backend.login(&credentials).await;
        view.pending = false;

        match result {
            Ok(tokens) => {
                if let Err(e) = self.session.persist(&tokens) {
                    view.notify(NoticeKind::Error, "Could not save session");
                    return Err(e.context("Failed to persist session tokens"));
                }
                info!(username = %credentials.username, "Login successful");
                view.login_form.password.clear();
                view.notify(NoticeKind::Success, LOGIN_SUCCESS_MESSAGE);
                self.check_session(view).await?;
            }
            Err(e) => {
                warn!(username = %credentials.username, error = %e, "Login failed");
                view.notify(NoticeKind::Error, Self::failure_text(&e, LOGIN_FAILED_MESSAGE));
            }
        }
        Ok(())
    }

    /// Register an account and switch to the login panel on success.
    pub async fn signup(&mut self, view: &mut ViewModel, credentials: Credentials) {
        if let Err(message) = credentials.validate() {
            view.notify(NoticeKind::Error, message);
            return;
        }

        view.pending = true;
        let result = self.backend.signup(&credentials).await;
        view.pending = false;

        match result {
            Ok(message) => {
                info!(username = %credentials.username, "Signup successful");
                view.signup_form.password.clear();
                view.login_form.username = credentials.username;
                view.login_form.password.clear();
                // Switch first; an inline message would otherwise be wiped by the switch
                view.show_login();
                view.notify(
                    NoticeKind::Success,
                    message.unwrap_or_else(|| SIGNUP_SUCCESS_MESSAGE.to_string()),
                );
            }
            Err(e) => {
                warn!(username = %credentials.username, error = %e, "Signup failed");
                view.notify(NoticeKind::Error, Self::failure_text(&e, SIGNUP_FAILED_MESSAGE));
            }
        }
    }

    /// Fetch the dashboard message with the stored access token.
    ///
    /// A 401 logs out. Any other failure is only logged.
    pub async fn load_protected_resource(&mut self, view: &mut ViewModel) -> Result<()> {
        let Some(token) = self.session.access_token()? else {
            debug!("No access token, skipping dashboard fetch");
            return self.logout(view);
        };

        view.pending = true;
        let result = self.backend.dashboard(&token).await;
        view.pending = false;

        match result {
            Ok(Some(message)) => {
                view.welcome = Some(message);
            }
            Ok(None) => {
                warn!("Dashboard response had no message");
            }
            Err(e) if e.is_unauthorized() => {
                info!("Access token rejected, ending session");
                self.logout(view)?;
            }
            Err(e) => {
                warn!(error = %e, "Error loading dashboard");
            }
        }
        Ok(())
    }

    /// Remove both tokens and show the login panel, whatever was stored before.
    pub fn logout(&mut self, view: &mut ViewModel) -> Result<()> {
        let cleared = self.session.clear();
        view.welcome = None;
        view.show_login();
        cleared.context("Failed to clear session tokens")
    }

    fn failure_text(error: &ApiError, fallback: &str) -> String {
        if error.is_transport() {
            SERVER_UNREACHABLE_MESSAGE.to_string()
        } else {
            error.server_message().unwrap_or(fallback).to_string()
        }
    }
}
