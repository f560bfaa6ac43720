//! Application state for the sessiongate terminal client.
//!
//! `App` owns the config, the `SessionGate` and the `ViewModel`. Key handlers
//! only queue a `PendingAction`; the main loop redraws (so "Working..." is
//! visible) and then runs it, which keeps a single request in flight.

use anyhow::Result;
use chrono::Utc;
use tracing::{error, info, warn};

use sessiongate_core::gate::GateDecision;
use sessiongate_core::{Config, NoticeKind, SessionGate, View, ViewModel};

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Quitting,
}

/// Work queued by the input handler for the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Login,
    Signup,
    Reload,
}

pub struct App {
    pub config: Config,
    pub gate: SessionGate,
    pub view: ViewModel,
    pub state: AppState,
    /// Write `last_username` back to the config file after a login
    pub save_config: bool,
    pending_action: Option<PendingAction>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let gate = SessionGate::from_config(&config)?;
        let view = ViewModel::new(&config);
        Ok(Self::with_gate(config, gate, view))
    }

    pub fn with_gate(config: Config, gate: SessionGate, view: ViewModel) -> Self {
        Self {
            config,
            gate,
            view,
            state: AppState::Normal,
            save_config: true,
            pending_action: None,
        }
    }

    /// Run the session check that decides the first screen.
    pub async fn start(&mut self) {
        match self.gate.check_session(&mut self.view).await {
            Ok(GateDecision::Proceed) => info!("Existing session accepted"),
            Ok(GateDecision::RedirectToLogin) => info!("No valid session, showing login"),
            Err(e) => self.report(e),
        }
    }

    /// Queue an action unless one is already waiting.
    pub fn request(&mut self, action: PendingAction) {
        if self.pending_action.is_some() || self.view.pending {
            return;
        }
        self.pending_action = Some(action);
        self.view.pending = true;
    }

    pub fn pending_action(&self) -> Option<PendingAction> {
        self.pending_action
    }

    /// Perform the queued action, if any.
    pub async fn run_pending(&mut self) {
        let Some(action) = self.pending_action.take() else {
            return;
        };

        let result = match action {
            PendingAction::Login => {
                let credentials = self.view.login_form.credentials();
                let result = self.gate.login(&mut self.view, credentials).await;
                if self.view.view == View::Dashboard {
                    self.remember_username();
                }
                result
            }
            PendingAction::Signup => {
                let credentials = self.view.signup_form.credentials();
                self.gate.signup(&mut self.view, credentials).await;
                Ok(())
            }
            PendingAction::Reload => self.gate.load_protected_resource(&mut self.view).await,
        };

        self.view.pending = false;
        if let Err(e) = result {
            self.report(e);
        }
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.gate.logout(&mut self.view) {
            self.report(e);
        } else {
            info!("Logged out");
        }
    }

    /// Periodic housekeeping between frames.
    pub fn tick(&mut self) {
        self.view.expire_notices(Utc::now());
    }

    fn remember_username(&mut self) {
        let username = self.view.login_form.username.clone();
        if self.config.last_username.as_deref() == Some(username.as_str()) {
            return;
        }
        self.config.last_username = Some(username);
        if !self.save_config {
            return;
        }
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    fn report(&mut self, e: anyhow::Error) {
        error!(error = %e, "Session operation failed");
        self.view.notify(NoticeKind::Error, format!("{:#}", e));
    }
}

/// App on the simulated backend with in-memory tokens and no config writes.
#[cfg(test)]
pub(crate) fn simulated_app() -> App {
    use sessiongate_core::{BackendKind, StorageKind};

    let config = Config {
        backend: BackendKind::Simulated,
        storage: StorageKind::Memory,
        ..Config::default()
    };
    let mut app = App::new(config).expect("simulated app");
    app.save_config = false;
    app
}
