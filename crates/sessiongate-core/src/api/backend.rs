use anyhow::Result;
use tracing::info;

use crate::auth::{Credentials, TokenPair};
use crate::config::{BackendKind, Config};

use super::{ApiError, AuthClient, SimulatedBackend};

/// The authentication service the gate talks to, picked by `Config.backend`.
pub enum AuthBackend {
    Remote(AuthClient),
    Simulated(SimulatedBackend),
}

impl AuthBackend {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(match config.backend {
            BackendKind::Remote => {
                info!(base_url = %config.base_url, "Using remote auth backend");
                AuthBackend::Remote(AuthClient::new(config)?)
            }
            BackendKind::Simulated => {
                info!("Using simulated auth backend");
                AuthBackend::Simulated(SimulatedBackend::new())
            }
        })
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            AuthBackend::Remote(_) => BackendKind::Remote,
            AuthBackend::Simulated(_) => BackendKind::Simulated,
        }
    }

    pub async fn signup(&mut self, credentials: &Credentials) -> Result<Option<String>, ApiError> {
        match self {
            AuthBackend::Remote(client) => client.signup(credentials).await,
            AuthBackend::Simulated(sim) => sim.signup(credentials),
        }
    }

    pub async fn login(&mut self, credentials: &Credentials) -> Result<TokenPair, ApiError> {
        match self {
            AuthBackend::Remote(client) => client.login(credentials).await,
            AuthBackend::Simulated(sim) => sim.login(credentials),
        }
    }

    pub async fn dashboard(&mut self, access_token: &str) -> Result<Option<String>, ApiError> {
        match self {
            AuthBackend::Remote(client) => client.dashboard(access_token).await,
            AuthBackend::Simulated(sim) => sim.dashboard(access_token),
        }
    }
}
