//! Application configuration management.
//!
//! Configuration is stored at `~/.config/sessiongate/config.json`. Every field
//! has a default, so a missing or partial file still loads. A handful of
//! environment variables override the file at startup.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "sessiongate";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default authentication service root (the accounts app of the backend).
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/accounts";

/// Toasts disappear after this many seconds unless configured otherwise.
const DEFAULT_TOAST_DURATION_SECS: u64 = 3;

const MAX_TOAST_DURATION_SECS: u64 = 86_400;

/// HTTP request timeout in seconds.
/// Long enough for a slow auth server, short enough that a dead one is reported.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;

pub const ENV_BASE_URL: &str = "SESSIONGATE_BASE_URL";
pub const ENV_BACKEND: &str = "SESSIONGATE_BACKEND";
pub const ENV_USERNAME: &str = "SESSIONGATE_USERNAME";

/// Which authentication backend the gate talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Real HTTP service at `base_url`
    #[default]
    Remote,
    /// In-process user table, no network
    Simulated,
}

impl BackendKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "remote" | "http" => Some(Self::Remote),
            "simulated" | "local" => Some(Self::Simulated),
            _ => None,
        }
    }
}

/// Where the token pair is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    File,
    Keyring,
    Memory,
}

/// How user-facing notices are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoticeStyle {
    /// Timed pop-up in the corner
    #[default]
    Toast,
    /// Persistent message line under the form
    Inline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub backend: BackendKind,
    pub storage: StorageKind,
    pub notice_style: NoticeStyle,
    pub toast_duration_secs: u64,
    pub request_timeout_secs: u64,
    pub last_username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            backend: BackendKind::default(),
            storage: StorageKind::default(),
            notice_style: NoticeStyle::default(),
            toast_duration_secs: DEFAULT_TOAST_DURATION_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            last_username: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup (the environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_BACKEND) {
            match BackendKind::parse(&raw) {
                Some(kind) => self.backend = kind,
                None => tracing::warn!(value = %raw, "Ignoring unknown backend override"),
            }
        }
        if let Some(username) = lookup(ENV_USERNAME).filter(|u| !u.is_empty()) {
            self.last_username = Some(username);
        }
    }

    /// Full URL for an endpoint below `base_url`, always with a trailing slash.
    pub fn endpoint(&self, name: &str) -> String {
        format!(
            "{}/{}/",
            self.base_url.trim_end_matches('/'),
            name.trim_matches('/')
        )
    }

    /// Toast lifetime, capped at a day.
    pub fn toast_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.toast_duration_secs.min(MAX_TOAST_DURATION_SECS) as i64)
    }

    /// Per-request timeout, at least one second.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(MIN_REQUEST_TIMEOUT_SECS))
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the token file and logs.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}
