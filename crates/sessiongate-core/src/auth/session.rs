use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::store::{FileStore, KeyringStore, MemoryStore, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::config::{Config, StorageKind};

/// Access/refresh tokens as returned by the login endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct TokenPair {
    #[serde(rename = "access")]
    pub access_token: String,
    #[serde(rename = "refresh")]
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access_token: access.into(),
            refresh_token: refresh.into(),
        }
    }

    /// Both tokens are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// The persisted token pair and its lifecycle.
///
/// Built once at startup and owned by the gate; nothing else touches the store.
pub struct Session {
    store: Box<dyn TokenStore>,
}

impl Session {
    pub fn new(store: Box<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Open the store selected in the config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store: Box<dyn TokenStore> = match config.storage {
            StorageKind::File => Box::new(FileStore::new(&config.data_dir()?)),
            StorageKind::Keyring => Box::new(KeyringStore::new()),
            StorageKind::Memory => Box::new(MemoryStore::new()),
        };
        debug!(storage = ?config.storage, "Token store opened");
        Ok(Self::new(store))
    }

    /// The stored access token. An empty value counts as absent.
    pub fn access_token(&self) -> Result<Option<String>> {
        Ok(self.store.get(ACCESS_TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    pub fn refresh_token(&self) -> Result<Option<String>> {
        Ok(self.store.get(REFRESH_TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    /// Both tokens, if both are present.
    pub fn tokens(&self) -> Result<Option<TokenPair>> {
        Ok(match (self.access_token()?, self.refresh_token()?) {
            (Some(access), Some(refresh)) => Some(TokenPair::new(access, refresh)),
            _ => None,
        })
    }

    /// Check if an access token is present. Storage errors count as absent.
    pub fn is_authenticated(&self) -> bool {
        match self.access_token() {
            Ok(token) => token.is_some(),
            Err(e) => {
                warn!(error = %e, "Failed to read access token");
                false
            }
        }
    }

    /// Overwrite both stored tokens. On failure no token is left stored.
    pub fn persist(&mut self, tokens: &TokenPair) -> Result<()> {
        self.store
            .set_pair(&tokens.access_token, &tokens.refresh_token)?;
        debug!("Session tokens persisted");
        Ok(())
    }

    /// Remove both tokens. Both removals are attempted even if the first fails.
    pub fn clear(&mut self) -> Result<()> {
        let access = self.store.remove(ACCESS_TOKEN_KEY);
        let refresh = self.store.remove(REFRESH_TOKEN_KEY);
        access?;
        refresh?;
        debug!("Session tokens cleared");
        Ok(())
    }
}
