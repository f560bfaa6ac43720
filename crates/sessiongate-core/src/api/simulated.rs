//! In-process stand-in for the accounts service.
//!
//! Mirrors the server's validation and messages so the client can be used
//! without a backend running. Accounts and issued tokens live only as long
//! as the process.

use std::collections::HashMap;

use chrono::Utc;
use reqwest::StatusCode;
use tracing::debug;

use crate::auth::credentials::MISSING_FIELDS_MESSAGE;
use crate::auth::{Credentials, TokenPair};

use super::ApiError;

pub const USER_EXISTS_MESSAGE: &str = "User already exists";
pub const USER_CREATED_MESSAGE: &str = "User created successfully";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

#[derive(Debug, Default)]
pub struct SimulatedBackend {
    /// username -> password
    users: HashMap<String, String>,
    /// access token -> username
    issued: HashMap<String, String>,
    counter: u64,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn rejected(message: &str) -> ApiError {
        ApiError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: Some(message.to_string()),
        }
    }

    pub fn signup(&mut self, credentials: &Credentials) -> Result<Option<String>, ApiError> {
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(Self::rejected(MISSING_FIELDS_MESSAGE));
        }
        if self.users.contains_key(&credentials.username) {
            return Err(Self::rejected(USER_EXISTS_MESSAGE));
        }
        self.users
            .insert(credentials.username.clone(), credentials.password.clone());
        debug!(username = %credentials.username, "Simulated account created");
        Ok(Some(USER_CREATED_MESSAGE.to_string()))
    }

    pub fn login(&mut self, credentials: &Credentials) -> Result<TokenPair, ApiError> {
        match self.users.get(&credentials.username) {
            Some(password) if *password == credentials.password => {}
            _ => return Err(Self::rejected(INVALID_CREDENTIALS_MESSAGE)),
        }

        self.counter += 1;
        let stamp = Utc::now().timestamp();
        let tokens = TokenPair::new(
            format!("sim-access.{}.{}.{}", credentials.username, stamp, self.counter),
            format!("sim-refresh.{}.{}.{}", credentials.username, stamp, self.counter),
        );
        self.issued
            .insert(tokens.access_token.clone(), credentials.username.clone());
        Ok(tokens)
    }

    pub fn dashboard(&self, access_token: &str) -> Result<Option<String>, ApiError> {
        match self.issued.get(access_token) {
            Some(username) => Ok(Some(format!("Welcome, {}!", username))),
            None => Err(ApiError::Unauthorized { message: None }),
        }
    }
}
