//! HTTP client for the accounts service.
//!
//! One request per call, no retries. Every non-success response is turned
//! into an `ApiError` that keeps the server's `error` text.

use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::{Credentials, TokenPair};
use crate::config::Config;

use super::ApiError;

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: Option<String>,
}

/// Client for the signup, login and dashboard endpoints.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    signup_url: String,
    login_url: String,
    dashboard_url: String,
}

impl AuthClient {
    /// Create a client for the service at `config.base_url`
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            signup_url: config.endpoint("signup"),
            login_url: config.endpoint("login"),
            dashboard_url: config.endpoint("dashboard"),
        })
    }

    /// Register a new account. Returns the server's confirmation text, if any.
    pub async fn signup(&self, credentials: &Credentials) -> Result<Option<String>, ApiError> {
        debug!(username = %credentials.username, "Sending signup request");

        let response = self
            .client
            .post(&self.signup_url)
            .json(credentials)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let body = response.text().await?;
        Ok(Self::message_field(&body))
    }

    /// Exchange credentials for a token pair.
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenPair, ApiError> {
        debug!(username = %credentials.username, "Sending login request");

        let response = self
            .client
            .post(&self.login_url)
            .json(credentials)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let body = response.text().await?;
        let tokens: TokenPair = serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!(
                "login response missing tokens ({}): {}",
                e,
                ApiError::truncate_body(&body)
            ))
        })?;
        if !tokens.is_complete() {
            return Err(ApiError::InvalidResponse(
                "login response has an empty token".to_string(),
            ));
        }
        Ok(tokens)
    }

    /// Fetch the protected dashboard with the access token as bearer credential.
    ///
    /// Only a 401 is an error here; any other status still yields whatever
    /// `message` the body carries.
    pub async fn dashboard(&self, access_token: &str) -> Result<Option<String>, ApiError> {
        let response = self
            .client
            .get(&self.dashboard_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::from_status(status, &body));
        }
        if !status.is_success() {
            warn!(%status, body = %ApiError::truncate_body(&body), "Dashboard returned non-success status");
        }

        Ok(Self::message_field(&body))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(%status, body = %ApiError::truncate_body(&body), "Request rejected");
            Err(ApiError::from_status(status, &body))
        }
    }

    fn message_field(body: &str) -> Option<String> {
        serde_json::from_str::<MessageBody>(body)
            .ok()
            .and_then(|b| b.message)
    }
}
