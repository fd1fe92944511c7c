//! Calls from the gate to the login and verification endpoints.
//!
//! Every request carries a timeout so a hung verification call resolves the
//! gate as unauthenticated instead of leaving the page waiting forever.

use super::GateError;
use crate::{
    APP_USER_AGENT,
    api::types::{LoginRequest, LoginResponse, VerifyTokenRequest, VerifyTokenResponse},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Default request timeout applied to both endpoints.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchange credentials for a token.
    async fn login(&self, identity: &str, password: &SecretString) -> Result<String, GateError>;

    /// Ask the server whether `token` is still valid.
    async fn verify(&self, token: &str) -> Result<VerifyTokenResponse, GateError>;
}

#[derive(Clone, Debug)]
pub struct HttpAuthBackend {
    client: Client,
    base_url: Url,
}

impl HttpAuthBackend {
    /// Backend for a server rooted at `base_url`, e.g. `https://site.tld/.netlify/functions`.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, GateError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, GateError> {
        let mut base_url = Url::parse(base_url)?;
        // `Url::join` replaces the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, name: &str) -> Result<Url, GateError> {
        Ok(self.base_url.join(name)?)
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    #[instrument(skip(self, password))]
    async fn login(&self, identity: &str, password: &SecretString) -> Result<String, GateError> {
        let request = LoginRequest {
            identity: Some(identity.to_string()),
            password: Some(password.expose_secret().to_string()),
        };

        let response = self
            .client
            .post(self.endpoint("login")?)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        debug!("Login response: {status}");

        match status {
            StatusCode::OK => {
                let body: LoginResponse = response.json().await?;
                body.token
                    .filter(|token| !token.is_empty())
                    .ok_or(GateError::ServerError)
            }
            StatusCode::BAD_REQUEST => Err(GateError::MissingField),
            StatusCode::UNAUTHORIZED => Err(GateError::InvalidCredentials),
            _ => Err(GateError::ServerError),
        }
    }

    #[instrument(skip(self, token))]
    async fn verify(&self, token: &str) -> Result<VerifyTokenResponse, GateError> {
        let request = VerifyTokenRequest {
            token: Some(token.to_string()),
        };

        let response = self
            .client
            .post(self.endpoint("verify-token")?)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!("Verify response: {status}");
            return Err(GateError::ServerError);
        }

        Ok(response.json().await?)
    }
}
