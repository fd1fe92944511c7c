//! Credential check and token minting.

use super::{
    AuthError, now_unix_seconds,
    credentials::{CredentialRecord, CredentialTable},
    signing::SigningKey,
};
use crate::token::{self, TokenClaims};
use secrecy::{ExposeSecret, SecretString};
use std::{sync::Arc, time::Duration};
use tokio::time::sleep;
use tracing::{debug, error, instrument};

pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;
pub const DEFAULT_FAILURE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

#[derive(Clone, Debug)]
pub struct TokenIssuer {
    credentials: Arc<CredentialTable>,
    key: SigningKey,
    ttl_seconds: i64,
    failure_delay: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(credentials: Arc<CredentialTable>, key: SigningKey) -> Self {
        Self {
            credentials,
            key,
            ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            failure_delay: DEFAULT_FAILURE_DELAY,
        }
    }

    #[must_use]
    pub fn with_ttl_seconds(mut self, seconds: i64) -> Self {
        self.ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_failure_delay(mut self, delay: Duration) -> Self {
        self.failure_delay = delay;
        self
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Check `identity`/`password` and mint a token valid for the configured TTL.
    ///
    /// # Errors
    /// - [`AuthError::MissingField`] when either field is empty,
    /// - [`AuthError::InvalidCredentials`] for an unknown identity or wrong password,
    ///   after the failure delay,
    /// - [`AuthError::ServerError`] on internal faults.
    pub async fn issue(
        &self,
        identity: &str,
        password: &SecretString,
    ) -> Result<IssuedToken, AuthError> {
        self.issue_at(identity, password, now_unix_seconds()).await
    }

    /// Same as [`TokenIssuer::issue`] with an explicit issue time.
    ///
    /// # Errors
    /// See [`TokenIssuer::issue`].
    #[instrument(skip(self, password))]
    pub async fn issue_at(
        &self,
        identity: &str,
        password: &SecretString,
        now: i64,
    ) -> Result<IssuedToken, AuthError> {
        let identity = identity.trim();
        if identity.is_empty() || password.expose_secret().is_empty() {
            return Err(AuthError::MissingField);
        }

        let record = self.credentials.get(identity).cloned();
        let known = record.is_some();
        let record = record.unwrap_or_else(CredentialRecord::decoy);

        // PBKDF2 runs for a noticeable time; keep it off the async workers.
        let candidate = SecretString::from(password.expose_secret().to_owned());
        let matched = tokio::task::spawn_blocking(move || {
            record.matches(candidate.expose_secret().as_bytes())
        })
        .await
        .map_err(|err| {
            error!("Password derivation task failed: {err}");
            AuthError::ServerError
        })?;

        if !(known && matched) {
            debug!("Invalid credentials, delaying response");
            sleep(self.failure_delay).await;
            return Err(AuthError::InvalidCredentials);
        }

        let claims = TokenClaims::new(identity, now.saturating_add(self.ttl_seconds));
        let token = token::sign_hs256(self.key.expose(), &claims).map_err(|err| {
            error!("Failed to sign token: {err}");
            AuthError::ServerError
        })?;

        Ok(IssuedToken { token, claims })
    }
}
