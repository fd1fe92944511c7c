//! Server side of the login gate.
//!
//! ## Issuing
//!
//! [`TokenIssuer`] checks an identity/password pair against the static
//! [`CredentialTable`] and signs a bearer token valid for 24 hours by default.
//! Unknown identities and wrong passwords take the same path: the same key
//! derivation work, the same delay, the same error.
//!
//! ## Verifying
//!
//! [`TokenVerifier`] is pure. It holds only the [`SigningKey`] and can be shared
//! freely between requests.
//!
//! > **Note:** tokens are never revoked server-side. Expiry is the only way a
//! > token stops being valid short of the client discarding it.

pub mod credentials;
pub mod issuer;
mod signing;
pub mod verifier;

pub use credentials::{CredentialEntry, CredentialError, CredentialRecord, CredentialTable};
pub use issuer::{IssuedToken, TokenIssuer};
pub use signing::{MIN_SECRET_LEN, SigningKey, SigningKeyError};
pub use verifier::{RejectReason, TokenVerifier, Verification};

use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("identity and password are required")]
    MissingField,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("server error")]
    ServerError,
}

/// Everything the HTTP handlers need, shared behind an `Arc`.
#[derive(Clone, Debug)]
pub struct AuthState {
    issuer: TokenIssuer,
    verifier: TokenVerifier,
}

impl AuthState {
    #[must_use]
    pub fn new(issuer: TokenIssuer, verifier: TokenVerifier) -> Self {
        Self { issuer, verifier }
    }

    #[must_use]
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    #[must_use]
    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }
}

pub(crate) fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX)
        })
}
