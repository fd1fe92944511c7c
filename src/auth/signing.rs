use secrecy::{ExposeSecret, SecretString};
use std::{fmt, sync::Arc};
use thiserror::Error;

pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningKeyError {
    #[error("token secret must be at least {MIN_SECRET_LEN} bytes")]
    TooShort,
}

/// Server-held HMAC secret shared by the issuer and the verifier.
///
/// Every instance that verifies tokens must be configured with the same value.
#[derive(Clone)]
pub struct SigningKey(Arc<SecretString>);

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey([REDACTED])")
    }
}

impl SigningKey {
    /// # Errors
    /// Returns an error if the secret is shorter than [`MIN_SECRET_LEN`] bytes.
    pub fn new(secret: SecretString) -> Result<Self, SigningKeyError> {
        if secret.expose_secret().len() < MIN_SECRET_LEN {
            return Err(SigningKeyError::TooShort);
        }
        Ok(Self(Arc::new(secret)))
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.0.expose_secret().as_bytes()
    }
}
