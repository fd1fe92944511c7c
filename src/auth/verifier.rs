//! Stateless token verification.

use super::{now_unix_seconds, signing::SigningKey};
use crate::token::{self, TokenClaims};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use utoipa::ToSchema;

/// Why a token was refused. Serialized into the `reason` field of `/verify-token`.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    InvalidFormat,
    InvalidSignature,
    Expired,
}

impl RejectReason {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidFormat => "Invalid token format",
            Self::InvalidSignature => "Invalid signature",
            Self::Expired => "Token expired",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<token::Error> for RejectReason {
    fn from(err: token::Error) -> Self {
        match err {
            token::Error::TokenFormat | token::Error::Base64 | token::Error::Json(_) => {
                Self::InvalidFormat
            }
            token::Error::InvalidKey | token::Error::InvalidSignature => Self::InvalidSignature,
            token::Error::Expired => Self::Expired,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Valid(TokenClaims),
    Invalid(RejectReason),
}

impl Verification {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        match self {
            Self::Valid(claims) => Some(&claims.identity),
            Self::Invalid(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TokenVerifier {
    key: SigningKey,
}

impl TokenVerifier {
    #[must_use]
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    #[must_use]
    pub fn verify(&self, token: &str) -> Verification {
        self.verify_at(token, now_unix_seconds())
    }

    #[must_use]
    pub fn verify_at(&self, token: &str, now: i64) -> Verification {
        match token::verify_hs256(token, self.key.expose(), now) {
            Ok(claims) => Verification::Valid(claims),
            Err(err) => {
                debug!("Token rejected: {err}");
                Verification::Invalid(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        issuer::TokenIssuer,
        testing::{ALICE_PASSWORD, alice_table, other_signing_key, signing_key},
    };
    use anyhow::Result;
    use secrecy::SecretString;

    const NOW: i64 = 1_700_000_000;

    async fn alice_token() -> Result<String> {
        let issued = TokenIssuer::new(alice_table(), signing_key())
            .issue_at("alice", &SecretString::from(ALICE_PASSWORD), NOW)
            .await?;
        Ok(issued.token)
    }

    #[tokio::test]
    async fn valid_right_after_issue() -> Result<()> {
        let token = alice_token().await?;
        let verification = TokenVerifier::new(signing_key()).verify_at(&token, NOW);
        assert!(verification.is_valid());
        assert_eq!(verification.identity(), Some("alice"));
        Ok(())
    }

    #[tokio::test]
    async fn reasons() -> Result<()> {
        let token = alice_token().await?;
        let verifier = TokenVerifier::new(signing_key());

        assert_eq!(
            verifier.verify_at("not-a-token", NOW),
            Verification::Invalid(RejectReason::InvalidFormat)
        );
        assert_eq!(
            verifier.verify_at(&token, NOW + 24 * 60 * 60 + 1),
            Verification::Invalid(RejectReason::Expired)
        );
        assert_eq!(
            TokenVerifier::new(other_signing_key()).verify_at(&token, NOW),
            Verification::Invalid(RejectReason::InvalidSignature)
        );
        Ok(())
    }

    #[tokio::test]
    async fn still_valid_at_expiry() -> Result<()> {
        let token = alice_token().await?;
        let verifier = TokenVerifier::new(signing_key());
        assert!(verifier.verify_at(&token, NOW + 24 * 60 * 60).is_valid());
        Ok(())
    }

    #[test]
    fn reason_wire_names() -> Result<()> {
        assert_eq!(
            serde_json::to_value(RejectReason::InvalidSignature)?,
            serde_json::json!("invalid_signature")
        );
        assert_eq!(RejectReason::Expired.to_string(), "Token expired");
        Ok(())
    }
}
