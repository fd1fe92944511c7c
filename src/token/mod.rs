//! Compact HS256 bearer tokens.
//!
//! A token is `b64(header).b64(claims).b64(signature)` using base64url without
//! padding. The signature is HMAC-SHA-256 over the first two segments exactly as
//! they appear on the wire, so any change to the header or claims invalidates it.

mod error;

pub use error::Error;

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use utoipa::ToSchema;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "HS256";
pub const DELIMITER: char = '.';

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

impl TokenHeader {
    fn hs256() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Payload of a token: who it was issued to and when it stops being valid.
#[derive(ToSchema, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Serialized as `username`, the field name used by tokens already in circulation.
    #[serde(rename = "username", alias = "identity")]
    pub identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl TokenClaims {
    #[must_use]
    pub fn new(identity: impl Into<String>, exp: i64) -> Self {
        Self {
            identity: identity.into(),
            exp: Some(exp),
        }
    }
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, Error> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, Error> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| Error::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn mac(secret: &[u8], signing_input: &str) -> Result<HmacSha256, Error> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| Error::InvalidKey)?;
    mac.update(signing_input.as_bytes());
    Ok(mac)
}

/// Split a token into its three segments.
///
/// # Errors
///
/// Returns [`Error::TokenFormat`] unless there are exactly three non-empty segments.
pub fn split(token: &str) -> Result<(&str, &str, &str), Error> {
    let mut parts = token.split(DELIMITER);
    let header_b64 = parts.next().ok_or(Error::TokenFormat)?;
    let claims_b64 = parts.next().ok_or(Error::TokenFormat)?;
    let sig_b64 = parts.next().ok_or(Error::TokenFormat)?;
    if parts.next().is_some()
        || header_b64.is_empty()
        || claims_b64.is_empty()
        || sig_b64.is_empty()
    {
        return Err(Error::TokenFormat);
    }

    Ok((header_b64, claims_b64, sig_b64))
}

/// Create an HS256 signed token.
///
/// # Errors
///
/// Returns an error if the header or claims cannot be encoded.
pub fn sign_hs256(secret: &[u8], claims: &TokenClaims) -> Result<String, Error> {
    let header_b64 = b64e_json(&TokenHeader::hs256())?;
    let claims_b64 = b64e_json(claims)?;
    let signing_input = format!("{header_b64}{DELIMITER}{claims_b64}");

    let signature = mac(secret, &signing_input)?.finalize().into_bytes();
    let signature_b64 = Base64UrlUnpadded::encode_string(&signature);

    Ok(format!("{signing_input}{DELIMITER}{signature_b64}"))
}

/// Verify an HS256 token and return its decoded claims.
///
/// Checks run in order: structure, signature, claims encoding, expiry. A token
/// without `exp` does not expire; one whose `exp` equals `now_unix_seconds` is
/// still valid.
///
/// # Errors
///
/// Returns an error if:
/// - the token does not have exactly three non-empty segments,
/// - the signature does not match the first two segments under `secret`,
/// - the claims segment is not base64url-encoded JSON claims,
/// - the token is expired.
pub fn verify_hs256(token: &str, secret: &[u8], now_unix_seconds: i64) -> Result<TokenClaims, Error> {
    let (header_b64, claims_b64, sig_b64) = split(token)?;

    let signing_input = format!("{header_b64}{DELIMITER}{claims_b64}");
    let signature =
        Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| Error::InvalidSignature)?;
    mac(secret, &signing_input)?
        .verify_slice(&signature)
        .map_err(|_| Error::InvalidSignature)?;

    let claims: TokenClaims = b64d_json(claims_b64)?;
    if let Some(exp) = claims.exp {
        if exp < now_unix_seconds {
            return Err(Error::Expired);
        }
    }

    Ok(claims)
}
