//! Static credential table and password derivation.
//!
//! Passwords are derived with PBKDF2-HMAC-SHA-512, 100 000 rounds, 64-byte
//! output. The salt is used as the UTF-8 bytes of the stored string, which is
//! how the records already in use were produced. Changing any of these values
//! makes every stored hash unverifiable.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use std::{collections::HashMap, fmt};
use subtle::ConstantTimeEq;
use thiserror::Error;

pub const PBKDF2_ROUNDS: u32 = 100_000;
pub const DIGEST_LEN: usize = 64;
const SALT_LEN: usize = 32;

// Salt for the decoy record used when the identity is unknown.
const DECOY_SALT: &str = "0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("invalid credentials json")]
    Json(#[from] serde_json::Error),
    #[error("credential identity must not be empty")]
    EmptyIdentity,
    #[error("duplicate credential identity: {0}")]
    DuplicateIdentity(String),
    #[error("credential salt must not be empty for {0}")]
    EmptySalt(String),
    #[error("password hash for {0} must be {DIGEST_LEN} hex-encoded bytes")]
    InvalidHash(String),
}

/// Derive the stored digest for `password` under `salt`.
#[must_use]
pub fn derive_key(password: &[u8], salt: &[u8]) -> [u8; DIGEST_LEN] {
    let mut out = [0u8; DIGEST_LEN];
    pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, PBKDF2_ROUNDS, &mut out);
    out
}

/// Wire shape of a credential record in configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CredentialEntry {
    pub identity: String,
    #[serde(alias = "passwordHash")]
    pub password_hash: String,
    pub salt: String,
}

#[derive(Clone)]
pub struct CredentialRecord {
    identity: String,
    salt: String,
    digest: [u8; DIGEST_LEN],
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl CredentialRecord {
    /// Build a record from its configuration entry.
    ///
    /// # Errors
    /// Returns an error if the identity or salt is empty or the hash is not a
    /// hex-encoded 64-byte digest.
    pub fn from_entry(entry: CredentialEntry) -> Result<Self, CredentialError> {
        let identity = entry.identity.trim().to_string();
        if identity.is_empty() {
            return Err(CredentialError::EmptyIdentity);
        }
        if entry.salt.is_empty() {
            return Err(CredentialError::EmptySalt(identity));
        }

        let mut digest = [0u8; DIGEST_LEN];
        hex::decode_to_slice(entry.password_hash.trim(), &mut digest)
            .map_err(|_| CredentialError::InvalidHash(identity.clone()))?;

        Ok(Self {
            identity,
            salt: entry.salt,
            digest,
        })
    }

    /// Create a record for `password` with a fresh random salt.
    #[must_use]
    pub fn generate(identity: &str, password: &str) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = hex::encode(salt);
        let digest = derive_key(password.as_bytes(), salt.as_bytes());

        Self {
            identity: identity.trim().to_string(),
            salt,
            digest,
        }
    }

    /// Record that no password matches in practice, used so unknown identities
    /// cost the same derivation as known ones.
    pub(crate) fn decoy() -> Self {
        Self {
            identity: String::new(),
            salt: DECOY_SALT.to_string(),
            digest: [0u8; DIGEST_LEN],
        }
    }

    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Derive `password` under this record's salt and compare in constant time.
    #[must_use]
    pub fn matches(&self, password: &[u8]) -> bool {
        let candidate = derive_key(password, self.salt.as_bytes());
        candidate.ct_eq(&self.digest).into()
    }

    #[must_use]
    pub fn to_entry(&self) -> CredentialEntry {
        CredentialEntry {
            identity: self.identity.clone(),
            password_hash: hex::encode(self.digest),
            salt: self.salt.clone(),
        }
    }
}

/// Read-only lookup of credential records by identity.
#[derive(Clone, Debug, Default)]
pub struct CredentialTable {
    records: HashMap<String, CredentialRecord>,
}

impl CredentialTable {
    /// Parse a JSON array of credential entries.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or any entry is invalid.
    pub fn from_json(json: &str) -> Result<Self, CredentialError> {
        let entries: Vec<CredentialEntry> = serde_json::from_str(json)?;
        let records = entries
            .into_iter()
            .map(CredentialRecord::from_entry)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_records(records)
    }

    /// # Errors
    /// Returns an error if two records share an identity.
    pub fn from_records(records: Vec<CredentialRecord>) -> Result<Self, CredentialError> {
        let mut table = HashMap::with_capacity(records.len());
        for record in records {
            if table.contains_key(record.identity()) {
                return Err(CredentialError::DuplicateIdentity(record.identity));
            }
            table.insert(record.identity.clone(), record);
        }

        Ok(Self { records: table })
    }

    #[must_use]
    pub fn get(&self, identity: &str) -> Option<&CredentialRecord> {
        self.records.get(identity)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
