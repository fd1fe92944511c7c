//! Request/response types for the login and verification endpoints.

use crate::{auth::RejectReason, token::TokenClaims};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

pub const MISSING_CREDENTIALS: &str = "Username and password are required";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const MISSING_TOKEN: &str = "Token is required";
pub const SERVER_ERROR: &str = "Server error";
pub const LOGIN_SUCCESSFUL: &str = "Login successful";

/// Accepts `identity` or the older `username` field name.
#[derive(ToSchema, Serialize, Deserialize, Default)]
pub struct LoginRequest {
    #[serde(default, alias = "username")]
    pub identity: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("identity", &self.identity)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoginResponse {
    #[must_use]
    pub fn success(token: String) -> Self {
        Self {
            success: true,
            token: Some(token),
            message: Some(LOGIN_SUCCESSFUL.to_string()),
            error: None,
        }
    }

    #[must_use]
    pub fn failure(error: &str) -> Self {
        Self {
            success: false,
            token: None,
            message: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct VerifyTokenRequest {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VerifyTokenResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim: Option<TokenClaims>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyTokenResponse {
    #[must_use]
    pub fn valid(claim: TokenClaims) -> Self {
        Self {
            valid: true,
            identity: Some(claim.identity.clone()),
            claim: Some(claim),
            reason: None,
            error: None,
        }
    }

    #[must_use]
    pub fn rejected(reason: RejectReason) -> Self {
        Self {
            valid: false,
            identity: None,
            claim: None,
            reason: Some(reason),
            error: Some(reason.message().to_string()),
        }
    }

    #[must_use]
    pub fn failure(error: &str) -> Self {
        Self {
            valid: false,
            identity: None,
            claim: None,
            reason: None,
            error: Some(error.to_string()),
        }
    }
}
