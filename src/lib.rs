//! # Keepsake (login gate for the memories site)
//!
//! `keepsake` guards a small personal memories/guestbook site with a single
//! shared login. It has two halves on either side of one trust boundary:
//!
//! - **Server** ([`auth`], [`api`]): `POST /login` checks an identity/password
//!   pair against a static credential table and returns a signed bearer token;
//!   `POST /verify-token` checks a token's structure, signature and expiry.
//! - **Client** ([`gate`]): a per-page session context that keeps the token in
//!   tab-scoped storage, asks the server whether it is still valid, and sends
//!   visitors without a valid token back to the login page.
//!
//! ## Tokens
//!
//! Tokens are `header.claims.signature`, base64url without padding, signed with
//! HMAC-SHA-256 under a secret every instance shares. They carry the identity
//! and an expiry 24 hours after issue, and are never stored server-side.
//!
//! ## Credentials
//!
//! Passwords are checked with PBKDF2-HMAC-SHA-512 (100 000 rounds). Failed
//! logins are answered after a fixed delay and never say whether the identity
//! or the password was wrong.

pub mod api;
pub mod auth;
pub mod cli;
pub mod gate;
pub mod token;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
