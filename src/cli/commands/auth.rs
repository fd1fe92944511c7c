//! Token and credential flags for the server.

use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgGroup, Command};
use secrecy::SecretString;

pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_CREDENTIALS: &str = "credentials";
pub const ARG_CREDENTIALS_PATH: &str = "credentials-path";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_FAILURE_DELAY_MS: &str = "failure-delay-ms";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long(ARG_TOKEN_SECRET)
                .help("Shared HMAC secret used to sign tokens (at least 32 bytes)")
                .env("KEEPSAKE_TOKEN_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_CREDENTIALS)
                .long(ARG_CREDENTIALS)
                .help("Credential table as JSON")
                .long_help(
                    "Credential table as a JSON array of {identity, password_hash, salt} records. \
                     Use `keepsake hash-password` to produce records.",
                )
                .env("KEEPSAKE_CREDENTIALS")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_CREDENTIALS_PATH)
                .long(ARG_CREDENTIALS_PATH)
                .help("Path to a JSON file holding the credential table")
                .env("KEEPSAKE_CREDENTIALS_PATH"),
        )
        .group(
            ArgGroup::new("credential-source")
                .args([ARG_CREDENTIALS, ARG_CREDENTIALS_PATH])
                .required(true)
                .multiple(false),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Lifetime of issued tokens in seconds")
                .env("KEEPSAKE_TOKEN_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_FAILURE_DELAY_MS)
                .long(ARG_FAILURE_DELAY_MS)
                .help("Delay before answering a failed login, in milliseconds")
                .env("KEEPSAKE_FAILURE_DELAY_MS")
                .default_value("1000")
                .value_parser(clap::value_parser!(u64)),
        )
}

#[derive(Debug)]
pub enum CredentialSource {
    Inline(SecretString),
    Path(String),
}

#[derive(Debug)]
pub struct Options {
    pub token_secret: SecretString,
    pub credentials: CredentialSource,
    pub token_ttl_seconds: i64,
    pub failure_delay_ms: u64,
}

impl Options {
    /// # Errors
    /// Returns an error if the secret or the credential source is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let token_secret = matches
            .get_one::<String>(ARG_TOKEN_SECRET)
            .map(|secret| SecretString::from(secret.clone()))
            .context("missing required argument: --token-secret")?;

        let credentials = if let Some(json) = matches.get_one::<String>(ARG_CREDENTIALS) {
            CredentialSource::Inline(SecretString::from(json.clone()))
        } else if let Some(path) = matches.get_one::<String>(ARG_CREDENTIALS_PATH) {
            CredentialSource::Path(path.clone())
        } else {
            return Err(anyhow!(
                "missing required argument: --{ARG_CREDENTIALS} or --{ARG_CREDENTIALS_PATH}"
            ));
        };

        Ok(Self {
            token_secret,
            credentials,
            token_ttl_seconds: matches
                .get_one::<i64>(ARG_TOKEN_TTL_SECONDS)
                .copied()
                .unwrap_or(86_400),
            failure_delay_ms: matches
                .get_one::<u64>(ARG_FAILURE_DELAY_MS)
                .copied()
                .unwrap_or(1_000),
        })
    }
}
