//! Map parsed arguments to the action the binary runs.

use crate::cli::actions::{Action, hash_password, server::Args};
use crate::cli::commands::{ARG_ALLOWED_ORIGIN, ARG_PORT, auth, hash_password as hash_command};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    if let Some(sub) = matches.subcommand_matches(hash_command::NAME) {
        let identity = sub
            .get_one::<String>(hash_command::ARG_IDENTITY)
            .cloned()
            .context("missing required argument: --identity")?;
        let password = sub
            .get_one::<String>(hash_command::ARG_PASSWORD)
            .map(|password| SecretString::from(password.clone()))
            .context("missing required argument: --password")?;

        return Ok(Action::HashPassword(hash_password::Args { identity, password }));
    }

    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let allowed_origin = matches
        .get_one::<String>(ARG_ALLOWED_ORIGIN)
        .cloned()
        .unwrap_or_else(|| "*".to_string());

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        allowed_origin,
        token_secret: auth_opts.token_secret,
        credentials: auth_opts.credentials,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        failure_delay_ms: auth_opts.failure_delay_ms,
    }))
}
