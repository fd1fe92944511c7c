use crate::auth::CredentialRecord;
use anyhow::{Result, anyhow};
use secrecy::{ExposeSecret, SecretString};

#[derive(Debug)]
pub struct Args {
    pub identity: String,
    pub password: SecretString,
}

/// Build the JSON record for one table entry.
///
/// # Errors
/// Returns an error if the identity or password is empty.
pub fn record_json(args: &Args) -> Result<String> {
    let identity = args.identity.trim();
    if identity.is_empty() {
        return Err(anyhow!("identity must not be empty"));
    }
    if args.password.expose_secret().is_empty() {
        return Err(anyhow!("password must not be empty"));
    }

    let record = CredentialRecord::generate(identity, args.password.expose_secret());
    Ok(serde_json::to_string_pretty(&record.to_entry())?)
}

/// Print a fresh credential record to stdout.
///
/// # Errors
/// Returns an error if the record cannot be built or the derivation task fails.
pub async fn execute(args: Args) -> Result<()> {
    let json = tokio::task::spawn_blocking(move || record_json(&args)).await??;
    println!("{json}");
    Ok(())
}
