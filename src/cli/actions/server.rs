use crate::{
    api,
    auth::{AuthState, CredentialTable, SigningKey, TokenIssuer, TokenVerifier},
    cli::{commands::auth::CredentialSource, telemetry},
};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::{fs, sync::Arc, time::Duration};
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub allowed_origin: String,
    pub token_secret: SecretString,
    pub credentials: CredentialSource,
    pub token_ttl_seconds: i64,
    pub failure_delay_ms: u64,
}

/// Load the credential table from inline JSON or a file.
///
/// # Errors
/// Returns an error if the file cannot be read or the table is invalid.
pub fn load_credentials(source: &CredentialSource) -> Result<CredentialTable> {
    let table = match source {
        CredentialSource::Inline(json) => {
            CredentialTable::from_json(json.expose_secret()).context("Invalid credential table")?
        }
        CredentialSource::Path(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read credentials file: {path}"))?;
            CredentialTable::from_json(&json)
                .with_context(|| format!("Invalid credential table in {path}"))?
        }
    };

    debug!("Loaded {} credential record(s)", table.len());

    Ok(table)
}

/// Build the shared issuer and verifier.
///
/// # Errors
/// Returns an error if the secret is too short or the credentials are invalid.
pub fn auth_state(args: &Args) -> Result<Arc<AuthState>> {
    let credentials = Arc::new(load_credentials(&args.credentials)?);
    if credentials.is_empty() {
        info!("Credential table is empty; every login will fail");
    }

    let key = SigningKey::new(args.token_secret.clone()).context("Invalid token secret")?;

    let issuer = TokenIssuer::new(credentials, key.clone())
        .with_ttl_seconds(args.token_ttl_seconds)
        .with_failure_delay(Duration::from_millis(args.failure_delay_ms));
    let verifier = TokenVerifier::new(key);

    Ok(Arc::new(AuthState::new(issuer, verifier)))
}

/// Execute the server action.
/// # Errors
/// Returns an error if configuration is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let state = auth_state(&args)?;

    let result = api::new(args.port, state, &args.allowed_origin).await;

    telemetry::shutdown_tracer();

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ALICE_HASH: &str = "4fcc7edfc49d22a30cd1f971f36a4df2882b807ed605258842b2c6ab7c6da63d7032ecc2fd66d384a1ec68e169919d7e5f6d7e502baf45ef7b6df47eff98cd34";

    fn table_json() -> String {
        format!(r#"[{{"identity":"alice","password_hash":"{ALICE_HASH}","salt":"alice-salt"}}]"#)
    }

    fn args(secret: &str, credentials: CredentialSource) -> Args {
        Args {
            port: 0,
            allowed_origin: "*".to_string(),
            token_secret: SecretString::from(secret),
            credentials,
            token_ttl_seconds: 60,
            failure_delay_ms: 0,
        }
    }

    #[test]
    fn loads_inline_credentials() -> Result<()> {
        let table = load_credentials(&CredentialSource::Inline(SecretString::from(table_json())))?;
        assert_eq!(table.len(), 1);
        assert!(table.get("alice").is_some());
        Ok(())
    }

    #[test]
    fn loads_credentials_from_file() -> Result<()> {
        let path = std::env::temp_dir().join(format!("keepsake-credentials-{}.json", ulid::Ulid::new()));
        let mut file = fs::File::create(&path)?;
        file.write_all(table_json().as_bytes())?;

        let table = load_credentials(&CredentialSource::Path(path.display().to_string()));
        fs::remove_file(&path)?;

        assert_eq!(table?.len(), 1);
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = load_credentials(&CredentialSource::Path("/nonexistent/keepsake.json".into()));
        assert!(result.is_err());
    }

    #[test]
    fn short_secret_is_rejected() {
        let inline = CredentialSource::Inline(SecretString::from(table_json()));
        assert!(auth_state(&args("too-short", inline)).is_err());

        let inline = CredentialSource::Inline(SecretString::from(table_json()));
        assert!(auth_state(&args("keepsake-test-secret-0123456789abcdef", inline)).is_ok());
    }

    #[tokio::test]
    async fn configured_state_issues_verifiable_tokens() -> Result<()> {
        let inline = CredentialSource::Inline(SecretString::from(table_json()));
        let state = auth_state(&args("keepsake-test-secret-0123456789abcdef", inline))?;

        let issued = state
            .issuer()
            .issue("alice", &SecretString::from("correct"))
            .await?;
        assert_eq!(state.verifier().verify(&issued.token).identity(), Some("alice"));
        Ok(())
    }
}
