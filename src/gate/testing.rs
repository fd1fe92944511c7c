//! In-memory stand-ins for the page and the server.

use super::{AuthBackend, GateError, Page};
use crate::{api::types::VerifyTokenResponse, auth::RejectReason, token::TokenClaims};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicUsize, Ordering},
};
use tokio::sync::Notify;

#[derive(Debug, Default)]
pub struct FakePage {
    path: String,
    redirects: Mutex<Vec<String>>,
    logout_shown: AtomicUsize,
}

impl FakePage {
    pub fn at(path: &str) -> Arc<Self> {
        Arc::new(Self {
            path: path.to_string(),
            ..Self::default()
        })
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn logout_shown(&self) -> usize {
        self.logout_shown.load(Ordering::SeqCst)
    }
}

impl Page for FakePage {
    fn path(&self) -> String {
        self.path.clone()
    }

    fn redirect(&self, path: &str) {
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }

    fn show_logout(&self) {
        self.logout_shown.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Valid,
    Invalid,
    Failure,
}

/// Accepts `alice`/`correct` and answers verification with a fixed outcome.
#[derive(Debug)]
pub struct FakeBackend {
    outcome: Outcome,
    release: Option<Arc<Notify>>,
    verify_calls: AtomicUsize,
    login_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn answering(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            release: None,
            verify_calls: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
        })
    }

    /// Verification does not answer until `release` is notified.
    pub fn held(outcome: Outcome, release: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            release: Some(release),
            verify_calls: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
        })
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthBackend for FakeBackend {
    async fn login(&self, identity: &str, password: &SecretString) -> Result<String, GateError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        if identity == "alice" && password.expose_secret() == "correct" {
            Ok("header.claims.signature".to_string())
        } else {
            Err(GateError::InvalidCredentials)
        }
    }

    async fn verify(&self, _token: &str) -> Result<VerifyTokenResponse, GateError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(release) = &self.release {
            release.notified().await;
        }
        match self.outcome {
            Outcome::Valid => Ok(VerifyTokenResponse::valid(TokenClaims::new("alice", i64::MAX))),
            Outcome::Invalid => Ok(VerifyTokenResponse::rejected(RejectReason::Expired)),
            Outcome::Failure => Err(GateError::ServerError),
        }
    }
}
