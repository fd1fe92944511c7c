//! Client-side session gate.
//!
//! A [`SessionGate`] is built once per page load from the page's storage, the
//! page itself and a backend that reaches the server. It moves through
//!
//! ```text
//! Uninitialized -> Checking -> Authenticated | Unauthenticated
//! Uninitialized -> Public                      (login page, no check)
//! ```
//!
//! and resolves exactly once. [`SessionGate::is_authenticated`] awaits that
//! resolution, so callers never observe a "don't know yet" answer. Any
//! verification failure, including network errors and timeouts, is treated as
//! unauthenticated: the stored token is dropped and the visitor is sent to the
//! login page.

mod backend;
mod guard;
mod page;
mod storage;

pub use backend::{AuthBackend, DEFAULT_TIMEOUT, HttpAuthBackend};
pub use guard::{GuardPolicy, PROTECTED_PAGES};
pub use page::{HOME_PATH, LOGIN_PATH, Page, is_login_page};
pub use storage::{MemoryStorage, SessionStorage, TOKEN_STORAGE_KEY};

use secrecy::{ExposeSecret, SecretString};
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum GateError {
    #[error("identity and password are required")]
    MissingField,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("server error")]
    ServerError,
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Uninitialized,
    Checking,
    Authenticated,
    Unauthenticated,
    /// On the login page; no check was made.
    Public,
}

impl GateState {
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Authenticated | Self::Unauthenticated | Self::Public)
    }
}

pub struct SessionGate {
    storage: Arc<dyn SessionStorage>,
    page: Arc<dyn Page>,
    backend: Arc<dyn AuthBackend>,
    state: watch::Sender<GateState>,
    redirected: AtomicBool,
}

impl fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionGate")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionGate {
    #[must_use]
    pub fn new(
        storage: Arc<dyn SessionStorage>,
        page: Arc<dyn Page>,
        backend: Arc<dyn AuthBackend>,
    ) -> Self {
        let (state, _) = watch::channel(GateState::Uninitialized);
        Self {
            storage,
            page,
            backend,
            state,
            redirected: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn state(&self) -> GateState {
        *self.state.borrow()
    }

    #[must_use]
    pub fn current_path(&self) -> String {
        self.page.path()
    }

    /// Run the page-load check. Only the first call does any work; later calls
    /// wait for and return the same result.
    pub async fn initialize(&self) -> GateState {
        self.resolve(true).await
    }

    /// `true` once the gate resolved to authenticated. Waits while a check is
    /// pending; a gate that is never initialized never answers.
    pub async fn is_authenticated(&self) -> bool {
        self.resolved().await == GateState::Authenticated
    }

    /// Initialize if needed and report whether the visitor may stay.
    /// Unauthenticated visitors are redirected to the login page.
    pub async fn protect_page(&self) -> bool {
        let state = self.resolve(true).await;
        // A gate resolved earlier by `setup_auth` has not redirected yet.
        if state == GateState::Unauthenticated && !self.redirected.load(Ordering::SeqCst) {
            self.redirect_to_login();
        }
        state == GateState::Authenticated
    }

    /// Initialize if needed and show the logout affordance when logged in.
    /// Never redirects, so unlisted pages render for anyone.
    pub async fn setup_auth(&self) -> bool {
        self.resolve(false).await == GateState::Authenticated
    }

    /// Exchange credentials for a token, store it and go to the home page.
    ///
    /// # Errors
    /// Returns the backend error unchanged; the gate stays as it was and the
    /// page is not redirected, so the visitor can try again.
    pub async fn login(&self, identity: &str, password: &SecretString) -> Result<(), GateError> {
        if identity.trim().is_empty() || password.expose_secret().is_empty() {
            return Err(GateError::MissingField);
        }

        let token = self.backend.login(identity, password).await?;
        self.storage.set(TOKEN_STORAGE_KEY, &token);
        self.state.send_replace(GateState::Authenticated);
        self.page.redirect(HOME_PATH);

        Ok(())
    }

    /// Forget the token and go to the login page. Safe to call repeatedly.
    pub fn logout(&self) {
        self.clear();
        let state = if is_login_page(&self.page.path()) {
            GateState::Public
        } else {
            GateState::Unauthenticated
        };
        self.state.send_replace(state);
        self.redirect_to_login();
    }

    async fn resolve(&self, redirect: bool) -> GateState {
        let on_login_page = is_login_page(&self.page.path());

        let mut started = false;
        self.state.send_if_modified(|state| {
            if *state != GateState::Uninitialized {
                return false;
            }
            *state = if on_login_page {
                GateState::Public
            } else {
                GateState::Checking
            };
            started = true;
            true
        });

        if !started {
            return self.resolved().await;
        }
        if on_login_page {
            return GateState::Public;
        }

        let resolved = self.check().await;

        // A login or logout made while the check was in flight wins.
        let applied = self.state.send_if_modified(|state| {
            if *state != GateState::Checking {
                return false;
            }
            *state = resolved;
            true
        });
        if !applied {
            debug!("Check result superseded");
            return self.resolved().await;
        }

        match resolved {
            GateState::Authenticated => self.page.show_logout(),
            _ if redirect => self.redirect_to_login(),
            _ => {}
        }

        resolved
    }

    async fn resolved(&self) -> GateState {
        let mut receiver = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        receiver
            .wait_for(|state| state.is_resolved())
            .await
            .map_or(GateState::Unauthenticated, |state| *state)
    }

    async fn check(&self) -> GateState {
        let Some(token) = self.storage.get(TOKEN_STORAGE_KEY) else {
            debug!("No stored token");
            return GateState::Unauthenticated;
        };

        match self.backend.verify(&token).await {
            Ok(response) if response.valid => GateState::Authenticated,
            Ok(response) => {
                debug!("Stored token rejected: {:?}", response.reason);
                self.discard(&token);
                GateState::Unauthenticated
            }
            Err(err) => {
                warn!("Auth check error: {err}");
                self.discard(&token);
                GateState::Unauthenticated
            }
        }
    }

    // Drop `token` unless a newer one replaced it meanwhile.
    fn discard(&self, token: &str) {
        if self.storage.get(TOKEN_STORAGE_KEY).as_deref() == Some(token) {
            self.clear();
        }
    }

    fn clear(&self) {
        self.storage.remove(TOKEN_STORAGE_KEY);
    }

    fn redirect_to_login(&self) {
        if !is_login_page(&self.page.path()) {
            self.redirected.store(true, Ordering::SeqCst);
            self.page.redirect(LOGIN_PATH);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing;
