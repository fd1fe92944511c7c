//! Which pages run the gate automatically.

use super::SessionGate;
use tracing::debug;

/// Pages that require a login. Anything else renders without a check.
pub const PROTECTED_PAGES: [&str; 4] = [
    "home.html",
    "memories.html",
    "comment.html",
    "countdown.html",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPolicy {
    pages: Vec<String>,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self::new(PROTECTED_PAGES)
    }
}

impl GuardPolicy {
    #[must_use]
    pub fn new<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pages: pages.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn is_protected(&self, path: &str) -> bool {
        self.pages.iter().any(|page| path.contains(page.as_str()))
    }

    /// Protect the gate's page if it is on the list.
    ///
    /// Returns `None` without touching the gate for unlisted pages, otherwise
    /// the result of [`SessionGate::protect_page`].
    pub async fn auto_protect(&self, gate: &SessionGate) -> Option<bool> {
        let path = gate.current_path();
        if !self.is_protected(&path) {
            debug!("Page is not protected: {path}");
            return None;
        }
        Some(gate.protect_page().await)
    }
}
