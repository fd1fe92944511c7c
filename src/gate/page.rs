//! The page the gate runs on.

/// Public page visitors are sent to when they are not logged in.
pub const LOGIN_PATH: &str = "/index.html";

/// Page a successful login lands on.
pub const HOME_PATH: &str = "/home.html";

/// Browser-side effects the gate needs from the current page.
pub trait Page: Send + Sync {
    /// Path of the current location, e.g. `/memories.html`.
    fn path(&self) -> String;

    /// Navigate away to `path`.
    fn redirect(&self, path: &str);

    /// Turn the login affordance into a logout one.
    fn show_logout(&self) {}
}

/// `/`, `/index.html` and anything ending in `index.html` is the login page.
#[must_use]
pub fn is_login_page(path: &str) -> bool {
    path == "/" || path == LOGIN_PATH || path.ends_with("index.html")
}
