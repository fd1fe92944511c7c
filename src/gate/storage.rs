//! Tab-scoped token storage.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

/// Key the session token is stored under.
pub const TOKEN_STORAGE_KEY: &str = "authToken";

/// Key/value storage that lives as long as the browser tab does.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory storage, dropped together with the page context that owns it.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `token`, as after a previous page load.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        let storage = Self::new();
        storage.set(TOKEN_STORAGE_KEY, token);
        storage
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}
