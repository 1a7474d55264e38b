//! Tab-scoped storage for the pending PKCE pair.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::debug;

use crate::pkce::PkcePair;

pub const VERIFIER_KEY: &str = "pkce_code_verifier";
pub const CHALLENGE_KEY: &str = "pkce_code_challenge";

/// Key/value storage that lives exactly as long as one browser tab/session.
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

/// In-memory session storage; one instance per tab.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> R) -> R {
        match self.items.lock() {
            Ok(mut items) => f(&mut items),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.with(|items| items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) {
        self.with(|items| {
            items.insert(key.to_string(), value.to_string());
        });
    }

    fn remove_item(&self, key: &str) {
        self.with(|items| {
            items.remove(key);
        });
    }
}

/// Persists the pair under [`VERIFIER_KEY`] and [`CHALLENGE_KEY`].
#[derive(Clone)]
pub struct PkceStore {
    storage: Arc<dyn SessionStorage>,
}

impl PkceStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    pub fn store(&self, pair: &PkcePair) {
        self.storage.set_item(VERIFIER_KEY, &pair.code_verifier);
        self.storage.set_item(CHALLENGE_KEY, &pair.code_challenge);
        debug!("stored pending PKCE pair");
    }

    /// `None` unless both halves are present.
    pub fn retrieve(&self) -> Option<PkcePair> {
        let code_verifier = self.storage.get_item(VERIFIER_KEY)?;
        let code_challenge = self.storage.get_item(CHALLENGE_KEY)?;
        Some(PkcePair {
            code_verifier,
            code_challenge,
        })
    }

    pub fn clear(&self) {
        self.storage.remove_item(VERIFIER_KEY);
        self.storage.remove_item(CHALLENGE_KEY);
        debug!("cleared PKCE pair");
    }
}
