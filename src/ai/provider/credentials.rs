//! Provider credential sources.
//!
//! Credentials are looked up by slot name (e.g. `GROQ_API_KEY`) on every
//! request, so adding or removing a key changes provider availability
//! without a restart. Values stay wrapped in `SecretString`.

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::Arc;

/// Lookup of provider credentials by slot name
pub trait CredentialSource: Send + Sync {
    /// Current credential for `slot`, if one is configured and non-empty
    fn credential(&self, slot: &str) -> Option<SecretString>;
}

pub type SharedCredentials = Arc<dyn CredentialSource>;

/// Reads credentials from process environment variables
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn credential(&self, slot: &str) -> Option<SecretString> {
        std::env::var(slot)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(SecretString::from)
    }
}

/// Fixed credentials, from config file overrides or tests
#[derive(Default)]
pub struct StaticCredentials {
    keys: HashMap<String, SecretString>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, slot: impl Into<String>, key: impl Into<String>) -> Self {
        self.keys.insert(slot.into(), SecretString::from(key.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut slots: Vec<&String> = self.keys.keys().collect();
        slots.sort();
        f.debug_struct("StaticCredentials")
            .field("slots", &slots)
            .finish()
    }
}

impl CredentialSource for StaticCredentials {
    fn credential(&self, slot: &str) -> Option<SecretString> {
        self.keys
            .get(slot)
            .filter(|k| !k.expose_secret().trim().is_empty())
            .cloned()
    }
}

/// Tries each source in order, first hit wins
pub struct LayeredCredentials {
    layers: Vec<SharedCredentials>,
}

impl LayeredCredentials {
    pub fn new(layers: Vec<SharedCredentials>) -> Self {
        Self { layers }
    }
}

impl CredentialSource for LayeredCredentials {
    fn credential(&self, slot: &str) -> Option<SecretString> {
        self.layers.iter().find_map(|layer| layer.credential(slot))
    }
}
