//! Secret storage for the Redmine API key.
//!
//! The key is kept out of the TOML config. It is looked up in this order:
//!
//! 1. the `REDMINE_API_KEY` environment variable
//! 2. the OS keychain (service `redmine-tools`, entry `redmine/api_key`)
//!
//! ```ignore
//! use redmine_storage::{resolve_api_key, KeychainStore};
//!
//! let store = KeychainStore::new();
//! let key = resolve_api_key(&store, |k| std::env::var(k).ok())?;
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use keyring::Entry;
use redmine_core::config::API_KEY_ENV;
use redmine_core::{Error, Result};
use tracing::debug;

/// Service name used in the OS keychain.
const SERVICE_NAME: &str = "redmine-tools";

/// Keychain entry holding the Redmine API key.
pub const API_KEY_ENTRY: &str = "redmine/api_key";

/// Secret store abstraction. Keys look like `{scope}/{name}`.
pub trait CredentialStore: Send + Sync {
    fn store(&self, key: &str, value: &str) -> Result<()>;

    /// `Ok(None)` when nothing is stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Removing a missing entry is not an error.
    fn delete(&self, key: &str) -> Result<()>;

    fn exists(&self, key: &str) -> bool {
        matches!(self.get(key), Ok(Some(_)))
    }
}

// =============================================================================
// KeychainStore
// =============================================================================

/// Store backed by the platform keychain (Keychain Services, Credential
/// Manager or Secret Service).
#[derive(Debug)]
pub struct KeychainStore {
    service: String,
}

impl KeychainStore {
    pub fn new() -> Self {
        Self::with_service_name(SERVICE_NAME)
    }

    /// Use a different keychain service, e.g. to keep test runs isolated.
    pub fn with_service_name(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).map_err(|e| {
            Error::Storage(format!("Cannot open keychain entry '{}': {}", key, e))
        })
    }
}

impl Default for KeychainStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeychainStore {
    fn store(&self, key: &str, value: &str) -> Result<()> {
        debug!(key = key, "Writing secret to keychain");
        self.entry(key)?
            .set_password(value)
            .map_err(|e| Error::Storage(format!("Cannot store '{}': {}", key, e)))
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => {
                debug!(key = key, "No keychain entry");
                Ok(None)
            }
            Err(e) => Err(Error::Storage(format!("Cannot read '{}': {}", key, e))),
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        debug!(key = key, "Removing secret from keychain");
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(Error::Storage(format!("Cannot delete '{}': {}", key, e))),
        }
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-process store for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a single API key.
    pub fn with_api_key(api_key: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(API_KEY_ENTRY.to_string(), api_key.to_string());
        Self {
            entries: RwLock::new(entries),
        }
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> Error {
    Error::Storage(format!("Lock poisoned: {}", e))
}

impl CredentialStore for MemoryStore {
    fn store(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().map_err(poisoned)?.get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().map_err(poisoned)?.remove(key);
        Ok(())
    }
}

// =============================================================================
// API key resolution
// =============================================================================

/// Find the API key: environment first, then the store.
///
/// Blank values are treated as unset. Returns `Error::Config` when neither
/// source has a key.
pub fn resolve_api_key<F>(store: &dyn CredentialStore, env: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = env(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
        debug!("Using API key from environment");
        return Ok(key);
    }

    match store.get(API_KEY_ENTRY)? {
        Some(key) if !key.trim().is_empty() => {
            debug!("Using API key from keychain");
            Ok(key)
        }
        _ => Err(Error::Config(format!(
            "Redmine API key not configured. Set {} or run `redmine-tools config set-api-key`",
            API_KEY_ENV
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(!store.exists(API_KEY_ENTRY));

        store.store(API_KEY_ENTRY, "abc").unwrap();
        assert_eq!(store.get(API_KEY_ENTRY).unwrap(), Some("abc".to_string()));

        store.store(API_KEY_ENTRY, "def").unwrap();
        assert_eq!(store.get(API_KEY_ENTRY).unwrap(), Some("def".to_string()));

        store.delete(API_KEY_ENTRY).unwrap();
        assert!(!store.exists(API_KEY_ENTRY));

        // Deleting again is fine
        store.delete(API_KEY_ENTRY).unwrap();
    }

    #[test]
    fn test_resolve_prefers_env() {
        let store = MemoryStore::with_api_key("from-keychain");
        let key = resolve_api_key(&store, |name| {
            (name == API_KEY_ENV).then(|| "from-env".to_string())
        })
        .unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn test_resolve_falls_back_to_store() {
        let store = MemoryStore::with_api_key("from-keychain");
        assert_eq!(resolve_api_key(&store, no_env).unwrap(), "from-keychain");

        // Blank env value does not shadow the stored key
        let key = resolve_api_key(&store, |_| Some("   ".to_string())).unwrap();
        assert_eq!(key, "from-keychain");
    }

    #[test]
    fn test_resolve_missing_key() {
        let store = MemoryStore::new();
        let err = resolve_api_key(&store, no_env).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_keychain_service_name() {
        assert_eq!(KeychainStore::new().service, "redmine-tools");
        assert_eq!(KeychainStore::default().service, "redmine-tools");
        assert_eq!(
            KeychainStore::with_service_name("redmine-tools-test").service,
            "redmine-tools-test"
        );
    }
}
