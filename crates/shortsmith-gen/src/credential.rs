//! API key access
//!
//! Providers ask a `CredentialProvider` for the key on every call instead of
//! reading ambient state, so a host can swap the key at runtime (for example
//! after the service rejects it).

use shortsmith_core::{Result, ShortsError};
use std::sync::RwLock;

/// Source of the API key used for every service call
pub trait CredentialProvider: Send + Sync {
    /// Current key, or `MissingCredential` if none is selected
    fn api_key(&self) -> Result<String>;

    /// Ask the host to pick a (new) key
    fn reselect(&self) -> Result<()>;

    fn has_selected_key(&self) -> bool {
        self.api_key().is_ok()
    }

    /// Reselect only if no key is currently selected
    fn ensure_selected(&self) -> Result<()> {
        if self.has_selected_key() {
            return Ok(());
        }
        self.reselect()
    }
}

/// A key fixed at startup (from config or environment)
#[derive(Debug, Default)]
pub struct StaticCredentials {
    key: RwLock<Option<String>>,
}

impl StaticCredentials {
    pub fn new(key: Option<String>) -> Self {
        Self {
            key: RwLock::new(key.filter(|k| !k.trim().is_empty())),
        }
    }

    /// Replace the stored key
    pub fn set_key(&self, key: Option<String>) {
        if let Ok(mut slot) = self.key.write() {
            *slot = key.filter(|k| !k.trim().is_empty());
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn api_key(&self) -> Result<String> {
        self.key
            .read()
            .ok()
            .and_then(|k| k.clone())
            .ok_or_else(|| {
                ShortsError::MissingCredential(
                    "No API key configured. Set SHORTSMITH_API_KEY or GEMINI_API_KEY, or add it to .shortsmith/config.toml".to_string(),
                )
            })
    }

    fn reselect(&self) -> Result<()> {
        Err(ShortsError::MissingCredential(
            "This key source cannot prompt for a new key; update the configuration and retry"
                .to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_key() {
        let creds = StaticCredentials::new(Some("abc".to_string()));
        assert_eq!(creds.api_key().unwrap(), "abc");
        assert!(creds.has_selected_key());
        assert!(creds.ensure_selected().is_ok());
    }

    #[test]
    fn test_blank_key_is_missing() {
        let creds = StaticCredentials::new(Some("   ".to_string()));
        assert!(matches!(
            creds.api_key(),
            Err(ShortsError::MissingCredential(_))
        ));
        assert!(creds.ensure_selected().is_err());
    }

    #[test]
    fn test_set_key() {
        let creds = StaticCredentials::new(None);
        assert!(!creds.has_selected_key());
        creds.set_key(Some("new-key".to_string()));
        assert_eq!(creds.api_key().unwrap(), "new-key");
    }
}
