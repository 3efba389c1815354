//! Credential administration and the session passphrase.
//!
//! [`SecretVault`] edits the encrypted secret list of the application state.
//! [`PassphraseStore`] holds the passphrase unlocked for the current process;
//! it is never persisted.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use super::encryption::{self, EncryptionError};
use crate::domain::{Provider, Secret};

/// Minimum passphrase length accepted when storing a secret
pub const MIN_PASSPHRASE_LEN: usize = 8;

/// Errors surfaced by secret administration
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("Passphrase must be at least {MIN_PASSPHRASE_LEN} characters")]
    PassphraseTooShort,

    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Decryption failed: wrong passphrase or corrupt secret")]
    DecryptionFailed,

    #[error("Encryption error: {0}")]
    Encryption(#[from] EncryptionError),
}

/// Reject passphrases too short to store secrets with
pub fn validate_passphrase(passphrase: &str) -> Result<(), SecretError> {
    if passphrase.chars().count() < MIN_PASSPHRASE_LEN {
        return Err(SecretError::PassphraseTooShort);
    }
    Ok(())
}

/// Editor over an encrypted secret list
pub struct SecretVault<'a> {
    secrets: &'a mut Vec<Secret>,
}

impl<'a> SecretVault<'a> {
    pub fn new(secrets: &'a mut Vec<Secret>) -> Self {
        Self { secrets }
    }

    /// Encrypt and store a secret, replacing any secret with the same alias
    pub fn set(&mut self, alias: &str, plaintext: &str, passphrase: &str) -> Result<(), SecretError> {
        validate_passphrase(passphrase)?;
        let value_encrypted = encryption::encrypt(plaintext, passphrase)?;

        self.secrets.retain(|s| s.alias != alias);
        self.secrets.push(Secret {
            alias: alias.to_string(),
            value_encrypted,
        });
        info!("Stored secret {}", alias);
        Ok(())
    }

    pub fn remove(&mut self, alias: &str) -> bool {
        let before = self.secrets.len();
        self.secrets.retain(|s| s.alias != alias);
        let removed = self.secrets.len() != before;
        if removed {
            info!("Removed secret {}", alias);
        }
        removed
    }

    /// Aliases of stored secrets (never the values)
    pub fn aliases(&self) -> Vec<String> {
        self.secrets.iter().map(|s| s.alias.clone()).collect()
    }

    pub fn has_secret_for(&self, provider: &Provider) -> bool {
        self.secrets.iter().any(|s| s.alias == provider.api_key_alias)
    }

    /// Decrypt a stored secret
    pub fn reveal(&self, alias: &str, passphrase: &str) -> Result<String, SecretError> {
        let secret = self
            .secrets
            .iter()
            .find(|s| s.alias == alias)
            .ok_or_else(|| SecretError::NotFound(alias.to_string()))?;

        encryption::decrypt(&secret.value_encrypted, passphrase).map_err(|e| {
            debug!("Failed to reveal secret {}: {}", alias, e);
            SecretError::DecryptionFailed
        })
    }
}

/// Passphrase unlocked for the running process
#[derive(Debug, Default)]
pub struct PassphraseStore {
    passphrase: RwLock<Option<String>>,
}

impl PassphraseStore {
    pub fn new() -> Self {
        Self {
            passphrase: RwLock::new(None),
        }
    }

    /// Store pre-unlocked with `passphrase`; `None` or an empty string leaves it locked
    pub fn unlocked(passphrase: Option<String>) -> Self {
        Self {
            passphrase: RwLock::new(passphrase.filter(|p| !p.is_empty())),
        }
    }

    /// Unlock with a passphrase. An empty string locks the store instead.
    pub async fn set(&self, passphrase: impl Into<String>) {
        let passphrase = passphrase.into();
        let mut p = self.passphrase.write().await;
        *p = if passphrase.is_empty() { None } else { Some(passphrase) };
    }

    pub async fn get(&self) -> Option<String> {
        self.passphrase.read().await.clone()
    }

    pub async fn clear(&self) {
        *self.passphrase.write().await = None;
    }

    pub async fn is_set(&self) -> bool {
        self.passphrase.read().await.is_some()
    }
}

/// Thread-safe shared passphrase store
pub type SharedPassphraseStore = Arc<PassphraseStore>;

/// Create a shared passphrase store, unlocked when a passphrase is given
pub fn create_passphrase_store(passphrase: Option<String>) -> SharedPassphraseStore {
    Arc::new(PassphraseStore::unlocked(passphrase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::default_providers;

    const PASS: &str = "long-enough-pass";

    #[test]
    fn test_validate_passphrase() {
        assert!(matches!(validate_passphrase("short"), Err(SecretError::PassphraseTooShort)));
        assert!(validate_passphrase("12345678").is_ok());
    }

    #[test]
    fn test_set_replaces_alias() {
        let mut secrets = Vec::new();
        let mut vault = SecretVault::new(&mut secrets);
        vault.set("OPENAI_API_KEY", "sk-1", PASS).unwrap();
        vault.set("OPENAI_API_KEY", "sk-2", PASS).unwrap();

        assert_eq!(vault.aliases(), vec!["OPENAI_API_KEY"]);
        assert_eq!(vault.reveal("OPENAI_API_KEY", PASS).unwrap(), "sk-2");
        assert_eq!(secrets.len(), 1);
        assert!(secrets[0].value_encrypted.starts_with("age:"));
    }

    #[test]
    fn test_set_rejects_short_passphrase() {
        let mut secrets = Vec::new();
        let mut vault = SecretVault::new(&mut secrets);
        assert!(vault.set("OPENAI_API_KEY", "sk-1", "short").is_err());
        assert!(vault.aliases().is_empty());
    }

    #[test]
    fn test_reveal_with_wrong_passphrase() {
        let mut secrets = Vec::new();
        let mut vault = SecretVault::new(&mut secrets);
        vault.set("ANTHROPIC_API_KEY", "sk-ant", PASS).unwrap();

        assert!(matches!(
            vault.reveal("ANTHROPIC_API_KEY", "another-pass"),
            Err(SecretError::DecryptionFailed)
        ));
        assert!(matches!(vault.reveal("MISSING", PASS), Err(SecretError::NotFound(_))));
    }

    #[test]
    fn test_has_secret_for_and_remove() {
        let providers = default_providers();
        let openai = providers.iter().find(|p| p.slug == "openai").unwrap();

        let mut secrets = Vec::new();
        let mut vault = SecretVault::new(&mut secrets);
        assert!(!vault.has_secret_for(openai));
        vault.set("OPENAI_API_KEY", "sk-1", PASS).unwrap();
        assert!(vault.has_secret_for(openai));
        assert!(vault.remove("OPENAI_API_KEY"));
        assert!(!vault.remove("OPENAI_API_KEY"));
        assert!(!vault.has_secret_for(openai));
    }

    #[tokio::test]
    async fn test_passphrase_store() {
        let store = PassphraseStore::new();
        assert!(!store.is_set().await);

        store.set("my-secret-passphrase").await;
        assert_eq!(store.get().await, Some("my-secret-passphrase".to_string()));

        store.set("").await;
        assert!(!store.is_set().await);

        let unlocked = PassphraseStore::unlocked(Some(String::new()));
        assert!(!unlocked.is_set().await);
    }
}
