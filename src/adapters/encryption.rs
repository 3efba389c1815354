//! Passphrase encryption for stored credentials
//!
//! Secrets and encrypted exports are sealed with AGE passphrase encryption
//! and encoded as `age:<base64>`:
//! ```text
//! age:YWdlLWVuY3J5cHRpb24ub3JnL3YxCi0+IHNjcnlwdC...
//! ```
//!
//! The engine only ever sees [`encrypt`] and [`decrypt`]; callers must not
//! depend on the envelope format.

use std::io::{Read, Write};

const AGE_PREFIX: &str = "age:";

/// Check if a value carries the encrypted envelope
pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(AGE_PREFIX)
}

/// Encrypt `plaintext` with `passphrase`
pub fn encrypt(plaintext: &str, passphrase: &str) -> Result<String, EncryptionError> {
    let encryptor =
        age::Encryptor::with_user_passphrase(age::secrecy::SecretString::from(passphrase.to_string()));

    let mut encrypted = vec![];
    let mut writer = encryptor
        .wrap_output(&mut encrypted)
        .map_err(|e| EncryptionError::Encrypt(e.to_string()))?;
    writer.write_all(plaintext.as_bytes())?;
    writer.finish()?;

    let encoded = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &encrypted);
    Ok(format!("{}{}", AGE_PREFIX, encoded))
}

/// Decrypt a blob produced by [`encrypt`].
///
/// A wrong passphrase and a damaged blob are indistinguishable to the caller.
pub fn decrypt(blob: &str, passphrase: &str) -> Result<String, EncryptionError> {
    let encoded = blob
        .strip_prefix(AGE_PREFIX)
        .ok_or(EncryptionError::InvalidPassphraseOrCorruptData)?;

    let encrypted = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded)
        .map_err(|_| EncryptionError::InvalidPassphraseOrCorruptData)?;

    let decryptor = match age::Decryptor::new(&encrypted[..]) {
        Ok(age::Decryptor::Passphrase(d)) => d,
        _ => return Err(EncryptionError::InvalidPassphraseOrCorruptData),
    };

    let mut reader = decryptor
        .decrypt(&age::secrecy::SecretString::from(passphrase.to_string()), None)
        .map_err(|_| EncryptionError::InvalidPassphraseOrCorruptData)?;

    let mut decrypted = vec![];
    reader
        .read_to_end(&mut decrypted)
        .map_err(|_| EncryptionError::InvalidPassphraseOrCorruptData)?;

    String::from_utf8(decrypted).map_err(|_| EncryptionError::InvalidPassphraseOrCorruptData)
}

/// Encryption-related errors
#[derive(Debug, thiserror::Error)]
pub enum EncryptionError {
    #[error("Invalid passphrase or corrupt data")]
    InvalidPassphraseOrCorruptData,

    #[error("Encryption failed: {0}")]
    Encrypt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
