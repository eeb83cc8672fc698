//! Age passphrase encryption.
//!
//! Age derives the file key from the passphrase with scrypt. The resulting
//! container is stored in a [`Document`](crate::Document) as opaque bytes.

use std::io::{Read, Write};
use std::iter;

use age::secrecy::SecretString;
use zeroize::Zeroizing;

use crate::document::Ciphertext;
use crate::error::{PaperCryptError, Result};

/// Encryption primitive used by the `generate` and `decode` flows.
pub trait Sealer {
    /// Encrypt `plaintext` under `passphrase`.
    fn seal(&self, plaintext: &[u8], passphrase: &str) -> Result<Ciphertext>;

    /// Decrypt a container produced by [`Sealer::seal`].
    ///
    /// # Errors
    ///
    /// `IncorrectPassphrase` if the passphrase does not open the container.
    fn open(&self, ciphertext: &Ciphertext, passphrase: &str) -> Result<Zeroizing<Vec<u8>>>;
}

/// [`Sealer`] over age's passphrase mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct AgeSealer;

impl Sealer for AgeSealer {
    fn seal(&self, plaintext: &[u8], passphrase: &str) -> Result<Ciphertext> {
        encrypt(plaintext, passphrase)
    }

    fn open(&self, ciphertext: &Ciphertext, passphrase: &str) -> Result<Zeroizing<Vec<u8>>> {
        decrypt(ciphertext, passphrase)
    }
}

/// Encrypt data using age passphrase-based encryption.
///
/// # Examples
///
/// ```
/// use papercrypt_core::crypto::encrypt;
///
/// let ciphertext = encrypt(b"secret data", "my-secure-passphrase").unwrap();
/// assert_ne!(ciphertext.as_bytes(), b"secret data");
/// ```
pub fn encrypt(data: &[u8], passphrase: &str) -> Result<Ciphertext> {
    let encryptor =
        age::Encryptor::with_user_passphrase(SecretString::from(passphrase.to_string()));

    let mut encrypted = Vec::new();
    let mut writer = encryptor
        .wrap_output(&mut encrypted)
        .map_err(|e| PaperCryptError::upstream("Failed to create encryptor", e))?;

    writer
        .write_all(data)
        .map_err(|e| PaperCryptError::upstream("Encryption write failed", e))?;

    writer
        .finish()
        .map_err(|e| PaperCryptError::upstream("Encryption finish failed", e))?;

    tracing::debug!(
        plaintext_len = data.len(),
        ciphertext_len = encrypted.len(),
        "encrypted"
    );
    Ok(Ciphertext::new(encrypted))
}

/// Decrypt an age container with a passphrase.
///
/// # Errors
///
/// Returns `IncorrectPassphrase` if the passphrase does not match, and
/// `Upstream` if the container is corrupted or not an age file.
pub fn decrypt(ciphertext: &Ciphertext, passphrase: &str) -> Result<Zeroizing<Vec<u8>>> {
    let decryptor = age::Decryptor::new(ciphertext.as_bytes())
        .map_err(|e| PaperCryptError::upstream("Failed to create decryptor", e))?;

    let identity = age::scrypt::Identity::new(SecretString::from(passphrase.to_string()));
    let mut reader = decryptor
        .decrypt(iter::once(&identity as &dyn age::Identity))
        .map_err(|e| match e {
            age::DecryptError::NoMatchingKeys
            | age::DecryptError::DecryptionFailed
            | age::DecryptError::KeyDecryptionFailed => PaperCryptError::IncorrectPassphrase,
            _ => PaperCryptError::upstream("Decryption failed", e),
        })?;

    let mut decrypted = Zeroizing::new(Vec::new());
    reader
        .read_to_end(&mut decrypted)
        .map_err(|e| PaperCryptError::upstream("Failed to read decrypted data", e))?;

    Ok(decrypted)
}
