//! Encryption collaborator.
//!
//! The codec treats ciphertext as opaque; this module is the one place that
//! produces and opens it. Passphrases are passed through to age and never
//! stored or logged.

pub mod encryption;
pub mod passphrase;

pub use encryption::{decrypt, encrypt, AgeSealer, Sealer};
pub use passphrase::{validate_passphrase, MIN_PASSPHRASE_LENGTH};
