//! Error types for PaperCrypt core operations.
//!
//! Every failure names the check or field that caused it, so that an operator
//! holding a paper copy knows which part of the transcription to re-check.
//! The CLI layer maps these to exit codes and user-facing messages.

use thiserror::Error;

use crate::checksum::ChecksumAlgorithm;

/// Result type alias for PaperCrypt operations.
pub type Result<T> = std::result::Result<T, PaperCryptError>;

/// Core error type for PaperCrypt operations.
#[derive(Debug, Error)]
pub enum PaperCryptError {
    /// Length or checksum verification failed. Never auto-corrected.
    #[error("Integrity check failed: {0}")]
    Integrity(#[from] IntegrityFailure),

    /// Version sniffing exhausted every known document shape
    #[error("Unrecognized document format: {0}")]
    UnrecognizedFormat(String),

    /// A required field is missing or cannot be parsed
    #[error("Malformed field {field}: {reason}")]
    MalformedField { field: String, reason: String },

    /// The operating system entropy source could not be read
    #[error("Random source unavailable: {0}")]
    RandomSourceUnavailable(String),

    /// Incorrect passphrase during decryption
    #[error("Incorrect passphrase")]
    IncorrectPassphrase,

    /// The encryption or QR-decode primitive failed
    #[error("{context}: {message}")]
    Upstream { context: String, message: String },

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Output target already exists and overwriting was not requested
    #[error("File already exists: {0} (use --force to overwrite)")]
    AlreadyExists(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// The specific verification that failed while decoding a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityFailure {
    /// The decoded ciphertext length differs from the recorded `ContentLength`.
    #[error("content length mismatch: expected {expected} bytes, found {actual}")]
    ContentLength { expected: usize, actual: usize },

    /// The transcribed body has the wrong number of characters for the recorded length.
    #[error(
        "body length mismatch: {expected_bytes} bytes need {expected_chars} characters, found {actual_chars}"
    )]
    BodyLength {
        expected_bytes: usize,
        expected_chars: usize,
        actual_chars: usize,
    },

    /// A body line holds a character outside the body alphabet.
    #[error("invalid character {character:?} in body line {line}")]
    BodyCharacter { line: usize, character: char },

    /// A content checksum does not match the recovered ciphertext.
    #[error("{algorithm} mismatch: expected {expected}, computed {actual}")]
    Checksum {
        algorithm: ChecksumAlgorithm,
        expected: String,
        actual: String,
    },

    /// The header checksum does not match the header fields as transcribed.
    #[error("header checksum mismatch: expected {expected}, computed {actual}")]
    Header { expected: String, actual: String },
}

impl IntegrityFailure {
    /// Whether this failure is one of the length cross-checks.
    pub fn is_length_mismatch(&self) -> bool {
        matches!(
            self,
            IntegrityFailure::ContentLength { .. } | IntegrityFailure::BodyLength { .. }
        )
    }
}

impl PaperCryptError {
    pub(crate) fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PaperCryptError::MalformedField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn upstream(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        PaperCryptError::Upstream {
            context: context.into(),
            message: err.to_string(),
        }
    }

    /// The integrity failure carried by this error, if any.
    pub fn integrity(&self) -> Option<&IntegrityFailure> {
        match self {
            PaperCryptError::Integrity(failure) => Some(failure),
            _ => None,
        }
    }
}
