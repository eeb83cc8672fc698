//! CLI error types for structured error handling.
//!
//! Core errors carry their own classification; this module maps them, and the
//! CLI's own failures, to exit codes.

use std::fmt;

use papercrypt_core::PaperCryptError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Input file not found
    NotFound { message: String, hint: String },

    /// Authentication failed (wrong passphrase)
    AuthFailed { message: String, hint: String },

    /// Invalid user input
    InvalidInput(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } | CliError::AuthFailed { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
        }
    }
}

/// Exit code for a core error.
pub fn core_exit_code(err: &PaperCryptError) -> i32 {
    match err {
        PaperCryptError::Integrity(_) => exit_codes::INTEGRITY_FAILED,
        PaperCryptError::UnrecognizedFormat(_) => exit_codes::UNRECOGNIZED_FORMAT,
        PaperCryptError::MalformedField { .. }
        | PaperCryptError::InvalidInput(_)
        | PaperCryptError::AlreadyExists(_) => exit_codes::INVALID_INPUT,
        PaperCryptError::IncorrectPassphrase => exit_codes::AUTH_FAILED,
        PaperCryptError::RandomSourceUnavailable(_)
        | PaperCryptError::Upstream { .. }
        | PaperCryptError::Io { .. } => exit_codes::GENERAL,
    }
}

/// Exit code for any error reaching `main`, found by walking the error chain.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| {
            if let Some(cli) = cause.downcast_ref::<CliError>() {
                Some(cli.exit_code())
            } else {
                cause.downcast_ref::<PaperCryptError>().map(core_exit_code)
            }
        })
        .unwrap_or(exit_codes::GENERAL)
}

/// A follow-up hint for errors where the next step is not obvious.
pub fn hint_for(err: &anyhow::Error) -> Option<&'static str> {
    let core = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<PaperCryptError>())?;
    match core {
        PaperCryptError::Integrity(failure) if failure.is_length_mismatch() => Some(
            "Hint: A body line is missing or incomplete. Compare the line numbers with the paper copy.",
        ),
        PaperCryptError::Integrity(_) => Some(
            "Hint: Re-check the transcription against the paper copy; similar-looking characters are the usual culprit.",
        ),
        PaperCryptError::UnrecognizedFormat(_) => {
            Some("Hint: Pass a PaperCrypt text document, a QR image, or its JSON payload.")
        }
        PaperCryptError::AlreadyExists(_) => Some("Hint: Use --force to overwrite."),
        _ => None,
    }
}
