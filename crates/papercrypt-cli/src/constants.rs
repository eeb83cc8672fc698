//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// General failure.
    pub const GENERAL: i32 = 1;

    /// Input file not found.
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong passphrase).
    pub const AUTH_FAILED: i32 = 5;

    /// Integrity check failed.
    pub const INTEGRITY_FAILED: i32 = 6;

    /// Input is not a document of any known generation.
    pub const UNRECOGNIZED_FORMAT: i32 = 7;
}

/// Environment variables read by the CLI.
pub mod env_vars {
    /// Passphrase for non-interactive use.
    pub const PASSPHRASE: &str = "PAPERCRYPT_PASSPHRASE";

    /// Log filter directives (same syntax as `RUST_LOG`).
    pub const LOG: &str = "PAPERCRYPT_LOG";
}
