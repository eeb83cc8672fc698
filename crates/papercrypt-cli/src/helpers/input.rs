//! Input handling helpers for passphrases and input files.

use std::io::{self, IsTerminal, Read};
use std::path::Path;

use dialoguer::Password;
use zeroize::Zeroizing;

use papercrypt_core::crypto::validate_passphrase;

use crate::constants::env_vars;
use crate::errors::CliError;

fn passphrase_from_env() -> Option<Zeroizing<String>> {
    let value = Zeroizing::new(std::env::var(env_vars::PASSPHRASE).ok()?);
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Prompt for the passphrase of an existing document, or read it from
/// `PAPERCRYPT_PASSPHRASE`.
pub fn prompt_passphrase() -> anyhow::Result<Zeroizing<String>> {
    if let Some(value) = passphrase_from_env() {
        return Ok(value);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::invalid_input(format!(
            "No passphrase provided and no TTY available. Set {}.",
            env_vars::PASSPHRASE
        ))
        .into());
    }
    Password::new()
        .with_prompt("Passphrase")
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

/// Prompt for a new passphrase with confirmation, or read it from
/// `PAPERCRYPT_PASSPHRASE`. Either way it must pass validation.
pub fn prompt_new_passphrase() -> anyhow::Result<Zeroizing<String>> {
    if let Some(value) = passphrase_from_env() {
        validate_passphrase(&value).map_err(|e| {
            CliError::invalid_input(format!("Passphrase does not meet requirements: {}", e))
        })?;
        return Ok(value);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::invalid_input(format!(
            "No passphrase provided and no TTY available. Set {}.",
            env_vars::PASSPHRASE
        ))
        .into());
    }
    loop {
        let passphrase = Password::new()
            .with_prompt("Enter passphrase")
            .with_confirmation("Confirm passphrase", "Passphrases do not match")
            .interact()
            .map(Zeroizing::new)
            .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))?;
        if let Err(err) = validate_passphrase(&passphrase) {
            eprintln!("Passphrase does not meet requirements: {}", err);
            continue;
        }
        return Ok(passphrase);
    }
}

/// Read all input from a file, or from stdin when `path` is `None` or `-`.
pub fn read_input(path: Option<&str>) -> anyhow::Result<Vec<u8>> {
    match path {
        None | Some("-") => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
            tracing::debug!(bytes = buffer.len(), "read stdin");
            Ok(buffer)
        }
        Some(path) => {
            let path = Path::new(path);
            if !path.exists() {
                return Err(CliError::not_found(
                    format!("Input file not found: {}", path.display()),
                    "Hint: Check the path, or pass \"-\" to read from stdin.",
                )
                .into());
            }
            let bytes = std::fs::read(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
            tracing::debug!(path = %path.display(), bytes = bytes.len(), "read input file");
            Ok(bytes)
        }
    }
}
