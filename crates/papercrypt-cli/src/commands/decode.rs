use papercrypt_core::crypto::{AgeSealer, Sealer};
use papercrypt_core::payload::decode_payload;
use papercrypt_core::{text, Document, PaperCryptError};

use crate::cli::{Cli, DecodeArgs};
use crate::constants::env_vars;
use crate::errors::CliError;
use crate::helpers::{looks_like_json, prompt_passphrase, read_input, Destination};

pub fn handle_decode(cli: &Cli, args: &DecodeArgs) -> anyhow::Result<()> {
    let destination = Destination::from_arg(args.output.as_deref(), args.force);
    if !args.verify_only {
        destination.check_writable()?;
    }

    let raw = read_input(args.input.as_deref())?;
    let document = read_document(raw)?;
    if !cli.quiet {
        eprintln!(
            "Verified document {} ({} bytes, generator {})",
            document.serial(),
            document.content_length(),
            document.generator_version()
        );
    }
    if args.verify_only {
        return Ok(());
    }

    let passphrase = prompt_passphrase()?;
    let plaintext = AgeSealer
        .open(document.ciphertext(), &passphrase)
        .map_err(|e| match e {
            PaperCryptError::IncorrectPassphrase => CliError::auth_failed_with_hint(
                "Incorrect passphrase",
                format!(
                    "Hint: Check your passphrase, or unset {} to be prompted.",
                    env_vars::PASSPHRASE
                ),
            )
            .into(),
            other => anyhow::Error::from(other),
        })?;

    destination.write(&plaintext)?;
    Ok(())
}

/// Decode a JSON payload or a text document, whichever the input is.
fn read_document(raw: Vec<u8>) -> anyhow::Result<Document> {
    if looks_like_json(&raw) {
        tracing::debug!("input looks like a JSON payload");
        return Ok(decode_payload(&raw)?);
    }
    let sheet = String::from_utf8(raw).map_err(|_| {
        PaperCryptError::UnrecognizedFormat("input is neither a text document nor JSON".into())
    })?;
    Ok(text::decode(&sheet)?)
}
