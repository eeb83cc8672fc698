use zeroize::Zeroizing;

use papercrypt_core::crypto::{AgeSealer, Sealer};
use papercrypt_core::text::{self, BodyEncoding, TextOptions};
use papercrypt_core::{Document, NewDocument, PaperCryptError, SerialNumber};

use crate::cli::{Cli, GenerateArgs};
use crate::config::{load_config, GenerateSection};
use crate::errors::CliError;
use crate::helpers::{parse_datetime, prompt_new_passphrase, read_input, Destination};

pub fn handle_generate(cli: &Cli, args: &GenerateArgs) -> anyhow::Result<()> {
    if args.pdf {
        return Err(CliError::invalid_input(
            "PDF output is not supported by this build.\nHint: Generate a text document and print it instead.",
        )
        .into());
    }

    let config = load_config(cli.config.as_deref())?;
    let destination = Destination::from_arg(args.output.as_deref(), args.force);
    destination.check_writable()?;

    // Validate every override before asking for anything.
    let serial = args
        .serial_number
        .as_deref()
        .map(SerialNumber::from_user_input)
        .transpose()?;
    let timestamp = args.date.as_deref().map(parse_datetime).transpose()?;
    let options = text_options(args, &config.generate);

    let plaintext = Zeroizing::new(read_input(args.input.as_deref())?);
    if plaintext.is_empty() {
        return Err(CliError::invalid_input("Input is empty; nothing to encrypt").into());
    }

    let passphrase = prompt_new_passphrase()?;
    let ciphertext = AgeSealer.seal(&plaintext, &passphrase)?;

    let mut builder = NewDocument::new(ciphertext)
        .with_serial_length(config.generate.serial_length)
        .with_purpose(args.purpose.clone().unwrap_or_default())
        .with_comment(args.comment.clone().unwrap_or_default());
    if let Some(serial) = serial {
        builder = builder.with_serial(serial);
    }
    if let Some(timestamp) = timestamp {
        builder = builder.with_timestamp(timestamp);
    }
    let document = builder.build()?;

    let sheet = render_sheet(&document, options)?;
    destination.write(sheet.as_bytes())?;

    if !cli.quiet && !destination.is_stdout() {
        eprintln!(
            "Wrote document {} ({} bytes of ciphertext) to {}",
            document.serial(),
            document.content_length(),
            destination.describe()
        );
    }
    Ok(())
}

/// Flags win over the config file; the config file wins over defaults.
fn text_options(args: &GenerateArgs, config: &GenerateSection) -> TextOptions {
    let armor = args.armor || (config.armor && !args.hex);
    TextOptions {
        encoding: if armor {
            BodyEncoding::Armor
        } else {
            BodyEncoding::Hex
        },
        lowercase: args.lowercase || config.lowercase,
        embed_qr: config.qr && !args.no_qr,
    }
}

/// Render the sheet, leaving out the QR code if the payload does not fit one.
fn render_sheet(document: &Document, options: TextOptions) -> anyhow::Result<String> {
    match text::encode(document, &options) {
        Ok(sheet) => Ok(sheet),
        Err(PaperCryptError::Upstream { message, .. }) if options.embed_qr => {
            tracing::warn!(
                reason = %message,
                "payload does not fit a QR code; rendering without it"
            );
            let options = TextOptions {
                embed_qr: false,
                ..options
            };
            Ok(text::encode(document, &options)?)
        }
        Err(err) => Err(err.into()),
    }
}
