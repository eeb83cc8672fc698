use anyhow::Context;

use papercrypt_core::payload::decode_payload;
use papercrypt_core::qr::{QrImageDecoder, RqrrDecoder};
use papercrypt_core::text::{self, TextOptions};

use crate::cli::{Cli, QrArgs};
use crate::helpers::{read_input, Destination};

pub fn handle_qr(cli: &Cli, args: &QrArgs) -> anyhow::Result<()> {
    let destination = Destination::from_arg(args.output.as_deref(), args.force);
    destination.check_writable()?;

    let raw = read_input(args.input.as_deref())?;
    let payload = if args.from_json {
        raw
    } else {
        RqrrDecoder
            .decode_image(&raw)
            .context("Failed to read a QR code from the input image")?
            .into_bytes()
    };

    if args.to_json {
        destination.write(&payload)?;
        return Ok(());
    }

    let document = decode_payload(&payload)?;
    let sheet = text::encode(&document, &TextOptions::default())?;
    destination.write(sheet.as_bytes())?;

    if !cli.quiet && !destination.is_stdout() {
        eprintln!(
            "Recovered document {} to {}",
            document.serial(),
            destination.describe()
        );
    }
    Ok(())
}
