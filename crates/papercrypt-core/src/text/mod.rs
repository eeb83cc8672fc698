//! Paper text format.
//!
//! A sheet is a block of labeled header lines in a fixed order, a blank line,
//! the body, and optionally a QR rendering of the equivalent JSON payload:
//!
//! ```text
//! # PaperCrypt document. Transcribe every line exactly.
//! SerialNumber: ABC123
//! Purpose: test
//! Comment:
//! Timestamp: 2024-01-01T00:00:00.000000000Z
//! ContentLength: 3
//! GeneratorVersion: 2.0.0
//! Checksum-CRC32: <8 hex digits>
//! Checksum-SHA256: <64 hex digits>
//! HeaderCRC32: <8 hex digits>
//!
//! 001: 010203
//! ```
//!
//! `HeaderCRC32` covers the serial, timestamp, content length, generator
//! version and content checksums; purpose and comment are free annotations.

mod body;
mod decode;

pub use body::{BodyEncoding, ARMOR_BEGIN, ARMOR_COLUMNS, ARMOR_END, HEX_BYTES_PER_LINE};
pub use decode::decode;

use crate::checksum::{crc32, Checksum};
use crate::document::{format_timestamp, Document};
use crate::error::Result;
use crate::{payload, qr};

pub const LABEL_SERIAL: &str = "SerialNumber";
pub const LABEL_PURPOSE: &str = "Purpose";
pub const LABEL_COMMENT: &str = "Comment";
pub const LABEL_TIMESTAMP: &str = "Timestamp";
pub const LABEL_CONTENT_LENGTH: &str = "ContentLength";
pub const LABEL_GENERATOR_VERSION: &str = "GeneratorVersion";
pub const LABEL_HEADER_CRC: &str = "HeaderCRC32";

const PREAMBLE: &str = "# PaperCrypt document. Transcribe every line exactly.";
const BODY_HINT_HEX: &str =
    "# Body digits are case-insensitive; line numbers and spaces are optional.";
const QR_HEADING: &str = "# QR payload";

/// Rendering options for [`encode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TextOptions {
    pub encoding: BodyEncoding,
    /// Render hex digits (body and checksums) in lower case.
    pub lowercase: bool,
    /// Append a QR rendering of the JSON payload after the body.
    pub embed_qr: bool,
}

/// Render a document as a paper sheet.
///
/// # Errors
///
/// Fails only when `embed_qr` is set and the payload does not fit a QR symbol.
pub fn encode(document: &Document, options: &TextOptions) -> Result<String> {
    let timestamp = format_timestamp(&document.timestamp());
    let header_crc = header_checksum(
        document.serial().as_str(),
        &timestamp,
        document.content_length(),
        document.generator_version(),
        document.checksums(),
    );

    let mut lines = vec![PREAMBLE.to_string()];
    if options.encoding == BodyEncoding::Hex {
        lines.push(BODY_HINT_HEX.to_string());
    }
    lines.push(header_line(LABEL_SERIAL, document.serial().as_str()));
    lines.push(header_line(LABEL_PURPOSE, document.purpose()));
    lines.push(header_line(LABEL_COMMENT, document.comment()));
    lines.push(header_line(LABEL_TIMESTAMP, &timestamp));
    lines.push(header_line(
        LABEL_CONTENT_LENGTH,
        &document.content_length().to_string(),
    ));
    lines.push(header_line(
        LABEL_GENERATOR_VERSION,
        document.generator_version(),
    ));
    for checksum in document.checksums() {
        lines.push(header_line(
            checksum.algorithm().header_label(),
            &checksum.to_hex(options.lowercase),
        ));
    }
    lines.push(header_line(
        LABEL_HEADER_CRC,
        &Checksum::Crc32(header_crc).to_hex(options.lowercase),
    ));
    lines.push(String::new());
    lines.extend(body::render(
        document.ciphertext().as_bytes(),
        options.encoding,
        options.lowercase,
    ));

    if options.embed_qr {
        let json = payload::encode(document)?;
        lines.push(String::new());
        lines.push(QR_HEADING.to_string());
        lines.extend(qr::render_unicode(json.as_bytes())?.lines().map(str::to_string));
    }

    let mut text = lines.join("\n");
    text.push('\n');
    Ok(text)
}

fn header_line(label: &str, value: &str) -> String {
    if value.is_empty() {
        format!("{}:", label)
    } else {
        format!("{}: {}", label, value)
    }
}

/// CRC-32 over the canonical header string.
pub(crate) fn header_checksum(
    serial: &str,
    timestamp: &str,
    content_length: usize,
    generator_version: &str,
    checksums: &[Checksum],
) -> u32 {
    let mut canonical = format!(
        "{}\n{}\n{}\n{}\n",
        serial, timestamp, content_length, generator_version
    );
    for checksum in checksums {
        canonical.push_str(&checksum.to_hex(false));
        canonical.push('\n');
    }
    crc32(canonical.as_bytes())
}
