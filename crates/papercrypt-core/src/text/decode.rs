//! Parsing and verification of paper sheets.

use std::collections::HashMap;

use crate::checksum::{Checksum, ChecksumAlgorithm, CURRENT_ALGORITHMS};
use crate::document::{format_timestamp, parse_timestamp, Ciphertext, Document};
use crate::error::{IntegrityFailure, PaperCryptError, Result};
use crate::payload::Generation;
use crate::serial::SerialNumber;

use super::body::{is_armor_checksum_line, BodyEncoding, BodyText, ARMOR_BEGIN, ARMOR_END};
use super::{
    header_checksum, LABEL_COMMENT, LABEL_CONTENT_LENGTH, LABEL_GENERATOR_VERSION,
    LABEL_HEADER_CRC, LABEL_PURPOSE, LABEL_SERIAL, LABEL_TIMESTAMP,
};

/// Parse a sheet, verify every recorded length and checksum, and return the document.
///
/// # Errors
///
/// - `MalformedField` when a required header is missing, repeated with a
///   different value, or unparsable
/// - `UnrecognizedFormat` when `GeneratorVersion` names no known generation
/// - `Integrity` naming the first failed check, in this order: body
///   length, body characters, decoded length, armor CRC-24, `Checksum-CRC32`,
///   `Checksum-SHA256`, `HeaderCRC32`
pub fn decode(text: &str) -> Result<Document> {
    let sheet = Sheet::parse(text)?;

    let serial = SerialNumber::parse(sheet.required(LABEL_SERIAL)?)?;
    let timestamp = parse_timestamp(sheet.required(LABEL_TIMESTAMP)?)?;
    let content_length: usize = sheet
        .required(LABEL_CONTENT_LENGTH)?
        .parse()
        .map_err(|e| PaperCryptError::malformed(LABEL_CONTENT_LENGTH, format!("{}", e)))?;
    let generator_version = sheet.required(LABEL_GENERATOR_VERSION)?;
    let generation = Generation::for_generator(generator_version)?;
    let recorded = CURRENT_ALGORITHMS
        .iter()
        .map(|algorithm| Checksum::from_hex(*algorithm, sheet.required(algorithm.header_label())?))
        .collect::<Result<Vec<_>>>()?;
    let header_crc = parse_header_crc(sheet.required(LABEL_HEADER_CRC)?)?;

    tracing::debug!(
        serial = %serial,
        content_length,
        generation = generation.major(),
        encoding = ?sheet.body.encoding(),
        "parsed sheet header"
    );

    let bytes = sheet.body.decode(content_length)?;
    for checksum in &recorded {
        checksum.ensure(&bytes)?;
    }

    let computed_header_crc = header_checksum(
        serial.as_str(),
        &format_timestamp(&timestamp),
        content_length,
        generator_version,
        &recorded,
    );
    if computed_header_crc != header_crc {
        return Err(IntegrityFailure::Header {
            expected: format!("{:08X}", header_crc),
            actual: format!("{:08X}", computed_header_crc),
        }
        .into());
    }

    Document::restore(
        serial,
        sheet.optional(LABEL_PURPOSE),
        sheet.optional(LABEL_COMMENT),
        timestamp,
        Ciphertext::new(bytes),
        generator_version,
    )
}

fn parse_header_crc(value: &str) -> Result<u32> {
    match Checksum::from_hex(ChecksumAlgorithm::Crc32, value) {
        Ok(Checksum::Crc32(crc)) => Ok(crc),
        _ => Err(PaperCryptError::malformed(
            LABEL_HEADER_CRC,
            format!("expected 8 hex digits, found {:?}", value.trim()),
        )),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    HexBody,
    ArmorBody,
    Trailer,
}

/// Header fields and body characters split out of a sheet.
struct Sheet {
    /// Lower-cased label -> value.
    fields: HashMap<String, String>,
    body: BodyText,
}

impl Sheet {
    fn parse(text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut fields = HashMap::new();
        let mut body = BodyText::new(BodyEncoding::Hex);
        let mut section = Section::Header;
        // A bare hex line only opens the body right after a blank line.
        let mut after_blank = false;
        // Unrecognized lines inside a hex body, kept until more body follows.
        let mut held: Vec<&str> = Vec::new();

        for raw in text.lines() {
            let line = raw.trim();
            match section {
                Section::Header => {
                    if line.is_empty() {
                        after_blank = true;
                        continue;
                    }
                    if line.starts_with('#') {
                        continue;
                    }
                    if line == ARMOR_BEGIN {
                        body = BodyText::new(BodyEncoding::Armor);
                        section = Section::ArmorBody;
                    } else if let Some(content) = numbered_line(line) {
                        body.push_line(content);
                        section = Section::HexBody;
                    } else if let Some((label, value)) = header_field(line) {
                        insert_field(&mut fields, label, value)?;
                    } else if after_blank && is_bare_hex(line) {
                        body.push_line(line);
                        section = Section::HexBody;
                    } else {
                        tracing::debug!(line, "ignoring unrecognized line before body");
                    }
                    after_blank = false;
                }
                Section::HexBody => {
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some(content) = numbered_line(line) {
                        resume_body(&mut body, &mut held);
                        body.push_line(content);
                    } else if let Some((label, value)) = header_field(line) {
                        insert_field(&mut fields, label, value)?;
                    } else if is_bare_hex(line) {
                        resume_body(&mut body, &mut held);
                        body.push_line(line);
                    } else {
                        held.push(line);
                    }
                }
                Section::ArmorBody => {
                    if line == ARMOR_END || line.starts_with('#') {
                        section = Section::Trailer;
                    } else if line.is_empty() {
                        continue;
                    } else if is_armor_checksum_line(line) {
                        body.set_armor_checksum(line);
                    } else {
                        body.push_line(line);
                    }
                }
                Section::Trailer => {
                    if let Some((label, value)) = header_field(line) {
                        insert_field(&mut fields, label, value)?;
                    }
                }
            }
        }

        if !held.is_empty() {
            tracing::debug!(lines = held.len(), "ignoring unrecognized lines after body");
        }
        Ok(Self { fields, body })
    }

    fn required(&self, label: &str) -> Result<&str> {
        self.fields
            .get(&label.to_ascii_lowercase())
            .map(String::as_str)
            .ok_or_else(|| PaperCryptError::malformed(label, "missing"))
    }

    fn optional(&self, label: &str) -> &str {
        self.fields
            .get(&label.to_ascii_lowercase())
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn insert_field(fields: &mut HashMap<String, String>, label: &str, value: &str) -> Result<()> {
    let key = label.to_ascii_lowercase();
    match fields.get(&key) {
        Some(existing) if existing != value => Err(PaperCryptError::malformed(
            label,
            format!("appears twice ({:?} and {:?})", existing, value),
        )),
        Some(_) => Ok(()),
        None => {
            fields.insert(key, value.to_string());
            Ok(())
        }
    }
}

/// Lines held back inside a hex body turned out to be body after all.
fn resume_body(body: &mut BodyText, held: &mut Vec<&str>) {
    for line in held.drain(..) {
        body.push_line(line);
    }
}

/// `NNN: content` -> content.
fn numbered_line(line: &str) -> Option<&str> {
    let (prefix, content) = line.split_once(':')?;
    let prefix = prefix.trim();
    if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) {
        Some(content)
    } else {
        None
    }
}

/// `Label: value` with a label of letters, digits and dashes that is not a line number.
fn header_field(line: &str) -> Option<(&str, &str)> {
    let (label, value) = line.split_once(':')?;
    let label = label.trim();
    let is_label = !label.is_empty()
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !label.chars().all(|c| c.is_ascii_digit());
    is_label.then_some((label, value.trim()))
}

fn is_bare_hex(line: &str) -> bool {
    line.chars().any(|c| c.is_ascii_hexdigit())
        && line
            .chars()
            .all(|c| c.is_ascii_hexdigit() || c.is_whitespace())
}
