//! Body rendering: numbered hex lines or a radix-64 armor block.
//!
//! Decoding checks the transcribed character count against the recorded
//! content length before anything else, so a truncated sheet is reported as
//! a length mismatch rather than as a checksum failure.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::checksum::{crc24, Checksum};
use crate::error::{IntegrityFailure, PaperCryptError, Result};

/// Bytes per hex body line.
pub const HEX_BYTES_PER_LINE: usize = 32;
/// Hex digits per visual group within a line.
pub const HEX_GROUP_DIGITS: usize = 8;
/// Columns per armor line.
pub const ARMOR_COLUMNS: usize = 64;

pub const ARMOR_BEGIN: &str = "-----BEGIN PAPERCRYPT MESSAGE-----";
pub const ARMOR_END: &str = "-----END PAPERCRYPT MESSAGE-----";

/// Alphabet used to render the ciphertext body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyEncoding {
    /// Base16, numbered lines of grouped digits.
    #[default]
    Hex,
    /// Standard base64 between armor markers, with a CRC-24 line.
    Armor,
}

pub(crate) fn render(bytes: &[u8], encoding: BodyEncoding, lowercase: bool) -> Vec<String> {
    match encoding {
        BodyEncoding::Hex => render_hex(bytes, lowercase),
        BodyEncoding::Armor => render_armor(bytes),
    }
}

fn render_hex(bytes: &[u8], lowercase: bool) -> Vec<String> {
    let line_count = bytes.len().div_ceil(HEX_BYTES_PER_LINE);
    let width = line_count.to_string().len().max(3);

    bytes
        .chunks(HEX_BYTES_PER_LINE)
        .enumerate()
        .map(|(index, chunk)| {
            let digits = if lowercase {
                hex::encode(chunk)
            } else {
                hex::encode_upper(chunk)
            };
            let mut line = format!("{:0width$}: ", index + 1, width = width);
            for (position, digit) in digits.chars().enumerate() {
                if position > 0 && position % HEX_GROUP_DIGITS == 0 {
                    line.push(' ');
                }
                line.push(digit);
            }
            line
        })
        .collect()
}

fn render_armor(bytes: &[u8]) -> Vec<String> {
    let encoded = STANDARD.encode(bytes);
    let mut lines = vec![ARMOR_BEGIN.to_string()];
    let chars: Vec<char> = encoded.chars().collect();
    lines.extend(
        chars
            .chunks(ARMOR_COLUMNS)
            .map(|chunk| chunk.iter().collect::<String>()),
    );
    lines.push(armor_checksum_line(bytes));
    lines.push(ARMOR_END.to_string());
    lines
}

fn armor_checksum_line(bytes: &[u8]) -> String {
    let crc = crc24(bytes).to_be_bytes();
    format!("={}", STANDARD.encode(&crc[1..]))
}

/// Body characters collected from a transcribed sheet.
#[derive(Debug)]
pub(crate) struct BodyText {
    encoding: BodyEncoding,
    /// Each significant character with the body line it came from (1-based).
    chars: Vec<(usize, char)>,
    lines: usize,
    armor_checksum: Option<String>,
}

impl BodyText {
    pub(crate) fn new(encoding: BodyEncoding) -> Self {
        Self {
            encoding,
            chars: Vec::new(),
            lines: 0,
            armor_checksum: None,
        }
    }

    pub(crate) fn encoding(&self) -> BodyEncoding {
        self.encoding
    }

    /// Append one body line; whitespace inside the line is dropped.
    pub(crate) fn push_line(&mut self, content: &str) {
        self.lines += 1;
        let line = self.lines;
        self.chars.extend(
            content
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| (line, c)),
        );
    }

    pub(crate) fn set_armor_checksum(&mut self, line: &str) {
        self.armor_checksum = Some(line.to_string());
    }

    /// `None` when the recorded length cannot be rendered at all.
    fn expected_chars(&self, content_length: usize) -> Option<usize> {
        match self.encoding {
            BodyEncoding::Hex => content_length.checked_mul(2),
            BodyEncoding::Armor => content_length.div_ceil(3).checked_mul(4),
        }
    }

    /// Decode the body, checking length, alphabet and (for armor) CRC-24.
    pub(crate) fn decode(&self, content_length: usize) -> Result<Vec<u8>> {
        let expected_chars = self.expected_chars(content_length).ok_or_else(|| {
            PaperCryptError::malformed(
                "ContentLength",
                format!("{} bytes cannot fit on a sheet", content_length),
            )
        })?;
        if self.chars.len() != expected_chars {
            return Err(IntegrityFailure::BodyLength {
                expected_bytes: content_length,
                expected_chars,
                actual_chars: self.chars.len(),
            }
            .into());
        }

        let valid = match self.encoding {
            BodyEncoding::Hex => is_hex_char as fn(char) -> bool,
            BodyEncoding::Armor => is_armor_char,
        };
        if let Some(&(line, character)) = self.chars.iter().find(|(_, c)| !valid(*c)) {
            return Err(IntegrityFailure::BodyCharacter { line, character }.into());
        }

        let text: String = self.chars.iter().map(|(_, c)| *c).collect();
        let bytes = match self.encoding {
            BodyEncoding::Hex => hex::decode(&text).map_err(|e| {
                PaperCryptError::malformed("Body", format!("hex decoding failed: {}", e))
            })?,
            BodyEncoding::Armor => STANDARD
                .decode(&text)
                .map_err(|e| self.base64_failure(e))?,
        };

        if bytes.len() != content_length {
            return Err(IntegrityFailure::ContentLength {
                expected: content_length,
                actual: bytes.len(),
            }
            .into());
        }

        if let Some(line) = &self.armor_checksum {
            parse_armor_checksum(line)?.ensure(&bytes)?;
        }

        Ok(bytes)
    }

    fn base64_failure(&self, err: base64::DecodeError) -> PaperCryptError {
        let offset = match err {
            base64::DecodeError::InvalidByte(offset, _)
            | base64::DecodeError::InvalidLastSymbol(offset, _) => offset,
            base64::DecodeError::InvalidLength(_) | base64::DecodeError::InvalidPadding => {
                self.chars.len().saturating_sub(1)
            }
        };
        match self.chars.get(offset) {
            Some(&(line, character)) => IntegrityFailure::BodyCharacter { line, character }.into(),
            None => PaperCryptError::malformed("Body", err.to_string()),
        }
    }
}

fn is_hex_char(c: char) -> bool {
    c.is_ascii_hexdigit()
}

fn is_armor_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')
}

/// Whether an armor line is the `=XXXX` CRC-24 line (as opposed to padding).
pub(crate) fn is_armor_checksum_line(line: &str) -> bool {
    line.len() == 5 && line.starts_with('=') && !line[1..].contains('=')
}

fn parse_armor_checksum(line: &str) -> Result<Checksum> {
    let malformed = |reason: String| PaperCryptError::malformed("ArmorChecksum", reason);
    let encoded = line
        .strip_prefix('=')
        .ok_or_else(|| malformed(format!("expected '=' prefix: {}", line)))?;
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| malformed(e.to_string()))?;
    if bytes.len() != 3 {
        return Err(malformed(format!("expected 3 bytes, found {}", bytes.len())));
    }
    let value = u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]);
    Ok(Checksum::Crc24(value))
}
