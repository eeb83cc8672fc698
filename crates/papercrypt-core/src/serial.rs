//! Serial numbers.
//!
//! Serials are drawn from a 32-symbol alphabet that leaves out characters
//! commonly confused when copied by hand (`0`/`O`, `I`, `Z`) and has no lower
//! case. With exactly 32 symbols, masking a random byte to 5 bits samples the
//! alphabet uniformly.
//!
//! Generation 1 accepted free-form serials, so a serial read back from a
//! document only has to be printable ASCII without whitespace. Serials typed
//! for a new document must use the alphabet.

use std::fmt;

use crate::error::{PaperCryptError, Result};

/// The serial alphabet. Frozen: serials participate in the header checksum.
pub const SERIAL_ALPHABET: &[u8; 32] = b"123456789ABCDEFGHJKLMNPQRSTUVWXY";

/// Length of generated serials when none is configured.
pub const DEFAULT_SERIAL_LENGTH: usize = 6;

/// Longest serial accepted from input.
pub const MAX_SERIAL_LENGTH: usize = 64;

/// A validated document serial number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SerialNumber(String);

impl SerialNumber {
    /// Generate a random serial of `length` symbols from the OS entropy source.
    ///
    /// # Errors
    ///
    /// Returns `RandomSourceUnavailable` if the entropy source cannot be read,
    /// and `InvalidInput` for a zero or oversized length.
    pub fn generate(length: usize) -> Result<Self> {
        if length == 0 || length > MAX_SERIAL_LENGTH {
            return Err(PaperCryptError::InvalidInput(format!(
                "Serial length must be between 1 and {} (got {})",
                MAX_SERIAL_LENGTH, length
            )));
        }

        let mut bytes = vec![0u8; length];
        getrandom::getrandom(&mut bytes)
            .map_err(|e| PaperCryptError::RandomSourceUnavailable(e.to_string()))?;

        let serial = bytes
            .iter()
            .map(|byte| SERIAL_ALPHABET[usize::from(byte & 0x1F)] as char)
            .collect();
        Ok(Self(serial))
    }

    /// Validate a serial read from a document.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(PaperCryptError::malformed("SerialNumber", "empty"));
        }
        if value.len() > MAX_SERIAL_LENGTH {
            return Err(PaperCryptError::malformed(
                "SerialNumber",
                format!("longer than {} characters", MAX_SERIAL_LENGTH),
            ));
        }
        if let Some(bad) = value.chars().find(|c| !c.is_ascii_graphic()) {
            return Err(PaperCryptError::malformed(
                "SerialNumber",
                format!("character {:?} is not printable ASCII", bad),
            ));
        }
        Ok(Self(value.to_string()))
    }

    /// Validate a serial typed by a user for a new document; lower case is
    /// folded to upper case and every symbol must be in the serial alphabet.
    pub fn from_user_input(value: &str) -> Result<Self> {
        let serial = Self::parse(&value.to_ascii_uppercase())?;
        if let Some(bad) = serial.0.chars().find(|c| !is_serial_char(*c)) {
            return Err(PaperCryptError::InvalidInput(format!(
                "Serial number character {:?} is not in the serial alphabet ({})",
                bad,
                String::from_utf8_lossy(SERIAL_ALPHABET)
            )));
        }
        Ok(serial)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_serial_char(c: char) -> bool {
    c.is_ascii() && SERIAL_ALPHABET.contains(&(c as u8))
}
