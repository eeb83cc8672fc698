//! Checksum engine.
//!
//! All checksums are pure functions of the raw ciphertext bytes. The set a
//! document generation records is a frozen format constant:
//!
//! - generation 2 records [`ChecksumAlgorithm::Crc32`] and
//!   [`ChecksumAlgorithm::Sha256`] ([`CURRENT_ALGORITHMS`])
//! - generation 1 recorded a single [`ChecksumAlgorithm::Crc24`]
//!
//! CRC-24 is the OpenPGP variant (RFC 4880, section 6.1). It also guards the
//! armored body rendering.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::error::{IntegrityFailure, PaperCryptError, Result};

/// Checksums written by the current document generation, in header order.
pub const CURRENT_ALGORITHMS: [ChecksumAlgorithm; 2] =
    [ChecksumAlgorithm::Crc32, ChecksumAlgorithm::Sha256];

const CRC24_INIT: u32 = 0x00B7_04CE;
const CRC24_POLY: u32 = 0x0186_4CFB;

/// A checksum algorithm known to the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumAlgorithm {
    Crc24,
    Crc32,
    Sha256,
}

impl ChecksumAlgorithm {
    /// Human-readable algorithm name.
    pub const fn name(self) -> &'static str {
        match self {
            ChecksumAlgorithm::Crc24 => "CRC-24",
            ChecksumAlgorithm::Crc32 => "CRC-32",
            ChecksumAlgorithm::Sha256 => "SHA-256",
        }
    }

    /// Label of the text header line carrying this checksum.
    pub const fn header_label(self) -> &'static str {
        match self {
            ChecksumAlgorithm::Crc24 => "Checksum-CRC24",
            ChecksumAlgorithm::Crc32 => "Checksum-CRC32",
            ChecksumAlgorithm::Sha256 => "Checksum-SHA256",
        }
    }

    /// Compute this algorithm over `bytes`.
    pub fn compute(self, bytes: &[u8]) -> Checksum {
        match self {
            ChecksumAlgorithm::Crc24 => Checksum::Crc24(crc24(bytes)),
            ChecksumAlgorithm::Crc32 => Checksum::Crc32(crc32(bytes)),
            ChecksumAlgorithm::Sha256 => Checksum::Sha256(sha256(bytes)),
        }
    }

    /// Number of hex digits in the rendered checksum.
    const fn hex_width(self) -> usize {
        match self {
            ChecksumAlgorithm::Crc24 => 6,
            ChecksumAlgorithm::Crc32 => 8,
            ChecksumAlgorithm::Sha256 => 64,
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A computed checksum value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Checksum {
    Crc24(u32),
    Crc32(u32),
    Sha256([u8; 32]),
}

impl Checksum {
    pub fn algorithm(&self) -> ChecksumAlgorithm {
        match self {
            Checksum::Crc24(_) => ChecksumAlgorithm::Crc24,
            Checksum::Crc32(_) => ChecksumAlgorithm::Crc32,
            Checksum::Sha256(_) => ChecksumAlgorithm::Sha256,
        }
    }

    /// Recompute over `bytes` and compare.
    pub fn verify(&self, bytes: &[u8]) -> bool {
        self.algorithm().compute(bytes) == *self
    }

    /// Like [`Checksum::verify`], but a mismatch becomes an integrity failure
    /// naming the algorithm and both values.
    pub fn ensure(&self, bytes: &[u8]) -> Result<()> {
        let computed = self.algorithm().compute(bytes);
        if computed == *self {
            tracing::debug!(algorithm = %self.algorithm(), "checksum verified");
            return Ok(());
        }
        Err(IntegrityFailure::Checksum {
            algorithm: self.algorithm(),
            expected: self.to_hex(false),
            actual: computed.to_hex(false),
        }
        .into())
    }

    /// Render as fixed-width hex.
    pub fn to_hex(&self, lowercase: bool) -> String {
        let rendered = match self {
            Checksum::Crc24(value) => format!("{:06X}", value),
            Checksum::Crc32(value) => format!("{:08X}", value),
            Checksum::Sha256(digest) => hex::encode_upper(digest),
        };
        if lowercase {
            rendered.to_ascii_lowercase()
        } else {
            rendered
        }
    }

    /// Parse a hex rendering produced by [`Checksum::to_hex`] (either case).
    pub fn from_hex(algorithm: ChecksumAlgorithm, value: &str) -> Result<Self> {
        let value = value.trim();
        let malformed =
            |reason: String| PaperCryptError::malformed(algorithm.header_label(), reason);

        if value.len() != algorithm.hex_width() {
            return Err(malformed(format!(
                "expected {} hex digits, found {}",
                algorithm.hex_width(),
                value.len()
            )));
        }
        if !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(malformed(format!("not a hex value: {}", value)));
        }

        match algorithm {
            ChecksumAlgorithm::Crc24 | ChecksumAlgorithm::Crc32 => {
                let parsed = u32::from_str_radix(value, 16)
                    .map_err(|e| malformed(e.to_string()))?;
                Ok(if algorithm == ChecksumAlgorithm::Crc24 {
                    Checksum::Crc24(parsed)
                } else {
                    Checksum::Crc32(parsed)
                })
            }
            ChecksumAlgorithm::Sha256 => {
                let mut digest = [0u8; 32];
                hex::decode_to_slice(value, &mut digest).map_err(|e| malformed(e.to_string()))?;
                Ok(Checksum::Sha256(digest))
            }
        }
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.algorithm(), self.to_hex(false))
    }
}

/// Compute the current generation's checksum set over `bytes`.
pub fn compute(bytes: &[u8]) -> Vec<Checksum> {
    CURRENT_ALGORITHMS
        .iter()
        .map(|algorithm| algorithm.compute(bytes))
        .collect()
}

/// OpenPGP CRC-24.
pub fn crc24(bytes: &[u8]) -> u32 {
    let mut crc = CRC24_INIT;
    for &byte in bytes {
        crc ^= u32::from(byte) << 16;
        for _ in 0..8 {
            crc <<= 1;
            if crc & 0x0100_0000 != 0 {
                crc ^= CRC24_POLY;
            }
        }
    }
    crc & 0x00FF_FFFF
}

/// IEEE CRC-32.
pub fn crc32(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}

/// SHA-256 digest.
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}
