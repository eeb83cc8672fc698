//! The document model.
//!
//! A [`Document`] bundles an opaque ciphertext container with the metadata
//! printed next to it. It is built once, never mutated, and every decoder
//! produces a fresh instance whose checksums were verified on the way in.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::checksum::{self, Checksum, ChecksumAlgorithm};
use crate::error::{PaperCryptError, Result};
use crate::payload::Generation;
use crate::serial::{SerialNumber, DEFAULT_SERIAL_LENGTH};
use crate::VERSION;

/// Opaque ciphertext as returned by the encryption primitive.
///
/// The codec never looks inside; it only stores, encodes and measures it.
#[derive(Clone, PartialEq, Eq)]
pub struct Ciphertext(Vec<u8>);

impl Ciphertext {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Ciphertext {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ciphertext")
            .field("len", &self.0.len())
            .finish()
    }
}

/// A ciphertext bundle with its metadata and checksums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    serial: SerialNumber,
    purpose: String,
    comment: String,
    timestamp: DateTime<Utc>,
    ciphertext: Ciphertext,
    checksums: Vec<Checksum>,
    generator_version: String,
}

impl Document {
    /// Rebuild a document from decoded parts whose integrity was already verified.
    ///
    /// The generator version must name a generation this crate can read.
    pub(crate) fn restore(
        serial: SerialNumber,
        purpose: &str,
        comment: &str,
        timestamp: DateTime<Utc>,
        ciphertext: Ciphertext,
        generator_version: &str,
    ) -> Result<Self> {
        let generator_version = generator_version_text(generator_version)?;
        Generation::for_generator(&generator_version)?;
        let checksums = checksum::compute(ciphertext.as_bytes());
        Ok(Self {
            serial,
            purpose: metadata_text("Purpose", purpose)?,
            comment: metadata_text("Comment", comment)?,
            timestamp,
            ciphertext,
            checksums,
            generator_version,
        })
    }

    pub fn serial(&self) -> &SerialNumber {
        &self.serial
    }

    /// Purpose line; empty when none was supplied.
    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    /// Comment line; empty when none was supplied.
    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn ciphertext(&self) -> &Ciphertext {
        &self.ciphertext
    }

    /// Byte length of the ciphertext.
    pub fn content_length(&self) -> usize {
        self.ciphertext.len()
    }

    /// Content checksums, in [`checksum::CURRENT_ALGORITHMS`] order.
    pub fn checksums(&self) -> &[Checksum] {
        &self.checksums
    }

    /// The recorded checksum for `algorithm`, if this document carries one.
    pub fn checksum(&self, algorithm: ChecksumAlgorithm) -> Option<&Checksum> {
        self.checksums
            .iter()
            .find(|checksum| checksum.algorithm() == algorithm)
    }

    pub fn generator_version(&self) -> &str {
        &self.generator_version
    }

    /// Consume the document, handing the ciphertext on to the decryption step.
    pub fn into_ciphertext(self) -> Ciphertext {
        self.ciphertext
    }
}

/// Builder for a freshly generated document.
#[derive(Debug, Clone)]
pub struct NewDocument {
    ciphertext: Ciphertext,
    serial: Option<SerialNumber>,
    serial_length: usize,
    purpose: String,
    comment: String,
    timestamp: Option<DateTime<Utc>>,
    generator_version: String,
}

impl NewDocument {
    pub fn new(ciphertext: impl Into<Ciphertext>) -> Self {
        Self {
            ciphertext: ciphertext.into(),
            serial: None,
            serial_length: DEFAULT_SERIAL_LENGTH,
            purpose: String::new(),
            comment: String::new(),
            timestamp: None,
            generator_version: VERSION.to_string(),
        }
    }

    pub fn with_serial(mut self, serial: SerialNumber) -> Self {
        self.serial = Some(serial);
        self
    }

    /// Length of the serial generated when none is set.
    pub fn with_serial_length(mut self, length: usize) -> Self {
        self.serial_length = length;
        self
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = purpose.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_generator_version(mut self, version: impl Into<String>) -> Self {
        self.generator_version = version.into();
        self
    }

    /// Validate metadata, assign a serial and timestamp if missing, and
    /// compute checksums.
    ///
    /// # Errors
    ///
    /// `MalformedField` for multi-line or non-printable metadata or for a
    /// generator version outside the current generation,
    /// `RandomSourceUnavailable` if a serial must be generated and entropy
    /// cannot be read.
    pub fn build(self) -> Result<Document> {
        let purpose = metadata_text("Purpose", &self.purpose)?;
        let comment = metadata_text("Comment", &self.comment)?;
        let generator_version = generator_version_text(&self.generator_version)?;
        if major_version(&generator_version) != Some(Generation::CURRENT.major()) {
            return Err(PaperCryptError::malformed(
                "GeneratorVersion",
                format!(
                    "{:?} does not write generation {}",
                    generator_version,
                    Generation::CURRENT.major()
                ),
            ));
        }
        let serial = match self.serial {
            Some(serial) => serial,
            None => SerialNumber::generate(self.serial_length)?,
        };
        let timestamp = self.timestamp.unwrap_or_else(Utc::now);
        let checksums = checksum::compute(self.ciphertext.as_bytes());

        tracing::debug!(
            serial = %serial,
            content_length = self.ciphertext.len(),
            "document assembled"
        );

        Ok(Document {
            serial,
            purpose,
            comment,
            timestamp,
            ciphertext: self.ciphertext,
            checksums,
            generator_version,
        })
    }
}

/// Render a timestamp in the document format (RFC 3339, UTC, nanoseconds).
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a document timestamp. Any RFC 3339 offset is accepted and normalized to UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| PaperCryptError::malformed("Timestamp", format!("{} ({})", e, value.trim())))
}

fn metadata_text(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if let Some(bad) = value.chars().find(|c| c.is_control()) {
        return Err(PaperCryptError::malformed(
            field,
            format!("must be a single printable line (found {:?})", bad),
        ));
    }
    Ok(value.to_string())
}

fn generator_version_text(value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(PaperCryptError::malformed(
            "GeneratorVersion",
            format!("not a version string: {:?}", value),
        ));
    }
    Ok(value.to_string())
}

/// Major component of a semantic version string (`v2.1.0`, `2`, `2.0.0-rc1`).
pub fn major_version(version: &str) -> Option<u64> {
    let version = version.trim();
    let version = version.strip_prefix('v').unwrap_or(version);
    version.split('.').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_build_assigns_serial_and_checksums() {
        let doc = NewDocument::new(vec![1u8, 2, 3]).build().unwrap();
        assert_eq!(doc.serial().as_str().len(), DEFAULT_SERIAL_LENGTH);
        assert_eq!(doc.content_length(), 3);
        assert_eq!(doc.checksums().len(), 2);
        assert_eq!(doc.generator_version(), VERSION);
    }

    #[test]
    fn test_build_keeps_supplied_fields() {
        let doc = NewDocument::new(vec![9u8; 10])
            .with_serial(SerialNumber::parse("ABC123").unwrap())
            .with_purpose("  backup codes ")
            .with_comment("drawer")
            .with_timestamp(sample_timestamp())
            .build()
            .unwrap();
        assert_eq!(doc.serial().as_str(), "ABC123");
        assert_eq!(doc.purpose(), "backup codes");
        assert_eq!(doc.comment(), "drawer");
        assert_eq!(doc.timestamp(), sample_timestamp());
    }

    #[test]
    fn test_build_rejects_multiline_metadata() {
        let err = NewDocument::new(vec![1u8])
            .with_comment("line one\nline two")
            .build()
            .unwrap_err();
        assert!(matches!(err, PaperCryptError::MalformedField { ref field, .. } if field == "Comment"));
    }

    #[test]
    fn test_build_rejects_foreign_generator_generation() {
        for version in ["1.3.2", "9.0.0", "dev"] {
            let err = NewDocument::new(vec![1u8])
                .with_generator_version(version)
                .build()
                .unwrap_err();
            assert!(
                matches!(err, PaperCryptError::MalformedField { ref field, .. } if field == "GeneratorVersion"),
                "{}: {}",
                version,
                err
            );
        }
        let doc = NewDocument::new(vec![1u8])
            .with_generator_version("2.7.1")
            .build()
            .unwrap();
        assert_eq!(doc.generator_version(), "2.7.1");
    }

    #[test]
    fn test_restore_rejects_unknown_generation() {
        let err = Document::restore(
            SerialNumber::parse("ABC123").unwrap(),
            "",
            "",
            sample_timestamp(),
            Ciphertext::new(vec![1]),
            "9.0.0",
        )
        .unwrap_err();
        assert!(matches!(err, PaperCryptError::UnrecognizedFormat(_)));
    }

    #[test]
    fn test_timestamp_format_round_trips_nanoseconds() {
        let timestamp = Utc
            .with_ymd_and_hms(2023, 6, 1, 12, 30, 45)
            .unwrap()
            .checked_add_signed(chrono::Duration::nanoseconds(123_456_789))
            .unwrap();
        let rendered = format_timestamp(&timestamp);
        assert_eq!(rendered, "2023-06-01T12:30:45.123456789Z");
        assert_eq!(parse_timestamp(&rendered).unwrap(), timestamp);
    }

    #[test]
    fn test_parse_timestamp_normalizes_offset() {
        let parsed = parse_timestamp("2024-01-01T02:00:00+02:00").unwrap();
        assert_eq!(parsed, sample_timestamp());
    }

    #[test]
    fn test_major_version() {
        assert_eq!(major_version("2.0.0"), Some(2));
        assert_eq!(major_version("v1.4.2"), Some(1));
        assert_eq!(major_version("1"), Some(1));
        assert_eq!(major_version("dev"), None);
        assert_eq!(major_version(""), None);
    }

    #[test]
    fn test_ciphertext_debug_hides_bytes() {
        let debug = format!("{:?}", Ciphertext::new(vec![0xAB; 4]));
        assert!(debug.contains("len: 4"));
        assert!(!debug.contains("171"));
    }
}
