//! Generation 2 payload record (current).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checksum::{Checksum, ChecksumAlgorithm};
use crate::document::{Ciphertext, Document};
use crate::error::{IntegrityFailure, PaperCryptError, Result};
use crate::serial::SerialNumber;
use crate::VERSION;

/// Generator version recorded for flat payloads that do not declare one.
const UNDECLARED_VERSION: &str = "2";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PayloadV2 {
    /// Release of the writer; its major is the record's generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    /// Release that produced the document, when it differs from the writer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    generator_version: Option<String>,
    serial_number: String,
    #[serde(default)]
    purpose: String,
    #[serde(default)]
    comment: String,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_length: Option<usize>,
    #[serde(rename = "DataCRC32")]
    data_crc32: u32,
    #[serde(rename = "DataSHA256")]
    data_sha256: String,
    #[serde(with = "super::base64_data")]
    data: Vec<u8>,
}

impl From<&Document> for PayloadV2 {
    fn from(document: &Document) -> Self {
        let bytes = document.ciphertext().as_bytes();
        let data_crc32 = match document.checksum(ChecksumAlgorithm::Crc32) {
            Some(Checksum::Crc32(value)) => *value,
            _ => crate::checksum::crc32(bytes),
        };
        let data_sha256 = document
            .checksum(ChecksumAlgorithm::Sha256)
            .copied()
            .unwrap_or_else(|| ChecksumAlgorithm::Sha256.compute(bytes))
            .to_hex(true);

        let generator_version = document.generator_version();
        Self {
            version: Some(VERSION.to_string()),
            generator_version: (generator_version != VERSION)
                .then(|| generator_version.to_string()),
            serial_number: document.serial().to_string(),
            purpose: document.purpose().to_string(),
            comment: document.comment().to_string(),
            created_at: document.timestamp(),
            content_length: Some(document.content_length()),
            data_crc32,
            data_sha256,
            data: bytes.to_vec(),
        }
    }
}

impl PayloadV2 {
    /// Verify length and both checksums, then build the document.
    pub(crate) fn into_document(self) -> Result<Document> {
        if let Some(expected) = self.content_length {
            if expected != self.data.len() {
                return Err(IntegrityFailure::ContentLength {
                    expected,
                    actual: self.data.len(),
                }
                .into());
            }
        }

        Checksum::Crc32(self.data_crc32).ensure(&self.data)?;
        Checksum::from_hex(ChecksumAlgorithm::Sha256, &self.data_sha256)
            .map_err(|_| {
                PaperCryptError::malformed(
                    "DataSHA256",
                    format!("expected 64 hex digits, found {:?}", self.data_sha256),
                )
            })?
            .ensure(&self.data)?;

        let version = super::declared_release(self.generator_version)
            .or_else(|| super::declared_release(self.version))
            .unwrap_or_else(|| UNDECLARED_VERSION.to_string());

        Document::restore(
            SerialNumber::parse(&self.serial_number)?,
            &self.purpose,
            &self.comment,
            self.created_at,
            Ciphertext::new(self.data),
            &version,
        )
    }
}
