//! Generation 1 payload record (read only).
//!
//! Generation 1 wrapped the ciphertext in a message object, so the base64
//! sits at `Data.Data`. Its only mandatory checksum was an OpenPGP CRC-24;
//! later releases of that generation added optional CRC-32 and SHA-256 fields,
//! the latter as an array of 32 integers.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::checksum::Checksum;
use crate::document::{Ciphertext, Document};
use crate::error::Result;
use crate::serial::SerialNumber;

/// Generator version recorded when a generation 1 record declares none.
const UNDECLARED_VERSION: &str = "1";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PayloadV1 {
    #[serde(default)]
    version: Option<String>,
    data: MessageV1,
    serial_number: String,
    #[serde(default)]
    purpose: String,
    #[serde(default)]
    comment: String,
    created_at: DateTime<Utc>,
    #[serde(rename = "DataCRC24")]
    data_crc24: u32,
    #[serde(rename = "DataCRC32", default)]
    data_crc32: Option<u32>,
    #[serde(rename = "DataSHA256", default)]
    data_sha256: Option<[u8; 32]>,
}

#[derive(Debug, Deserialize)]
struct MessageV1 {
    #[serde(rename = "Data", with = "super::base64_data")]
    data: Vec<u8>,
}

impl PayloadV1 {
    /// Verify every checksum the record carries and upgrade it to the current
    /// document model.
    pub(crate) fn upgrade(self) -> Result<Document> {
        let bytes = self.data.data;

        Checksum::Crc24(self.data_crc24).ensure(&bytes)?;
        if let Some(crc) = self.data_crc32 {
            Checksum::Crc32(crc).ensure(&bytes)?;
        }
        if let Some(digest) = self.data_sha256 {
            Checksum::Sha256(digest).ensure(&bytes)?;
        }

        let version = super::declared_release(self.version)
            .unwrap_or_else(|| UNDECLARED_VERSION.to_string());

        tracing::debug!(
            content_length = bytes.len(),
            version = %version,
            "upgrading generation 1 payload"
        );

        Document::restore(
            SerialNumber::parse(&self.serial_number)?,
            &self.purpose,
            &self.comment,
            self.created_at,
            Ciphertext::new(bytes),
            &version,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::{crc24, ChecksumAlgorithm, CURRENT_ALGORITHMS};
    use crate::error::IntegrityFailure;
    use serde_json::json;

    fn record(crc24_value: u32) -> serde_json::Value {
        json!({
            "Data": { "Data": "AQID" },
            "SerialNumber": "ABC123",
            "Purpose": "test",
            "Comment": "",
            "CreatedAt": "2023-03-04T10:00:00Z",
            "DataCRC24": crc24_value,
        })
    }

    #[test]
    fn test_upgrade_carries_current_checksums() {
        let payload: PayloadV1 = serde_json::from_value(record(crc24(&[1, 2, 3]))).unwrap();
        let doc = payload.upgrade().unwrap();
        assert_eq!(doc.ciphertext().as_bytes(), &[1, 2, 3]);
        assert_eq!(doc.generator_version(), UNDECLARED_VERSION);
        let algorithms: Vec<_> = doc.checksums().iter().map(Checksum::algorithm).collect();
        assert_eq!(algorithms, CURRENT_ALGORITHMS.to_vec());
    }

    #[test]
    fn test_crc24_mismatch_is_integrity_failure() {
        let payload: PayloadV1 =
            serde_json::from_value(record(crc24(&[1, 2, 3]) ^ 1)).unwrap();
        let err = payload.upgrade().unwrap_err();
        assert!(matches!(
            err.integrity(),
            Some(IntegrityFailure::Checksum {
                algorithm: ChecksumAlgorithm::Crc24,
                ..
            })
        ));
    }

    #[test]
    fn test_optional_sha256_array_is_verified() {
        let mut value = record(crc24(&[1, 2, 3]));
        value["DataSHA256"] = json!([0u8; 32].to_vec());
        let payload: PayloadV1 = serde_json::from_value(value).unwrap();
        assert!(payload.upgrade().is_err());
    }

    #[test]
    fn test_unparsable_version_keeps_generation() {
        let mut value = record(crc24(&[1, 2, 3]));
        value["Version"] = json!("dev");
        let payload: PayloadV1 = serde_json::from_value(value).unwrap();
        assert_eq!(payload.upgrade().unwrap().generator_version(), UNDECLARED_VERSION);
    }

    #[test]
    fn test_missing_crc24_is_rejected() {
        let mut value = record(0);
        value.as_object_mut().unwrap().remove("DataCRC24");
        assert!(serde_json::from_value::<PayloadV1>(value).is_err());
    }
}
