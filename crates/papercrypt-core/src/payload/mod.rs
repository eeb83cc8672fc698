//! Structured JSON payloads, as embedded in QR codes.
//!
//! The current generation writes a flat record whose `Data` field holds the
//! base64 ciphertext. Generation 1 nested it one level deeper (`Data.Data`)
//! and is read only; [`decode_payload`] upgrades it to the current
//! [`Document`] straight after parsing.

mod sniff;
mod v1;
mod v2;

pub use sniff::{decode_payload, sniff, Generation};

use crate::document::{major_version, Document};
use crate::error::{PaperCryptError, Result};

/// Serialize a document as a current-generation JSON payload.
pub fn encode(document: &Document) -> Result<String> {
    serde_json::to_string(&v2::PayloadV2::from(document))
        .map_err(|e| PaperCryptError::upstream("Failed to serialize payload", e))
}

/// A declared version that can stand as the document's generator version.
///
/// Records classified by shape may carry a `Version` with no major number;
/// those fall back to the generation's own default.
fn declared_release(version: Option<String>) -> Option<String> {
    version.filter(|version| major_version(version).is_some())
}

/// Standard padded base64 for byte fields.
mod base64_data {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.trim())
            .map_err(serde::de::Error::custom)
    }
}
