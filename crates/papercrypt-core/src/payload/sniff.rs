//! Generation detection.
//!
//! Rules are tried in order and the first one that yields a major version
//! wins. Each rule only reads the parsed JSON value, so a rule that does not
//! match leaves nothing behind for the next one.

use serde_json::{Map, Value};

use crate::document::{major_version, Document};
use crate::error::{PaperCryptError, Result};

use super::v1::PayloadV1;
use super::v2::PayloadV2;

/// A payload format generation with a deserializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    /// Nested `Data.Data`, CRC-24 checksum.
    V1,
    /// Flat `Data`, CRC-32 and SHA-256 checksums.
    V2,
}

impl Generation {
    /// The generation this crate writes.
    pub const CURRENT: Generation = Generation::V2;

    pub fn major(self) -> u64 {
        match self {
            Generation::V1 => 1,
            Generation::V2 => 2,
        }
    }

    /// The generation written by the generator release `version`.
    ///
    /// # Errors
    ///
    /// `UnrecognizedFormat` when the version has no major number or names a
    /// generation without a decoder.
    pub fn for_generator(version: &str) -> Result<Self> {
        let major = major_version(version).ok_or_else(|| {
            PaperCryptError::UnrecognizedFormat(format!(
                "generator version {:?} has no major number",
                version.trim()
            ))
        })?;
        Self::try_from(major)
    }
}

impl TryFrom<u64> for Generation {
    type Error = PaperCryptError;

    fn try_from(major: u64) -> Result<Self> {
        match major {
            1 => Ok(Generation::V1),
            2 => Ok(Generation::V2),
            other => Err(PaperCryptError::UnrecognizedFormat(format!(
                "no decoder for generation {}",
                other
            ))),
        }
    }
}

type Rule = fn(&Map<String, Value>) -> Option<u64>;

const RULES: &[(&str, Rule)] = &[
    ("declared version", declared_version),
    ("flat Data", flat_data),
    ("nested Data.Data", nested_data),
];

fn declared_version(record: &Map<String, Value>) -> Option<u64> {
    match record.get("Version")? {
        Value::String(version) => major_version(version),
        Value::Number(number) => number.as_u64(),
        _ => None,
    }
}

fn flat_data(record: &Map<String, Value>) -> Option<u64> {
    record.get("Data")?.as_str().map(|_| 2)
}

fn nested_data(record: &Map<String, Value>) -> Option<u64> {
    record.get("Data")?.get("Data")?.as_str().map(|_| 1)
}

/// Classify a raw payload without decoding it.
pub fn sniff(raw: &[u8]) -> Result<Generation> {
    let value = parse(raw)?;
    classify(&value)
}

/// Classify a raw payload, decode it with the matching deserializer and
/// upgrade it to the current document model.
///
/// # Errors
///
/// - `UnrecognizedFormat` if the input is not a JSON object or no rule matches
/// - `MalformedField` if the record does not fit its generation's shape
/// - `Integrity` if a length or checksum fails to verify
pub fn decode_payload(raw: &[u8]) -> Result<Document> {
    let value = parse(raw)?;
    let generation = classify(&value)?;
    let malformed = |e: serde_json::Error| {
        PaperCryptError::malformed(
            format!("generation {} payload", generation.major()),
            e.to_string(),
        )
    };

    match generation {
        Generation::V1 => serde_json::from_value::<PayloadV1>(value)
            .map_err(malformed)?
            .upgrade(),
        Generation::V2 => serde_json::from_value::<PayloadV2>(value)
            .map_err(malformed)?
            .into_document(),
    }
}

fn parse(raw: &[u8]) -> Result<Value> {
    let raw = raw.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(raw);
    serde_json::from_slice(raw)
        .map_err(|e| PaperCryptError::UnrecognizedFormat(format!("not a JSON payload: {}", e)))
}

fn classify(value: &Value) -> Result<Generation> {
    let record = value.as_object().ok_or_else(|| {
        PaperCryptError::UnrecognizedFormat("payload is not a JSON object".to_string())
    })?;

    let (rule, major) = RULES
        .iter()
        .find_map(|(name, rule)| rule(record).map(|major| (*name, major)))
        .ok_or_else(|| {
            PaperCryptError::UnrecognizedFormat(
                "no Version field and no Data or Data.Data ciphertext".to_string(),
            )
        })?;

    tracing::debug!(rule, major, "classified payload");
    Generation::try_from(major)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_version_wins() {
        assert_eq!(
            sniff(br#"{"Version":"1.4.0","Data":"AQID"}"#).unwrap(),
            Generation::V1
        );
        assert_eq!(
            sniff(br#"{"Version":"v2.0.1","Data":{"Data":"AQID"}}"#).unwrap(),
            Generation::V2
        );
    }

    #[test]
    fn test_shape_rules() {
        assert_eq!(sniff(br#"{"Data":"AQID"}"#).unwrap(), Generation::V2);
        assert_eq!(sniff(br#"{"Data":{"Data":"AQID"}}"#).unwrap(), Generation::V1);
    }

    #[test]
    fn test_unparsable_version_falls_through() {
        assert_eq!(
            sniff(br#"{"Version":"dev","Data":{"Data":"AQID"}}"#).unwrap(),
            Generation::V1
        );
    }

    #[test]
    fn test_unknown_major_is_unrecognized() {
        for raw in [&br#"{"Version":"3.0.0","Data":"AQID"}"#[..], br#"{"Version":"0.9"}"#] {
            assert!(matches!(
                sniff(raw),
                Err(PaperCryptError::UnrecognizedFormat(_))
            ));
        }
    }

    #[test]
    fn test_generation_for_generator_release() {
        assert_eq!(Generation::for_generator("2.0.0").unwrap(), Generation::V2);
        assert_eq!(Generation::for_generator("1.3.2").unwrap(), Generation::V1);
        for version in ["9.0.0", "0.1", "dev", ""] {
            assert!(
                matches!(
                    Generation::for_generator(version),
                    Err(PaperCryptError::UnrecognizedFormat(_))
                ),
                "{:?}",
                version
            );
        }
    }

    #[test]
    fn test_unrecognized_inputs() {
        for raw in [&b"{}"[..], b"[]", b"not json", br#"{"Data":42}"#, b""] {
            assert!(
                matches!(sniff(raw), Err(PaperCryptError::UnrecognizedFormat(_))),
                "{:?}",
                String::from_utf8_lossy(raw)
            );
        }
    }

    #[test]
    fn test_explicit_version_selects_deserializer() {
        // A flat record that claims generation 1 must be read as generation 1.
        let err = decode_payload(
            br#"{"Version":"1.0.0","Data":"AQID","SerialNumber":"ABC123","CreatedAt":"2024-01-01T00:00:00Z","DataCRC32":0,"DataSHA256":""}"#,
        )
        .unwrap_err();
        assert!(
            matches!(err, PaperCryptError::MalformedField { ref field, .. } if field == "generation 1 payload")
        );
    }
}
