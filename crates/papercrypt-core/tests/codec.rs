use chrono::{TimeZone, Utc};

use papercrypt_core::checksum::{self, ChecksumAlgorithm};
use papercrypt_core::payload::{self, decode_payload, sniff, Generation};
use papercrypt_core::text::{self, BodyEncoding, TextOptions};
use papercrypt_core::{
    Document, IntegrityFailure, NewDocument, PaperCryptError, SerialNumber,
};

const V1_FIXTURE: &str = include_str!("fixtures/v1_payload.json");
const V1_FULL_FIXTURE: &str = include_str!("fixtures/v1_payload_full.json");

fn fixture_ciphertext() -> Vec<u8> {
    let mut bytes: Vec<u8> = (0x40u8..0x40 + 45).collect();
    bytes.extend_from_slice(&[0x00, 0xFF, 0x10]);
    bytes
}

fn scenario_document() -> Document {
    NewDocument::new(vec![0x01u8, 0x02, 0x03])
        .with_serial(SerialNumber::parse("ABC123").expect("valid serial"))
        .with_purpose("test")
        .with_timestamp(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        .build()
        .expect("document should build")
}

fn header_value<'a>(sheet: &'a str, label: &str) -> Option<&'a str> {
    sheet.lines().find_map(|line| {
        line.strip_prefix(label)
            .and_then(|rest| rest.strip_prefix(':'))
            .map(str::trim)
    })
}

#[test]
fn test_three_byte_scenario() {
    let doc = scenario_document();
    let sheet = text::encode(&doc, &TextOptions::default()).expect("encode should succeed");

    assert_eq!(header_value(&sheet, "ContentLength"), Some("3"));
    assert_eq!(header_value(&sheet, "SerialNumber"), Some("ABC123"));
    assert_eq!(header_value(&sheet, "Purpose"), Some("test"));
    assert_eq!(
        header_value(&sheet, "Timestamp"),
        Some("2024-01-01T00:00:00.000000000Z")
    );
    assert_eq!(header_value(&sheet, "Checksum-CRC32"), Some("55BC801D"));
    assert_eq!(
        header_value(&sheet, "Checksum-SHA256"),
        Some("039058C6F2C0CB492C533B0A4D14EF77CC0F78ABCCCED5287D84A1A2011CFB81")
    );
    assert_eq!(
        sheet.lines().filter(|line| line.starts_with("Checksum-")).count(),
        2
    );
    assert!(sheet.lines().any(|line| line == "001: 010203"));

    let decoded = text::decode(&sheet).expect("decode should succeed");
    assert_eq!(decoded, doc);
    for recorded in decoded.checksums() {
        assert!(recorded.verify(&[0x01, 0x02, 0x03]));
    }
}

#[test]
fn test_text_round_trip_both_encodings() {
    let ciphertext: Vec<u8> = (0..=255u8).cycle().take(700).collect();
    let doc = NewDocument::new(ciphertext)
        .with_purpose("round trip")
        .with_comment("both encodings")
        .build()
        .expect("document should build");

    for encoding in [BodyEncoding::Hex, BodyEncoding::Armor] {
        for lowercase in [false, true] {
            let options = TextOptions {
                encoding,
                lowercase,
                embed_qr: false,
            };
            let sheet = text::encode(&doc, &options).expect("encode should succeed");
            let decoded = text::decode(&sheet).expect("decode should succeed");
            assert_eq!(decoded, doc, "{:?} lowercase={}", encoding, lowercase);
        }
    }
}

#[test]
fn test_embedded_qr_matches_sheet() {
    let doc = scenario_document();
    let options = TextOptions {
        embed_qr: true,
        ..TextOptions::default()
    };
    let sheet = text::encode(&doc, &options).expect("encode should succeed");
    assert!(sheet.contains("# QR payload"));
    assert_eq!(text::decode(&sheet).expect("decode should succeed"), doc);
}

#[test]
fn test_every_single_body_character_change_is_detected() {
    let doc = NewDocument::new(vec![0x5Au8, 0xA5, 0x00, 0xFF, 0x42])
        .with_serial(SerialNumber::parse("QRS789").expect("valid serial"))
        .build()
        .expect("document should build");
    let sheet = text::encode(&doc, &TextOptions::default()).expect("encode should succeed");
    let body_index = sheet
        .lines()
        .position(|line| line.starts_with("001: "))
        .expect("body line");

    let lines: Vec<&str> = sheet.lines().collect();
    let body = lines[body_index];
    for (position, original) in body.char_indices().skip("001: ".len()) {
        if original == ' ' {
            continue;
        }
        for replacement in ['0', '7', 'F', 'G', 'x'] {
            if replacement.eq_ignore_ascii_case(&original) {
                continue;
            }
            let mut changed = body.to_string();
            changed.replace_range(position..position + 1, &replacement.to_string());
            let mut tampered = lines.clone();
            tampered[body_index] = &changed;

            let err = text::decode(&tampered.join("\n")).expect_err("change must be detected");
            assert!(
                err.integrity().is_some(),
                "position {} -> {:?} gave {}",
                position,
                replacement,
                err
            );
        }
    }
}

#[test]
fn test_truncation_is_length_mismatch() {
    let doc = NewDocument::new(vec![0xEEu8; 100])
        .build()
        .expect("document should build");
    for encoding in [BodyEncoding::Hex, BodyEncoding::Armor] {
        let options = TextOptions {
            encoding,
            ..TextOptions::default()
        };
        let sheet = text::encode(&doc, &options).expect("encode should succeed");

        // Drop the last body line.
        let mut lines: Vec<&str> = sheet.lines().collect();
        let last_body = match encoding {
            BodyEncoding::Hex => lines
                .iter()
                .rposition(|line| line.starts_with("00"))
                .expect("hex body line"),
            BodyEncoding::Armor => lines
                .iter()
                .position(|line| line.starts_with('='))
                .expect("armor checksum line")
                - 1,
        };
        lines.remove(last_body);

        let err = text::decode(&lines.join("\n")).expect_err("truncation must fail");
        assert!(
            err.integrity()
                .is_some_and(IntegrityFailure::is_length_mismatch),
            "{:?}: {}",
            encoding,
            err
        );
    }
}

#[test]
fn test_content_length_edit_is_length_mismatch() {
    let sheet = text::encode(&scenario_document(), &TextOptions::default())
        .expect("encode should succeed");
    let edited = sheet.replace("ContentLength: 3", "ContentLength: 4");
    let err = text::decode(&edited).expect_err("length edit must fail");
    assert!(err
        .integrity()
        .is_some_and(IntegrityFailure::is_length_mismatch));
}

#[test]
fn test_checksum_typo_names_algorithm() {
    let sheet = text::encode(&scenario_document(), &TextOptions::default())
        .expect("encode should succeed");
    let edited = sheet.replace("Checksum-CRC32: 55BC801D", "Checksum-CRC32: 55BC801E");
    let err = text::decode(&edited).expect_err("typo must fail");
    assert!(matches!(
        err.integrity(),
        Some(IntegrityFailure::Checksum {
            algorithm: ChecksumAlgorithm::Crc32,
            ..
        })
    ));
}

#[test]
fn test_payload_round_trip() {
    let doc = scenario_document();
    let json = payload::encode(&doc).expect("encode should succeed");
    assert_eq!(sniff(json.as_bytes()).expect("sniff"), Generation::CURRENT);
    assert_eq!(decode_payload(json.as_bytes()).expect("decode"), doc);
}

#[test]
fn test_explicit_version_wins_over_shape() {
    // Nested shape, but an explicit current version.
    let raw = br#"{"Version":"2.0.0","Data":{"Data":"AQID"},"SerialNumber":"ABC123","CreatedAt":"2024-01-01T00:00:00Z","DataCRC24":0}"#;
    assert_eq!(sniff(raw).expect("sniff"), Generation::V2);
    assert!(matches!(
        decode_payload(raw),
        Err(PaperCryptError::MalformedField { .. })
    ));
}

#[test]
fn test_legacy_fixture_matches_fresh_encode() {
    assert_eq!(sniff(V1_FIXTURE.as_bytes()).expect("sniff"), Generation::V1);
    let legacy = decode_payload(V1_FIXTURE.as_bytes()).expect("legacy fixture should decode");

    assert_eq!(legacy.ciphertext().as_bytes(), fixture_ciphertext().as_slice());
    assert_eq!(legacy.serial().as_str(), "XK4R7P");
    assert_eq!(legacy.purpose(), "recovery codes");
    assert_eq!(legacy.comment(), "top drawer");
    assert_eq!(legacy.generator_version(), "1");
    assert_eq!(legacy.checksums(), checksum::compute(&fixture_ciphertext()).as_slice());

    let fresh = NewDocument::new(fixture_ciphertext())
        .build()
        .expect("document should build");
    let fresh_json = payload::encode(&fresh).expect("encode should succeed");
    let current = decode_payload(fresh_json.as_bytes()).expect("fresh payload should decode");
    assert_eq!(current.ciphertext(), legacy.ciphertext());

    // The upgraded document renders and re-reads as a current sheet.
    let sheet = text::encode(&legacy, &TextOptions::default()).expect("encode should succeed");
    assert_eq!(text::decode(&sheet).expect("decode should succeed"), legacy);
}

#[test]
fn test_legacy_fixture_with_optional_checksums() {
    let legacy =
        decode_payload(V1_FULL_FIXTURE.as_bytes()).expect("legacy fixture should decode");
    assert_eq!(legacy.generator_version(), "1.3.2");
    assert_eq!(legacy.ciphertext().as_bytes(), fixture_ciphertext().as_slice());
}

#[test]
fn test_upgraded_legacy_payload_round_trip() {
    for fixture in [V1_FIXTURE, V1_FULL_FIXTURE] {
        let legacy = decode_payload(fixture.as_bytes()).expect("legacy fixture should decode");
        let json = payload::encode(&legacy).expect("encode should succeed");
        assert_eq!(sniff(json.as_bytes()).expect("sniff"), Generation::CURRENT);

        let record: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(record["Version"], papercrypt_core::VERSION);
        assert_eq!(record["GeneratorVersion"], legacy.generator_version());

        assert_eq!(decode_payload(json.as_bytes()).expect("re-encoded payload"), legacy);
    }
}

#[test]
fn test_legacy_free_form_serial_survives() {
    let legacy = V1_FIXTURE.replacen("XK4R7P", "ZOO-01", 1);
    let doc = decode_payload(legacy.as_bytes()).expect("legacy serial should decode");
    assert_eq!(doc.serial().as_str(), "ZOO-01");

    let sheet = text::encode(&doc, &TextOptions::default()).expect("encode should succeed");
    assert_eq!(text::decode(&sheet).expect("decode should succeed"), doc);
}

#[test]
fn test_legacy_fixture_tampered_data_fails() {
    let tampered = V1_FIXTURE.replacen("QEFC", "QEFD", 1);
    let err = decode_payload(tampered.as_bytes()).expect_err("tampering must fail");
    assert!(matches!(
        err.integrity(),
        Some(IntegrityFailure::Checksum {
            algorithm: ChecksumAlgorithm::Crc24,
            ..
        })
    ));
}

#[test]
fn test_unrecognized_payloads_fail_cleanly() {
    for raw in ["{}", "{\"Version\":\"9.0.0\"}", "[1,2,3]", "SerialNumber: ABC123"] {
        assert!(
            matches!(
                decode_payload(raw.as_bytes()),
                Err(PaperCryptError::UnrecognizedFormat(_))
            ),
            "{}",
            raw
        );
    }
}

#[test]
fn test_sheet_with_unknown_lines_and_reordered_headers() {
    let doc = scenario_document();
    let sheet = text::encode(&doc, &TextOptions::default()).expect("encode should succeed");
    let mut lines: Vec<String> = sheet.lines().map(str::to_string).collect();
    let purpose = lines
        .iter()
        .position(|line| line.starts_with("Purpose"))
        .expect("purpose line");
    let moved = lines.remove(purpose);
    lines.push(String::new());
    lines.push(moved);
    lines.insert(1, "Printed-By: office printer".to_string());

    assert_eq!(text::decode(&lines.join("\n")).expect("decode should succeed"), doc);
}
