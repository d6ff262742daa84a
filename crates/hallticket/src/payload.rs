//! Verification payload
//!
//! Format: `HT1|<id>|<name>|<rollOrApplication>|<exam>`
//!
//! - `id` and `name` are cut to [`MAX_ID_CHARS`] and [`MAX_NAME_CHARS`]
//!   characters, the exam name to a configurable prefix
//! - `%`, `|`, control characters and every non-ASCII byte are
//!   percent-encoded (UTF-8, uppercase hex), so the payload is printable ASCII

use crate::record::StudentRecord;
use std::fmt;
use thiserror::Error;

/// Version tag leading every payload
pub const PAYLOAD_VERSION: &str = "HT1";

pub const MAX_ID_CHARS: usize = 64;
pub const MAX_NAME_CHARS: usize = 64;

/// Default exam-name prefix length
pub const DEFAULT_EXAM_CHARS: usize = 24;

const SEPARATOR: char = '|';
const FIELD_COUNT: usize = 5;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("unsupported payload version: {0}")]
    UnsupportedVersion(String),

    #[error("expected 5 fields, found {0}")]
    FieldCount(usize),

    #[error("invalid escape in payload field: {0}")]
    InvalidEscape(String),
}

/// Identity data carried by the verification code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationPayload {
    pub id: String,
    pub name: String,
    pub roll_or_application: String,
    pub exam: String,
}

impl VerificationPayload {
    /// Build the payload for a record
    pub fn from_record(record: &StudentRecord, exam_chars: usize) -> Self {
        Self {
            id: truncate_chars(&record.identity.id, MAX_ID_CHARS),
            name: truncate_chars(&record.identity.name, MAX_NAME_CHARS),
            roll_or_application: truncate_chars(record.roll_or_application(), MAX_ID_CHARS),
            exam: truncate_chars(&record.exam.exam_name, exam_chars),
        }
    }

    /// Serialize to the scanner format
    pub fn encode(&self) -> String {
        [
            PAYLOAD_VERSION.to_string(),
            percent_encode(&self.id),
            percent_encode(&self.name),
            percent_encode(&self.roll_or_application),
            percent_encode(&self.exam),
        ]
        .join("|")
    }

    /// Decode a scanned payload
    pub fn parse(payload: &str) -> Result<Self, PayloadError> {
        let fields: Vec<&str> = payload.split(SEPARATOR).collect();
        if fields.len() != FIELD_COUNT {
            return Err(PayloadError::FieldCount(fields.len()));
        }
        if fields[0] != PAYLOAD_VERSION {
            return Err(PayloadError::UnsupportedVersion(fields[0].to_string()));
        }

        Ok(Self {
            id: percent_decode(fields[1])?,
            name: percent_decode(fields[2])?,
            roll_or_application: percent_decode(fields[3])?,
            exam: percent_decode(fields[4])?,
        })
    }
}

impl fmt::Display for VerificationPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn needs_escape(byte: u8) -> bool {
    byte == b'%' || byte == SEPARATOR as u8 || !(0x20..0x7F).contains(&byte)
}

fn percent_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        if needs_escape(byte) {
            out.push_str(&format!("%{byte:02X}"));
        } else {
            out.push(byte as char);
        }
    }
    out
}

fn percent_decode(field: &str) -> Result<String, PayloadError> {
    let invalid = || PayloadError::InvalidEscape(field.to_string());
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = field.get(i + 1..i + 3).ok_or_else(invalid)?;
            let byte = u8::from_str_radix(hex, 16).map_err(|_| invalid())?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawRecord;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(value: serde_json::Value) -> StudentRecord {
        StudentRecord::prepare(&RawRecord(value)).unwrap()
    }

    #[test]
    fn test_encode_plain() {
        let rec = record(json!({
            "id": "STU-001",
            "name": "Asha Rao",
            "rollNumber": "R-1001",
            "examName": "Diploma Final Examination 2025"
        }));
        let payload = VerificationPayload::from_record(&rec, DEFAULT_EXAM_CHARS);

        assert_eq!(
            payload.encode(),
            "HT1|STU-001|Asha Rao|R-1001|Diploma Final Examinatio"
        );
    }

    #[test]
    fn test_falls_back_to_application_number() {
        let rec = record(json!({
            "id": "S2",
            "name": "Ravi",
            "applicationNumber": "APP-77",
            "examName": "Entrance"
        }));
        let payload = VerificationPayload::from_record(&rec, DEFAULT_EXAM_CHARS);
        assert_eq!(payload.roll_or_application, "APP-77");
    }

    #[test]
    fn test_escapes_reserved_and_non_ascii() {
        let payload = VerificationPayload {
            id: "A|B".to_string(),
            name: "Zoë 100%".to_string(),
            roll_or_application: "R\n1".to_string(),
            exam: String::new(),
        };
        let encoded = payload.encode();

        assert_eq!(encoded, "HT1|A%7CB|Zo%C3%AB 100%25|R%0A1|");
        assert!(encoded.bytes().all(|b| (0x20..0x7F).contains(&b)));
        assert_eq!(VerificationPayload::parse(&encoded).unwrap(), payload);
    }

    #[test]
    fn test_truncates_by_characters() {
        let long_name = "é".repeat(100);
        let rec = record(json!({ "id": "S", "name": long_name, "examName": "E" }));
        let payload = VerificationPayload::from_record(&rec, 4);

        assert_eq!(payload.name.chars().count(), MAX_NAME_CHARS);
        assert_eq!(payload.exam, "E");
    }

    #[test]
    fn test_deterministic() {
        let rec = record(json!({ "id": "S", "name": "N", "examName": "E" }));
        let a = VerificationPayload::from_record(&rec, 24).encode();
        let b = VerificationPayload::from_record(&rec, 24).encode();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            VerificationPayload::parse("HT2|a|b|c|d").unwrap_err(),
            PayloadError::UnsupportedVersion("HT2".to_string())
        );
        assert_eq!(
            VerificationPayload::parse("HT1|a|b").unwrap_err(),
            PayloadError::FieldCount(3)
        );
        assert!(matches!(
            VerificationPayload::parse("HT1|a%G1|b|c|d").unwrap_err(),
            PayloadError::InvalidEscape(_)
        ));
        assert!(matches!(
            VerificationPayload::parse("HT1|a%C3|b|c|d").unwrap_err(),
            PayloadError::InvalidEscape(_)
        ));
        assert!(VerificationPayload::parse("HT1|a%4|b|c|d").is_err());
    }
}
