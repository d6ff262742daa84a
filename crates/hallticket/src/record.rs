//! Record model
//!
//! Raw input is a loosely shaped JSON object. [`StudentRecord::prepare`]
//! looks each logical field up under its accepted keys, checks the required
//! ones and computes the display strings once.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use ticket_text::{display_amount, display_date, display_time};

/// Currency prefix used by [`StudentRecord::prepare`]
pub const DEFAULT_CURRENCY_PREFIX: &str = "Rs. ";

/// A record fails validation only when a required field is missing
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Unvalidated input record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub Value);

impl From<Value> for RawRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Resolve a dotted path (e.g. "identity.rollNumber") in a JSON value
fn resolve_path<'a>(path: &str, data: &'a Value) -> Option<&'a Value> {
    let mut current = data;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Convert a scalar JSON value to trimmed text; blank and non-scalar values are absent
fn value_to_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Accepted input keys for each logical field, in lookup order
mod keys {
    pub const ID: &[&str] = &["id", "_id", "studentId", "student_id", "identity.id"];
    pub const APPLICATION_NUMBER: &[&str] = &[
        "applicationNumber",
        "applicationNo",
        "application_number",
        "appNo",
        "identity.applicationNumber",
    ];
    pub const ROLL_NUMBER: &[&str] = &[
        "rollNumber",
        "rollNo",
        "roll_number",
        "identity.rollNumber",
    ];
    pub const NAME: &[&str] = &[
        "name",
        "fullName",
        "studentName",
        "full_name",
        "identity.name",
    ];
    pub const DOB: &[&str] = &["dob", "dateOfBirth", "date_of_birth", "personal.dob"];
    pub const GENDER: &[&str] = &["gender", "personal.gender"];
    pub const CATEGORY: &[&str] = &["category", "personal.category"];
    pub const FATHER_NAME: &[&str] = &["fatherName", "father_name", "personal.fatherName"];
    pub const MOTHER_NAME: &[&str] = &["motherName", "mother_name", "personal.motherName"];
    pub const PWD: &[&str] = &[
        "personWithDisability",
        "pwd",
        "isPwd",
        "person_with_disability",
        "personal.personWithDisability",
    ];
    pub const SCRIBE: &[&str] = &[
        "scribeRequired",
        "scribe",
        "scribe_required",
        "personal.scribeRequired",
    ];
    pub const EXAM_NAME: &[&str] = &["examName", "exam", "exam_name", "examInfo.examName"];
    pub const EXAM_DATE: &[&str] = &["examDate", "exam_date", "examInfo.examDate"];
    pub const EXAM_TIME: &[&str] = &["examTime", "exam_time", "examInfo.examTime"];
    pub const REPORTING_TIME: &[&str] = &[
        "reportingTime",
        "reporting_time",
        "examInfo.reportingTime",
    ];
    pub const DURATION: &[&str] = &["duration", "examDuration", "examInfo.duration"];
    pub const FEE: &[&str] = &["fee", "examFee", "amount", "examInfo.fee"];
    pub const CENTER_NAME: &[&str] = &[
        "centerName",
        "centreName",
        "center",
        "examCenter",
        "venue.centerName",
    ];
    pub const ADDRESS: &[&str] = &["address", "centerAddress", "venue.address"];
    pub const CITY: &[&str] = &["city", "venue.city"];
    pub const STATE: &[&str] = &["state", "venue.state"];
}

impl RawRecord {
    /// First present value among `keys`
    pub fn lookup(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| resolve_path(key, &self.0))
            .find_map(value_to_text)
    }

    /// Best available identifier, used when reporting a record that failed
    pub fn identifier(&self) -> Option<String> {
        self.lookup(keys::ID)
            .or_else(|| self.lookup(keys::APPLICATION_NUMBER))
            .or_else(|| self.lookup(keys::ROLL_NUMBER))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub application_number: Option<String>,
    pub roll_number: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Personal {
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub category: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub person_with_disability: Option<String>,
    pub scribe_required: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamInfo {
    pub exam_name: String,
    pub exam_date: Option<String>,
    pub exam_time: Option<String>,
    pub reporting_time: Option<String>,
    pub duration: Option<String>,
    pub fee: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub center_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Display strings derived from the raw values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayValues {
    pub dob: Option<String>,
    pub exam_date: Option<String>,
    pub exam_time: Option<String>,
    pub reporting_time: Option<String>,
    pub fee: Option<String>,
    pub person_with_disability: Option<String>,
    pub scribe_required: Option<String>,
}

/// Validated record, read-only during composition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub identity: Identity,
    pub personal: Personal,
    pub exam: ExamInfo,
    pub venue: Venue,
    pub display: DisplayValues,
}

impl StudentRecord {
    /// Validate a raw record with the default currency prefix
    pub fn prepare(raw: &RawRecord) -> Result<Self, ValidationError> {
        Self::prepare_with(raw, DEFAULT_CURRENCY_PREFIX)
    }

    /// Validate a raw record
    ///
    /// Fails only when id, name or exam name is missing or blank. Values
    /// that cannot be canonicalized keep their raw text.
    pub fn prepare_with(raw: &RawRecord, currency_prefix: &str) -> Result<Self, ValidationError> {
        let id = raw
            .lookup(keys::ID)
            .ok_or(ValidationError::MissingField("id"))?;
        let name = raw
            .lookup(keys::NAME)
            .ok_or(ValidationError::MissingField("name"))?;
        let exam_name = raw
            .lookup(keys::EXAM_NAME)
            .ok_or(ValidationError::MissingField("examName"))?;

        let identity = Identity {
            id,
            application_number: raw.lookup(keys::APPLICATION_NUMBER),
            roll_number: raw.lookup(keys::ROLL_NUMBER),
            name,
        };
        let personal = Personal {
            dob: raw.lookup(keys::DOB),
            gender: raw.lookup(keys::GENDER),
            category: raw.lookup(keys::CATEGORY),
            father_name: raw.lookup(keys::FATHER_NAME),
            mother_name: raw.lookup(keys::MOTHER_NAME),
            person_with_disability: raw.lookup(keys::PWD),
            scribe_required: raw.lookup(keys::SCRIBE),
        };
        let exam = ExamInfo {
            exam_name,
            exam_date: raw.lookup(keys::EXAM_DATE),
            exam_time: raw.lookup(keys::EXAM_TIME),
            reporting_time: raw.lookup(keys::REPORTING_TIME),
            duration: raw.lookup(keys::DURATION),
            fee: raw.lookup(keys::FEE),
        };
        let venue = Venue {
            center_name: raw.lookup(keys::CENTER_NAME),
            address: raw.lookup(keys::ADDRESS),
            city: raw.lookup(keys::CITY),
            state: raw.lookup(keys::STATE),
        };

        let display = DisplayValues {
            dob: personal.dob.as_deref().map(display_date),
            exam_date: exam.exam_date.as_deref().map(display_date),
            exam_time: exam.exam_time.as_deref().map(display_time),
            reporting_time: exam.reporting_time.as_deref().map(display_time),
            fee: exam
                .fee
                .as_deref()
                .map(|fee| display_amount(fee, currency_prefix)),
            person_with_disability: personal.person_with_disability.as_deref().map(yes_no),
            scribe_required: personal.scribe_required.as_deref().map(yes_no),
        };

        Ok(Self {
            identity,
            personal,
            exam,
            venue,
            display,
        })
    }

    /// Roll number, or the application number when no roll number is assigned
    pub fn roll_or_application(&self) -> &str {
        self.identity
            .roll_number
            .as_deref()
            .or(self.identity.application_number.as_deref())
            .unwrap_or("")
    }

    /// Whether either parent name is present
    pub fn has_guardian(&self) -> bool {
        self.personal.father_name.is_some() || self.personal.mother_name.is_some()
    }
}

/// Render a yes/no flag as "Yes"/"No"; other text passes through
fn yes_no(raw: &str) -> String {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => "Yes".to_string(),
        "no" | "n" | "false" | "0" => "No".to_string(),
        _ => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        RawRecord(value)
    }

    #[test]
    fn test_prepare_flat_record() {
        let record = StudentRecord::prepare(&raw(json!({
            "id": "STU-001",
            "applicationNumber": "APP2025001",
            "rollNumber": "R-1001",
            "name": "  Asha Rao ",
            "dob": "2004-07-09",
            "gender": "Female",
            "examName": "Diploma Final Examination",
            "examDate": "15/03/2025",
            "examTime": "10:00 - 13:00",
            "reportingTime": "9:00",
            "fee": 1500,
            "personWithDisability": false,
            "centerName": "Govt. Polytechnic",
            "city": "Pune"
        })))
        .unwrap();

        assert_eq!(record.identity.id, "STU-001");
        assert_eq!(record.identity.name, "Asha Rao");
        assert_eq!(record.roll_or_application(), "R-1001");
        assert_eq!(record.display.dob.as_deref(), Some("09 Jul 2004"));
        assert_eq!(record.display.exam_date.as_deref(), Some("15 Mar 2025"));
        assert_eq!(
            record.display.exam_time.as_deref(),
            Some("10:00 AM - 01:00 PM")
        );
        assert_eq!(record.display.reporting_time.as_deref(), Some("09:00 AM"));
        assert_eq!(record.display.fee.as_deref(), Some("Rs. 1,500.00"));
        assert_eq!(record.display.person_with_disability.as_deref(), Some("No"));
        assert_eq!(record.venue.city.as_deref(), Some("Pune"));
        assert_eq!(record.venue.address, None);
    }

    #[test]
    fn test_prepare_grouped_and_alias_keys() {
        let record = StudentRecord::prepare(&raw(json!({
            "identity": { "id": 42, "name": "Ravi Kumar", "applicationNumber": "A-9" },
            "examInfo": { "examName": "Entrance Test" },
            "venue": { "address": "Plot 4, MIDC" },
            "scribe": "Y"
        })))
        .unwrap();

        assert_eq!(record.identity.id, "42");
        assert_eq!(record.identity.roll_number, None);
        assert_eq!(record.roll_or_application(), "A-9");
        assert_eq!(record.exam.exam_name, "Entrance Test");
        assert_eq!(record.venue.address.as_deref(), Some("Plot 4, MIDC"));
        assert_eq!(record.display.scribe_required.as_deref(), Some("Yes"));
    }

    #[test]
    fn test_flat_key_wins_over_grouped() {
        let record = raw(json!({
            "rollNo": "FLAT",
            "identity": { "rollNumber": "GROUPED" }
        }));
        assert_eq!(record.lookup(keys::ROLL_NUMBER).as_deref(), Some("FLAT"));
    }

    #[test]
    fn test_missing_required_fields() {
        let missing_name = raw(json!({ "id": "S1", "name": "   ", "examName": "X" }));
        assert_eq!(
            StudentRecord::prepare(&missing_name).unwrap_err(),
            ValidationError::MissingField("name")
        );

        let missing_id = raw(json!({ "name": "A", "examName": "X" }));
        assert_eq!(
            StudentRecord::prepare(&missing_id).unwrap_err().to_string(),
            "missing required field: id"
        );

        let missing_exam = raw(json!({ "id": "S1", "name": "A", "examName": null }));
        assert_eq!(
            StudentRecord::prepare(&missing_exam).unwrap_err(),
            ValidationError::MissingField("examName")
        );
    }

    #[test]
    fn test_unparseable_values_keep_raw_text() {
        let record = StudentRecord::prepare(&raw(json!({
            "id": "S1",
            "name": "A",
            "examName": "X",
            "examDate": "to be announced",
            "examTime": "forenoon",
            "fee": "waived",
            "personWithDisability": "partial"
        })))
        .unwrap();

        assert_eq!(record.display.exam_date.as_deref(), Some("to be announced"));
        assert_eq!(record.display.exam_time.as_deref(), Some("forenoon"));
        assert_eq!(record.display.fee.as_deref(), Some("waived"));
        assert_eq!(
            record.display.person_with_disability.as_deref(),
            Some("partial")
        );
    }

    #[test]
    fn test_bare_year_dates_keep_raw_text() {
        let record = StudentRecord::prepare(&raw(json!({
            "id": "S1",
            "name": "A",
            "examName": "X",
            "dob": "2004",
            "examDate": 2025
        })))
        .unwrap();

        assert_eq!(record.display.dob.as_deref(), Some("2004"));
        assert_eq!(record.display.exam_date.as_deref(), Some("2025"));
    }

    #[test]
    fn test_identifier_fallbacks() {
        assert_eq!(raw(json!({ "id": "S1" })).identifier().as_deref(), Some("S1"));
        assert_eq!(
            raw(json!({ "applicationNo": "A-1" })).identifier().as_deref(),
            Some("A-1")
        );
        assert_eq!(raw(json!({ "name": "A" })).identifier(), None);
        assert_eq!(raw(json!("not an object")).identifier(), None);
    }

    #[test]
    fn test_has_guardian() {
        let base = json!({ "id": "S1", "name": "A", "examName": "X" });
        assert!(!StudentRecord::prepare(&raw(base.clone())).unwrap().has_guardian());

        let mut with_mother = base;
        with_mother["motherName"] = json!("Sunita");
        assert!(StudentRecord::prepare(&raw(with_mother)).unwrap().has_guardian());
    }

    #[test]
    fn test_yes_no() {
        assert_eq!(yes_no("TRUE"), "Yes");
        assert_eq!(yes_no("n"), "No");
        assert_eq!(yes_no("0"), "No");
        assert_eq!(yes_no(" Not applicable "), "Not applicable");
    }
}
