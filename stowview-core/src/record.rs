//! Manifest records before and after validation.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::dims::ContainerSize;

/// Names of the fields every manifest record must carry, in CSV column order
pub const RECORD_FIELDS: [&str; 5] = ["id", "bay", "row", "tier", "size"];

/// One manifest entry as read from the document, nothing validated yet
///
/// Every field is kept as text; blank values and JSON `null` are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestRecord {
    pub id: Option<String>,
    pub bay: Option<String>,
    pub row: Option<String>,
    pub tier: Option<String>,
    pub size: Option<String>,
}

impl ManifestRecord {
    /// Build a record from positional CSV-style fields
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        let mut fields = fields.into_iter().map(non_blank);
        Self {
            id: fields.next().flatten(),
            bay: fields.next().flatten(),
            row: fields.next().flatten(),
            tier: fields.next().flatten(),
            size: fields.next().flatten(),
        }
    }

    /// Build a record from a JSON object; anything else yields `None`
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            id: json_field(object, "id"),
            bay: json_field(object, "bay"),
            row: json_field(object, "row"),
            tier: json_field(object, "tier"),
            size: json_field(object, "size"),
        })
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn json_field(object: &Map<String, Value>, name: &str) -> Option<String> {
    match object.get(name)? {
        Value::Null => None,
        Value::String(s) => non_blank(s),
        other => Some(other.to_string()),
    }
}

/// Why a manifest entry was left out of the placed set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("entry is not a record")]
    NotARecord,

    #[error("line {line} could not be split into fields")]
    Malformed { line: usize },

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not a slot number: `{value}`")]
    InvalidNumber { field: &'static str, value: String },

    #[error("unsupported container size `{0}`")]
    UnknownSize(String),
}

/// A validated manifest entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerRecord {
    pub id: String,
    pub bay: u32,
    pub row: u32,
    pub tier: u32,
    pub size: ContainerSize,
}

impl ContainerRecord {
    pub fn new(id: impl Into<String>, bay: u32, row: u32, tier: u32, size: ContainerSize) -> Self {
        Self {
            id: id.into(),
            bay,
            row,
            tier,
            size,
        }
    }
}

impl TryFrom<&ManifestRecord> for ContainerRecord {
    type Error = SkipReason;

    fn try_from(raw: &ManifestRecord) -> Result<Self, Self::Error> {
        // Presence first, so a record missing several fields reports the first one
        let id = required("id", &raw.id)?;
        let bay = required("bay", &raw.bay)?;
        let row = required("row", &raw.row)?;
        let tier = required("tier", &raw.tier)?;
        let size = required("size", &raw.size)?;

        Ok(Self {
            id: id.to_string(),
            bay: slot_number("bay", bay)?,
            row: slot_number("row", row)?,
            tier: slot_number("tier", tier)?,
            size: size
                .parse()
                .map_err(|_| SkipReason::UnknownSize(size.to_string()))?,
        })
    }
}

fn required<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str, SkipReason> {
    value.as_deref().ok_or(SkipReason::MissingField(field))
}

fn slot_number(field: &'static str, value: &str) -> Result<u32, SkipReason> {
    parse_slot_number(value).ok_or_else(|| SkipReason::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Read a bay, row or tier number; leading zeros are allowed ("04" is 4)
pub fn parse_slot_number(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_slot_number() {
        assert_eq!(parse_slot_number("04"), Some(4));
        assert_eq!(parse_slot_number(" 82 "), Some(82));
        assert_eq!(parse_slot_number("-1"), None);
        assert_eq!(parse_slot_number("1.5"), None);
        assert_eq!(parse_slot_number(""), None);
    }

    #[test]
    fn test_json_record_with_mixed_types() {
        let raw = ManifestRecord::from_json(
            &json!({ "id": "MSCU1234567", "bay": "03", "row": 2, "tier": 82, "size": "40FT" }),
        )
        .unwrap();
        let record = ContainerRecord::try_from(&raw).unwrap();
        assert_eq!(
            record,
            ContainerRecord::new("MSCU1234567", 3, 2, 82, ContainerSize::Forty)
        );
    }

    #[test]
    fn test_numeric_id_is_kept_as_text() {
        let raw = ManifestRecord::from_json(
            &json!({ "id": 42, "bay": 1, "row": 1, "tier": 2, "size": 20 }),
        )
        .unwrap();
        assert_eq!(ContainerRecord::try_from(&raw).unwrap().id, "42");
    }

    #[test]
    fn test_missing_and_blank_fields() {
        let raw = ManifestRecord::from_json(
            &json!({ "id": "A", "bay": 1, "row": null, "tier": 2, "size": "20" }),
        )
        .unwrap();
        assert_eq!(
            ContainerRecord::try_from(&raw),
            Err(SkipReason::MissingField("row"))
        );

        let raw = ManifestRecord::from_fields(["A", "1", "1", "  ", "20"]);
        assert_eq!(
            ContainerRecord::try_from(&raw),
            Err(SkipReason::MissingField("tier"))
        );
    }

    #[test]
    fn test_invalid_values() {
        let raw = ManifestRecord::from_fields(["A", "1", "x", "2", "20"]);
        assert!(matches!(
            ContainerRecord::try_from(&raw),
            Err(SkipReason::InvalidNumber { field: "row", .. })
        ));

        let raw = ManifestRecord::from_fields(["A", "1", "1", "2", "53"]);
        assert_eq!(
            ContainerRecord::try_from(&raw),
            Err(SkipReason::UnknownSize("53".to_string()))
        );
    }

    #[test]
    fn test_non_object_json() {
        assert_eq!(ManifestRecord::from_json(&json!([1, 2, 3])), None);
    }
}
