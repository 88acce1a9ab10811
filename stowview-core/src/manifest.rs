/// Manifest reader for JSON record lists and CSV text
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, none_of, space0},
    combinator::{all_consuming, map, value},
    multi::{fold_many0, separated_list1},
    sequence::delimited,
    IResult,
};
use serde::de::Error as _;
use serde_json::Value;

use crate::error::ManifestError;
use crate::record::{ContainerRecord, ManifestRecord, SkipReason, RECORD_FIELDS};

/// All entries of one manifest document, in document order
///
/// Entries that are not records at all (a number inside a JSON list, a CSV
/// line that cannot be split) are kept with their skip reason so they still
/// count as skipped when placed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<Result<ManifestRecord, SkipReason>>,
}

impl Manifest {
    /// Parse JSON or CSV, picked by the first non-blank character
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        match text.trim_start().chars().next() {
            None => Err(ManifestError::Empty),
            Some('[') | Some('{') => Self::from_json(text),
            Some(_) => Self::from_csv(text),
        }
    }

    /// Parse a JSON array of records, or an object with a `containers` array
    pub fn from_json(text: &str) -> Result<Self, ManifestError> {
        let document: Value = serde_json::from_str(text)?;
        let items = match document {
            Value::Array(items) => items,
            Value::Object(mut object) => match object.remove("containers") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(ManifestError::Json(serde_json::Error::custom(
                        "expected a record list or an object with a `containers` list",
                    )))
                }
            },
            _ => {
                return Err(ManifestError::Json(serde_json::Error::custom(
                    "expected a record list",
                )))
            }
        };

        Ok(Self {
            entries: items
                .iter()
                .map(|item| ManifestRecord::from_json(item).ok_or(SkipReason::NotARecord))
                .collect(),
        })
    }

    /// Parse comma separated text. Blank lines and `#` comments are ignored.
    /// A first line naming the columns (`id,bay,row,tier,size` in any order)
    /// is used as a header, otherwise columns are taken in that order.
    pub fn from_csv(text: &str) -> Result<Self, ManifestError> {
        let mut columns: Option<Vec<Option<usize>>> = None;
        let mut entries = Vec::new();
        let mut first = true;

        for (number, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields = match parse_csv_line(line) {
                Ok((_, fields)) => fields,
                Err(e) => {
                    log::warn!("manifest line {} is not valid CSV: {:?}", number + 1, e);
                    first = false;
                    entries.push(Err(SkipReason::Malformed { line: number + 1 }));
                    continue;
                }
            };

            if std::mem::take(&mut first) && is_header(&fields) {
                columns = Some(header_columns(&fields));
                continue;
            }

            let record = match &columns {
                Some(columns) => ManifestRecord::from_fields(
                    columns
                        .iter()
                        .map(|&column| column.and_then(|i| fields.get(i)).map_or("", String::as_str)),
                ),
                None => ManifestRecord::from_fields(fields.iter().map(String::as_str)),
            };
            entries.push(Ok(record));
        }

        if entries.is_empty() && first {
            return Err(ManifestError::Empty);
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate every entry
    pub fn records(&self) -> impl Iterator<Item = Result<ContainerRecord, SkipReason>> + '_ {
        self.entries.iter().map(|entry| match entry {
            Ok(record) => ContainerRecord::try_from(record),
            Err(reason) => Err(reason.clone()),
        })
    }
}

fn is_header(fields: &[String]) -> bool {
    fields
        .iter()
        .any(|f| f.trim().eq_ignore_ascii_case(RECORD_FIELDS[0]))
}

/// Column index of each record field, `None` when the header lacks it
fn header_columns(fields: &[String]) -> Vec<Option<usize>> {
    RECORD_FIELDS
        .iter()
        .map(|name| fields.iter().position(|f| f.trim().eq_ignore_ascii_case(name)))
        .collect()
}

fn parse_csv_line(input: &str) -> IResult<&str, Vec<String>> {
    all_consuming(separated_list1(char(','), csv_field))(input)
}

fn csv_field(input: &str) -> IResult<&str, String> {
    delimited(space0, alt((quoted_field, bare_field)), space0)(input)
}

/// `"..."` with `""` standing for one quote
fn quoted_field(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        fold_many0(
            alt((value('"', tag("\"\"")), none_of("\""))),
            String::new,
            |mut field, c| {
                field.push(c);
                field
            },
        ),
        char('"'),
    )(input)
}

fn bare_field(input: &str) -> IResult<&str, String> {
    map(take_while(|c: char| c != ',' && c != '"'), |s: &str| {
        s.trim().to_string()
    })(input)
}
