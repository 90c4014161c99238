//! Raw records and field coercion
//!
//! A [`RawRecord`] is the untyped mapping a source drop delivers. It exists
//! only during normalization; the coercion helpers here turn its loosely
//! typed fields (numbers delivered as strings, `\N` null markers) into the
//! declared semantic types.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::DriverName;

/// Problem coercing a single field.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize)]
pub enum FieldProblem {
    #[error("is required but missing")]
    Missing,
    #[error("cannot be coerced to {expected} (found {found})")]
    Uncoercible {
        expected: &'static str,
        found: String,
    },
}

/// A single offending field within a rejected batch.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize)]
#[error("row {row}: field `{field}` {problem}")]
pub struct FieldError {
    /// Row index within the incoming batch
    pub row: usize,
    /// Field name as it appears in the raw record
    pub field: String,
    /// What went wrong
    pub problem: FieldProblem,
}

impl FieldError {
    fn missing(field: &str) -> Self {
        Self {
            row: 0,
            field: field.to_string(),
            problem: FieldProblem::Missing,
        }
    }

    fn uncoercible(field: &str, expected: &'static str, found: &Value) -> Self {
        Self {
            row: 0,
            field: field.to_string(),
            problem: FieldProblem::Uncoercible {
                expected,
                found: found.to_string(),
            },
        }
    }

    pub(crate) fn at_row(mut self, row: usize) -> Self {
        self.row = row;
        self
    }
}

/// An untyped record from one source drop.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Source system name
    pub source: String,
    /// Drop this record was delivered in
    pub drop_id: String,
    /// The raw field mapping
    pub fields: Map<String, Value>,
}

impl RawRecord {
    /// Create a raw record from an already-parsed field mapping.
    pub fn new(source: impl Into<String>, drop_id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            source: source.into(),
            drop_id: drop_id.into(),
            fields,
        }
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(source: &str, drop_id: &str, value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self::new(source, drop_id, fields)),
            _ => None,
        }
    }

    /// Field lookup treating JSON null and the `\N` null marker as absent.
    fn get(&self, field: &str) -> Option<&Value> {
        match self.fields.get(field) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s == "\\N" || s.is_empty() => None,
            Some(v) => Some(v),
        }
    }

    pub fn require_i64(&self, field: &str) -> Result<i64, FieldError> {
        match self.get(field) {
            None => Err(FieldError::missing(field)),
            Some(v) => coerce_i64(v).ok_or_else(|| FieldError::uncoercible(field, "integer", v)),
        }
    }

    pub fn require_i32(&self, field: &str) -> Result<i32, FieldError> {
        let wide = self.require_i64(field)?;
        i32::try_from(wide).map_err(|_| {
            FieldError::uncoercible(field, "integer", &Value::from(wide))
        })
    }

    pub fn require_f64(&self, field: &str) -> Result<f64, FieldError> {
        match self.get(field) {
            None => Err(FieldError::missing(field)),
            Some(v) => coerce_f64(v).ok_or_else(|| FieldError::uncoercible(field, "float", v)),
        }
    }

    pub fn require_str(&self, field: &str) -> Result<String, FieldError> {
        match self.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(v) => Err(FieldError::uncoercible(field, "string", v)),
        }
    }

    pub fn require_date(&self, field: &str) -> Result<NaiveDate, FieldError> {
        let text = self.require_str(field)?;
        NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|_| {
            FieldError::uncoercible(field, "date", &Value::String(text))
        })
    }

    /// Nested `{forename, surname}` name struct.
    pub fn require_name(&self, field: &str) -> Result<DriverName, FieldError> {
        match self.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Object(name)) => {
                let forename = name.get("forename").and_then(Value::as_str);
                let surname = name.get("surname").and_then(Value::as_str);
                match (forename, surname) {
                    (Some(forename), Some(surname)) => Ok(DriverName {
                        forename: forename.to_string(),
                        surname: surname.to_string(),
                    }),
                    _ => Err(FieldError::uncoercible(
                        field,
                        "name struct",
                        &Value::Object(name.clone()),
                    )),
                }
            }
            Some(v) => Err(FieldError::uncoercible(field, "name struct", v)),
        }
    }

    // Optional getters are lenient: a present but uncoercible value becomes
    // None with a debug log, since only required fields reject the batch.

    pub fn optional_i64(&self, field: &str) -> Option<i64> {
        let value = self.get(field)?;
        let coerced = coerce_i64(value);
        if coerced.is_none() {
            tracing::debug!(field, %value, "dropping uncoercible optional integer");
        }
        coerced
    }

    pub fn optional_i32(&self, field: &str) -> Option<i32> {
        self.optional_i64(field).and_then(|v| i32::try_from(v).ok())
    }

    pub fn optional_u32(&self, field: &str) -> Option<u32> {
        self.optional_i64(field).and_then(|v| u32::try_from(v).ok())
    }

    pub fn optional_f64(&self, field: &str) -> Option<f64> {
        let value = self.get(field)?;
        let coerced = coerce_f64(value);
        if coerced.is_none() {
            tracing::debug!(field, %value, "dropping uncoercible optional float");
        }
        coerced
    }

    pub fn optional_str(&self, field: &str) -> Option<String> {
        match self.get(field)? {
            Value::String(s) => Some(s.clone()),
            value => {
                tracing::debug!(field, %value, "dropping non-string optional field");
                None
            }
        }
    }

    pub fn optional_date(&self, field: &str) -> Option<NaiveDate> {
        let text = self.optional_str(field)?;
        match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                tracing::debug!(field, %text, "dropping unparseable optional date");
                None
            }
        }
    }
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        RawRecord::from_value("test", "2021-01-01", value).expect("object")
    }

    #[test]
    fn test_numeric_string_coercion() {
        let raw = record(json!({"raceId": "42", "points": "25.5"}));
        assert_eq!(raw.require_i64("raceId").unwrap(), 42);
        assert_eq!(raw.require_f64("points").unwrap(), 25.5);
    }

    #[test]
    fn test_null_marker_is_missing() {
        let raw = record(json!({"time": "\\N", "laps": null}));
        assert_eq!(raw.optional_str("time"), None);
        assert!(matches!(
            raw.require_i64("laps").unwrap_err().problem,
            FieldProblem::Missing
        ));
    }

    #[test]
    fn test_uncoercible_required_field() {
        let raw = record(json!({"raceId": {"nested": true}}));
        let err = raw.require_i64("raceId").unwrap_err();
        assert!(matches!(err.problem, FieldProblem::Uncoercible { .. }));
        assert_eq!(err.field, "raceId");
    }

    #[test]
    fn test_nested_name() {
        let raw = record(json!({"name": {"forename": "Lando", "surname": "Norris"}}));
        let name = raw.require_name("name").unwrap();
        assert_eq!(name.full(), "Lando Norris");
    }

    #[test]
    fn test_lenient_optional_field() {
        let raw = record(json!({"grid": "not-a-number"}));
        assert_eq!(raw.optional_i32("grid"), None);
    }
}
