/// FolioView Field Values
///
/// A `FieldValue` is the dynamically typed content of one record field, as
/// fetched from the admin API. Records coming off the wire are JSON, so the
/// variants mirror what JSON can carry plus a first-class timestamp, which is
/// what the list pages sort by most of the time.
///
/// # Text form
///
/// Text predicates match against `to_text()`, the value rendered the way the
/// dashboard would display it. Null has no text form and never matches.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Field value enum covering every shape a record field can take
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    /// Arrays and objects (image lists, nested documents) kept verbatim
    Nested(JsonValue),
    Null,
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// True for non-null values that are not the empty string.
    pub fn is_present(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view of the value; ints and floats compare together.
    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Int(n) => Some(*n as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Display text used by text predicates and CSV cells.
    pub fn to_text(&self) -> Option<String> {
        match self {
            FieldValue::String(s) => Some(s.clone()),
            FieldValue::Int(n) => Some(n.to_string()),
            FieldValue::Float(f) => Some(f.to_string()),
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Timestamp(t) => Some(format_instant(t)),
            FieldValue::Nested(v) => Some(v.to_string()),
            FieldValue::Null => None,
        }
    }

    /// Coerce to an instant: timestamps as-is, strings parsed, integers
    /// read as epoch milliseconds. Anything else has no instant.
    pub fn to_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(t) => Some(*t),
            FieldValue::String(s) => parse_instant(s),
            FieldValue::Int(ms) => Utc.timestamp_millis_opt(*ms).single(),
            _ => None,
        }
    }

    /// Equality used by equality predicates.
    ///
    /// Strings compare exactly, numbers compare across int/float, and a
    /// timestamp equals a string that parses to the same instant. Null never
    /// equals anything, including another null.
    pub fn loose_eq(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Null, _) | (_, FieldValue::Null) => false,
            (FieldValue::String(a), FieldValue::String(b)) => a == b,
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a == b,
            (FieldValue::Timestamp(a), FieldValue::String(s))
            | (FieldValue::String(s), FieldValue::Timestamp(a)) => parse_instant(s) == Some(*a),
            (FieldValue::Nested(a), FieldValue::Nested(b)) => a == b,
            (a, b) => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }

    /// Convert a JSON value. Integers that fit stay integers; strings stay
    /// strings (use `SortKind::Instant` to order them as dates).
    pub fn from_json(value: &JsonValue) -> FieldValue {
        match value {
            JsonValue::Null => FieldValue::Null,
            JsonValue::Bool(b) => FieldValue::Bool(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    FieldValue::Float(f)
                } else {
                    FieldValue::Null
                }
            }
            JsonValue::String(s) => FieldValue::String(s.clone()),
            JsonValue::Array(_) | JsonValue::Object(_) => FieldValue::Nested(value.clone()),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            FieldValue::String(v) => JsonValue::String(v.clone()),
            FieldValue::Int(v) => JsonValue::Number((*v).into()),
            FieldValue::Float(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            FieldValue::Bool(v) => JsonValue::Bool(*v),
            FieldValue::Timestamp(t) => JsonValue::String(format_instant(t)),
            FieldValue::Nested(v) => v.clone(),
            FieldValue::Null => JsonValue::Null,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// Parse the date formats the API and callers use: RFC 3339, a naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC) and a bare `YYYY-MM-DD`.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Render an instant the way the API does (`2024-03-01T00:00:00.000Z`).
pub fn format_instant(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_variants() {
        assert_eq!(FieldValue::from_json(&json!(null)), FieldValue::Null);
        assert_eq!(FieldValue::from_json(&json!(7)), FieldValue::Int(7));
        assert_eq!(FieldValue::from_json(&json!(2.5)), FieldValue::Float(2.5));
        assert_eq!(FieldValue::from_json(&json!("x")), FieldValue::String("x".to_string()));
        assert!(matches!(FieldValue::from_json(&json!([1, 2])), FieldValue::Nested(_)));
    }

    #[test]
    fn test_parse_instant_formats() {
        let day = parse_instant("2024-02-01").unwrap();
        let naive = parse_instant("2024-02-01T00:00:00").unwrap();
        let rfc = parse_instant("2024-02-01T00:00:00.000Z").unwrap();
        let offset = parse_instant("2024-02-01T02:00:00+02:00").unwrap();

        assert_eq!(day, naive);
        assert_eq!(day, rfc);
        assert_eq!(day, offset);
        assert!(parse_instant("not a date").is_none());
    }

    #[test]
    fn test_to_instant_from_epoch_millis() {
        let value = FieldValue::Int(1_704_067_200_000);
        assert_eq!(value.to_instant(), parse_instant("2024-01-01"));
        assert_eq!(FieldValue::Bool(true).to_instant(), None);
    }

    #[test]
    fn test_loose_eq() {
        assert!(FieldValue::Int(3).loose_eq(&FieldValue::Float(3.0)));
        assert!(FieldValue::from("active").loose_eq(&FieldValue::from("active")));
        assert!(!FieldValue::from("Active").loose_eq(&FieldValue::from("active")));
        assert!(!FieldValue::Null.loose_eq(&FieldValue::Null));

        let t = parse_instant("2024-01-01").unwrap();
        assert!(FieldValue::Timestamp(t).loose_eq(&FieldValue::from("2024-01-01")));
    }

    #[test]
    fn test_presence_and_text() {
        assert!(!FieldValue::from("").is_present());
        assert!(!FieldValue::Null.is_present());
        assert!(FieldValue::Int(0).is_present());

        assert_eq!(FieldValue::Float(1.0).to_text().as_deref(), Some("1"));
        assert_eq!(FieldValue::Null.to_text(), None);

        let t = parse_instant("2024-03-01").unwrap();
        assert_eq!(
            FieldValue::Timestamp(t).to_text().as_deref(),
            Some("2024-03-01T00:00:00.000Z")
        );
    }

    #[test]
    fn test_option_conversion() {
        let missing: Option<String> = None;
        assert_eq!(FieldValue::from(missing), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(5i64)), FieldValue::Int(5));
    }
}
