/// FolioView Filters
///
/// Declarative predicates applied to a record set. A view combines any number
/// of them with logical AND, in declaration order, stopping at the first
/// predicate a record fails.
///
/// Disabled predicates (empty search query, the `all` sentinel, `Presence::Any`)
/// are kept in the filter list so the caller's UI state maps one-to-one onto
/// it; they simply contribute no constraint.

use crate::error::ViewError;
use crate::record::Fields;
use crate::value::FieldValue;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Sentinel string the select boxes use for "no constraint".
pub const ALL: &str = "all";

/// Target of an equality predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Predicate disabled
    All,
    /// Field must equal this value
    Value(FieldValue),
}

impl Target {
    /// `"all"` is the disabled sentinel, anything else a string target.
    pub fn parse(s: &str) -> Self {
        if s == ALL {
            Target::All
        } else {
            Target::Value(FieldValue::String(s.to_string()))
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Target::All)
    }
}

impl From<&str> for Target {
    fn from(s: &str) -> Self {
        Target::parse(s)
    }
}

impl From<FieldValue> for Target {
    fn from(v: FieldValue) -> Self {
        Target::Value(v)
    }
}

/// Presence requirement on a field (e.g. "subscribers with a phone number")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presence {
    /// Predicate disabled
    #[default]
    Any,
    /// Field exists, is not null and not empty
    With,
    /// Field is absent, null or empty
    Without,
}

impl FromStr for Presence {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" | "any" => Ok(Presence::Any),
            "with" => Ok(Presence::With),
            "without" => Ok(Presence::Without),
            _ => Err(ViewError::invalid(format!(
                "unknown presence filter '{}', use 'all', 'with' or 'without'",
                s
            ))),
        }
    }
}

/// Caller-supplied predicate over any record.
pub type Predicate = Arc<dyn Fn(&dyn Fields) -> bool + Send + Sync>;

/// A single filter predicate.
#[derive(Clone)]
pub enum FilterSpec {
    /// Case-insensitive substring match; matches if ANY field contains the query
    Text { fields: Vec<String>, query: String },
    /// Field equals target (or target is `All`)
    Equals { field: String, target: Target },
    /// Field presence
    Presence { field: String, presence: Presence },
    /// Named one-off predicate
    Custom { name: String, predicate: Predicate },
}

impl FilterSpec {
    /// Text predicate over a single field.
    pub fn text(field: impl Into<String>, query: impl Into<String>) -> Self {
        FilterSpec::Text {
            fields: vec![field.into()],
            query: query.into(),
        }
    }

    /// Text predicate over several fields (a page's search box).
    pub fn text_any<I, S>(fields: I, query: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterSpec::Text {
            fields: fields.into_iter().map(Into::into).collect(),
            query: query.into(),
        }
    }

    pub fn equals(field: impl Into<String>, target: impl Into<Target>) -> Self {
        FilterSpec::Equals {
            field: field.into(),
            target: target.into(),
        }
    }

    pub fn presence(field: impl Into<String>, presence: Presence) -> Self {
        FilterSpec::Presence {
            field: field.into(),
            presence,
        }
    }

    pub fn custom<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&dyn Fields) -> bool + Send + Sync + 'static,
    {
        FilterSpec::Custom {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Reject malformed shapes: a text predicate without fields, or an empty
    /// field name anywhere.
    pub fn validate(&self) -> Result<(), ViewError> {
        match self {
            FilterSpec::Text { fields, .. } => {
                if fields.is_empty() {
                    return Err(ViewError::invalid("text filter needs at least one field"));
                }
                if fields.iter().any(|f| f.is_empty()) {
                    return Err(ViewError::invalid("text filter has an empty field name"));
                }
                Ok(())
            }
            FilterSpec::Equals { field, .. } | FilterSpec::Presence { field, .. } => {
                if field.is_empty() {
                    return Err(ViewError::invalid("filter has an empty field name"));
                }
                Ok(())
            }
            FilterSpec::Custom { name, .. } => {
                if name.is_empty() {
                    return Err(ViewError::invalid("custom filter needs a name"));
                }
                Ok(())
            }
        }
    }

    /// Whether this predicate constrains anything right now.
    pub fn is_active(&self) -> bool {
        match self {
            FilterSpec::Text { query, .. } => !query.is_empty(),
            FilterSpec::Equals { target, .. } => !target.is_all(),
            FilterSpec::Presence { presence, .. } => *presence != Presence::Any,
            FilterSpec::Custom { .. } => true,
        }
    }

    /// Field names this predicate reads (custom predicates report their name).
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            FilterSpec::Text { fields, .. } => fields.iter().map(|f| f.as_str()).collect(),
            FilterSpec::Equals { field, .. } | FilterSpec::Presence { field, .. } => vec![field.as_str()],
            FilterSpec::Custom { name, .. } => vec![name.as_str()],
        }
    }

    pub fn matches<R: Fields>(&self, record: &R) -> bool {
        self.compile().matches(record)
    }

    /// Prepare for repeated evaluation (lowercases the query once).
    pub(crate) fn compile(&self) -> Matcher<'_> {
        match self {
            FilterSpec::Text { fields, query } => {
                if query.is_empty() {
                    Matcher::Pass
                } else {
                    Matcher::Text {
                        fields,
                        needle: query.to_lowercase(),
                    }
                }
            }
            FilterSpec::Equals { field, target } => match target {
                Target::All => Matcher::Pass,
                Target::Value(value) => Matcher::Equals { field, value },
            },
            FilterSpec::Presence { field, presence } => match presence {
                Presence::Any => Matcher::Pass,
                Presence::With => Matcher::Presence { field, want: true },
                Presence::Without => Matcher::Presence { field, want: false },
            },
            FilterSpec::Custom { predicate, .. } => Matcher::Custom(predicate),
        }
    }
}

impl fmt::Debug for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterSpec::Text { fields, query } => f
                .debug_struct("Text")
                .field("fields", fields)
                .field("query", query)
                .finish(),
            FilterSpec::Equals { field, target } => f
                .debug_struct("Equals")
                .field("field", field)
                .field("target", target)
                .finish(),
            FilterSpec::Presence { field, presence } => f
                .debug_struct("Presence")
                .field("field", field)
                .field("presence", presence)
                .finish(),
            FilterSpec::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
        }
    }
}

/// Compiled form of a `FilterSpec`.
pub(crate) enum Matcher<'a> {
    Pass,
    Text { fields: &'a [String], needle: String },
    Equals { field: &'a str, value: &'a FieldValue },
    Presence { field: &'a str, want: bool },
    Custom(&'a Predicate),
}

impl Matcher<'_> {
    pub(crate) fn matches<R: Fields>(&self, record: &R) -> bool {
        match self {
            Matcher::Pass => true,
            Matcher::Text { fields, needle } => fields.iter().any(|name| {
                record
                    .field(name)
                    .and_then(|v| v.to_text())
                    .map(|text| text.to_lowercase().contains(needle.as_str()))
                    .unwrap_or(false)
            }),
            Matcher::Equals { field, value } => record
                .field(field)
                .map(|v| v.loose_eq(value))
                .unwrap_or(false),
            Matcher::Presence { field, want } => {
                let present = record.field(field).map(|v| v.is_present()).unwrap_or(false);
                present == *want
            }
            Matcher::Custom(predicate) => predicate(record as &dyn Fields),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn applicant() -> Record {
        Record::new()
            .with("firstName", "Ada")
            .with("lastName", "Lovelace")
            .with("email", "ADA@Example.com")
            .with("phoneNumber", "+44 20 7946 0000")
            .with("gender", "female")
            .with("age", 36i64)
    }

    #[test]
    fn test_text_filter_case_insensitive() {
        let record = applicant();
        assert!(FilterSpec::text("email", "ada@example").matches(&record));
        assert!(FilterSpec::text("lastName", "LOVE").matches(&record));
        assert!(!FilterSpec::text("lastName", "byron").matches(&record));
    }

    #[test]
    fn test_text_filter_any_field() {
        let record = applicant();
        let search = FilterSpec::text_any(["firstName", "phoneNumber"], "7946");
        assert!(search.matches(&record));

        let search = FilterSpec::text_any(["firstName", "lastName"], "7946");
        assert!(!search.matches(&record));
    }

    #[test]
    fn test_text_filter_missing_field_fails() {
        let record = applicant();
        assert!(!FilterSpec::text("address", "london").matches(&record));
        // Numbers are searched through their text form
        assert!(FilterSpec::text("age", "36").matches(&record));
    }

    #[test]
    fn test_empty_query_disables_text_filter() {
        let record = Record::new();
        let search = FilterSpec::text("email", "");
        assert!(!search.is_active());
        assert!(search.matches(&record));
    }

    #[test]
    fn test_equality_filter_and_all_sentinel() {
        let record = applicant();
        assert!(FilterSpec::equals("gender", "female").matches(&record));
        assert!(!FilterSpec::equals("gender", "male").matches(&record));
        assert!(!FilterSpec::equals("gender", "Female").matches(&record));

        let all = FilterSpec::equals("gender", ALL);
        assert!(!all.is_active());
        assert!(all.matches(&Record::new()));
    }

    #[test]
    fn test_equality_filter_numeric() {
        let record = applicant();
        assert!(FilterSpec::equals("age", FieldValue::Float(36.0)).matches(&record));
    }

    #[test]
    fn test_presence_filter() {
        let with_phone = Record::new().with("phone", "555");
        let empty_phone = Record::new().with("phone", "");
        let null_phone = Record::new().with("phone", FieldValue::Null);
        let no_phone = Record::new();

        let with = FilterSpec::presence("phone", Presence::With);
        let without = FilterSpec::presence("phone", Presence::Without);

        assert!(with.matches(&with_phone));
        assert!(!with.matches(&empty_phone));
        assert!(without.matches(&empty_phone));
        assert!(without.matches(&null_phone));
        assert!(without.matches(&no_phone));
        assert!(!without.matches(&with_phone));
    }

    #[test]
    fn test_presence_from_str() {
        assert_eq!("all".parse::<Presence>().unwrap(), Presence::Any);
        assert_eq!("with".parse::<Presence>().unwrap(), Presence::With);
        assert!("sometimes".parse::<Presence>().is_err());
    }

    #[test]
    fn test_custom_filter() {
        let adult = FilterSpec::custom("adult", |r| {
            r.field("age").and_then(|v| v.as_i64()).map(|a| a >= 18).unwrap_or(false)
        });
        assert!(adult.matches(&applicant()));
        assert!(!adult.matches(&Record::new()));
        assert_eq!(format!("{:?}", adult), "Custom { name: \"adult\" }");
    }

    #[test]
    fn test_validate_rejects_malformed_shapes() {
        let no_fields = FilterSpec::text_any(Vec::<String>::new(), "x");
        assert!(no_fields.validate().unwrap_err().is_invalid_argument());
        assert!(FilterSpec::equals("", "x").validate().is_err());
        assert!(FilterSpec::text_any(["a", ""], "x").validate().is_err());
        assert!(FilterSpec::text("email", "x").validate().is_ok());
    }
}
