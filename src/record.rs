/// FolioView Records
///
/// Every list page feeds the view engine a sequence of records. The engine
/// only ever reads them through the `Fields` trait, so typed domain structs
/// and the untyped `Record` map are interchangeable.
///
/// # Examples
///
/// ```
/// use folioview::{Fields, FieldValue, Record};
///
/// let record = Record::new()
///     .with("_id", "p1")
///     .with("projectName", "Harbour House")
///     .with("status", "active");
///
/// assert_eq!(record.field("status"), Some(FieldValue::from("active")));
/// assert_eq!(record.record_id().as_deref(), Some("p1"));
/// assert_eq!(record.field("missing"), None);
/// ```

use crate::error::ViewError;
use crate::value::FieldValue;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

/// Named field access over a record.
///
/// `None` means the record has no such field; a field that exists but holds
/// JSON `null` is `Some(FieldValue::Null)`. Both sort last and fail text and
/// equality predicates.
pub trait Fields {
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Identifier used for local patching after a delete. The API tags
    /// documents with `_id`; plain `id` is accepted too.
    fn record_id(&self) -> Option<String> {
        self.field("_id")
            .or_else(|| self.field("id"))
            .and_then(|v| v.to_text())
    }
}

impl<T: Fields + ?Sized> Fields for &T {
    fn field(&self, name: &str) -> Option<FieldValue> {
        (**self).field(name)
    }

    fn record_id(&self) -> Option<String> {
        (**self).record_id()
    }
}

/// Untyped record: field name to value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Map<String, JsonValue>")]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(|k| k.as_str()).collect()
    }

    /// Build a record from a JSON object. Anything other than an object is
    /// rejected.
    pub fn from_json(value: &JsonValue) -> Result<Self, ViewError> {
        match value {
            JsonValue::Object(map) => Ok(Record::from(map.clone())),
            other => Err(ViewError::invalid(format!(
                "expected a JSON object for a record, got {}",
                json_kind(other)
            ))),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl Fields for Record {
    fn field(&self, name: &str) -> Option<FieldValue> {
        self.fields.get(name).cloned()
    }
}

impl From<Map<String, JsonValue>> for Record {
    fn from(map: Map<String, JsonValue>) -> Self {
        let fields = map
            .into_iter()
            .map(|(k, v)| (k, FieldValue::from_json(&v)))
            .collect();
        Record { fields }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
