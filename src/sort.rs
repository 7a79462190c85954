/// FolioView Sorting
///
/// One `SortSpec` is active per view. Sorting is stable: records with equal
/// keys keep their fetch order, in both directions, because direction flips
/// the comparator result and never the input sequence.
///
/// Records whose sort field is absent, null, or (for `SortKind::Instant`)
/// not readable as a date sort after every record that has a key, whatever
/// the direction. When no record has the field the sort is a stable no-op,
/// which is also how an unknown field name behaves.

use crate::error::ViewError;
use crate::record::Fields;
use crate::value::FieldValue;
use std::cmp::Ordering;
use std::str::FromStr;

/// Field every list page sorts by initially.
pub const CREATED_AT: &str = "createdAt";

/// Record timestamps written by the API.
pub const INSTANT_FIELDS: &[&str] = &[CREATED_AT, "updatedAt"];

/// Sort order specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending order (smallest first)
    Ascending,
    /// Descending order (largest first)
    Descending,
}

impl SortOrder {
    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

impl FromStr for SortOrder {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(ViewError::invalid(format!(
                "unknown sort direction '{}', use 'asc' or 'desc'",
                s
            ))),
        }
    }
}

/// How sort keys are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKind {
    /// By value type: strings locale-aware, numbers numerically,
    /// timestamps as instants
    #[default]
    Natural,
    /// Coerce strings and epoch milliseconds to instants first
    Instant,
}

impl SortKind {
    /// Comparator a header click on `field` starts with.
    pub fn for_field(field: &str) -> SortKind {
        if INSTANT_FIELDS.iter().any(|f| *f == field) {
            SortKind::Instant
        } else {
            SortKind::Natural
        }
    }
}

/// The active sort: field, direction and comparator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
    pub kind: SortKind,
}

impl Default for SortSpec {
    /// Newest first by creation time.
    fn default() -> Self {
        SortSpec {
            field: CREATED_AT.to_string(),
            order: SortOrder::Descending,
            kind: SortKind::Instant,
        }
    }
}

impl SortSpec {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        SortSpec {
            field: field.into(),
            order,
            kind: SortKind::Natural,
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        SortSpec::new(field, SortOrder::Ascending)
    }

    pub fn descending(field: impl Into<String>) -> Self {
        SortSpec::new(field, SortOrder::Descending)
    }

    pub fn with_kind(mut self, kind: SortKind) -> Self {
        self.kind = kind;
        self
    }

    /// Column-header click: the same field sorted ascending flips to
    /// descending; anything else sorts the clicked field ascending.
    ///
    /// The comparator kind is kept when the field stays the same and
    /// otherwise comes from `SortKind::for_field`, so the order a click
    /// produces never depends on earlier clicks.
    pub fn toggle(&self, field: &str) -> SortSpec {
        if self.field != field {
            return SortSpec::ascending(field).with_kind(SortKind::for_field(field));
        }
        SortSpec {
            field: self.field.clone(),
            order: self.order.reversed(),
            kind: self.kind,
        }
    }

    pub fn validate(&self) -> Result<(), ViewError> {
        if self.field.is_empty() {
            return Err(ViewError::invalid("sort field name is empty"));
        }
        Ok(())
    }

    /// Sort key for one record. `None` sorts last.
    fn key_of<R: Fields>(&self, record: &R) -> Option<FieldValue> {
        let value = record.field(&self.field)?;
        match self.kind {
            SortKind::Natural => (!value.is_null()).then_some(value),
            SortKind::Instant => value.to_instant().map(FieldValue::Timestamp),
        }
    }

    fn compare_keys(&self, a: &Option<FieldValue>, b: &Option<FieldValue>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => {
                let base = compare_values(a, b);
                match self.order {
                    SortOrder::Ascending => base,
                    SortOrder::Descending => base.reverse(),
                }
            }
        }
    }

    /// Stable sort of borrowed records. Keys are read once per record.
    pub fn sort<'a, R: Fields>(&self, records: Vec<&'a R>) -> Vec<&'a R> {
        let mut keyed: Vec<(Option<FieldValue>, &'a R)> =
            records.into_iter().map(|r| (self.key_of(r), r)).collect();

        // Vec::sort_by is stable
        keyed.sort_by(|(ka, _), (kb, _)| self.compare_keys(ka, kb));

        keyed.into_iter().map(|(_, r)| r).collect()
    }
}

fn type_rank(value: &FieldValue) -> u8 {
    match value {
        FieldValue::Bool(_) => 0,
        FieldValue::Int(_) | FieldValue::Float(_) => 1,
        FieldValue::Timestamp(_) => 2,
        FieldValue::String(_) => 3,
        FieldValue::Nested(_) => 4,
        FieldValue::Null => 5,
    }
}

/// Ascending comparison of two non-missing values.
pub fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
        (FieldValue::Int(a), FieldValue::Int(b)) => a.cmp(b),
        (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a.cmp(b),
        (FieldValue::String(a), FieldValue::String(b)) => locale_cmp(a, b),
        (FieldValue::Nested(_), FieldValue::Nested(_)) => Ordering::Equal,
        (a, b) => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            // Mixed types - rank by type for a deterministic order
            _ => type_rank(a).cmp(&type_rank(b)),
        },
    }
}

/// Base letter of a lowercase Latin-1 accented letter.
fn base_letter(c: char) -> char {
    match c {
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => c,
    }
}

fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase).map(base_letter)
}

/// Locale-style string ordering, compared in three passes:
///
/// 1. base letters, ignoring case and common Latin accents ("éclair" sorts
///    before "zebra")
/// 2. unaccented before accented at the first differing letter
/// 3. lowercase before uppercase at the first differing character
///
/// Only identical strings compare equal.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let base = folded(a).cmp(folded(b));
    if base != Ordering::Equal {
        return base;
    }

    let accents = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    if accents != Ordering::Equal {
        return accents;
    }

    for (x, y) in a.chars().zip(b.chars()) {
        if x != y {
            return match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => x.cmp(&y),
            };
        }
    }
    a.len().cmp(&b.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn people() -> Vec<Record> {
        vec![
            Record::new().with("id", 1i64).with("name", "charlie").with("score", 75i64),
            Record::new().with("id", 2i64).with("name", "Alice").with("score", 92i64),
            Record::new().with("id", 3i64).with("name", "bob").with("score", 85i64),
        ]
    }

    fn ids(records: &[&Record]) -> Vec<i64> {
        records
            .iter()
            .map(|r| r.field("id").and_then(|v| v.as_i64()).unwrap())
            .collect()
    }

    #[test]
    fn test_sort_strings_ignore_case() {
        let data = people();
        let sorted = SortSpec::ascending("name").sort(data.iter().collect());
        assert_eq!(ids(&sorted), vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_descending_numbers() {
        let data = people();
        let sorted = SortSpec::descending("score").sort(data.iter().collect());
        assert_eq!(ids(&sorted), vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_missing_values_last_both_directions() {
        let data = vec![
            Record::new().with("id", 1i64).with("age", 30i64),
            Record::new().with("id", 2i64),
            Record::new().with("id", 3i64).with("age", 25i64),
            Record::new().with("id", 4i64).with("age", FieldValue::Null),
        ];

        let asc = SortSpec::ascending("age").sort(data.iter().collect());
        assert_eq!(ids(&asc), vec![3, 1, 2, 4]);

        let desc = SortSpec::descending("age").sort(data.iter().collect());
        assert_eq!(ids(&desc), vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_sort_is_stable_under_reversal() {
        let data = vec![
            Record::new().with("id", 1i64).with("status", "active"),
            Record::new().with("id", 2i64).with("status", "pending"),
            Record::new().with("id", 3i64).with("status", "active"),
            Record::new().with("id", 4i64).with("status", "active"),
        ];

        let asc = SortSpec::ascending("status").sort(data.iter().collect());
        assert_eq!(ids(&asc), vec![1, 3, 4, 2]);

        let desc = SortSpec::descending("status").sort(data.iter().collect());
        assert_eq!(ids(&desc), vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_unknown_field_is_noop() {
        let data = people();
        let sorted = SortSpec::descending("nonexistent").sort(data.iter().collect());
        assert_eq!(ids(&sorted), vec![1, 2, 3]);
    }

    #[test]
    fn test_instant_kind_parses_strings() {
        let data = vec![
            Record::new().with("id", 1i64).with("createdAt", "2024-03-01T10:00:00.000Z"),
            Record::new().with("id", 2i64).with("createdAt", "2024-01-15"),
            Record::new().with("id", 3i64).with("createdAt", "garbage"),
            Record::new().with("id", 4i64).with("createdAt", "2024-02-01T00:00:00+05:00"),
        ];

        let newest = SortSpec::default().sort(data.iter().collect());
        assert_eq!(ids(&newest), vec![1, 4, 2, 3]);

        let oldest = SortSpec::ascending(CREATED_AT)
            .with_kind(SortKind::Instant)
            .sort(data.iter().collect());
        assert_eq!(ids(&oldest), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_mixed_numeric_types() {
        let data = vec![
            Record::new().with("id", 1i64).with("v", 2.5),
            Record::new().with("id", 2i64).with("v", 2i64),
            Record::new().with("id", 3i64).with("v", 3i64),
        ];
        let sorted = SortSpec::ascending("v").sort(data.iter().collect());
        assert_eq!(ids(&sorted), vec![2, 1, 3]);
    }

    #[test]
    fn test_locale_cmp() {
        assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
        assert_eq!(locale_cmp("Residential", "residential"), Ordering::Greater);
        assert_eq!(locale_cmp("same", "same"), Ordering::Equal);
        assert_eq!(locale_cmp("abc", "ab"), Ordering::Greater);
    }

    #[test]
    fn test_locale_cmp_folds_accents() {
        assert_eq!(locale_cmp("éclair", "zebra"), Ordering::Less);
        assert_eq!(locale_cmp("Émile", "eve"), Ordering::Less);
        assert_eq!(locale_cmp("Ñandú", "nube"), Ordering::Less);
        assert_eq!(locale_cmp("Zoë", "Zoey"), Ordering::Less);

        // Same base letters: the unaccented spelling comes first
        assert_eq!(locale_cmp("resume", "résumé"), Ordering::Less);
        assert_eq!(locale_cmp("Résumé", "resume"), Ordering::Greater);
        assert_eq!(locale_cmp("café", "Café"), Ordering::Less);
    }

    #[test]
    fn test_toggle() {
        let spec = SortSpec::default();
        let by_email = spec.toggle("email");
        assert_eq!(by_email, SortSpec::ascending("email"));

        let flipped = by_email.toggle("email");
        assert_eq!(flipped.order, SortOrder::Descending);

        // Descending on the same field goes back to ascending
        assert_eq!(flipped.toggle("email").order, SortOrder::Ascending);

        // Default sort is descending, so clicking createdAt sorts ascending and keeps the kind
        let created = spec.toggle(CREATED_AT);
        assert_eq!(created.order, SortOrder::Ascending);
        assert_eq!(created.kind, SortKind::Instant);
    }

    #[test]
    fn test_toggle_kind_follows_field_not_history() {
        let back = SortSpec::default().toggle("email").toggle(CREATED_AT);
        assert_eq!(back, SortSpec::default().toggle(CREATED_AT));
        assert_eq!(back.kind, SortKind::Instant);

        assert_eq!(SortSpec::ascending("email").toggle("updatedAt").kind, SortKind::Instant);
        assert_eq!(SortSpec::default().toggle("projectName").kind, SortKind::Natural);

        // An explicit comparator survives clicks on its own field
        let custom = SortSpec::ascending("deadline").with_kind(SortKind::Instant);
        assert_eq!(custom.toggle("deadline").kind, SortKind::Instant);
    }

    #[test]
    fn test_validate_and_parse_order() {
        assert!(SortSpec::ascending("").validate().is_err());
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Descending);
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
