/// Summaries computed once per fetch, not per keystroke: status counts for
/// the stat cards and the distinct values that populate filter drop-downs.

use crate::error::ViewError;
use crate::filter::FilterSpec;
use crate::page::PageSpec;
use crate::record::Fields;
use crate::sort::SortSpec;
use crate::value::FieldValue;
use crate::view::view;
use serde::Serialize;

/// Per-value record counts for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCounts {
    pub field: String,
    pub total: usize,
    pub counts: Vec<(String, usize)>,
}

impl StatusCounts {
    pub fn get(&self, value: &str) -> usize {
        self.counts
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

/// Count records per known value of `field`, one unbounded view per value.
pub fn status_counts<R: Fields>(
    records: &[R],
    field: &str,
    values: &[&str],
) -> Result<StatusCounts, ViewError> {
    let sort = SortSpec::default();
    let page = PageSpec::all();

    let mut counts = Vec::with_capacity(values.len());
    for value in values {
        let filter = FilterSpec::equals(field, FieldValue::from(*value));
        let result = view(records, &[filter], &sort, &page)?;
        counts.push((value.to_string(), result.filtered_count));
    }

    Ok(StatusCounts {
        field: field.to_string(),
        total: records.len(),
        counts,
    })
}

/// Distinct non-null values of `field` in first-seen order.
pub fn distinct_values<R: Fields>(records: &[R], field: &str) -> Vec<FieldValue> {
    let mut seen: Vec<FieldValue> = Vec::new();
    for value in records.iter().filter_map(|r| r.field(field)) {
        if value.is_null() {
            continue;
        }
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn projects() -> Vec<Record> {
        vec![
            Record::new().with("status", "active").with("projectType", "Residential"),
            Record::new().with("status", "pending").with("projectType", "Commercial"),
            Record::new().with("status", "active").with("projectType", "Residential"),
            Record::new().with("status", "deactive"),
            Record::new().with("projectType", FieldValue::Null),
        ]
    }

    #[test]
    fn test_status_counts() {
        let counts = status_counts(&projects(), "status", &["active", "pending", "deactive"]).unwrap();
        assert_eq!(counts.total, 5);
        assert_eq!(counts.get("active"), 2);
        assert_eq!(counts.get("pending"), 1);
        assert_eq!(counts.get("deactive"), 1);
        assert_eq!(counts.get("archived"), 0);
    }

    #[test]
    fn test_status_counts_empty_field_is_invalid() {
        assert!(status_counts(&projects(), "", &["active"]).is_err());
    }

    #[test]
    fn test_distinct_values_first_seen_order() {
        let types = distinct_values(&projects(), "projectType");
        assert_eq!(
            types,
            vec![FieldValue::from("Residential"), FieldValue::from("Commercial")]
        );
    }
}
