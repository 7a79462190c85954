/// Caller-owned list state
///
/// `ListState` is what a list page keeps between renders: the full fetched
/// record set and its current `ViewQuery`. It is the one place that knows
/// when a view parameter changed, so it carries the reset obligation the
/// stateless engine cannot: any change to a filter, the sort or the page size
/// sends the page back to 1.
///
/// Status counts are computed when records are loaded or patched, never on
/// a search keystroke.

use crate::error::ViewError;
use crate::filter::{FilterSpec, Presence, Target};
use crate::page::PageSpec;
use crate::record::Fields;
use crate::sort::SortSpec;
use crate::summary::{status_counts, StatusCounts};
use crate::view::{ViewQuery, ViewResult};
use log::{debug, info};

/// Field whose values drive the status summary, and the values to count.
#[derive(Debug, Clone)]
struct StatusField {
    field: String,
    values: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ListState<R> {
    records: Vec<R>,
    query: ViewQuery,
    /// Query restored by `clear_filters`
    initial: ViewQuery,
    status_field: Option<StatusField>,
    status_counts: Option<StatusCounts>,
}

impl<R: Fields> ListState<R> {
    /// `query` holds the page's controls in their initial position; it is
    /// also what `clear_filters` returns to.
    pub fn new(query: ViewQuery) -> Self {
        ListState {
            records: Vec::new(),
            initial: query.clone(),
            query,
            status_field: None,
            status_counts: None,
        }
    }

    /// Track per-value counts of `field` (the stat cards above a list).
    pub fn with_status_field(mut self, field: &str, values: &[&str]) -> Self {
        self.status_field = Some(StatusField {
            field: field.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    pub fn page_number(&self) -> usize {
        self.query.page.number
    }

    pub fn status_counts(&self) -> Option<&StatusCounts> {
        self.status_counts.as_ref()
    }

    /// Install a freshly fetched record set.
    pub fn replace_records(&mut self, records: Vec<R>) -> Result<(), ViewError> {
        info!("loaded {} records", records.len());
        self.records = records;
        self.reset_page();
        self.refresh_status_counts()
    }

    /// Drop records after a successful delete. Returns how many were removed.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> Result<usize, ViewError>
    where
        F: FnMut(&R) -> bool,
    {
        let before = self.records.len();
        self.records.retain(|r| !predicate(r));
        let removed = before - self.records.len();
        if removed > 0 {
            debug!("removed {} records locally", removed);
            self.refresh_status_counts()?;
        }
        Ok(removed)
    }

    pub fn remove_by_id(&mut self, id: &str) -> Result<bool, ViewError> {
        let removed = self.remove_where(|r| r.record_id().as_deref() == Some(id))?;
        Ok(removed > 0)
    }

    /// Apply a local edit to the record with `id` (e.g. a status change the
    /// API accepted). Returns false when no record has that id.
    pub fn patch_by_id<F>(&mut self, id: &str, edit: F) -> Result<bool, ViewError>
    where
        F: FnOnce(&mut R),
    {
        let Some(record) = self
            .records
            .iter_mut()
            .find(|r| r.record_id().as_deref() == Some(id))
        else {
            return Ok(false);
        };
        edit(record);
        self.refresh_status_counts()?;
        Ok(true)
    }

    /// Replace the filter occupying the same slot (same kind and fields), or
    /// add it. Resets the page.
    pub fn set_filter(&mut self, filter: FilterSpec) -> Result<(), ViewError> {
        filter.validate()?;
        match self.query.filters.iter_mut().find(|f| same_slot(f, &filter)) {
            Some(slot) => *slot = filter,
            None => self.query.filters.push(filter),
        }
        self.reset_page();
        Ok(())
    }

    /// Update the search box: the query of every text filter.
    pub fn set_search(&mut self, query: &str) {
        for filter in &mut self.query.filters {
            if let FilterSpec::Text { query: q, .. } = filter {
                *q = query.to_string();
            }
        }
        self.reset_page();
    }

    pub fn set_equals(&mut self, field: &str, target: impl Into<Target>) -> Result<(), ViewError> {
        self.set_filter(FilterSpec::equals(field, target))
    }

    pub fn set_presence(&mut self, field: &str, presence: Presence) -> Result<(), ViewError> {
        self.set_filter(FilterSpec::presence(field, presence))
    }

    pub fn set_sort(&mut self, sort: SortSpec) -> Result<(), ViewError> {
        sort.validate()?;
        self.query.sort = sort;
        self.reset_page();
        Ok(())
    }

    /// Column-header click.
    pub fn toggle_sort(&mut self, field: &str) -> Result<(), ViewError> {
        let next = self.query.sort.toggle(field);
        self.set_sort(next)
    }

    pub fn set_page_size(&mut self, size: usize) -> Result<(), ViewError> {
        PageSpec::first(size).validate()?;
        self.query.page = PageSpec::first(size);
        Ok(())
    }

    /// Jump to a page; out-of-range numbers are clamped at render time.
    pub fn go_to_page(&mut self, number: usize) {
        self.query.page.number = number.max(1);
    }

    pub fn next_page(&mut self) -> Result<(), ViewError> {
        let page_count = self.render()?.page_count;
        self.query.page.number = (self.query.page.number + 1).min(page_count);
        Ok(())
    }

    pub fn previous_page(&mut self) {
        self.query.page.number = self.query.page.number.saturating_sub(1).max(1);
    }

    /// Back to the initial filters and sort, first page. Page size is kept.
    pub fn clear_filters(&mut self) {
        let size = self.query.page.size;
        self.query = self.initial.clone();
        self.query.page = PageSpec::first(size);
        debug!("filters cleared");
    }

    pub fn render(&self) -> Result<ViewResult<'_, R>, ViewError> {
        self.query.run(&self.records)
    }

    /// Filtered and sorted records for export, ignoring pagination.
    pub fn export_rows(&self) -> Result<Vec<&R>, ViewError> {
        self.query.derive(&self.records)
    }

    fn reset_page(&mut self) {
        self.query.page.number = 1;
    }

    fn refresh_status_counts(&mut self) -> Result<(), ViewError> {
        self.status_counts = match &self.status_field {
            Some(status) => {
                let values: Vec<&str> = status.values.iter().map(|v| v.as_str()).collect();
                Some(status_counts(&self.records, &status.field, &values)?)
            }
            None => None,
        };
        Ok(())
    }
}

fn same_slot(a: &FilterSpec, b: &FilterSpec) -> bool {
    match (a, b) {
        (FilterSpec::Text { fields: fa, .. }, FilterSpec::Text { fields: fb, .. }) => fa == fb,
        (FilterSpec::Equals { field: fa, .. }, FilterSpec::Equals { field: fb, .. }) => fa == fb,
        (FilterSpec::Presence { field: fa, .. }, FilterSpec::Presence { field: fb, .. }) => fa == fb,
        (FilterSpec::Custom { name: na, .. }, FilterSpec::Custom { name: nb, .. }) => na == nb,
        _ => false,
    }
}
