/// FolioView Collection View
///
/// The view engine every list page runs on each interaction: filter, sort,
/// then cut out one page. It is a pure function of its arguments. It keeps no
/// state between calls, never mutates the caller's records, and returns
/// borrowed references into them.
///
/// Resetting the page to 1 after a filter or page-size change is the
/// caller's job (see `ListState`), since a stateless call cannot tell that
/// anything changed.
///
/// # Examples
///
/// ```
/// use folioview::{view, FilterSpec, PageSpec, Record, SortSpec};
///
/// let records = vec![
///     Record::new().with("id", 1i64).with("status", "active").with("createdAt", "2024-01-01"),
///     Record::new().with("id", 2i64).with("status", "pending").with("createdAt", "2024-02-01"),
///     Record::new().with("id", 3i64).with("status", "active").with("createdAt", "2024-03-01"),
/// ];
///
/// let result = view(
///     &records,
///     &[FilterSpec::equals("status", "active")],
///     &SortSpec::default(),
///     &PageSpec::first(10),
/// )
/// .unwrap();
///
/// assert_eq!(result.filtered_count, 2);
/// assert_eq!(result.visible[0].get("id").and_then(|v| v.as_i64()), Some(3));
/// ```

use crate::error::ViewError;
use crate::filter::FilterSpec;
use crate::page::{PageInfo, PageSpec};
use crate::record::Fields;
use crate::sort::SortSpec;
use log::trace;

/// Page size the dashboard starts with.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Output of one `view` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewResult<'a, R> {
    /// The visible slice, in sorted order
    pub visible: Vec<&'a R>,
    /// Size of the full record set
    pub total_count: usize,
    /// Records left after filtering
    pub filtered_count: usize,
    pub page_count: usize,
    /// Clamped page and the values needed for pagination controls
    pub page: PageInfo,
}

impl<R> ViewResult<'_, R> {
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// 1-based `(first, last)` of the visible slice within the filtered set.
    pub fn range(&self) -> Option<(usize, usize)> {
        self.page.range()
    }
}

/// Filter, sort and paginate `records`.
///
/// Fails only with `InvalidArgument`: a zero page size or a malformed
/// filter or sort. Unknown fields, missing values and empty input are not
/// errors.
pub fn view<'a, R: Fields>(
    records: &'a [R],
    filters: &[FilterSpec],
    sort: &SortSpec,
    page: &PageSpec,
) -> Result<ViewResult<'a, R>, ViewError> {
    page.validate()?;
    let sorted = derive(records, filters, sort)?;

    let info = PageInfo::new(page, sorted.len());
    let (start, end) = page.bounds(sorted.len());
    trace!(
        "view: {} of {} records match, page {}/{} ({}..{})",
        sorted.len(),
        records.len(),
        info.page,
        info.page_count,
        start,
        end
    );

    let filtered_count = sorted.len();
    let visible = sorted[start..end].to_vec();
    Ok(ViewResult {
        visible,
        total_count: records.len(),
        filtered_count,
        page_count: info.page_count,
        page: info,
    })
}

/// Filtered and sorted sequence without pagination. This is what exports
/// consume.
pub fn derive<'a, R: Fields>(
    records: &'a [R],
    filters: &[FilterSpec],
    sort: &SortSpec,
) -> Result<Vec<&'a R>, ViewError> {
    sort.validate()?;
    let filtered = filter_records(records, filters)?;
    Ok(sort.sort(filtered))
}

/// Apply every filter in declaration order, keeping input order.
pub fn filter_records<'a, R: Fields>(
    records: &'a [R],
    filters: &[FilterSpec],
) -> Result<Vec<&'a R>, ViewError> {
    for filter in filters {
        filter.validate()?;
    }

    let matchers: Vec<_> = filters
        .iter()
        .filter(|f| f.is_active())
        .map(|f| f.compile())
        .collect();

    Ok(records
        .iter()
        .filter(|record| matchers.iter().all(|m| m.matches(*record)))
        .collect())
}

/// Filters, sort and page bundled together: the view parameters a list page
/// keeps between renders.
#[derive(Debug, Clone)]
pub struct ViewQuery {
    pub filters: Vec<FilterSpec>,
    pub sort: SortSpec,
    pub page: PageSpec,
}

impl Default for ViewQuery {
    fn default() -> Self {
        ViewQuery {
            filters: Vec::new(),
            sort: SortSpec::default(),
            page: PageSpec::first(DEFAULT_PAGE_SIZE),
        }
    }
}

impl ViewQuery {
    pub fn new() -> Self {
        ViewQuery::default()
    }

    pub fn filter(mut self, filter: FilterSpec) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sort_by(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(mut self, page: PageSpec) -> Self {
        self.page = page;
        self
    }

    /// Filters that currently constrain the result (for "active filter"
    /// chips and the clear-filters button).
    pub fn active_filters(&self) -> Vec<&FilterSpec> {
        self.filters.iter().filter(|f| f.is_active()).collect()
    }

    pub fn run<'a, R: Fields>(&self, records: &'a [R]) -> Result<ViewResult<'a, R>, ViewError> {
        view(records, &self.filters, &self.sort, &self.page)
    }

    pub fn derive<'a, R: Fields>(&self, records: &'a [R]) -> Result<Vec<&'a R>, ViewError> {
        derive(records, &self.filters, &self.sort)
    }
}
