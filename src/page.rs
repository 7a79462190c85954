/// FolioView Pagination
///
/// Page numbers are 1-based. A requested page is always clamped into
/// `[1, page_count]` before slicing, so a stale page number left over from a
/// larger result set still lands on the last real page instead of an empty one.

use crate::error::ViewError;

/// Requested page size and page number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    pub size: usize,
    pub number: usize,
}

impl PageSpec {
    pub fn new(size: usize, number: usize) -> Self {
        PageSpec { size, number }
    }

    /// First page of the given size.
    pub fn first(size: usize) -> Self {
        PageSpec::new(size, 1)
    }

    /// A single unbounded page holding the whole result.
    pub fn all() -> Self {
        PageSpec::new(usize::MAX, 1)
    }

    pub fn validate(&self) -> Result<(), ViewError> {
        if self.size == 0 {
            return Err(ViewError::invalid("page size must be positive"));
        }
        Ok(())
    }

    /// `max(1, ceil(filtered / size))`
    pub fn page_count(&self, filtered: usize) -> usize {
        filtered.div_ceil(self.size).max(1)
    }

    /// Requested page clamped into `[1, page_count]`.
    pub fn clamp(&self, filtered: usize) -> usize {
        self.number.clamp(1, self.page_count(filtered))
    }

    /// Half-open index range of the clamped page.
    pub fn bounds(&self, filtered: usize) -> (usize, usize) {
        let page = self.clamp(filtered);
        let start = (page - 1).saturating_mul(self.size).min(filtered);
        let end = start.saturating_add(self.size).min(filtered);
        (start, end)
    }
}

/// Derived pagination metadata for rendering controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// Current page after clamping
    pub page: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub filtered_count: usize,
}

impl PageInfo {
    pub fn new(spec: &PageSpec, filtered_count: usize) -> Self {
        PageInfo {
            page: spec.clamp(filtered_count),
            page_size: spec.size,
            page_count: spec.page_count(filtered_count),
            filtered_count,
        }
    }

    /// 1-based inclusive positions of the visible slice ("showing 11 to 20
    /// of 42"), or `None` when nothing is visible.
    pub fn range(&self) -> Option<(usize, usize)> {
        let spec = PageSpec::new(self.page_size, self.page);
        let (start, end) = spec.bounds(self.filtered_count);
        (end > start).then_some((start + 1, end))
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }

    /// Numbered page buttons: at most `width` consecutive page numbers that
    /// keep the current page centered, pinned to the first or last page near
    /// the edges.
    pub fn window(&self, width: usize) -> Vec<usize> {
        let total = self.page_count;
        if width == 0 {
            return Vec::new();
        }
        if total <= width {
            return (1..=total).collect();
        }

        let half = width / 2;
        let start = if self.page <= half + 1 {
            1
        } else if self.page + half >= total {
            total - width + 1
        } else {
            self.page - half
        };
        (start..start + width).collect()
    }
}
