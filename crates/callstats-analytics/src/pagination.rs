//! Pagination window
//!
//! Stateless, zero-based windowing over any slice. Stale page indexes clamp to
//! the last page instead of failing.

use serde::Serialize;

/// `ceil(total / page_size)`; `0` when there is nothing to page
#[inline]
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Page index actually served for a request
fn effective_index(total: usize, page_index: usize, page_size: usize) -> usize {
    page_index.min(total_pages(total, page_size).saturating_sub(1))
}

/// Items on page `page_index`, clamped to the last page
pub fn page<T>(items: &[T], page_index: usize, page_size: usize) -> &[T] {
    if page_size == 0 || items.is_empty() {
        return &[];
    }

    let start = effective_index(items.len(), page_index, page_size) * page_size;
    let end = (start + page_size).min(items.len());
    &items[start..end]
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: usize,
    /// Effective zero-based page
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

/// One page plus its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

/// Like [`page`], with metadata and owned items
pub fn paginate<T: Clone>(items: &[T], page_index: usize, page_size: usize) -> Page<T> {
    let total = items.len();
    Page {
        items: page(items, page_index, page_size).to_vec(),
        meta: PageMeta {
            total,
            page: effective_index(total, page_index, page_size),
            per_page: page_size,
            total_pages: total_pages(total, page_size),
        },
    }
}
