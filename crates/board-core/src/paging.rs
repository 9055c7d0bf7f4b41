//! Page requests and the page-link window shown under a listing.

use serde::{Deserialize, Serialize};

/// Number of page links shown per window.
pub const BLOCK_COUNT: u64 = 5;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Highest page number accepted; keeps every row offset within a signed 64-bit `OFFSET`.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PAGE_SIZE;

/// Request for one page of results. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a request, clamping out-of-range values instead of rejecting them.
    pub fn new(page: u64, size: u64) -> Self {
        let size = match size {
            0 => DEFAULT_PAGE_SIZE,
            s => s.min(MAX_PAGE_SIZE),
        };
        Self {
            page: page.clamp(1, MAX_PAGE),
            size,
        }
    }

    /// Zero-based page index.
    pub fn index(&self) -> u64 {
        self.page.clamp(1, MAX_PAGE) - 1
    }

    /// Rows per page, within `1..=MAX_PAGE_SIZE`.
    pub fn limit(&self) -> u64 {
        self.size.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        self.index() * self.limit()
    }
}

/// Pagination metadata for one page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub current_page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub block_count: u64,
    pub window_start: u64,
    pub window_end: u64,
    /// Last page of the previous window, if there is one.
    pub prev_window: Option<u64>,
    /// First page of the next window, if there is one.
    pub next_window: Option<u64>,
}

impl Paging {
    pub fn new(request: PageRequest, total_items: u64) -> Self {
        Self::with_block_count(request, total_items, BLOCK_COUNT)
    }

    pub fn with_block_count(request: PageRequest, total_items: u64, block_count: u64) -> Self {
        let block_count = block_count.max(1);
        let page_size = request.limit();
        let total_pages = total_items.div_ceil(page_size).max(1);
        let current_page = request.index() + 1;

        let window_start = ((current_page - 1) / block_count) * block_count + 1;
        let window_end = window_start
            .saturating_add(block_count - 1)
            .min(total_pages)
            .max(window_start);

        Self {
            current_page,
            page_size,
            total_items,
            total_pages,
            block_count,
            window_start,
            window_end,
            prev_window: (window_start > 1).then(|| window_start - 1),
            next_window: (window_end < total_pages).then(|| window_end + 1),
        }
    }
}

/// A page of items plus its pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub paging: Paging,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            paging: Paging::new(request, total_items),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            paging: self.paging,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_clamping() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req.page, 1);
        assert_eq!(req.size, DEFAULT_PAGE_SIZE);

        let req = PageRequest::new(3, 1000);
        assert_eq!(req.size, MAX_PAGE_SIZE);
        assert_eq!(req.index(), 2);
        assert_eq!(req.offset(), 200);
    }

    #[test]
    fn test_huge_page_is_capped() {
        let req = PageRequest::new(u64::MAX, MAX_PAGE_SIZE);
        assert_eq!(req.page, MAX_PAGE);
        assert!(req.offset() <= i64::MAX as u64);

        // built directly, bypassing `new`
        let req = PageRequest {
            page: u64::MAX,
            size: u64::MAX,
        };
        assert_eq!(req.limit(), MAX_PAGE_SIZE);
        assert!(req.offset() <= i64::MAX as u64);

        let paging = Paging::new(req, 3);
        assert_eq!(paging.current_page, MAX_PAGE);
        assert_eq!(paging.total_pages, 1);
        assert_eq!(paging.next_window, None);
    }

    #[test]
    fn test_empty_listing_has_one_page() {
        let paging = Paging::new(PageRequest::default(), 0);
        assert_eq!(paging.total_pages, 1);
        assert_eq!(paging.window_start, 1);
        assert_eq!(paging.window_end, 1);
        assert_eq!(paging.prev_window, None);
        assert_eq!(paging.next_window, None);
    }

    #[test]
    fn test_first_window() {
        // 95 items at 10 per page -> 10 pages
        let paging = Paging::new(PageRequest::new(3, 10), 95);
        assert_eq!(paging.total_pages, 10);
        assert_eq!(paging.window_start, 1);
        assert_eq!(paging.window_end, 5);
        assert_eq!(paging.prev_window, None);
        assert_eq!(paging.next_window, Some(6));
    }

    #[test]
    fn test_last_partial_window() {
        let paging = Paging::new(PageRequest::new(11, 10), 120);
        assert_eq!(paging.total_pages, 12);
        assert_eq!(paging.window_start, 11);
        assert_eq!(paging.window_end, 12);
        assert_eq!(paging.prev_window, Some(10));
        assert_eq!(paging.next_window, None);
    }

    #[test]
    fn test_window_boundary() {
        let paging = Paging::new(PageRequest::new(5, 10), 100);
        assert_eq!(paging.window_start, 1);
        assert_eq!(paging.window_end, 5);

        let paging = Paging::new(PageRequest::new(6, 10), 100);
        assert_eq!(paging.window_start, 6);
        assert_eq!(paging.window_end, 10);
        assert_eq!(paging.next_window, None);
    }

    #[test]
    fn test_page_past_the_end_keeps_its_window() {
        let paging = Paging::new(PageRequest::new(9, 10), 15);
        assert_eq!(paging.total_pages, 2);
        assert_eq!(paging.window_start, 6);
        assert_eq!(paging.window_end, 6);
        assert_eq!(paging.prev_window, Some(5));
    }

    #[test]
    fn test_map_preserves_paging() {
        let page = Page::new(vec![1, 2, 3], PageRequest::new(1, 3), 7);
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20, 30]);
        assert_eq!(mapped.paging.total_pages, 3);
    }
}
