// ABOUTME: Pagination utilities for list views
// ABOUTME: Page query parameters and the metadata returned alongside a page

use serde::{Deserialize, Serialize};

/// Minimum page number (1-indexed)
pub const MIN_PAGE: i64 = 1;

/// Query parameters accepted by paginated views
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

/// Page number plus the page size configured on the view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaginationParams {
    pub page: i64,
    pub limit: i64,
}

impl PaginationParams {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }

    /// Get SQL LIMIT clause value
    pub fn limit(&self) -> i64 {
        self.limit.max(1)
    }

    /// Get SQL OFFSET clause value, `None` when the page is too large to address
    pub fn offset(&self) -> Option<i64> {
        (self.page() - 1).checked_mul(self.limit())
    }

    /// Get the current page number
    pub fn page(&self) -> i64 {
        self.page.max(MIN_PAGE)
    }
}

/// Metadata about pagination state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginationMeta {
    /// Current page number (1-indexed)
    pub page: i64,

    #[serde(rename = "pageSize")]
    pub page_size: i64,

    #[serde(rename = "totalItems")]
    pub total_items: i64,

    #[serde(rename = "totalPages")]
    pub total_pages: i64,

    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,

    #[serde(rename = "hasPreviousPage")]
    pub has_previous_page: bool,
}

impl PaginationMeta {
    /// Create pagination metadata from params and total count
    pub fn new(params: &PaginationParams, total_items: i64) -> Self {
        let page = params.page();
        let page_size = params.limit();
        let total_pages = if total_items > 0 {
            (total_items - 1) / page_size + 1
        } else {
            0
        };

        Self {
            page,
            page_size,
            total_items,
            total_pages,
            has_next_page: page < total_pages,
            has_previous_page: page > MIN_PAGE,
        }
    }

    /// A page past the end is invalid, except the first page of an empty list
    pub fn is_out_of_range(&self) -> bool {
        self.page > self.total_pages.max(MIN_PAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params_validation() {
        let params = PaginationParams::new(-5, 10);
        assert_eq!(params.page(), 1);
        assert_eq!(params.offset(), Some(0));

        let params = PaginationParams::new(1, 0);
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn test_pagination_offset_calculation() {
        assert_eq!(PaginationParams::new(1, 20).offset(), Some(0));
        assert_eq!(PaginationParams::new(2, 20).offset(), Some(20));
        assert_eq!(PaginationParams::new(3, 10).offset(), Some(20));
    }

    #[test]
    fn test_huge_page_has_no_offset() {
        assert_eq!(PaginationParams::new(i64::MAX, 2).offset(), None);

        let meta = PaginationMeta::new(&PaginationParams::new(i64::MAX, 2), 3);
        assert!(meta.is_out_of_range());

        let meta = PaginationMeta::new(&PaginationParams::new(1, i64::MAX), 3);
        assert_eq!(meta.total_pages, 1);
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(&PaginationParams::new(1, 20), 100);

        assert_eq!(meta.total_pages, 5);
        assert!(meta.has_next_page);
        assert!(!meta.has_previous_page);
        assert!(!meta.is_out_of_range());
    }

    #[test]
    fn test_pagination_meta_last_page() {
        let meta = PaginationMeta::new(&PaginationParams::new(5, 20), 100);

        assert!(!meta.has_next_page);
        assert!(meta.has_previous_page);
    }

    #[test]
    fn test_out_of_range_pages() {
        assert!(PaginationMeta::new(&PaginationParams::new(6, 20), 100).is_out_of_range());
        assert!(!PaginationMeta::new(&PaginationParams::new(1, 20), 0).is_out_of_range());
        assert!(PaginationMeta::new(&PaginationParams::new(2, 20), 0).is_out_of_range());
    }
}
