//! Pagination parameters for list operations.

use serde::{Deserialize, Serialize};

/// Parameters for paginating through large result sets.
///
/// Pages are 1-indexed (page 1 is the first page). The boundary parses these
/// from the request and the service translates them into query limit/offset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PaginationParams {
    /// The page number (1-indexed).
    pub page: usize,
    /// Number of items per page.
    pub per_page: usize,
}

impl PaginationParams {
    /// Creates new pagination parameters.
    pub fn new(page: usize, per_page: usize) -> Self {
        Self { page, per_page }
    }

    /// Calculates the number of items to skip for this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) * self.per_page
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_skips_whole_pages() {
        assert_eq!(PaginationParams::new(1, 10).offset(), 0);
        assert_eq!(PaginationParams::new(2, 50).offset(), 50);
        assert_eq!(PaginationParams::new(3, 20).offset(), 40);
    }

    #[test]
    fn page_zero_clamps_to_the_first_page() {
        assert_eq!(PaginationParams::new(0, 10).offset(), 0);
    }
}
