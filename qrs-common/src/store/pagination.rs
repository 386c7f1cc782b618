//! Page arithmetic for the recency-ordered record view

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default number of records per page
pub const PAGE_CAPACITY: usize = 10;

/// How page numbers below 1 are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PagingPolicy {
    /// Reject with [`Error::InvalidPage`]
    #[default]
    Strict,
    /// Answer with an empty page
    Lenient,
}

/// Pagination metadata for a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// Matching records
    pub total_records: usize,
    /// Total number of pages (0 for an empty set)
    pub total_pages: usize,
    pub page_capacity: usize,
}

impl PageInfo {
    pub fn new(total_records: usize, page_capacity: usize) -> Self {
        let page_capacity = page_capacity.max(1);
        Self {
            total_records,
            total_pages: total_records.div_ceil(page_capacity),
            page_capacity,
        }
    }
}

/// Slice bounds for a 1-based page
///
/// `Ok(None)` means the page lies past the end or was refused leniently.
///
/// # Examples
/// ```
/// use qrs_common::store::pagination::{page_bounds, PagingPolicy};
///
/// // 25 records, 10 per page: 10 + 10 + 5
/// assert_eq!(page_bounds(25, 10, 1, PagingPolicy::Strict).unwrap(), Some(0..10));
/// assert_eq!(page_bounds(25, 10, 3, PagingPolicy::Strict).unwrap(), Some(20..25));
/// assert_eq!(page_bounds(25, 10, 4, PagingPolicy::Strict).unwrap(), None);
/// assert!(page_bounds(25, 10, 0, PagingPolicy::Strict).is_err());
/// ```
pub fn page_bounds(
    total: usize,
    page_capacity: usize,
    page: i64,
    policy: PagingPolicy,
) -> Result<Option<std::ops::Range<usize>>> {
    if page < 1 {
        return match policy {
            PagingPolicy::Strict => Err(Error::InvalidPage(page)),
            PagingPolicy::Lenient => Ok(None),
        };
    }
    let page_capacity = page_capacity.max(1);
    let start = usize::try_from(page - 1)
        .ok()
        .and_then(|p| p.checked_mul(page_capacity));
    match start {
        Some(start) if start < total => Ok(Some(start..(start + page_capacity).min(total))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_info_normal() {
        let p = PageInfo::new(250, 100);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.total_records, 250);
    }

    #[test]
    fn test_page_info_exact_boundary_and_empty() {
        assert_eq!(PageInfo::new(200, 100).total_pages, 2);
        assert_eq!(PageInfo::new(0, 10).total_pages, 0);
    }

    #[test]
    fn test_page_info_zero_capacity_treated_as_one() {
        let p = PageInfo::new(3, 0);
        assert_eq!(p.page_capacity, 1);
        assert_eq!(p.total_pages, 3);
    }

    #[test]
    fn test_bounds_first_and_last_page() {
        assert_eq!(page_bounds(150, 100, 1, PagingPolicy::Strict).unwrap(), Some(0..100));
        assert_eq!(page_bounds(150, 100, 2, PagingPolicy::Strict).unwrap(), Some(100..150));
    }

    #[test]
    fn test_bounds_out_of_range_high_is_empty() {
        assert_eq!(page_bounds(150, 100, 3, PagingPolicy::Strict).unwrap(), None);
        assert_eq!(page_bounds(150, 100, i64::MAX, PagingPolicy::Strict).unwrap(), None);
        assert_eq!(page_bounds(0, 10, 1, PagingPolicy::Strict).unwrap(), None);
    }

    #[test]
    fn test_bounds_low_depends_on_policy() {
        assert!(matches!(
            page_bounds(150, 100, 0, PagingPolicy::Strict),
            Err(Error::InvalidPage(0))
        ));
        assert!(matches!(
            page_bounds(150, 100, -3, PagingPolicy::Strict),
            Err(Error::InvalidPage(-3))
        ));
        assert_eq!(page_bounds(150, 100, 0, PagingPolicy::Lenient).unwrap(), None);
    }
}
