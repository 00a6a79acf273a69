//! Page-number pagination primitives shared by list endpoints.
//!
//! Clients send a 1-indexed `page` and a `limit`. Both are normalised rather
//! than rejected: a missing or non-positive page becomes the first page, and a
//! missing or out-of-range limit falls back to [`DEFAULT_PAGE_SIZE`]. Results
//! travel in a [`Page`] envelope that also reports the total number of
//! matching records, ignoring pagination, so clients can render page
//! controls.

use serde::{Deserialize, Serialize};

/// Page size used when the client omits `limit` or supplies an invalid value.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Normalised pagination request.
///
/// ## Invariants
/// - `page >= 1`
/// - `1 <= limit <= MAX_PAGE_SIZE`
///
/// # Examples
/// ```
/// use pagination::{PageRequest, DEFAULT_PAGE_SIZE};
///
/// let request = PageRequest::new(Some(0), Some(500));
/// assert_eq!(request.page(), 1);
/// assert_eq!(request.limit(), DEFAULT_PAGE_SIZE);
/// assert_eq!(PageRequest::new(Some(3), Some(20)).offset(), 40);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Build a request from raw client values, normalising out-of-range input.
    #[must_use]
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page
            .and_then(|value| u32::try_from(value).ok())
            .filter(|value| *value >= 1)
            .unwrap_or(1);
        let limit = limit
            .and_then(|value| u32::try_from(value).ok())
            .filter(|value| (1..=MAX_PAGE_SIZE).contains(value))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self { page, limit }
    }

    /// First page with the default page size.
    #[must_use]
    pub const fn first() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }

    /// 1-indexed page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of records to skip before the first item of this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// Page of results plus the total count of matching records.
///
/// # Examples
/// ```
/// use pagination::{Page, PageRequest};
///
/// let request = PageRequest::new(Some(2), Some(2));
/// let page = Page::from_slice(vec![1, 2, 3, 4, 5], request);
/// assert_eq!(page.items, vec![3, 4]);
/// assert_eq!(page.total, 5);
/// assert_eq!(page.total_pages(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on the requested page.
    pub items: Vec<T>,
    /// Total number of matching records across all pages.
    pub total: u64,
    /// 1-indexed page number that was served.
    pub page: u32,
    /// Page size that was applied.
    pub limit: u32,
}

impl<T> Page<T> {
    /// Wrap an already-paginated slice of items.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
        }
    }

    /// Paginate a fully materialised, already-filtered result set.
    #[must_use]
    pub fn from_slice(all: Vec<T>, request: PageRequest) -> Self {
        let total = u64::try_from(all.len()).unwrap_or(u64::MAX);
        let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(request.limit).unwrap_or(usize::MAX);
        let items = all.into_iter().skip(skip).take(take).collect();
        Self::new(items, total, request)
    }

    /// Number of pages needed to show every matching record.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit as u64)
    }

    /// Convert every item while keeping the paging metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}
