//! Pagination utilities for service layer
//!
//! Raw caller input is signed so that out-of-range values (0, negatives) can be
//! coerced instead of rejected. `normalize` turns it into a `PageWindow` whose
//! offset arithmetic can neither go negative nor overflow the store's BIGINT.

/// Pagination parameters as received from callers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index; `None` or `<= 0` means the first page
    pub page: Option<i64>,
    /// items per page; `None` or `<= 0` means the configured default
    pub per_page: Option<i64>,
}

/// A clamped, ready-to-query page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page index, always >= 1
    pub page: u64,
    /// items per page, always within `1..=max_per_page`
    pub per_page: u64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self { page: Some(page), per_page: Some(per_page) }
    }

    /// Clamp page and size independently, before any offset arithmetic.
    pub fn normalize(self, default_per_page: u64, max_per_page: u64) -> PageWindow {
        let page = match self.page {
            Some(p) if p > 0 => p.unsigned_abs(),
            _ => 1,
        };
        let per_page = match self.per_page {
            Some(s) if s > 0 => s.unsigned_abs(),
            _ => default_per_page,
        };
        PageWindow { page, per_page: per_page.clamp(1, max_per_page.max(1)) }
    }
}

impl PageWindow {
    pub fn limit(&self) -> u64 { self.per_page }

    /// `(page - 1) * per_page`, saturated to the largest value a BIGINT bind accepts.
    pub fn offset(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.per_page)
            .min(i64::MAX.unsigned_abs())
    }
}

/// `ceil(total_items / per_page)`; zero items is zero pages.
pub fn total_pages(total_items: u64, per_page: u64) -> u64 {
    if per_page == 0 { return 0; }
    total_items.div_ceil(per_page)
}
