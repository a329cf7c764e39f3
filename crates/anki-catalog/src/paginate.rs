//! Page arithmetic for listings.

use serde::Serialize;

/// Cards per page on the public catalog.
pub const CATALOG_PAGE_SIZE: i64 = 30;

/// Cards per page on the moderation list.
pub const ADMIN_PAGE_SIZE: i64 = 20;

/// Page arithmetic over a result set of `count` rows.
///
/// An empty result set still has one (empty) page, and page lookups never
/// fail: anything unparsable lands on the first page and anything past the
/// end lands on the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    /// Rows in the whole result set.
    pub count: i64,
    /// Rows per page, at least 1.
    pub per_page: i64,
}

/// A resolved page, ready to be turned into `LIMIT`/`OFFSET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    /// 1-based page number.
    pub number: i64,
    /// Last page number.
    pub num_pages: i64,
    /// Page size the set was split by.
    pub per_page: i64,
    /// Rows in the whole result set.
    pub count: i64,
    /// Whether a page comes before this one.
    pub has_previous: bool,
    /// Whether a page comes after this one.
    pub has_next: bool,
}

impl Paginator {
    /// Negative counts are treated as empty and page sizes below 1 as 1.
    pub const fn new(count: i64, per_page: i64) -> Self {
        Self {
            count: if count < 0 { 0 } else { count },
            per_page: if per_page < 1 { 1 } else { per_page },
        }
    }

    /// Number of pages, never less than 1.
    pub const fn num_pages(&self) -> i64 {
        if self.count == 0 {
            1
        } else {
            (self.count + self.per_page - 1) / self.per_page
        }
    }

    /// Resolve a raw `page` parameter.
    pub fn get_page(&self, raw: Option<&str>) -> Page {
        let last = self.num_pages();
        let number = match raw.map(str::trim) {
            Some("last") => last,
            Some(s) => s.parse::<i64>().map_or(1, |n| n.clamp(1, last)),
            None => 1,
        };
        self.page(number)
    }

    /// Page `number`, clamped into `1..=num_pages`.
    pub const fn page(&self, number: i64) -> Page {
        let last = self.num_pages();
        let number = if number < 1 {
            1
        } else if number > last {
            last
        } else {
            number
        };
        Page {
            number,
            num_pages: last,
            per_page: self.per_page,
            count: self.count,
            has_previous: number > 1,
            has_next: number < last,
        }
    }
}

impl Page {
    /// Rows to skip, for `OFFSET`.
    pub const fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }

    /// Rows to fetch, for `LIMIT`.
    pub const fn limit(&self) -> i64 {
        self.per_page
    }

    /// Rows actually present on this page.
    pub const fn len(&self) -> i64 {
        let remaining = self.count - self.offset();
        if remaining < 0 {
            0
        } else if remaining > self.per_page {
            self.per_page
        } else {
            remaining
        }
    }

    /// True only for the single page of an empty result set.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
