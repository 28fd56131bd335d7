//! # Page-Based Pagination
//!
//! Clients send `page` (1-based) and `page_size`; [`PaginationHandle`] clamps
//! them, counts the filtered query, and applies `OFFSET`/`LIMIT`.
//!
//! | input              | normalized              |
//! |--------------------|-------------------------|
//! | `page <= 0`        | [`DEFAULT_PAGE`]        |
//! | `page_size <= 0`   | [`DEFAULT_PAGE_SIZE`]   |
//! | `page_size > 100`  | [`MAX_PAGE_SIZE`]       |
//!
//! Pages past the end are allowed and simply return no rows.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::backend::QueryTarget;
use crate::errors::QueryError;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Largest OFFSET the SQL drivers can bind; they take it as a signed 64-bit integer.
pub const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

/// Rows skipped before `page`, capped at [`MAX_OFFSET`].
const fn page_offset(page: u64, page_size: u64) -> u64 {
    let offset = page.saturating_sub(1).saturating_mul(page_size);
    if offset > MAX_OFFSET { MAX_OFFSET } else { offset }
}

/// Raw page request from the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PaginationRequest {
    /// 1-based page number
    pub page: i64,
    /// Rows per page
    pub page_size: i64,
}

impl PaginationRequest {
    #[must_use]
    pub const fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    /// Clamp to `(page, page_size)` with `page >= 1` and
    /// `1 <= page_size <= MAX_PAGE_SIZE`.
    #[must_use]
    pub fn normalize(&self) -> (u64, u64) {
        let page = u64::try_from(self.page)
            .ok()
            .filter(|page| *page > 0)
            .unwrap_or(DEFAULT_PAGE);
        let page_size = u64::try_from(self.page_size)
            .ok()
            .filter(|size| *size > 0)
            .map_or(DEFAULT_PAGE_SIZE, |size| size.min(MAX_PAGE_SIZE));
        (page, page_size)
    }
}

/// Number of pages needed for `total` rows. An empty result is still one page.
#[must_use]
pub const fn total_pages(total: u64, page_size: u64) -> u64 {
    if total == 0 || page_size == 0 {
        1
    } else {
        total.div_ceil(page_size)
    }
}

/// Pagination metadata, known once the count has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationInfo {
    pub page: u64,
    pub page_size: u64,
    /// Rows matching the filters, across all pages
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationInfo {
    #[must_use]
    pub const fn offset(&self) -> u64 {
        page_offset(self.page, self.page_size)
    }

    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }

    #[must_use]
    pub const fn has_previous_page(&self) -> bool {
        self.page > 1
    }

    /// A `Content-Range` style summary, e.g. `products 0-9/42`.
    ///
    /// Control and non-ASCII characters are removed from `resource` so the
    /// result is safe to put in a header.
    #[must_use]
    pub fn content_range(&self, resource: &str) -> String {
        let safe_name: String = resource
            .chars()
            .filter(|c| c.is_ascii() && !c.is_ascii_control())
            .collect();
        let first = self.offset();
        let last = first
            .saturating_add(self.page_size)
            .saturating_sub(1)
            .min(self.total.saturating_sub(1).max(first));
        format!("{safe_name} {first}-{last}/{}", self.total)
    }
}

/// Normalized page request plus the metadata produced by [`apply`](Self::apply).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationHandle {
    page: u64,
    page_size: u64,
    info: Option<PaginationInfo>,
}

impl PaginationHandle {
    #[must_use]
    pub fn new(request: &PaginationRequest) -> Self {
        let (page, page_size) = request.normalize();
        Self {
            page,
            page_size,
            info: None,
        }
    }

    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    #[must_use]
    pub const fn offset(&self) -> u64 {
        page_offset(self.page, self.page_size)
    }

    /// Total matching rows; `None` until the count has run.
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.info.map(|info| info.total)
    }

    #[must_use]
    pub fn total_pages(&self) -> Option<u64> {
        self.info.map(|info| info.total_pages)
    }

    #[must_use]
    pub const fn current_info(&self) -> Option<&PaginationInfo> {
        self.info.as_ref()
    }

    /// Count `target` as it is, record the totals, then page it.
    ///
    /// The count runs against whatever predicates are already attached, so
    /// filters must be applied first for the totals to describe the filtered set.
    pub async fn apply<T: QueryTarget>(&mut self, target: T) -> Result<T, QueryError> {
        let total = target.count().await.map_err(QueryError::count_failed)?;

        let info = PaginationInfo {
            page: self.page,
            page_size: self.page_size,
            total,
            total_pages: total_pages(total, self.page_size),
        };
        tracing::trace!(
            page = info.page,
            page_size = info.page_size,
            total = info.total,
            total_pages = info.total_pages,
            "Applying pagination"
        );
        self.info = Some(info);

        Ok(target.offset(self.offset()).limit(self.page_size))
    }
}
