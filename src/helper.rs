//! # Query Helper
//!
//! [`QueryHelper`] runs a whole list request: sanitize the conditions against a
//! [`QuerySettings`], attach them to the query, count, then page.
//!
//! ```rust,ignore
//! let mut helper = QueryHelper::from_request(request);
//! let applied = helper
//!     .apply(&settings, Some(SelectQuery::new(product::Entity::find(), &db)))
//!     .await?;
//!
//! let Applied::Query(query) = applied else { unreachable!() };
//! let rows = query.into_inner().all(&db).await?;
//! let info = helper.info(); // {pagination: {...}, conditions: {...}}
//! ```
//!
//! A helper is built for one request. Calling [`apply`](QueryHelper::apply)
//! again re-runs everything and replaces the previous info.

use serde::Serialize;
use serde_json::Value as Json;
use utoipa::ToSchema;

use crate::backend::QueryTarget;
use crate::errors::QueryError;
use crate::filtering::{ConditionsHandle, Rejection};
use crate::models::{QueryConditions, QueryRequest, RawFilter};
use crate::pagination::{PaginationHandle, PaginationInfo};
use crate::settings::QuerySettings;

/// What [`QueryHelper::apply`] produced.
#[derive(Debug)]
pub enum Applied<T> {
    /// The query with predicates, ordering and paging attached
    Query(T),
    /// No query was given; conditions were sanitized and nothing else ran
    NoTarget,
}

impl<T> Applied<T> {
    /// The query, if there was one.
    pub fn into_query(self) -> Option<T> {
        match self {
            Self::Query(query) => Some(query),
            Self::NoTarget => None,
        }
    }
}

/// Metadata echoed back to the client after a list request.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct QueryHelperInfo {
    /// Absent when no query was counted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInfo>,
    pub conditions: QueryConditions,
}

/// Request-scoped orchestrator for search, filter, sort and pagination.
#[derive(Debug, Clone, Default)]
pub struct QueryHelper {
    request: QueryRequest,
    info: Option<QueryHelperInfo>,
    rejected: Vec<Rejection>,
}

impl QueryHelper {
    #[must_use]
    pub fn builder() -> QueryHelperBuilder {
        QueryHelperBuilder::default()
    }

    /// Wrap a deserialized client payload.
    #[must_use]
    pub fn from_request(request: QueryRequest) -> Self {
        Self {
            request,
            info: None,
            rejected: Vec::new(),
        }
    }

    /// The untrusted request this helper was built from.
    #[must_use]
    pub const fn request(&self) -> &QueryRequest {
        &self.request
    }

    /// Sanitize against `settings`, then attach conditions and pagination to
    /// `target`.
    ///
    /// With no target this is a dry run: the sanitized conditions are recorded
    /// and [`Applied::NoTarget`] is returned without touching the database.
    ///
    /// # Errors
    ///
    /// [`QueryError::CountFailed`] when the count query fails. The helper's
    /// info is left unset in that case.
    pub async fn apply<T: QueryTarget>(
        &mut self,
        settings: &QuerySettings,
        target: Option<T>,
    ) -> Result<Applied<T>, QueryError> {
        self.info = None;

        let mut conditions = ConditionsHandle::new(Some(settings));
        let sanitized = conditions.update_conditions(&self.request.conditions).clone();
        self.rejected = conditions.rejected().to_vec();

        let Some(target) = target else {
            tracing::debug!("No query target, recording sanitized conditions only");
            self.info = Some(QueryHelperInfo {
                pagination: None,
                conditions: sanitized,
            });
            return Ok(Applied::NoTarget);
        };

        let target = conditions.apply(target)?;

        let mut pagination = PaginationHandle::new(&self.request.pagination);
        let target = pagination.apply(target).await?;

        self.info = Some(QueryHelperInfo {
            pagination: pagination.current_info().copied(),
            conditions: sanitized,
        });
        Ok(Applied::Query(target))
    }

    /// Pagination and sanitized conditions from the last successful
    /// [`apply`](Self::apply).
    #[must_use]
    pub const fn info(&self) -> Option<&QueryHelperInfo> {
        self.info.as_ref()
    }

    /// Everything the last [`apply`](Self::apply) dropped from the request.
    #[must_use]
    pub fn rejected(&self) -> &[Rejection] {
        &self.rejected
    }
}

/// Builds a [`QueryHelper`] field by field.
///
/// Anything left unset takes the same default as a missing key in a JSON
/// request.
#[derive(Debug, Clone, Default)]
pub struct QueryHelperBuilder {
    request: QueryRequest,
}

impl QueryHelperBuilder {
    /// 1-based page; values below 1 become 1
    #[must_use]
    pub const fn page(mut self, page: i64) -> Self {
        self.request.pagination.page = page;
        self
    }

    /// Rows per page; clamped to 1..=100, 0 or less means 10
    #[must_use]
    pub const fn page_size(mut self, page_size: i64) -> Self {
        self.request.pagination.page_size = page_size;
        self
    }

    #[must_use]
    pub fn search_text(mut self, text: impl Into<String>) -> Self {
        self.request.conditions.search_text = text.into();
        self
    }

    #[must_use]
    pub fn search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request.conditions.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn order_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request.conditions.order_by = fields.into_iter().map(Into::into).collect();
        self
    }

    /// `1` ascending, `-1` descending, `0` for the settings default
    #[must_use]
    pub const fn sort_factor(mut self, factor: i32) -> Self {
        self.request.conditions.sort_factor = factor;
        self
    }

    /// Replace all filters
    #[must_use]
    pub fn filters(mut self, filters: Vec<RawFilter>) -> Self {
        self.request.conditions.filters = filters;
        self
    }

    /// Append one filter
    #[must_use]
    pub fn filter(
        mut self,
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Json>,
    ) -> Self {
        self.request
            .conditions
            .filters
            .push(RawFilter::new(field, operator, value));
        self
    }

    #[must_use]
    pub fn build(self) -> QueryHelper {
        QueryHelper::from_request(self.request)
    }
}
