//! # Errors
//!
//! Invalid client input is never an error here: fields and operators outside the
//! policy are dropped, and filters with a malformed value are skipped. What is
//! left are programming and backend failures:
//!
//! - [`QueryError::ConditionsNotSet`]: a [`ConditionsHandle`](crate::filtering::ConditionsHandle)
//!   was applied before any request was sanitized through it
//! - [`QueryError::CountFailed`]: the count round-trip failed. Never retried
//! - [`QueryError::InvalidSettings`]: a policy could not be parsed
//!
//! Backend details are logged with `tracing` where the failure happens; the
//! `Display` text stays generic so it can be shown to clients.

use sea_orm::DbErr;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// `apply` was called before the conditions were sanitized
    #[error("query conditions were applied before being set")]
    ConditionsNotSet,

    /// The count query against the filtered set failed
    #[error("failed to count matching records")]
    CountFailed(#[source] DbErr),

    /// A policy document could not be parsed
    #[error("invalid query settings: {0}")]
    InvalidSettings(#[from] serde_json::Error),
}

impl QueryError {
    /// Log the internal details, the same way for every call site.
    pub(crate) fn count_failed(err: DbErr) -> Self {
        tracing::error!(error = ?err, "Count query failed");
        Self::CountFailed(err)
    }
}
