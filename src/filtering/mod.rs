//! # Search, Filter & Sort Translation
//!
//! This module turns untrusted client conditions into Sea-Query predicates. It is
//! the security boundary of the crate: only fields and operators listed in a
//! [`QuerySettings`](crate::QuerySettings) ever reach the database, and every
//! value is bound as a parameter.
//!
//! ## Pipeline
//!
//! 1. [`sanitize`] checks the request against the policy, drops whatever is
//!    not allowed and rewrites public field names through the column aliases
//! 2. [`QueryConditions::apply_to`](crate::QueryConditions::apply_to) ANDs the
//!    filters, ANDs in one OR-group for the free text search, and adds the
//!    ORDER BY columns to a [`QueryTarget`](crate::QueryTarget)
//!
//! ## Request Examples
//!
//! ```json
//! {
//!   "search_text": "phone",
//!   "search_fields": ["name", "description"],
//!   "order_by": ["created_at"],
//!   "sort_factor": -1,
//!   "filters": [
//!     {"field": "price", "operator": "BETWEEN", "value": [100, 500]},
//!     {"field": "category", "operator": "IN", "value": [1, 2, 3]},
//!     {"field": "name", "operator": "LIKE", "value": "%pro%"}
//!   ]
//! }
//! ```
//!
//! becomes, against a policy aliasing `category` to `category_id`:
//!
//! ```sql
//! WHERE "price" BETWEEN 100 AND 500
//!   AND "category_id" IN (1, 2, 3)
//!   AND "name" LIKE '%pro%'
//!   AND ("name" LIKE '%phone%' OR "description" LIKE '%phone%')
//! ORDER BY "created_at" DESC
//! ```
//!
//! ## Dropping Rules
//!
//! - Search or order fields not in the allow-list are removed
//! - Filters on fields without an allow-list entry are removed
//! - Filters whose operator is unknown or not allowed for that field are removed
//! - Filters whose value has the wrong shape (BETWEEN without exactly two
//!   values, IN without an array) are skipped when the query is built
//!
//! None of these are errors. The dropped entries are returned as
//! [`Rejection`]s and logged at debug level.

pub mod conditions;
pub mod sanitize;
pub mod search;
pub mod sort;

pub use conditions::{build_filter_expr, build_filters_condition};
pub use sanitize::{ConditionsHandle, Rejection, Sanitized, sanitize};
pub use search::{MAX_SEARCH_TEXT_LENGTH, build_search_condition, normalize_search_text};
pub use sort::{OrderColumn, clamp_sort_factor, direction_for, normalize_sort_factor, order_columns};
