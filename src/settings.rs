//! # Query Policy
//!
//! [`QuerySettings`] is the allow-list a list endpoint hands to the sanitizer:
//! which columns may be searched, which may be ordered by, which may be filtered
//! and with which operators, plus the public-name to column-name aliases.
//!
//! Anything not listed here is dropped from client requests.
//!
//! ## Loading from configuration
//!
//! ```rust,ignore
//! let settings = QuerySettings::from_json(r#"{
//!     "column_alias": {"category": "category_id"},
//!     "allowed_search": ["name", "description"],
//!     "allowed_order_by": ["created_at", "price"],
//!     "allowed_filters": {"price": [">=", "<="], "category": ["=", "IN"]},
//!     "default_sort_factor": -1
//! }"#)?;
//! ```
//!
//! ## Building in code
//!
//! ```rust,ignore
//! let settings = QuerySettings::new()
//!     .allow_search(["name", "description"])
//!     .allow_order_by(["created_at", "price"])
//!     .allow_filter("price", [FilterOperator::Ge, FilterOperator::Le])
//!     .alias("category", "category_id")
//!     .with_default_sort_factor(-1);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;
use utoipa::ToSchema;

use crate::errors::QueryError;
use crate::filtering::sort::clamp_sort_factor;
use crate::models::FilterOperator;

const DEFAULT_ORDER_COLUMN: &str = "created_at";
const DEFAULT_SORT_FACTOR: i32 = 1;

/// Policy used when a handle is created without one.
pub(crate) static DEFAULT_SETTINGS: LazyLock<QuerySettings> = LazyLock::new(QuerySettings::default);

const fn default_sort_factor() -> i32 {
    DEFAULT_SORT_FACTOR
}

/// Allow-list and aliasing policy for one list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QuerySettings {
    /// Public field name to storage column name
    #[serde(default)]
    pub column_alias: HashMap<String, String>,
    /// Fields that may appear in `order_by`, also the fallback ordering
    #[serde(default)]
    pub allowed_order_by: Vec<String>,
    /// Fields that may appear in `search_fields`, also the fallback search set
    #[serde(default)]
    pub allowed_search: Vec<String>,
    /// Filterable fields and the operators each one accepts
    #[serde(default)]
    pub allowed_filters: HashMap<String, Vec<FilterOperator>>,
    /// Direction used when the client sends `sort_factor = 0`
    #[serde(default = "default_sort_factor")]
    pub default_sort_factor: i32,
}

/// Orders by `created_at` ascending; nothing is searchable or filterable.
impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            column_alias: HashMap::new(),
            allowed_order_by: vec![DEFAULT_ORDER_COLUMN.to_string()],
            allowed_search: Vec::new(),
            allowed_filters: HashMap::new(),
            default_sort_factor: DEFAULT_SORT_FACTOR,
        }
    }
}

impl QuerySettings {
    /// An empty policy: nothing allowed, ascending default order.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allowed_order_by: Vec::new(),
            ..Self::default()
        }
    }

    /// Parse a policy from its JSON configuration form.
    ///
    /// Unknown operator tokens are a configuration error, unlike in client
    /// requests where they are silently dropped.
    pub fn from_json(json: &str) -> Result<Self, QueryError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn allow_search<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_search.extend(fields.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn allow_order_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_order_by.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Allow filtering `field` with the given operators. Calling it again for
    /// the same field adds to its operator set.
    #[must_use]
    pub fn allow_filter<I>(mut self, field: impl Into<String>, operators: I) -> Self
    where
        I: IntoIterator<Item = FilterOperator>,
    {
        let allowed = self.allowed_filters.entry(field.into()).or_default();
        for op in operators {
            if !allowed.contains(&op) {
                allowed.push(op);
            }
        }
        self
    }

    /// Map the public name `field` onto the storage column `column`.
    #[must_use]
    pub fn alias(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.column_alias.insert(field.into(), column.into());
        self
    }

    #[must_use]
    pub const fn with_default_sort_factor(mut self, factor: i32) -> Self {
        self.default_sort_factor = factor;
        self
    }

    /// Storage column for a public field name.
    #[must_use]
    pub fn column_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.column_alias.get(field).map_or(field, String::as_str)
    }

    /// Whether `operator` may be used on `field`. `None` when the field is not
    /// filterable at all.
    #[must_use]
    pub fn filter_allows(&self, field: &str, operator: FilterOperator) -> Option<bool> {
        self.allowed_filters
            .get(field)
            .map(|ops| ops.contains(&operator))
    }

    /// The default direction, forced into `{-1, 1}`. A zero default means
    /// ascending.
    #[must_use]
    pub fn effective_default_sort_factor(&self) -> i32 {
        match self.default_sort_factor {
            0 => DEFAULT_SORT_FACTOR,
            factor => clamp_sort_factor(factor),
        }
    }
}
