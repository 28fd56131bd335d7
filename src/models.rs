use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::pagination::PaginationRequest;

/// Comparison operators a filter may use.
///
/// On the wire each operator is its SQL token (`"="`, `"NOT IN"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum FilterOperator {
    /// Equality (=)
    #[serde(rename = "=")]
    Eq,
    /// Not equal (!=)
    #[serde(rename = "!=")]
    Ne,
    /// Greater than (>)
    #[serde(rename = ">")]
    Gt,
    /// Less than (<)
    #[serde(rename = "<")]
    Lt,
    /// Greater than or equal (>=)
    #[serde(rename = ">=")]
    Ge,
    /// Less than or equal (<=)
    #[serde(rename = "<=")]
    Le,
    /// BETWEEN, value is a two element array
    #[serde(rename = "BETWEEN")]
    Between,
    /// IN, value is an array
    #[serde(rename = "IN")]
    In,
    /// NOT IN, value is an array
    #[serde(rename = "NOT IN")]
    NotIn,
    /// LIKE, value is the pattern as given
    #[serde(rename = "LIKE")]
    Like,
}

impl FilterOperator {
    /// All operators, in wire order.
    pub const ALL: [Self; 10] = [
        Self::Eq,
        Self::Ne,
        Self::Gt,
        Self::Lt,
        Self::Ge,
        Self::Le,
        Self::Between,
        Self::In,
        Self::NotIn,
        Self::Like,
    ];

    /// The wire token for this operator
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Between => "BETWEEN",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Like => "LIKE",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Error returned when an operator token is not one of the supported operators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter operator '{0}'")]
pub struct UnknownOperator(pub String);

impl FromStr for FilterOperator {
    type Err = UnknownOperator;

    /// Only the exact wire token matches: no trimming, no case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.token() == s)
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}

/// A filter exactly as the client sent it.
///
/// The operator stays a plain string so that an unknown token drops only this
/// filter instead of failing deserialization of the whole request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RawFilter {
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl RawFilter {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// A filter that passed the allow-list, with its field already mapped through
/// the column aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FilterCondition {
    pub field: String,
    pub operator: FilterOperator,
    pub value: serde_json::Value,
}

/// Untrusted search, sort and filter input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RawConditions {
    /// Free text matched with `LIKE '%text%'` against the search fields
    pub search_text: String,
    /// Columns to search. Empty (or a single empty string) means "all allowed"
    pub search_fields: Vec<String>,
    /// Columns to order by. Empty means the policy's full order-by list
    pub order_by: Vec<String>,
    /// `1` ascending, `-1` descending, `0` for the policy default
    pub sort_factor: i32,
    pub filters: Vec<RawFilter>,
}

/// Sanitized conditions: every field and operator here passed the policy.
///
/// This is also what gets echoed back to the client so it can see which parts
/// of its request were honoured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QueryConditions {
    pub search_text: String,
    pub search_fields: Vec<String>,
    pub order_by: Vec<String>,
    /// Always `1` or `-1`
    pub sort_factor: i32,
    pub filters: Vec<FilterCondition>,
}

/// The full client payload for a list request.
///
/// ```json
/// {
///   "page": 2,
///   "page_size": 20,
///   "search_text": "phone",
///   "search_fields": ["name"],
///   "order_by": ["created_at"],
///   "sort_factor": -1,
///   "filters": [{"field": "price", "operator": ">=", "value": 100}]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QueryRequest {
    #[serde(flatten)]
    pub pagination: PaginationRequest,
    #[serde(flatten)]
    pub conditions: RawConditions,
}
