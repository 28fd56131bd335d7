//! # querycrate
//!
//! Policy-driven search, filtering, sorting and pagination for Sea-ORM list
//! endpoints.
//!
//! A client sends an untrusted request (`page`, `page_size`, `search_text`,
//! `search_fields`, `order_by`, `sort_factor`, `filters`). A [`QuerySettings`]
//! allow-list decides which fields and operators may reach the database;
//! everything else is dropped. The surviving conditions become parameterized
//! Sea-Query predicates on a [`SelectQuery`], the filtered set is counted, and
//! `OFFSET`/`LIMIT` are applied.
//!
//! ```rust,ignore
//! use querycrate::{Applied, FilterOperator, QueryHelper, QueryRequest, QuerySettings, SelectQuery};
//!
//! let settings = QuerySettings::new()
//!     .allow_search(["name", "description"])
//!     .allow_order_by(["created_at", "price"])
//!     .allow_filter("price", [FilterOperator::Ge, FilterOperator::Le])
//!     .allow_filter("category", [FilterOperator::Eq, FilterOperator::In])
//!     .alias("category", "category_id");
//!
//! let request: QueryRequest = serde_json::from_str(body)?;
//! let mut helper = QueryHelper::from_request(request);
//!
//! let target = SelectQuery::new(product::Entity::find(), &db);
//! if let Applied::Query(query) = helper.apply(&settings, Some(target)).await? {
//!     let rows = query.into_inner().all(&db).await?;
//!     let info = helper.info(); // echoed back to the client
//! }
//! ```

pub mod backend;
pub mod errors;
pub mod filtering;
pub mod helper;
pub mod models;
pub mod pagination;
pub mod settings;

pub use backend::{QueryTarget, SelectQuery};
pub use errors::QueryError;
pub use filtering::{ConditionsHandle, OrderColumn, Rejection, Sanitized, sanitize};
pub use helper::{Applied, QueryHelper, QueryHelperBuilder, QueryHelperInfo};
pub use models::{
    FilterCondition, FilterOperator, QueryConditions, QueryRequest, RawConditions, RawFilter,
    UnknownOperator,
};
pub use pagination::{PaginationHandle, PaginationInfo, PaginationRequest};
pub use settings::QuerySettings;
