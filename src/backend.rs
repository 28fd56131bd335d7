//! # Query Backend
//!
//! [`QueryTarget`] is everything the translator and the paginator need from a
//! query: attach a condition, attach ordering, offset, limit and count.
//! [`SelectQuery`] implements it for a Sea-ORM [`Select`] bound to a connection.
//!
//! ```rust,ignore
//! let target = SelectQuery::new(product::Entity::find(), &db);
//! let applied = helper.apply(&settings, Some(target)).await?;
//! if let Applied::Query(query) = applied {
//!     let rows = query.into_inner().all(&db).await?;
//! }
//! ```

use async_trait::async_trait;
use sea_orm::{
    Condition, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, sea_query::SimpleExpr,
};

use crate::filtering::OrderColumn;

/// A query that predicates, ordering and paging can be attached to.
#[async_trait]
pub trait QueryTarget: Sized + Send + Sync {
    /// AND `condition` into the query
    #[must_use]
    fn filter(self, condition: Condition) -> Self;

    /// Append ORDER BY entries, in order
    #[must_use]
    fn order_by(self, columns: &[OrderColumn]) -> Self;

    #[must_use]
    fn offset(self, offset: u64) -> Self;

    #[must_use]
    fn limit(self, limit: u64) -> Self;

    /// Count the rows the query currently matches.
    async fn count(&self) -> Result<u64, DbErr>;
}

/// A Sea-ORM select plus the connection its count runs on.
pub struct SelectQuery<'db, E, C>
where
    E: EntityTrait,
{
    select: Select<E>,
    db: &'db C,
}

impl<'db, E, C> SelectQuery<'db, E, C>
where
    E: EntityTrait,
{
    pub const fn new(select: Select<E>, db: &'db C) -> Self {
        Self { select, db }
    }

    /// The select with everything applied, ready to execute.
    #[must_use]
    pub fn into_inner(self) -> Select<E> {
        self.select
    }

    #[must_use]
    pub const fn select(&self) -> &Select<E> {
        &self.select
    }
}

#[async_trait]
impl<'db, E, C> QueryTarget for SelectQuery<'db, E, C>
where
    E: EntityTrait + Sync,
    E::Model: FromQueryResult + Send + Sync + 'db,
    C: ConnectionTrait + Sync,
{
    fn filter(self, condition: Condition) -> Self {
        Self {
            select: QueryFilter::filter(self.select, condition),
            db: self.db,
        }
    }

    fn order_by(self, columns: &[OrderColumn]) -> Self {
        let select = columns.iter().fold(self.select, |select, column| {
            QueryOrder::order_by(
                select,
                SimpleExpr::Column(column.column_ref()),
                column.direction.clone(),
            )
        });
        Self { select, db: self.db }
    }

    fn offset(self, offset: u64) -> Self {
        Self {
            select: QuerySelect::offset(self.select, offset),
            db: self.db,
        }
    }

    fn limit(self, limit: u64) -> Self {
        Self {
            select: QuerySelect::limit(self.select, limit),
            db: self.db,
        }
    }

    async fn count(&self) -> Result<u64, DbErr> {
        PaginatorTrait::count(self.select.clone(), self.db).await
    }
}
