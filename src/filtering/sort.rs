use sea_orm::sea_query::Order;

use super::conditions::column_ref;

/// One ORDER BY entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderColumn {
    pub column: String,
    pub direction: Order,
}

impl OrderColumn {
    pub(crate) fn column_ref(&self) -> sea_orm::sea_query::ColumnRef {
        column_ref(&self.column)
    }
}

/// Force a non-zero factor into `{-1, 1}`. Zero passes through; the caller
/// decides what default it stands for.
#[must_use]
pub const fn clamp_sort_factor(factor: i32) -> i32 {
    if factor > 1 {
        1
    } else if factor < -1 {
        -1
    } else {
        factor
    }
}

/// Normalize a client sort factor: `0` takes `default`, everything else is
/// clamped.
#[must_use]
pub const fn normalize_sort_factor(factor: i32, default: i32) -> i32 {
    if factor == 0 {
        default
    } else {
        clamp_sort_factor(factor)
    }
}

/// Negative factors sort descending.
#[must_use]
pub const fn direction_for(sort_factor: i32) -> Order {
    if sort_factor < 0 { Order::Desc } else { Order::Asc }
}

/// One entry per column, all sharing the direction of `sort_factor`.
#[must_use]
pub fn order_columns(columns: &[String], sort_factor: i32) -> Vec<OrderColumn> {
    columns
        .iter()
        .map(|column| OrderColumn {
            column: column.clone(),
            direction: direction_for(sort_factor),
        })
        .collect()
}
