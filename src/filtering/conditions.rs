use sea_orm::{
    Condition,
    sea_query::{Alias, ColumnRef, Expr, IntoColumnRef, SimpleExpr, Value},
};
use serde_json::Value as Json;

use super::search::build_search_condition;
use super::sort::{OrderColumn, order_columns};
use crate::backend::QueryTarget;
use crate::models::{FilterCondition, FilterOperator, QueryConditions};

/// Column reference for a sanitized name. `table.column` becomes a qualified
/// reference, anything else a single quoted identifier.
pub(crate) fn column_ref(name: &str) -> ColumnRef {
    match name.split_once('.') {
        Some((table, column)) => (Alias::new(table), Alias::new(column)).into_column_ref(),
        None => Alias::new(name).into_column_ref(),
    }
}

/// Bind a JSON scalar. Arrays and objects are not scalars.
///
/// Integers outside the `i64` range bind as floats, since the drivers take
/// integers as signed 64-bit values.
fn scalar_value(value: &Json) -> Option<Value> {
    match value {
        Json::Null => Some(Value::String(None)),
        Json::Bool(b) => Some(Value::from(*b)),
        Json::Number(n) => n
            .as_i64()
            .map(Value::from)
            .or_else(|| n.as_f64().map(Value::from)),
        Json::String(s) => Some(Value::from(s.clone())),
        Json::Array(_) | Json::Object(_) => None,
    }
}

/// Every element of a JSON array as a bound value.
fn sequence_values(value: &Json) -> Option<Vec<Value>> {
    value.as_array()?.iter().map(scalar_value).collect()
}

/// LIKE takes the pattern as given; wildcard placement is up to the client.
fn like_pattern(value: &Json) -> Option<String> {
    match value {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        Json::Bool(b) => Some(b.to_string()),
        Json::Null | Json::Array(_) | Json::Object(_) => None,
    }
}

/// Build the predicate for one sanitized filter.
///
/// Returns `None` when the value does not have the shape the operator needs:
/// BETWEEN wants exactly two scalars, IN / NOT IN want an array of scalars,
/// the rest want a single scalar.
#[must_use]
pub fn build_filter_expr(filter: &FilterCondition) -> Option<SimpleExpr> {
    let column = Expr::col(column_ref(&filter.field));
    let expr = match filter.operator {
        FilterOperator::Eq => column.eq(scalar_value(&filter.value)?),
        FilterOperator::Ne => column.ne(scalar_value(&filter.value)?),
        FilterOperator::Gt => column.gt(scalar_value(&filter.value)?),
        FilterOperator::Lt => column.lt(scalar_value(&filter.value)?),
        FilterOperator::Ge => column.gte(scalar_value(&filter.value)?),
        FilterOperator::Le => column.lte(scalar_value(&filter.value)?),
        FilterOperator::Between => {
            let [low, high] = filter.value.as_array()?.as_slice() else {
                return None;
            };
            column.between(scalar_value(low)?, scalar_value(high)?)
        }
        FilterOperator::In => column.is_in(sequence_values(&filter.value)?),
        FilterOperator::NotIn => column.is_not_in(sequence_values(&filter.value)?),
        FilterOperator::Like => column.like(like_pattern(&filter.value)?),
    };
    Some(expr)
}

/// AND every filter that has a usable value; the rest are skipped.
#[must_use]
pub fn build_filters_condition(filters: &[FilterCondition]) -> Condition {
    filters.iter().fold(Condition::all(), |condition, filter| {
        match build_filter_expr(filter) {
            Some(expr) => condition.add(expr),
            None => {
                tracing::debug!(
                    field = %filter.field,
                    operator = %filter.operator,
                    value = %filter.value,
                    "Skipping filter with unusable value"
                );
                condition
            }
        }
    })
}

impl QueryConditions {
    /// Filters ANDed together with the search OR-group. `None` when nothing
    /// would constrain the query.
    #[must_use]
    pub fn condition(&self) -> Option<Condition> {
        let mut condition = build_filters_condition(&self.filters);
        if let Some(search) = build_search_condition(&self.search_text, &self.search_fields) {
            condition = condition.add(search);
        }
        (!condition.is_empty()).then_some(condition)
    }

    /// ORDER BY entries, all in the direction of `sort_factor`.
    #[must_use]
    pub fn order_columns(&self) -> Vec<OrderColumn> {
        order_columns(&self.order_by, self.sort_factor)
    }

    /// Attach predicates and ordering to `target`.
    #[must_use]
    pub fn apply_to<T: QueryTarget>(&self, mut target: T) -> T {
        if let Some(condition) = self.condition() {
            target = target.filter(condition);
        }

        let order = self.order_columns();
        if !order.is_empty() {
            target = target.order_by(&order);
        }

        target
    }
}
