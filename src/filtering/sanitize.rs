use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

use super::search::normalize_search_text;
use super::sort::normalize_sort_factor;
use crate::backend::QueryTarget;
use crate::errors::QueryError;
use crate::models::{FilterCondition, FilterOperator, QueryConditions, RawConditions, RawFilter};
use crate::settings::{DEFAULT_SETTINGS, QuerySettings};

/// A part of the client request that the policy did not allow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// Requested search field is not searchable
    SearchField { field: String },
    /// Requested order-by field is not sortable
    OrderField { field: String },
    /// Filter on a field that is not filterable
    FilterField { field: String },
    /// Filter operator unknown, or not allowed for this field
    FilterOperator { field: String, operator: String },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SearchField { field } => write!(f, "search field '{field}' is not allowed"),
            Self::OrderField { field } => write!(f, "order field '{field}' is not allowed"),
            Self::FilterField { field } => write!(f, "filter field '{field}' is not allowed"),
            Self::FilterOperator { field, operator } => {
                write!(f, "operator '{operator}' is not allowed on '{field}'")
            }
        }
    }
}

/// Output of [`sanitize`]: the conditions to apply, plus what was dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sanitized {
    pub conditions: QueryConditions,
    pub rejected: Vec<Rejection>,
}

/// Apply the "empty means everything allowed" fallback, then keep only allowed
/// names, then alias. A single empty string counts as empty.
fn allowed_columns(
    requested: &[String],
    allowed: &[String],
    settings: &QuerySettings,
    rejected: &mut Vec<Rejection>,
    reject: fn(String) -> Rejection,
) -> Vec<String> {
    let unspecified = match requested {
        [] => true,
        [only] => only.is_empty(),
        _ => false,
    };

    let kept: Vec<&str> = if unspecified {
        allowed.iter().map(String::as_str).collect()
    } else {
        requested
            .iter()
            .filter(|field| {
                let ok = allowed.contains(*field);
                if !ok {
                    rejected.push(reject((*field).clone()));
                }
                ok
            })
            .map(String::as_str)
            .collect()
    };

    kept.into_iter()
        .map(|field| settings.column_for(field).to_string())
        .collect()
}

fn sanitize_filter(
    filter: &RawFilter,
    settings: &QuerySettings,
    rejected: &mut Vec<Rejection>,
) -> Option<FilterCondition> {
    let reject_operator = || Rejection::FilterOperator {
        field: filter.field.clone(),
        operator: filter.operator.clone(),
    };

    if !settings.allowed_filters.contains_key(&filter.field) {
        rejected.push(Rejection::FilterField {
            field: filter.field.clone(),
        });
        return None;
    }

    let Ok(operator) = filter.operator.parse::<FilterOperator>() else {
        rejected.push(reject_operator());
        return None;
    };

    if settings.filter_allows(&filter.field, operator) != Some(true) {
        rejected.push(reject_operator());
        return None;
    }

    Some(FilterCondition {
        field: settings.column_for(&filter.field).to_string(),
        operator,
        value: filter.value.clone(),
    })
}

/// Reduce untrusted conditions to what `settings` allows.
///
/// Never fails: disallowed fields and operators are dropped and reported in
/// [`Sanitized::rejected`]. Allow-list checks use the public field names;
/// aliases are applied to what survives.
#[must_use]
pub fn sanitize(settings: &QuerySettings, raw: &RawConditions) -> Sanitized {
    let mut rejected = Vec::new();

    let search_fields = allowed_columns(
        &raw.search_fields,
        &settings.allowed_search,
        settings,
        &mut rejected,
        |field| Rejection::SearchField { field },
    );

    let order_by = allowed_columns(
        &raw.order_by,
        &settings.allowed_order_by,
        settings,
        &mut rejected,
        |field| Rejection::OrderField { field },
    );

    let sort_factor =
        normalize_sort_factor(raw.sort_factor, settings.effective_default_sort_factor());

    let filters = raw
        .filters
        .iter()
        .filter_map(|filter| sanitize_filter(filter, settings, &mut rejected))
        .collect();

    for rejection in &rejected {
        tracing::debug!(%rejection, "Dropping disallowed query condition");
    }

    Sanitized {
        conditions: QueryConditions {
            search_text: normalize_search_text(&raw.search_text),
            search_fields,
            order_by,
            sort_factor,
            filters,
        },
        rejected,
    }
}

/// Holds a policy and the conditions last sanitized against it.
///
/// Applying before [`update_conditions`](Self::update_conditions) is a
/// programming error and returns [`QueryError::ConditionsNotSet`].
#[derive(Debug, Clone)]
pub struct ConditionsHandle<'s> {
    settings: &'s QuerySettings,
    sanitized: Option<Sanitized>,
}

impl<'s> ConditionsHandle<'s> {
    /// `None` uses [`QuerySettings::default`].
    #[must_use]
    pub fn new(settings: Option<&'s QuerySettings>) -> Self {
        Self {
            settings: settings.unwrap_or(&*DEFAULT_SETTINGS),
            sanitized: None,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &QuerySettings {
        self.settings
    }

    /// Sanitize `raw` and keep the result for [`apply`](Self::apply).
    pub fn update_conditions(&mut self, raw: &RawConditions) -> &QueryConditions {
        let sanitized = self.sanitized.insert(sanitize(self.settings, raw));
        &sanitized.conditions
    }

    /// The conditions that will be applied, if any were set.
    #[must_use]
    pub fn current_info(&self) -> Option<&QueryConditions> {
        self.sanitized.as_ref().map(|s| &s.conditions)
    }

    /// What the last sanitization dropped.
    #[must_use]
    pub fn rejected(&self) -> &[Rejection] {
        self.sanitized
            .as_ref()
            .map(|s| s.rejected.as_slice())
            .unwrap_or_default()
    }

    /// Attach the sanitized predicates and ordering to `target`.
    pub fn apply<T: QueryTarget>(&self, target: T) -> Result<T, QueryError> {
        let sanitized = self.sanitized.as_ref().ok_or(QueryError::ConditionsNotSet)?;
        Ok(sanitized.conditions.apply_to(target))
    }
}
