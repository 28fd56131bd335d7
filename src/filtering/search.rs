use sea_orm::{Condition, sea_query::Expr};

use super::conditions::column_ref;

// Basic safety limit
pub const MAX_SEARCH_TEXT_LENGTH: usize = 10_000;

/// Trim the search text and cap it at [`MAX_SEARCH_TEXT_LENGTH`] bytes without
/// splitting a character.
#[must_use]
pub fn normalize_search_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.len() <= MAX_SEARCH_TEXT_LENGTH {
        return trimmed.to_string();
    }

    let mut end = MAX_SEARCH_TEXT_LENGTH;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].trim_end().to_string()
}

/// One `field LIKE '%text%'` per search field, ORed together.
///
/// `None` when the text is blank or there is nothing to search.
#[must_use]
pub fn build_search_condition(text: &str, fields: &[String]) -> Option<Condition> {
    let keywords = text.trim();
    if keywords.is_empty() || fields.is_empty() {
        return None;
    }

    let pattern = format!("%{keywords}%");
    Some(fields.iter().fold(Condition::any(), |condition, field| {
        condition.add(Expr::col(column_ref(field)).like(pattern.as_str()))
    }))
}
