//! Row and column visibility for an edit session.

use crate::models::post::PostSummary;

/// Title search plus single-field filter.
///
/// Visibility only scopes what "entirely empty" means for column
/// indicators; clear and restore operations still reach hidden cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilter {
    title: Option<String>,
    field: Option<String>,
}

impl ViewFilter {
    /// Case-insensitive substring match on post titles. Blank clears it.
    pub fn set_title(&mut self, query: Option<&str>) {
        self.title = query
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .map(str::to_lowercase);
    }

    pub fn set_field(&mut self, field: Option<&str>) {
        self.field = field.map(str::to_string);
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn shows_row(&self, post: &PostSummary) -> bool {
        match &self.title {
            Some(query) => post.title.to_lowercase().contains(query.as_str()),
            None => true,
        }
    }

    pub fn shows_field(&self, key: &str) -> bool {
        self.field.as_deref().map_or(true, |field| field == key)
    }
}
