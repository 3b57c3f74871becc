//! Field values: the scalar/list union shared by grid, session, and wire.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One cell of the grid.
///
/// On the wire a scalar is a JSON string and a list is a JSON array of
/// strings, so the JSON type itself tags the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl FieldValue {
    /// The blank scalar used for cleared and absent cells.
    pub fn empty() -> Self {
        Self::Scalar(String::new())
    }

    /// Build a scalar value.
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    /// Build a list value.
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// A list is empty when it has no elements; a scalar when it trims to "".
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(text) => text.trim().is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Parse what a user typed into a cell.
    ///
    /// After trimming, text that starts with `[`, ends with `]`, and parses
    /// as a JSON array becomes a list. Everything else is a trimmed scalar.
    /// A bracketed literal that happens to be valid JSON (for example
    /// `["a"]` typed as prose) is therefore read as a list; there is no
    /// escape for that collision on the text path.
    pub fn from_input(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            if let Some(items) = parse_json_list(trimmed) {
                return Self::List(items);
            }
        }
        Self::Scalar(trimmed.to_string())
    }

    /// Render the value the way an editor shows it in a text cell.
    pub fn to_input(&self) -> String {
        match self {
            Self::Scalar(text) => text.clone(),
            // Serializing a Vec<String> cannot fail.
            Self::List(items) => serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string()),
        }
    }

    /// Apply the trimming a direct cell edit gets: scalars are trimmed,
    /// list elements are kept verbatim.
    pub fn normalized(self) -> Self {
        match self {
            Self::Scalar(text) => {
                let trimmed = text.trim();
                if trimmed.len() == text.len() {
                    Self::Scalar(text)
                } else {
                    Self::Scalar(trimmed.to_string())
                }
            }
            list @ Self::List(_) => list,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_input())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

fn parse_json_list(text: &str) -> Option<Vec<String>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(text).ok()?;
    values
        .into_iter()
        .map(|value| match value {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => Some(String::new()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        })
        .collect()
}
