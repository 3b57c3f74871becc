//! Grid page models.

use super::post::{PostId, PostSummary, PostTypeDescriptor, PostTypeFilter};
use super::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query parameters for building one grid page.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GridQuery {
    pub post_type: Option<String>,
    /// Signed so that negative input clamps instead of failing extraction.
    pub page: Option<i64>,
}

impl GridQuery {
    pub fn filter(&self) -> PostTypeFilter {
        PostTypeFilter::parse(self.post_type.as_deref())
    }

    /// 1-based page number; missing, zero or negative means the first page.
    pub fn page(&self) -> usize {
        usize::try_from(self.page.unwrap_or(1).max(1)).unwrap_or(usize::MAX)
    }
}

/// A column of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldColumn {
    pub key: String,
    /// Human-readable label; the key itself when no label is registered.
    pub label: String,
}

/// A row of the grid: post context plus the fields that post actually has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRow {
    pub post: PostSummary,
    pub fields: BTreeMap<String, FieldValue>,
}

/// One page of the sparse post×field matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPage {
    pub post_type: String,
    pub page: usize,
    pub page_size: usize,
    pub total_posts: usize,
    pub total_pages: usize,
    pub post_types: Vec<PostTypeDescriptor>,
    pub columns: Vec<FieldColumn>,
    pub rows: Vec<GridRow>,
}

impl GridPage {
    /// Look up a cell; `None` when the post lacks the field.
    pub fn value(&self, post_id: PostId, key: &str) -> Option<&FieldValue> {
        self.rows
            .iter()
            .find(|row| row.post.id == post_id)
            .and_then(|row| row.fields.get(key))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
