//! Post, post-type, and stored-meta models.

use super::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Numeric post identifier as assigned by the host.
pub type PostId = u64;

/// Post lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Publish,
    Draft,
    Pending,
    Private,
    Trash,
    #[serde(rename = "auto-draft")]
    AutoDraft,
}

impl PostStatus {
    /// Statuses a grid page may show.
    pub const EDITABLE: [PostStatus; 4] = [
        PostStatus::Publish,
        PostStatus::Draft,
        PostStatus::Pending,
        PostStatus::Private,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Private => "private",
            Self::Trash => "trash",
            Self::AutoDraft => "auto-draft",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "publish" | "published" => Ok(Self::Publish),
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "private" => Ok(Self::Private),
            "trash" => Ok(Self::Trash),
            "auto-draft" => Ok(Self::AutoDraft),
            other => Err(format!("unknown post status '{}'", other)),
        }
    }
}

/// Registered post type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTypeDescriptor {
    pub name: String,
    pub label: String,
    #[serde(default = "default_true")]
    pub public: bool,
    #[serde(default = "default_true")]
    pub show_ui: bool,
    #[serde(default)]
    pub builtin: bool,
}

fn default_true() -> bool {
    true
}

impl PostTypeDescriptor {
    /// Whether `all` includes this type: visible in the admin UI and either
    /// public or registered by a plugin rather than built in.
    pub fn included_in_all(&self) -> bool {
        self.show_ui && (self.public || !self.builtin)
    }
}

/// Which post types a grid page covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PostTypeFilter {
    #[default]
    All,
    Type(String),
}

impl PostTypeFilter {
    /// Parse the query-string form: `all`, blank, or a type name.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::All,
            Some(value) if value.eq_ignore_ascii_case("all") => Self::All,
            Some(value) => Self::Type(value.to_string()),
        }
    }

    pub fn as_query_value(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Type(name) => name.as_str(),
        }
    }
}

/// Read-only context shown next to each grid row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: PostId,
    pub title: String,
    pub status: PostStatus,
    pub post_type: String,
}

/// A post row as kept by the embedded host store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: PostId,
    pub title: String,
    pub status: PostStatus,
    pub post_type: String,
    /// Host permission flag consulted by `can_edit`.
    pub editable: bool,
}

impl From<&PostRecord> for PostSummary {
    fn from(value: &PostRecord) -> Self {
        Self {
            id: value.id,
            title: value.title.clone(),
            status: value.status,
            post_type: value.post_type.clone(),
        }
    }
}

/// Raw meta value as persisted by the host.
///
/// List values are kept in a serialized form and decoded transparently when
/// the grid is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoredMeta {
    Text(String),
    Serialized(Vec<String>),
}

impl From<StoredMeta> for FieldValue {
    fn from(value: StoredMeta) -> Self {
        match value {
            StoredMeta::Text(text) => FieldValue::Scalar(text),
            StoredMeta::Serialized(items) => FieldValue::List(items),
        }
    }
}

impl From<FieldValue> for StoredMeta {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Scalar(text) => StoredMeta::Text(text),
            FieldValue::List(items) => StoredMeta::Serialized(items),
        }
    }
}

/// Request payload for creating a post in the embedded host.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub status: Option<PostStatus>,
    pub post_type: Option<String>,
    pub editable: Option<bool>,
    #[serde(default)]
    pub meta: BTreeMap<String, FieldValue>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// Outcome of a single field write through the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Stored value changed.
    Written,
    /// Stored value already equal; nothing persisted.
    Unchanged,
    /// Blank value removed the stored entry (or there was none).
    Deleted,
}
