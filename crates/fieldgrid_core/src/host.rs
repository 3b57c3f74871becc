//! Host collaborator contract.
//!
//! Everything the editor needs from the content host sits behind
//! [`MetaHost`]: post enumeration, per-post meta storage, field labels, and
//! the edit-permission check. [`crate::Database`] is the embedded adapter.

use crate::error::AppError;
use crate::models::post::{
    PostId, PostStatus, PostSummary, PostTypeDescriptor, SaveOutcome, StoredMeta,
};
use crate::models::value::FieldValue;
use std::collections::BTreeMap;

/// Narrow host API used by the grid builder and the save handler.
pub trait MetaHost {
    /// Every registered post type.
    fn list_post_types(&self) -> Result<Vec<PostTypeDescriptor>, AppError>;

    /// Count posts of `types` whose status is in `statuses`.
    fn count_posts(&self, types: &[String], statuses: &[PostStatus]) -> Result<usize, AppError>;

    /// One page of posts ordered by title ascending.
    fn fetch_posts(
        &self,
        types: &[String],
        statuses: &[PostStatus],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PostSummary>, AppError>;

    /// All stored meta of a post, internal keys included.
    fn get_all_meta(&self, post_id: PostId) -> Result<BTreeMap<String, StoredMeta>, AppError>;

    /// Best-effort display label for a field key.
    fn resolve_field_label(&self, key: &str, post_id: PostId) -> Result<Option<String>, AppError>;

    /// Whether the current caller may edit `post_id`.
    fn can_edit(&self, post_id: PostId) -> Result<bool, AppError>;

    /// Write `value`, or delete the entry when the value is empty.
    fn save_field(
        &self,
        post_id: PostId,
        key: &str,
        value: &FieldValue,
    ) -> Result<SaveOutcome, AppError>;

    /// Remove one field from one post. Returns whether an entry existed.
    fn delete_field(&self, post_id: PostId, key: &str) -> Result<bool, AppError>;

    /// Remove `key` from every post. Returns the number of entries removed.
    fn delete_field_everywhere(&self, key: &str) -> Result<usize, AppError>;
}
