//! Embedded host store for FieldGrid, backed by redb.
//!
//! [`Database`] plays the role of the content host: it keeps post rows,
//! registered post types, per-post meta, and a field-label registry, and it
//! implements [`MetaHost`] so the grid builder and save handler never touch
//! redb directly.

/// Post meta and field-label storage.
pub mod meta;
/// Post and post-type storage.
pub mod posts;
/// redb table definitions.
pub mod tables;


use crate::error::AppError;
use crate::host::MetaHost;
use crate::models::post::{
    PostId, PostRecord, PostStatus, PostSummary, PostTypeDescriptor, SaveOutcome, StoredMeta,
};
use crate::models::value::FieldValue;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Database handle with accessors for each table group.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub posts: posts::PostDb,
    pub meta: meta::MetaDb,
}

impl Database {
    /// Open (or create) the store under directory `path`.
    ///
    /// # Returns
    /// A fully initialized [`Database`].
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created, another process
    /// holds the database, or table initialization fails.
    pub fn new(path: &str) -> Result<Self, AppError> {
        let dir = Path::new(path);
        std::fs::create_dir_all(dir).map_err(|err| {
            AppError::StorageMessage(format!(
                "Failed to create database directory '{}': {}",
                dir.display(),
                err
            ))
        })?;
        let file = dir.join(tables::REDB_FILE_NAME);

        let db = match redb::Database::create(&file) {
            Ok(db) => Arc::new(db),
            Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                return Err(AppError::StorageMessage(format!(
                    "Database at '{}' is already open in another process.\n\
                    Stop the other FieldGrid server or set DB_PATH to a different location.",
                    file.display()
                )));
            }
            Err(err) => return Err(err.into()),
        };

        Self::from_shared(db)
    }

    /// Build a handle over an already-open redb instance.
    ///
    /// # Errors
    /// Returns an error if table initialization fails.
    pub fn from_shared(db: Arc<redb::Database>) -> Result<Self, AppError> {
        Ok(Self {
            posts: posts::PostDb::new(db.clone())?,
            meta: meta::MetaDb::new(db.clone())?,
            db,
        })
    }

    /// Register the built-in `post` and `page` types when no type exists yet.
    ///
    /// # Errors
    /// Propagates storage errors.
    pub fn ensure_default_post_types(&self) -> Result<(), AppError> {
        if !self.posts.list_types()?.is_empty() {
            return Ok(());
        }
        for (name, label) in [("post", "Posts"), ("page", "Pages")] {
            self.posts.register_type(&PostTypeDescriptor {
                name: name.to_string(),
                label: label.to_string(),
                public: true,
                show_ui: true,
                builtin: true,
            })?;
        }
        tracing::info!("Registered default post types");
        Ok(())
    }

    /// Create a post together with its initial meta.
    ///
    /// Blank values in `meta` are skipped, matching save semantics.
    ///
    /// # Returns
    /// The stored post row.
    ///
    /// # Errors
    /// Returns `BadRequest` for a blank title and propagates storage errors.
    pub fn create_post(
        &self,
        title: &str,
        status: PostStatus,
        post_type: &str,
        editable: bool,
        meta: &BTreeMap<String, FieldValue>,
    ) -> Result<PostRecord, AppError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::BadRequest("Post title must not be empty".to_string()));
        }
        let post_type = post_type.trim();
        if post_type.is_empty() {
            return Err(AppError::BadRequest("Post type must not be empty".to_string()));
        }
        let record = self.posts.create(title, status, post_type, editable)?;
        for (key, value) in meta {
            self.meta.put(record.id, key, value)?;
        }
        Ok(record)
    }
}

impl MetaHost for Database {
    fn list_post_types(&self) -> Result<Vec<PostTypeDescriptor>, AppError> {
        self.posts.list_types()
    }

    fn count_posts(&self, types: &[String], statuses: &[PostStatus]) -> Result<usize, AppError> {
        self.posts.count(types, statuses)
    }

    fn fetch_posts(
        &self,
        types: &[String],
        statuses: &[PostStatus],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PostSummary>, AppError> {
        self.posts.page_by_title(types, statuses, limit, offset)
    }

    fn get_all_meta(&self, post_id: PostId) -> Result<BTreeMap<String, StoredMeta>, AppError> {
        self.meta.all_for_post(post_id)
    }

    fn resolve_field_label(&self, key: &str, _post_id: PostId) -> Result<Option<String>, AppError> {
        self.meta.label(key)
    }

    fn can_edit(&self, post_id: PostId) -> Result<bool, AppError> {
        Ok(self
            .posts
            .get(post_id)?
            .map(|record| record.editable)
            .unwrap_or(false))
    }

    fn save_field(
        &self,
        post_id: PostId,
        key: &str,
        value: &FieldValue,
    ) -> Result<SaveOutcome, AppError> {
        self.meta.put(post_id, key, value)
    }

    fn delete_field(&self, post_id: PostId, key: &str) -> Result<bool, AppError> {
        self.meta.delete(post_id, key)
    }

    fn delete_field_everywhere(&self, key: &str) -> Result<usize, AppError> {
        self.meta.delete_key_everywhere(key)
    }
}
