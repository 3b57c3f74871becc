//! Post and post-type storage operations backed by redb.

use crate::db::tables::{COUNTERS, NEXT_POST_ID, POSTS, POST_TYPES};
use crate::error::AppError;
use crate::models::post::{PostId, PostRecord, PostStatus, PostSummary, PostTypeDescriptor};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for post and post-type tables.
pub struct PostDb {
    db: Arc<redb::Database>,
}

fn matches_filter(record: &PostRecord, types: &[String], statuses: &[PostStatus]) -> bool {
    statuses.contains(&record.status) && types.iter().any(|t| t == &record.post_type)
}

impl PostDb {
    /// Initialize post tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(POSTS)?;
        write_txn.open_table(POST_TYPES)?;
        write_txn.open_table(COUNTERS)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a post with the next free id.
    ///
    /// # Returns
    /// The stored row.
    ///
    /// # Errors
    /// Returns an error when serialization or storage fails.
    pub fn create(
        &self,
        title: &str,
        status: PostStatus,
        post_type: &str,
        editable: bool,
    ) -> Result<PostRecord, AppError> {
        let write_txn = self.db.begin_write()?;
        let record = {
            let mut counters = write_txn.open_table(COUNTERS)?;
            let mut posts = write_txn.open_table(POSTS)?;
            let id = counters
                .get(NEXT_POST_ID)?
                .map(|guard| guard.value())
                .unwrap_or(1);
            counters.insert(NEXT_POST_ID, id + 1)?;

            let record = PostRecord {
                id,
                title: title.to_string(),
                status,
                post_type: post_type.to_string(),
                editable,
            };
            let encoded = bincode::serialize(&record)?;
            posts.insert(id, encoded.as_slice())?;
            record
        };
        write_txn.commit()?;
        tracing::debug!(post_id = record.id, post_type = %record.post_type, "Created post");
        Ok(record)
    }

    /// Fetch a post by id.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, id: PostId) -> Result<Option<PostRecord>, AppError> {
        let read_txn = self.db.begin_read()?;
        let posts = read_txn.open_table(POSTS)?;
        match posts.get(id)? {
            Some(value) => Ok(Some(bincode::deserialize(value.value())?)),
            None => Ok(None),
        }
    }

    /// Update the edit-permission flag of a post.
    ///
    /// # Returns
    /// `Ok(false)` when the post does not exist.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn set_editable(&self, id: PostId, editable: bool) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        let found = {
            let mut posts = write_txn.open_table(POSTS)?;
            let existing = posts
                .get(id)?
                .map(|guard| bincode::deserialize::<PostRecord>(guard.value()))
                .transpose()?;
            match existing {
                Some(mut record) => {
                    record.editable = editable;
                    let encoded = bincode::serialize(&record)?;
                    posts.insert(id, encoded.as_slice())?;
                    true
                }
                None => false,
            }
        };
        write_txn.commit()?;
        Ok(found)
    }

    /// Count posts of `types` with a status in `statuses`.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn count(&self, types: &[String], statuses: &[PostStatus]) -> Result<usize, AppError> {
        let mut count = 0usize;
        self.scan(|record| {
            if matches_filter(&record, types, statuses) {
                count += 1;
            }
        })?;
        Ok(count)
    }

    /// Return one title-ordered page of matching posts.
    ///
    /// Ties on title are broken by id so paging is stable.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn page_by_title(
        &self,
        types: &[String],
        statuses: &[PostStatus],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PostSummary>, AppError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut matching = Vec::new();
        self.scan(|record| {
            if matches_filter(&record, types, statuses) {
                matching.push(record);
            }
        })?;
        matching.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(matching
            .iter()
            .skip(offset)
            .take(limit)
            .map(PostSummary::from)
            .collect())
    }

    fn scan(&self, mut visit: impl FnMut(PostRecord)) -> Result<(), AppError> {
        let read_txn = self.db.begin_read()?;
        let posts = read_txn.open_table(POSTS)?;
        for item in posts.iter()? {
            let (_, value) = item?;
            visit(bincode::deserialize(value.value())?);
        }
        Ok(())
    }

    /// Register or replace a post type.
    ///
    /// # Errors
    /// Returns `BadRequest` for a blank name and propagates storage errors.
    pub fn register_type(&self, descriptor: &PostTypeDescriptor) -> Result<(), AppError> {
        let name = descriptor.name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest(
                "Post type name must not be empty".to_string(),
            ));
        }
        let encoded = bincode::serialize(descriptor)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut types = write_txn.open_table(POST_TYPES)?;
            types.insert(name, encoded.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// List registered post types ordered by name.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn list_types(&self) -> Result<Vec<PostTypeDescriptor>, AppError> {
        let read_txn = self.db.begin_read()?;
        let types = read_txn.open_table(POST_TYPES)?;
        let mut out = Vec::new();
        for item in types.iter()? {
            let (_, value) = item?;
            out.push(bincode::deserialize(value.value())?);
        }
        Ok(out)
    }
}
