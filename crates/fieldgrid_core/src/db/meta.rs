//! Post meta and field-label storage backed by redb.

use crate::db::tables::{FIELD_LABELS, POST_META};
use crate::error::AppError;
use crate::models::post::{PostId, SaveOutcome, StoredMeta};
use crate::models::value::FieldValue;
use redb::{ReadableDatabase, ReadableTable};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Accessor for the meta and label tables.
pub struct MetaDb {
    db: Arc<redb::Database>,
}

impl MetaDb {
    /// Initialize meta tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(POST_META)?;
        write_txn.open_table(FIELD_LABELS)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Every meta entry of `post_id`, keyed by meta key.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn all_for_post(&self, post_id: PostId) -> Result<BTreeMap<String, StoredMeta>, AppError> {
        let read_txn = self.db.begin_read()?;
        let meta = read_txn.open_table(POST_META)?;
        let mut out = BTreeMap::new();
        for item in meta.range((post_id, "")..(post_id.saturating_add(1), ""))? {
            let (key, value) = item?;
            let (owner, meta_key) = key.value();
            if owner != post_id {
                continue;
            }
            out.insert(meta_key.to_string(), bincode::deserialize(value.value())?);
        }
        Ok(out)
    }

    /// Fetch a single meta entry.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, post_id: PostId, key: &str) -> Result<Option<StoredMeta>, AppError> {
        let read_txn = self.db.begin_read()?;
        let meta = read_txn.open_table(POST_META)?;
        match meta.get((post_id, key))? {
            Some(value) => Ok(Some(bincode::deserialize(value.value())?)),
            None => Ok(None),
        }
    }

    /// Write `value` under `(post_id, key)`, or delete the entry when the
    /// value is empty. Blank and absent are the same end state.
    ///
    /// # Returns
    /// What happened to the stored entry.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn put(
        &self,
        post_id: PostId,
        key: &str,
        value: &FieldValue,
    ) -> Result<SaveOutcome, AppError> {
        if value.is_empty() {
            self.delete(post_id, key)?;
            return Ok(SaveOutcome::Deleted);
        }

        let stored = StoredMeta::from(value.clone());
        let encoded = bincode::serialize(&stored)?;
        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut meta = write_txn.open_table(POST_META)?;
            let unchanged = meta
                .get((post_id, key))?
                .is_some_and(|existing| existing.value() == encoded.as_slice());
            if unchanged {
                SaveOutcome::Unchanged
            } else {
                meta.insert((post_id, key), encoded.as_slice())?;
                SaveOutcome::Written
            }
        };
        write_txn.commit()?;
        Ok(outcome)
    }

    /// Delete one entry.
    ///
    /// # Returns
    /// `Ok(true)` when an entry existed.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn delete(&self, post_id: PostId, key: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut meta = write_txn.open_table(POST_META)?;
            let removed = meta.remove((post_id, key))?;
            removed.is_some()
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// Delete `key` from every post in one transaction.
    ///
    /// # Returns
    /// Number of entries removed.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn delete_key_everywhere(&self, key: &str) -> Result<usize, AppError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut meta = write_txn.open_table(POST_META)?;
            let mut owners = Vec::new();
            for item in meta.iter()? {
                let (entry_key, _) = item?;
                let (owner, meta_key) = entry_key.value();
                if meta_key == key {
                    owners.push(owner);
                }
            }
            for owner in &owners {
                let _ = meta.remove((*owner, key))?;
            }
            owners.len()
        };
        write_txn.commit()?;
        tracing::info!(key, removed, "Deleted field from all posts");
        Ok(removed)
    }

    /// Register a display label for a meta key.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn set_label(&self, key: &str, label: &str) -> Result<(), AppError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut labels = write_txn.open_table(FIELD_LABELS)?;
            labels.insert(key, label)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Registered label for `key`, if any.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn label(&self, key: &str) -> Result<Option<String>, AppError> {
        let read_txn = self.db.begin_read()?;
        let labels = read_txn.open_table(FIELD_LABELS)?;
        Ok(labels.get(key)?.map(|guard| guard.value().to_string()))
    }
}
