//! Shared test-only helpers for fieldgrid_core.

use crate::models::post::{PostRecord, PostStatus};
use crate::models::value::FieldValue;
use crate::Database;
use std::collections::BTreeMap;
use tempfile::TempDir;

/// Creates an isolated temporary database and returns it with the temp dir.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing files.
///
/// # Panics
/// Panics if temp-dir creation, path conversion, or database initialization
/// fails in the test environment.
pub(crate) fn setup_temp_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("db");
    let db = Database::new(db_path.to_str().expect("db path")).expect("db");
    (db, temp_dir)
}

/// Insert a published, editable `post` with the given meta.
pub(crate) fn seed_post(
    db: &Database,
    title: &str,
    meta: &[(&str, FieldValue)],
) -> PostRecord {
    let meta: BTreeMap<String, FieldValue> = meta
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    db.create_post(title, PostStatus::Publish, "post", true, &meta)
        .expect("seed post")
}
