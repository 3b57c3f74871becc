//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";

/// Canonical post rows (`PostRecord`, bincode-encoded), keyed by post id.
pub const POSTS: TableDefinition<u64, &[u8]> = TableDefinition::new("posts");
/// Post meta rows (`StoredMeta`, bincode-encoded), keyed by (post id, meta key).
pub const POST_META: TableDefinition<(u64, &str), &[u8]> = TableDefinition::new("post_meta");
/// Registered post types (`PostTypeDescriptor`, bincode-encoded).
pub const POST_TYPES: TableDefinition<&str, &[u8]> = TableDefinition::new("post_types");
/// Field label registry, meta key to display label.
pub const FIELD_LABELS: TableDefinition<&str, &str> = TableDefinition::new("field_labels");
/// Monotonic counters (next post id).
pub const COUNTERS: TableDefinition<&str, u64> = TableDefinition::new("counters");

/// Counter key for the next post id.
pub const NEXT_POST_ID: &str = "next_post_id";
