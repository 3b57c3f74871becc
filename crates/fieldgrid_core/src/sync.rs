//! Save protocol: batch planning, wire types, and the per-field apply step.
//!
//! The client flattens an edit session into [`SyncEntry`] values, splits them
//! with [`plan_batches`], and sends each [`SaveBatch`] inside a
//! [`SaveRequest`]. The server decodes the same types and runs
//! [`apply_batch`] against its [`MetaHost`].

use crate::constants::is_internal_key;
use crate::error::AppError;
use crate::host::MetaHost;
use crate::models::post::{PostId, SaveOutcome};
use crate::models::value::FieldValue;
use crate::sanitize::sanitize_value;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// All tracked fields of one post, in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEntry {
    pub post_id: PostId,
    pub fields: Vec<(String, FieldValue)>,
}

impl SyncEntry {
    pub fn new(post_id: PostId, fields: Vec<(String, FieldValue)>) -> Self {
        Self { post_id, fields }
    }
}

/// An ordered slice of entries sent in one save request.
///
/// On the wire this is a JSON object `{"<post id>": {"<field>": value}}`.
/// Serialization and deserialization both keep entry and field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaveBatch {
    pub entries: Vec<SyncEntry>,
}

impl SaveBatch {
    pub fn new(entries: Vec<SyncEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn post_count(&self) -> usize {
        self.entries.len()
    }

    pub fn field_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.fields.len()).sum()
    }
}

/// Batch size actually used for planning; anything below one means one.
pub fn effective_batch_size(batch_size: usize) -> usize {
    batch_size.max(1)
}

/// Split `entries` into consecutive batches of at most `batch_size` posts.
///
/// Order is preserved and nothing is dropped: concatenating the returned
/// batches yields `entries` again. Only the last batch may be smaller.
pub fn plan_batches(entries: Vec<SyncEntry>, batch_size: usize) -> Vec<SaveBatch> {
    let size = effective_batch_size(batch_size);
    let mut batches = Vec::with_capacity(entries.len().div_ceil(size));
    let mut iter = entries.into_iter().peekable();
    while iter.peek().is_some() {
        batches.push(SaveBatch::new(iter.by_ref().take(size).collect()));
    }
    batches
}

struct FieldMap<'a>(&'a [(String, FieldValue)]);

impl Serialize for FieldMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for SaveBatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.post_id.to_string(), &FieldMap(&entry.fields))?;
        }
        map.end()
    }
}

struct OrderedFields(Vec<(String, FieldValue)>);

impl<'de> Deserialize<'de> for OrderedFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = OrderedFields;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping field keys to a string or an array of strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, FieldValue>()? {
                    fields.push((key, value));
                }
                Ok(OrderedFields(fields))
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

impl<'de> Deserialize<'de> for SaveBatch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BatchVisitor;

        impl<'de> Visitor<'de> for BatchVisitor {
            type Value = SaveBatch;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping post ids to field objects")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(raw_id) = access.next_key::<String>()? {
                    let post_id = raw_id.trim().parse::<PostId>().map_err(|_| {
                        de::Error::invalid_value(de::Unexpected::Str(&raw_id), &"a numeric post id")
                    })?;
                    let OrderedFields(fields) = access.next_value()?;
                    entries.push(SyncEntry::new(post_id, fields));
                }
                Ok(SaveBatch::new(entries))
            }
        }

        deserializer.deserialize_map(BatchVisitor)
    }
}

/// Body of one save request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRequest {
    pub token: String,
    pub data: SaveBatch,
}

/// Anti-forgery token issued before each mutating request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    /// Remaining lifetime in seconds.
    pub expires_in: u64,
}

/// Success payload of a save response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSummary {
    pub saved_count: usize,
    pub message: String,
}

/// Response envelope shared by the save and delete endpoints.
///
/// `data` holds a [`SaveSummary`] on success and an error description
/// string on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    pub data: serde_json::Value,
}

impl SaveResponse {
    pub fn saved(saved_count: usize, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: serde_json::json!({
                "saved_count": saved_count,
                "message": message.into(),
            }),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: serde_json::Value::String(message.into()),
        }
    }

    /// Interpret the envelope.
    ///
    /// # Errors
    /// Returns the server's error description for `success: false`, or a
    /// description of the shape problem when a successful envelope does not
    /// carry a [`SaveSummary`].
    pub fn into_result(self) -> Result<SaveSummary, String> {
        if !self.success {
            return Err(match self.data {
                serde_json::Value::String(message) => message,
                serde_json::Value::Null => "Save failed".to_string(),
                other => other.to_string(),
            });
        }
        serde_json::from_value(self.data)
            .map_err(|err| format!("Malformed save response: {}", err))
    }
}

/// Progress report emitted before each batch is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncProgress {
    /// 1-based number of the batch about to be sent.
    pub batch: usize,
    pub total_batches: usize,
    /// Share of batches already completed, 0..=100.
    pub percent: u8,
}

impl SyncProgress {
    pub fn before_batch(index: usize, total_batches: usize) -> Self {
        let percent = if total_batches == 0 {
            100
        } else {
            (index.min(total_batches) * 100 / total_batches) as u8
        };
        Self {
            batch: index + 1,
            total_batches,
            percent,
        }
    }
}

/// Field-level tally for one applied batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchReport {
    /// Fields whose stored value changed.
    pub saved: usize,
    /// Fields removed because their value was blank.
    pub deleted: usize,
    /// Fields that already held the submitted value.
    pub unchanged: usize,
    /// Internal keys and posts the caller may not edit.
    pub skipped: usize,
}

/// Apply one decoded batch to `host`, pair by pair in payload order.
///
/// Internal keys and posts failing [`MetaHost::can_edit`] are skipped
/// without error. Values are sanitized first; a value that is empty
/// afterwards deletes the stored field.
///
/// # Returns
/// Counts per outcome; `saved` is what the response reports.
///
/// # Errors
/// Propagates host storage errors. Pairs applied before the failure stay
/// applied.
pub fn apply_batch<H: MetaHost + ?Sized>(
    host: &H,
    batch: &SaveBatch,
) -> Result<BatchReport, AppError> {
    let mut report = BatchReport::default();
    let mut permissions: HashMap<PostId, bool> = HashMap::new();

    for entry in &batch.entries {
        let allowed = match permissions.get(&entry.post_id) {
            Some(allowed) => *allowed,
            None => {
                let allowed = host.can_edit(entry.post_id)?;
                permissions.insert(entry.post_id, allowed);
                allowed
            }
        };
        if !allowed {
            tracing::debug!(post_id = entry.post_id, "Skipping post without edit permission");
            report.skipped += entry.fields.len();
            continue;
        }

        for (key, value) in &entry.fields {
            if is_internal_key(key) {
                report.skipped += 1;
                continue;
            }
            match host.save_field(entry.post_id, key, &sanitize_value(value))? {
                SaveOutcome::Written => report.saved += 1,
                SaveOutcome::Unchanged => report.unchanged += 1,
                SaveOutcome::Deleted => report.deleted += 1,
            }
        }
    }

    Ok(report)
}
