//! Client-side edit session.
//!
//! [`EditSession`] owns the current value of every cell of a loaded grid
//! page and the snapshots that make clear operations reversible. Clears
//! compose: a column clear followed by a global clear keeps both snapshots,
//! and every restore consults them through [`EditSession::resolve_restore_value`]
//! in the order global, column, row.
//!
//! Nothing here performs I/O. Operations naming an unknown post or field
//! are no-ops that return `false`.

/// Row and column visibility.
pub mod view;

#[cfg(test)]
mod tests;

pub use view::ViewFilter;

use crate::models::grid::{FieldColumn, GridPage};
use crate::models::post::{PostId, PostSummary};
use crate::models::value::FieldValue;
use crate::sync::SyncEntry;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

type Cells = BTreeMap<String, FieldValue>;

/// State of a clear/restore toggle control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleState {
    Normal,
    Cleared,
}

/// Cell counts for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SessionStats {
    pub rows: usize,
    pub fields: usize,
    pub cells: usize,
    pub empty_cells: usize,
    pub cleared_columns: usize,
    pub cleared_rows: usize,
    pub global_cleared: bool,
}

/// Emptiness predicate behind every "fully cleared" display.
pub fn is_empty(value: &FieldValue) -> bool {
    value.is_empty()
}

/// Editable state of one grid page.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    rows: Vec<PostSummary>,
    fields: Vec<FieldColumn>,
    current: BTreeMap<PostId, Cells>,
    column_snapshots: BTreeMap<String, BTreeMap<PostId, FieldValue>>,
    row_snapshots: BTreeMap<PostId, Cells>,
    global_snapshot: Option<BTreeMap<PostId, Cells>>,
    global_cleared: bool,
    cleared_columns: BTreeSet<String>,
    cleared_rows: BTreeSet<PostId>,
    selected: BTreeSet<PostId>,
    view: ViewFilter,
}

impl EditSession {
    /// Start a session from a built grid page.
    ///
    /// Every row gets a cell for every column; cells the post does not have
    /// start as an empty scalar.
    pub fn from_grid(grid: &GridPage) -> Self {
        let fields = grid.columns.clone();
        let mut rows = Vec::with_capacity(grid.rows.len());
        let mut current = BTreeMap::new();
        for row in &grid.rows {
            if current.contains_key(&row.post.id) {
                continue;
            }
            let cells: Cells = fields
                .iter()
                .map(|column| {
                    let value = row.fields.get(&column.key).cloned().unwrap_or_default();
                    (column.key.clone(), value)
                })
                .collect();
            current.insert(row.post.id, cells);
            rows.push(row.post.clone());
        }
        Self {
            rows,
            fields,
            current,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> &[PostSummary] {
        &self.rows
    }

    pub fn fields(&self) -> &[FieldColumn] {
        &self.fields
    }

    /// Current value of one cell.
    pub fn value(&self, post_id: PostId, field: &str) -> Option<&FieldValue> {
        self.current.get(&post_id).and_then(|cells| cells.get(field))
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|column| column.key == field)
    }

    pub fn has_row(&self, post_id: PostId) -> bool {
        self.current.contains_key(&post_id)
    }

    pub fn has_column_snapshot(&self, field: &str) -> bool {
        self.column_snapshots.contains_key(field)
    }

    pub fn has_row_snapshot(&self, post_id: PostId) -> bool {
        self.row_snapshots.contains_key(&post_id)
    }

    pub fn has_global_snapshot(&self) -> bool {
        self.global_snapshot.is_some()
    }

    pub fn is_global_cleared(&self) -> bool {
        self.global_cleared
    }

    fn field_keys(&self) -> Vec<String> {
        self.fields.iter().map(|column| column.key.clone()).collect()
    }

    fn row_ids(&self) -> Vec<PostId> {
        self.rows.iter().map(|post| post.id).collect()
    }

    fn cell_mut(&mut self, post_id: PostId, field: &str) -> Option<&mut FieldValue> {
        self.current
            .get_mut(&post_id)
            .and_then(|cells| cells.get_mut(field))
    }

    /// Overwrite one cell. Scalars are trimmed.
    pub fn set_cell(&mut self, post_id: PostId, field: &str, value: FieldValue) -> bool {
        match self.cell_mut(post_id, field) {
            Some(cell) => {
                *cell = value.normalized();
                true
            }
            None => false,
        }
    }

    /// Overwrite one cell from typed text, detecting JSON arrays.
    pub fn set_cell_input(&mut self, post_id: PostId, field: &str, raw: &str) -> bool {
        self.set_cell(post_id, field, FieldValue::from_input(raw))
    }

    fn snapshot_entries(&self, post_id: PostId, field: &str) -> [Option<&FieldValue>; 3] {
        let global = self
            .global_snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.get(&post_id))
            .and_then(|cells| cells.get(field));
        let column = self
            .column_snapshots
            .get(field)
            .and_then(|snapshot| snapshot.get(&post_id));
        let row = self
            .row_snapshots
            .get(&post_id)
            .and_then(|cells| cells.get(field));
        [global, column, row]
    }

    /// The value a restore would write into a cell.
    ///
    /// # Returns
    /// The first entry recorded for the cell in the global, column, and row
    /// snapshots, in that order, even when that entry is empty. `None` means
    /// no snapshot covers the cell and it must be left as it is.
    pub fn resolve_restore_value(&self, post_id: PostId, field: &str) -> Option<FieldValue> {
        self.snapshot_entries(post_id, field)
            .into_iter()
            .flatten()
            .next()
            .cloned()
    }

    fn first_filled_snapshot(&self, post_id: PostId, field: &str) -> Option<FieldValue> {
        self.snapshot_entries(post_id, field)
            .into_iter()
            .flatten()
            .find(|value| !value.is_empty())
            .cloned()
    }

    fn restore_cell(&mut self, post_id: PostId, field: &str) {
        if let Some(value) = self.resolve_restore_value(post_id, field) {
            if let Some(cell) = self.cell_mut(post_id, field) {
                *cell = value;
            }
        }
    }

    fn snapshot_column(&self, field: &str) -> BTreeMap<PostId, FieldValue> {
        self.current
            .iter()
            .filter_map(|(post_id, cells)| cells.get(field).map(|value| (*post_id, value.clone())))
            .collect()
    }

    /// Blank a column, snapshotting it first unless a snapshot already
    /// exists from an earlier clear.
    pub fn clear_column(&mut self, field: &str) -> bool {
        if !self.has_field(field) {
            return false;
        }
        if !self.column_snapshots.contains_key(field) {
            let snapshot = self.snapshot_column(field);
            self.column_snapshots.insert(field.to_string(), snapshot);
        }
        for cells in self.current.values_mut() {
            if let Some(cell) = cells.get_mut(field) {
                *cell = FieldValue::empty();
            }
        }
        self.cleared_columns.insert(field.to_string());
        tracing::debug!(field, "Cleared column");
        true
    }

    /// Write resolved values back into a column and drop its snapshot.
    ///
    /// Applies when the column is cleared or still has a snapshot.
    pub fn restore_column(&mut self, field: &str) -> bool {
        if !self.has_field(field)
            || (!self.cleared_columns.contains(field) && !self.column_snapshots.contains_key(field))
        {
            return false;
        }
        for post_id in self.row_ids() {
            self.restore_cell(post_id, field);
        }
        self.column_snapshots.remove(field);
        self.cleared_columns.remove(field);
        tracing::debug!(field, "Restored column");
        true
    }

    /// Blank a row, snapshotting it first unless a snapshot already exists.
    ///
    /// Every visible column left entirely empty by this clear is marked
    /// cleared as well.
    pub fn clear_row(&mut self, post_id: PostId) -> bool {
        let Some(cells) = self.current.get_mut(&post_id) else {
            return false;
        };
        self.row_snapshots
            .entry(post_id)
            .or_insert_with(|| cells.clone());
        for cell in cells.values_mut() {
            *cell = FieldValue::empty();
        }
        self.cleared_rows.insert(post_id);
        for key in self.field_keys() {
            if self.view.shows_field(&key) && self.column_is_empty(&key) {
                self.cleared_columns.insert(key);
            }
        }
        tracing::debug!(post_id, "Cleared row");
        true
    }

    /// Write resolved values back into a row and drop its snapshot.
    ///
    /// Afterwards each cleared column indicator resets when that column has
    /// no snapshot of its own and is no longer entirely empty.
    pub fn restore_row(&mut self, post_id: PostId) -> bool {
        if !self.has_row(post_id)
            || (!self.cleared_rows.contains(&post_id) && !self.row_snapshots.contains_key(&post_id))
        {
            return false;
        }
        for key in self.field_keys() {
            self.restore_cell(post_id, &key);
        }
        self.row_snapshots.remove(&post_id);
        self.cleared_rows.remove(&post_id);

        let settled: Vec<String> = self
            .cleared_columns
            .iter()
            .filter(|key| !self.column_snapshots.contains_key(*key) && !self.column_is_empty(key))
            .cloned()
            .collect();
        for key in settled {
            self.cleared_columns.remove(&key);
        }
        tracing::debug!(post_id, "Restored row");
        true
    }

    /// Blank every cell.
    ///
    /// Columns without a snapshot get one from their current values, and a
    /// global snapshot records each cell's restorable value: the current
    /// value when non-empty, otherwise what the existing snapshots hold.
    /// Does nothing while a global clear is already active.
    pub fn clear_all(&mut self) -> bool {
        if self.global_cleared {
            return false;
        }

        let mut global = BTreeMap::new();
        for (post_id, cells) in &self.current {
            let restorable: Cells = cells
                .iter()
                .map(|(key, value)| {
                    let kept = if value.is_empty() {
                        self.first_filled_snapshot(*post_id, key)
                            .unwrap_or_else(|| value.clone())
                    } else {
                        value.clone()
                    };
                    (key.clone(), kept)
                })
                .collect();
            global.insert(*post_id, restorable);
        }

        for key in self.field_keys() {
            if !self.column_snapshots.contains_key(&key) {
                let snapshot = self.snapshot_column(&key);
                self.column_snapshots.insert(key, snapshot);
            }
        }

        for cells in self.current.values_mut() {
            for cell in cells.values_mut() {
                *cell = FieldValue::empty();
            }
        }
        self.global_snapshot = Some(global);
        self.global_cleared = true;
        self.cleared_columns = self.field_keys().into_iter().collect();
        tracing::debug!(rows = self.rows.len(), fields = self.fields.len(), "Cleared all cells");
        true
    }

    /// Write every resolved value back, then discard all snapshots and
    /// indicators.
    ///
    /// # Returns
    /// `false` when there was nothing to restore.
    pub fn restore_all(&mut self) -> bool {
        let had_state = self.global_cleared
            || !self.column_snapshots.is_empty()
            || !self.row_snapshots.is_empty()
            || !self.cleared_columns.is_empty()
            || !self.cleared_rows.is_empty();
        if !had_state {
            return false;
        }

        let keys = self.field_keys();
        for post_id in self.row_ids() {
            for key in &keys {
                self.restore_cell(post_id, key);
            }
        }

        self.column_snapshots.clear();
        self.row_snapshots.clear();
        self.global_snapshot = None;
        self.global_cleared = false;
        self.cleared_columns.clear();
        self.cleared_rows.clear();
        tracing::debug!("Restored all cells");
        true
    }

    pub fn column_state(&self, field: &str) -> ToggleState {
        if self.cleared_columns.contains(field) {
            ToggleState::Cleared
        } else {
            ToggleState::Normal
        }
    }

    pub fn row_state(&self, post_id: PostId) -> ToggleState {
        if self.cleared_rows.contains(&post_id) {
            ToggleState::Cleared
        } else {
            ToggleState::Normal
        }
    }

    pub fn global_state(&self) -> ToggleState {
        if self.global_cleared {
            ToggleState::Cleared
        } else {
            ToggleState::Normal
        }
    }

    pub fn toggle_column(&mut self, field: &str) -> bool {
        match self.column_state(field) {
            ToggleState::Normal => self.clear_column(field),
            ToggleState::Cleared => self.restore_column(field),
        }
    }

    pub fn toggle_row(&mut self, post_id: PostId) -> bool {
        match self.row_state(post_id) {
            ToggleState::Normal => self.clear_row(post_id),
            ToggleState::Cleared => self.restore_row(post_id),
        }
    }

    pub fn toggle_all(&mut self) -> bool {
        match self.global_state() {
            ToggleState::Normal => self.clear_all(),
            ToggleState::Cleared => self.restore_all(),
        }
    }

    /// Add a row to or remove it from the selection.
    pub fn select_row(&mut self, post_id: PostId, selected: bool) -> bool {
        if !self.has_row(post_id) {
            return false;
        }
        if selected {
            self.selected.insert(post_id);
        } else {
            self.selected.remove(&post_id);
        }
        true
    }

    /// Selected rows in display order.
    pub fn selected_rows(&self) -> Vec<PostId> {
        self.rows
            .iter()
            .map(|post| post.id)
            .filter(|post_id| self.selected.contains(post_id))
            .collect()
    }

    /// Clear every selected row, then empty the selection.
    ///
    /// # Returns
    /// Number of rows cleared.
    pub fn clear_selected_rows(&mut self) -> usize {
        let targets = self.selected_rows();
        self.selected.clear();
        targets
            .into_iter()
            .filter(|post_id| self.clear_row(*post_id))
            .count()
    }

    /// Restore every selected row, then empty the selection.
    ///
    /// # Returns
    /// Number of rows restored.
    pub fn restore_selected_rows(&mut self) -> usize {
        let targets = self.selected_rows();
        self.selected.clear();
        targets
            .into_iter()
            .filter(|post_id| self.restore_row(*post_id))
            .count()
    }

    pub fn view(&self) -> &ViewFilter {
        &self.view
    }

    pub fn set_title_filter(&mut self, query: Option<&str>) {
        self.view.set_title(query);
    }

    /// Show a single field, or every field with `None`.
    ///
    /// An unknown field leaves the filter unchanged.
    pub fn set_field_filter(&mut self, field: Option<&str>) -> bool {
        if let Some(key) = field {
            if !self.has_field(key) {
                return false;
            }
        }
        self.view.set_field(field);
        true
    }

    pub fn visible_rows(&self) -> Vec<&PostSummary> {
        self.rows
            .iter()
            .filter(|post| self.view.shows_row(post))
            .collect()
    }

    pub fn visible_fields(&self) -> Vec<&FieldColumn> {
        self.fields
            .iter()
            .filter(|column| self.view.shows_field(&column.key))
            .collect()
    }

    /// Whether every visible row holds an empty value in `field`.
    ///
    /// `false` when no row is visible.
    pub fn column_is_empty(&self, field: &str) -> bool {
        let mut visible = self
            .rows
            .iter()
            .filter(|post| self.view.shows_row(post))
            .peekable();
        if visible.peek().is_none() {
            return false;
        }
        visible.all(|post| self.value(post.id, field).map_or(true, is_empty))
    }

    /// Whether every visible field of a row is empty.
    pub fn row_is_empty(&self, post_id: PostId) -> bool {
        match self.current.get(&post_id) {
            Some(cells) => cells
                .iter()
                .filter(|(key, _)| self.view.shows_field(key))
                .all(|(_, value)| is_empty(value)),
            None => false,
        }
    }

    pub fn stats(&self) -> SessionStats {
        let cells = self.current.values().map(BTreeMap::len).sum();
        let empty_cells = self
            .current
            .values()
            .flat_map(|cells| cells.values())
            .filter(|value| is_empty(value))
            .count();
        SessionStats {
            rows: self.rows.len(),
            fields: self.fields.len(),
            cells,
            empty_cells,
            cleared_columns: self.cleared_columns.len(),
            cleared_rows: self.cleared_rows.len(),
            global_cleared: self.global_cleared,
        }
    }

    /// Flatten the session for saving: one entry per row in display order,
    /// fields in column order. Rows without tracked fields are omitted.
    pub fn sync_entries(&self) -> Vec<SyncEntry> {
        self.rows
            .iter()
            .filter_map(|post| {
                let cells = self.current.get(&post.id)?;
                let fields: Vec<(String, FieldValue)> = self
                    .fields
                    .iter()
                    .filter_map(|column| {
                        cells
                            .get(&column.key)
                            .map(|value| (column.key.clone(), value.clone()))
                    })
                    .collect();
                (!fields.is_empty()).then(|| SyncEntry::new(post.id, fields))
            })
            .collect()
    }
}
