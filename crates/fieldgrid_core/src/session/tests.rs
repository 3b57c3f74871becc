//! Edit session behavior tests.

use super::*;
use crate::models::grid::GridRow;
use crate::models::post::PostStatus;

const P1: PostId = 1;
const P2: PostId = 2;

fn post(id: PostId, title: &str) -> PostSummary {
    PostSummary {
        id,
        title: title.to_string(),
        status: PostStatus::Publish,
        post_type: "post".to_string(),
    }
}

fn column(key: &str) -> FieldColumn {
    FieldColumn {
        key: key.to_string(),
        label: key.to_string(),
    }
}

fn grid(rows: Vec<(PostSummary, Vec<(&str, FieldValue)>)>, keys: &[&str]) -> GridPage {
    GridPage {
        post_type: "all".to_string(),
        page: 1,
        page_size: 100,
        total_posts: rows.len(),
        total_pages: 1,
        post_types: Vec::new(),
        columns: keys.iter().map(|key| column(key)).collect(),
        rows: rows
            .into_iter()
            .map(|(post, fields)| GridRow {
                post,
                fields: fields
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            })
            .collect(),
    }
}

/// P1: {color: red}, P2: {color: blue, tags: [x, y]}
fn scenario_session() -> EditSession {
    EditSession::from_grid(&grid(
        vec![
            (post(P1, "First"), vec![("color", FieldValue::scalar("red"))]),
            (
                post(P2, "Second"),
                vec![
                    ("color", FieldValue::scalar("blue")),
                    ("tags", FieldValue::list(["x", "y"])),
                ],
            ),
        ],
        &["color", "tags"],
    ))
}

fn cell(session: &EditSession, post_id: PostId, field: &str) -> FieldValue {
    session.value(post_id, field).cloned().expect("known cell")
}

fn all_cells(session: &EditSession) -> Vec<(PostId, String, FieldValue)> {
    session
        .rows()
        .iter()
        .flat_map(|post| {
            session.fields().iter().map(move |column| {
                (
                    post.id,
                    column.key.clone(),
                    session.value(post.id, &column.key).cloned().expect("cell"),
                )
            })
        })
        .collect()
}

#[test]
fn from_grid_fills_absent_cells_with_empty_scalar() {
    let session = scenario_session();
    assert_eq!(cell(&session, P1, "tags"), FieldValue::empty());
    assert_eq!(cell(&session, P2, "tags"), FieldValue::list(["x", "y"]));
    assert_eq!(session.stats().cells, 4);
    assert_eq!(session.stats().empty_cells, 1);
}

#[test]
fn set_cell_trims_scalars_and_ignores_unknown_targets() {
    let mut session = scenario_session();
    assert!(session.set_cell(P1, "color", FieldValue::scalar("  green  ")));
    assert_eq!(cell(&session, P1, "color"), FieldValue::scalar("green"));
    assert!(session.set_cell_input(P1, "tags", " [\"a\"] "));
    assert_eq!(cell(&session, P1, "tags"), FieldValue::list(["a"]));

    assert!(!session.set_cell(99, "color", FieldValue::scalar("x")));
    assert!(!session.set_cell(P1, "missing", FieldValue::scalar("x")));
    assert!(session.value(P1, "missing").is_none());
}

#[test]
fn column_clear_then_restore_scenario() {
    let mut session = scenario_session();
    assert!(session.clear_column("color"));
    assert_eq!(cell(&session, P1, "color"), FieldValue::empty());
    assert_eq!(cell(&session, P2, "color"), FieldValue::empty());
    assert_eq!(session.column_state("color"), ToggleState::Cleared);

    assert!(session.restore_column("color"));
    assert_eq!(cell(&session, P1, "color"), FieldValue::scalar("red"));
    assert_eq!(cell(&session, P2, "color"), FieldValue::scalar("blue"));
    assert_eq!(cell(&session, P2, "tags"), FieldValue::list(["x", "y"]));
    assert_eq!(session.column_state("color"), ToggleState::Normal);
    assert!(!session.has_column_snapshot("color"));
}

#[test]
fn column_clear_restore_is_an_inverse_for_every_column() {
    for key in ["color", "tags"] {
        let mut session = scenario_session();
        let before = all_cells(&session);
        session.clear_column(key);
        session.restore_column(key);
        assert_eq!(all_cells(&session), before, "column {}", key);
    }
}

#[test]
fn repeated_column_clear_keeps_first_snapshot() {
    let mut session = scenario_session();
    session.clear_column("color");
    session.set_cell(P1, "color", FieldValue::scalar("typed while cleared"));
    session.clear_column("color");
    session.restore_column("color");
    assert_eq!(cell(&session, P1, "color"), FieldValue::scalar("red"));
}

#[test]
fn restore_column_writes_back_recorded_empty_cells() {
    let mut session = scenario_session();
    session.clear_column("tags");
    session.set_cell(P1, "tags", FieldValue::scalar("new"));
    session.restore_column("tags");
    // P1 was empty when the column was cleared, so it is empty again.
    assert_eq!(cell(&session, P1, "tags"), FieldValue::empty());
    assert_eq!(cell(&session, P2, "tags"), FieldValue::list(["x", "y"]));
}

#[test]
fn restore_without_any_snapshot_leaves_cell_untouched() {
    let mut session = scenario_session();
    session.clear_row(P2);
    session.set_cell(P1, "tags", FieldValue::scalar("typed"));
    // Only P2 has a snapshot; the tags column has none.
    assert_eq!(session.resolve_restore_value(P1, "tags"), None);
    assert!(session.restore_column("tags"));
    assert_eq!(cell(&session, P1, "tags"), FieldValue::scalar("typed"));
    assert_eq!(cell(&session, P2, "tags"), FieldValue::list(["x", "y"]));
}

#[test]
fn column_clear_restore_is_an_inverse_after_a_row_clear() {
    let mut session = scenario_session();
    session.clear_row(P1);
    let before = all_cells(&session);
    assert_eq!(cell(&session, P1, "color"), FieldValue::empty());

    assert!(session.clear_column("color"));
    assert!(session.restore_column("color"));
    // The empty column entry for P1 wins over its older row snapshot.
    assert_eq!(all_cells(&session), before);
    assert_eq!(cell(&session, P2, "color"), FieldValue::scalar("blue"));
    assert!(session.has_row_snapshot(P1));

    assert!(session.restore_row(P1));
    assert_eq!(cell(&session, P1, "color"), FieldValue::scalar("red"));
}

#[test]
fn restore_column_falls_back_to_row_snapshot() {
    let mut session = scenario_session();
    session.clear_row(P2);
    assert_eq!(cell(&session, P2, "tags"), FieldValue::empty());
    // Every visible row is now empty in `tags`, so its indicator is set.
    assert_eq!(session.column_state("tags"), ToggleState::Cleared);
    assert_eq!(session.column_state("color"), ToggleState::Normal);

    assert!(session.restore_column("tags"));
    assert_eq!(cell(&session, P2, "tags"), FieldValue::list(["x", "y"]));
    assert_eq!(cell(&session, P2, "color"), FieldValue::empty());
    assert_eq!(session.row_state(P2), ToggleState::Cleared);
}

#[test]
fn row_clear_then_restore() {
    let mut session = scenario_session();
    let before = all_cells(&session);
    assert!(session.clear_row(P2));
    assert_eq!(session.row_state(P2), ToggleState::Cleared);
    assert!(session.row_is_empty(P2));
    assert!(!session.row_is_empty(P1));

    assert!(session.restore_row(P2));
    assert_eq!(all_cells(&session), before);
    assert_eq!(session.row_state(P2), ToggleState::Normal);
    assert_eq!(session.column_state("tags"), ToggleState::Normal);
    assert!(!session.has_row_snapshot(P2));
}

#[test]
fn clearing_every_row_marks_every_column() {
    let mut session = scenario_session();
    session.select_row(P1, true);
    session.select_row(P2, true);
    assert_eq!(session.clear_selected_rows(), 2);
    assert!(session.selected_rows().is_empty());
    assert_eq!(session.column_state("color"), ToggleState::Cleared);
    assert_eq!(session.column_state("tags"), ToggleState::Cleared);

    session.select_row(P1, true);
    assert_eq!(session.restore_selected_rows(), 1);
    // color is filled again for P1; tags is still empty everywhere.
    assert_eq!(session.column_state("color"), ToggleState::Normal);
    assert_eq!(session.column_state("tags"), ToggleState::Cleared);
}

#[test]
fn column_indicator_stays_while_column_snapshot_remains() {
    let mut session = scenario_session();
    session.clear_column("color");
    session.clear_row(P1);
    session.restore_row(P1);
    assert_eq!(session.column_state("color"), ToggleState::Cleared);
    assert!(session.has_column_snapshot("color"));
}

#[test]
fn clear_all_then_restore_all_is_a_full_reset() {
    let mut session = scenario_session();
    let before = all_cells(&session);
    assert!(session.clear_all());
    assert!(all_cells(&session).iter().all(|(_, _, value)| value.is_empty()));
    assert!(session.is_global_cleared());
    assert!(session.has_global_snapshot());
    assert!(session.has_column_snapshot("color"));
    assert!(session.has_column_snapshot("tags"));
    assert_eq!(session.column_state("tags"), ToggleState::Cleared);

    assert!(session.restore_all());
    assert_eq!(all_cells(&session), before);
    assert!(!session.is_global_cleared());
    assert!(!session.has_global_snapshot());
    assert!(!session.has_column_snapshot("color"));
    assert!(!session.has_column_snapshot("tags"));
    assert_eq!(session.stats().cleared_columns, 0);
}

#[test]
fn column_clear_during_global_clear_keeps_restore_all_working() {
    let mut session = scenario_session();
    session.clear_all();
    assert!(session.clear_column("tags"));
    assert_eq!(cell(&session, P2, "tags"), FieldValue::empty());

    session.restore_all();
    assert_eq!(cell(&session, P2, "tags"), FieldValue::list(["x", "y"]));
    assert_eq!(cell(&session, P1, "color"), FieldValue::scalar("red"));
}

#[test]
fn clear_all_composes_with_earlier_column_and_row_clears() {
    let mut session = scenario_session();
    session.clear_column("color");
    session.clear_row(P2);
    session.clear_all();

    // The global snapshot picked up values held by the earlier snapshots.
    assert_eq!(
        session.resolve_restore_value(P1, "color"),
        Some(FieldValue::scalar("red"))
    );
    assert_eq!(
        session.resolve_restore_value(P2, "tags"),
        Some(FieldValue::list(["x", "y"]))
    );

    session.restore_all();
    assert_eq!(cell(&session, P1, "color"), FieldValue::scalar("red"));
    assert_eq!(cell(&session, P2, "color"), FieldValue::scalar("blue"));
    assert_eq!(cell(&session, P2, "tags"), FieldValue::list(["x", "y"]));
    assert_eq!(session.row_state(P2), ToggleState::Normal);
    assert!(!session.has_row_snapshot(P2));
}

#[test]
fn second_clear_all_is_a_no_op() {
    let mut session = scenario_session();
    session.clear_all();
    session.set_cell(P1, "color", FieldValue::scalar("typed"));
    assert!(!session.clear_all());
    assert_eq!(cell(&session, P1, "color"), FieldValue::scalar("typed"));
    session.restore_all();
    assert_eq!(cell(&session, P1, "color"), FieldValue::scalar("red"));
}

#[test]
fn restore_all_without_state_does_nothing() {
    let mut session = scenario_session();
    assert!(!session.restore_all());
    assert!(!session.restore_column("color"));
    assert!(!session.restore_row(P1));
}

#[test]
fn resolver_prefers_global_then_column_then_row() {
    let mut session = scenario_session();
    session.clear_row(P1);
    assert_eq!(
        session.resolve_restore_value(P1, "color"),
        Some(FieldValue::scalar("red"))
    );

    session.restore_row(P1);
    session.clear_column("color");
    session.set_cell(P1, "color", FieldValue::scalar("later"));
    session.clear_row(P1);
    // Column snapshot wins over the newer row snapshot.
    assert_eq!(
        session.resolve_restore_value(P1, "color"),
        Some(FieldValue::scalar("red"))
    );
    // The row snapshot records P1's empty tags cell.
    assert_eq!(
        session.resolve_restore_value(P1, "tags"),
        Some(FieldValue::empty())
    );
    assert_eq!(session.resolve_restore_value(P2, "tags"), None);
}

#[test]
fn toggles_dispatch_on_indicator_state() {
    let mut session = scenario_session();
    assert!(session.toggle_column("color"));
    assert_eq!(session.column_state("color"), ToggleState::Cleared);
    assert!(session.toggle_column("color"));
    assert_eq!(cell(&session, P1, "color"), FieldValue::scalar("red"));

    assert!(session.toggle_row(P1));
    assert_eq!(session.row_state(P1), ToggleState::Cleared);
    assert!(session.toggle_row(P1));
    assert_eq!(session.row_state(P1), ToggleState::Normal);

    assert!(session.toggle_all());
    assert_eq!(session.global_state(), ToggleState::Cleared);
    assert!(session.toggle_all());
    assert_eq!(session.global_state(), ToggleState::Normal);
    assert!(!session.toggle_column("missing"));
}

#[test]
fn unknown_targets_are_no_ops() {
    let mut session = scenario_session();
    let before = all_cells(&session);
    assert!(!session.clear_column("missing"));
    assert!(!session.clear_row(42));
    assert!(!session.restore_row(42));
    assert!(!session.select_row(42, true));
    assert!(!session.set_field_filter(Some("missing")));
    assert_eq!(all_cells(&session), before);
}

#[test]
fn view_filters_scope_column_emptiness() {
    let mut session = scenario_session();
    session.set_title_filter(Some("second"));
    assert_eq!(
        session
            .visible_rows()
            .iter()
            .map(|post| post.id)
            .collect::<Vec<_>>(),
        vec![P2]
    );
    session.clear_row(P2);
    // Only P2 is visible, so both columns count as entirely empty.
    assert_eq!(session.column_state("color"), ToggleState::Cleared);
    assert!(!session.has_column_snapshot("color"));
    session.restore_row(P2);
    assert_eq!(session.column_state("color"), ToggleState::Normal);

    session.set_title_filter(Some("nothing matches"));
    assert!(session.visible_rows().is_empty());
    assert!(!session.column_is_empty("color"));

    session.set_title_filter(None);
    assert!(session.set_field_filter(Some("tags")));
    let keys: Vec<&str> = session
        .visible_fields()
        .iter()
        .map(|column| column.key.as_str())
        .collect();
    assert_eq!(keys, vec!["tags"]);
}

#[test]
fn sync_entries_flatten_in_row_and_column_order() {
    let mut session = scenario_session();
    session.clear_column("color");
    let entries = session.sync_entries();
    assert_eq!(
        entries,
        vec![
            SyncEntry::new(
                P1,
                vec![
                    ("color".to_string(), FieldValue::empty()),
                    ("tags".to_string(), FieldValue::empty()),
                ]
            ),
            SyncEntry::new(
                P2,
                vec![
                    ("color".to_string(), FieldValue::empty()),
                    ("tags".to_string(), FieldValue::list(["x", "y"])),
                ]
            ),
        ]
    );

    let no_columns = EditSession::from_grid(&grid(vec![(post(P1, "Bare"), Vec::new())], &[]));
    assert!(no_columns.sync_entries().is_empty());
}

#[test]
fn is_empty_predicate_matches_value_rules() {
    assert!(is_empty(&FieldValue::scalar("  \n ")));
    assert!(is_empty(&FieldValue::List(Vec::new())));
    assert!(!is_empty(&FieldValue::list([""])));
    assert!(!is_empty(&FieldValue::scalar("0")));
}
