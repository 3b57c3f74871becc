//! Unit tests for the `fgrid` CLI entrypoint module.

use super::{
    format_grid_output, format_session_output, format_sync_output, format_types_output,
    normalize_server, parse_save_input, resolve_server, Cli, Commands,
};
use crate::ops::SessionOp;
use clap::Parser;
use fieldgrid_client::SyncOutcome;
use fieldgrid_core::models::grid::{FieldColumn, GridPage, GridRow};
use fieldgrid_core::models::post::{PostStatus, PostSummary, PostTypeDescriptor};
use fieldgrid_core::models::value::FieldValue;
use fieldgrid_core::{EditSession, DEFAULT_BATCH_SIZE, DEFAULT_CLI_SERVER_URL, DEFAULT_PORT};

fn grid() -> GridPage {
    let row = |id: u64, title: &str, fields: &[(&str, FieldValue)]| GridRow {
        post: PostSummary {
            id,
            title: title.to_string(),
            status: PostStatus::Publish,
            post_type: "post".to_string(),
        },
        fields: fields
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect(),
    };
    GridPage {
        post_type: "all".to_string(),
        page: 1,
        page_size: 100,
        total_posts: 2,
        total_pages: 1,
        post_types: Vec::new(),
        columns: vec![
            FieldColumn {
                key: "color".to_string(),
                label: "Color".to_string(),
            },
            FieldColumn {
                key: "tags".to_string(),
                label: "tags".to_string(),
            },
        ],
        rows: vec![
            row(
                1,
                "Alpha",
                &[
                    ("color", FieldValue::scalar("red")),
                    ("tags", FieldValue::list(["a", "b"])),
                ],
            ),
            row(2, "Beta", &[("color", FieldValue::scalar("blue"))]),
        ],
    }
}

#[test]
fn normalize_server_matrix() {
    let cases = [
        (
            DEFAULT_CLI_SERVER_URL.to_string(),
            format!("http://127.0.0.1:{}", DEFAULT_PORT),
        ),
        (
            format!("https://localhost:{}", DEFAULT_PORT),
            format!("https://localhost:{}", DEFAULT_PORT),
        ),
        (
            format!("http://127.0.0.1:{}/", DEFAULT_PORT),
            format!("http://127.0.0.1:{}", DEFAULT_PORT),
        ),
    ];
    for (input, expected) in cases {
        assert_eq!(normalize_server(input), expected);
    }
}

#[test]
fn resolve_server_treats_blank_override_as_absent() {
    assert_eq!(resolve_server(None), DEFAULT_CLI_SERVER_URL);
    assert_eq!(resolve_server(Some("   ".to_string())), DEFAULT_CLI_SERVER_URL);
    assert_eq!(
        resolve_server(Some(" http://127.0.0.1:9 ".to_string())),
        "http://127.0.0.1:9"
    );
}

#[test]
fn cli_parses_edit_with_repeated_ops() {
    let cli = Cli::try_parse_from([
        "fgrid",
        "--server",
        "http://127.0.0.1:9",
        "edit",
        "--op",
        "clear-column:color",
        "--op",
        "set:2:color=green",
        "--save",
        "--batch-size",
        "5",
    ])
    .expect("cli should parse edit");
    assert_eq!(cli.batch_size, 5);
    match cli.command {
        Commands::Edit { ops, save, page, .. } => {
            assert!(save);
            assert_eq!(page, 1);
            assert_eq!(
                ops,
                vec![
                    SessionOp::ClearColumn("color".to_string()),
                    SessionOp::Set {
                        post_id: 2,
                        field: "color".to_string(),
                        raw: "green".to_string(),
                    },
                ]
            );
        }
        _ => panic!("expected edit command"),
    }
}

#[test]
fn cli_rejects_unknown_op_and_uses_batch_defaults() {
    assert!(Cli::try_parse_from(["fgrid", "edit", "--op", "explode"]).is_err());
    let cli = Cli::try_parse_from(["fgrid", "save", "--file", "edits.json"]).expect("save");
    assert_eq!(cli.batch_size, DEFAULT_BATCH_SIZE);
    assert_eq!(cli.pause_ms, 100);
    match cli.command {
        Commands::Save { file } => assert_eq!(file.as_deref(), Some("edits.json")),
        _ => panic!("expected save command"),
    }
}

#[test]
fn cli_parses_delete_field_scope() {
    let cli = Cli::try_parse_from(["fgrid", "delete-field", "color", "--post", "12"])
        .expect("delete-field");
    match cli.command {
        Commands::DeleteField { key, post } => {
            assert_eq!(key, "color");
            assert_eq!(post, Some(12));
        }
        _ => panic!("expected delete-field command"),
    }
}

#[test]
fn grid_output_lists_cells_and_paging() {
    let output = format_grid_output(&grid(), false).expect("grid text");
    let lines: Vec<&str> = output.lines().collect();
    assert!(lines[0].starts_with("ID"));
    assert!(lines[0].contains("Color"));
    assert!(lines[1].contains("red"));
    assert!(lines[1].contains(r#"["a","b"]"#));
    assert!(lines[2].contains("Beta"));
    assert_eq!(lines[3], "page 1/1 (2 post(s), type all)");

    let rendered = format_grid_output(&grid(), true).expect("grid json");
    let parsed: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");
    assert_eq!(parsed["rows"][0]["fields"]["tags"], serde_json::json!(["a", "b"]));
}

#[test]
fn session_output_marks_cleared_columns_and_rows() {
    let mut session = EditSession::from_grid(&grid());
    assert!(session.clear_column("color"));
    assert!(session.clear_row(2));

    let output = format_session_output(&session, false).expect("session text");
    let header = output.lines().next().expect("header");
    assert!(header.contains("Color*"));
    assert!(output.lines().any(|line| line.starts_with("2*")));

    let rendered = format_session_output(&session, true).expect("session json");
    let parsed: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");
    assert_eq!(parsed["columns"][0]["state"], "cleared");
    assert_eq!(parsed["rows"][1]["state"], "cleared");
    assert_eq!(parsed["rows"][0]["fields"]["color"], "");
    assert_eq!(parsed["global"], "normal");
}

#[test]
fn session_output_honours_title_filter() {
    let mut session = EditSession::from_grid(&grid());
    session.set_title_filter(Some("bet"));
    let output = format_session_output(&session, false).expect("session text");
    assert!(!output.contains("Alpha"));
    assert!(output.contains("Beta"));
}

#[test]
fn save_input_keeps_order_and_rejects_bad_ids() {
    let batch = parse_save_input(r#"{"9": {"b": "x", "a": ["1"]}, "3": {"c": ""}}"#)
        .expect("valid map");
    let ids: Vec<u64> = batch.entries.iter().map(|entry| entry.post_id).collect();
    assert_eq!(ids, vec![9, 3]);
    assert_eq!(batch.entries[0].fields[0].0, "b");

    assert!(parse_save_input(r#"{"abc": {"k": "v"}}"#).is_err());
    assert!(parse_save_input("[]").is_err());
}

#[test]
fn types_and_sync_output_render_plain_text() {
    let types = vec![PostTypeDescriptor {
        name: "product".to_string(),
        label: "Products".to_string(),
        public: false,
        show_ui: false,
        builtin: false,
    }];
    let output = format_types_output(&types, false).expect("types");
    assert!(output.starts_with("product"));
    assert!(output.contains("Products"));

    let outcome = SyncOutcome {
        saved: 4,
        batches_sent: 2,
    };
    assert_eq!(
        format_sync_output(&outcome, false).expect("sync"),
        "Saved 4 field(s) in 2 batch(es)"
    );
}
