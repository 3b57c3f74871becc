//! Command-line client for the FieldGrid API.

mod ops;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use fieldgrid_client::{HttpTransport, SyncDriver, SyncError, SyncOptions, SyncOutcome};
use fieldgrid_core::constants::DEFAULT_BATCH_PAUSE_MS;
use fieldgrid_core::models::grid::GridPage;
use fieldgrid_core::models::post::{PostId, PostTypeDescriptor, PostTypeFilter};
use fieldgrid_core::session::ToggleState;
use fieldgrid_core::sync::{SaveBatch, SyncProgress};
use fieldgrid_core::{EditSession, DEFAULT_BATCH_SIZE, DEFAULT_CLI_SERVER_URL};
use ops::SessionOp;
use serde_json::{json, Value};
use std::io::{self, Read};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fgrid", about = "FieldGrid CLI", version)]
struct Cli {
    /// Server URL (can also be set via FG_SERVER env var)
    #[arg(short, long, env = "FG_SERVER")]
    server: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long, default_value = "30")]
    timeout: u64,

    /// Posts per save request
    #[arg(long, global = true, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Pause between save requests in milliseconds
    #[arg(long, global = true, default_value_t = DEFAULT_BATCH_PAUSE_MS)]
    pause_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// List registered post types
    Types,
    /// Show one grid page
    Grid {
        /// Post type name, or "all"
        #[arg(short, long, default_value = "all")]
        post_type: String,
        #[arg(long, default_value = "1")]
        page: usize,
    },
    /// Load a grid page, apply session operations, and optionally save
    Edit {
        #[arg(short, long, default_value = "all")]
        post_type: String,
        #[arg(long, default_value = "1")]
        page: usize,
        /// Operation such as clear-column:color or set:12:color=red (repeatable)
        #[arg(short, long = "op", value_name = "OP")]
        ops: Vec<SessionOp>,
        /// Send the resulting session to the server
        #[arg(long)]
        save: bool,
    },
    /// Save a {"post": {"field": value}} JSON map in batches
    Save {
        /// Input file; stdin when omitted
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Delete a field from one post or from every post
    DeleteField {
        key: String,
        /// Limit the deletion to one post
        #[arg(short, long)]
        post: Option<PostId>,
    },
}

fn fail(action: &str, message: impl std::fmt::Display) -> ! {
    eprintln!("{} failed: {}", action, message);
    std::process::exit(1);
}

fn normalize_server(server: String) -> String {
    if let Ok(mut url) = reqwest::Url::parse(&server) {
        let should_normalize_localhost =
            url.scheme().eq_ignore_ascii_case("http") && url.host_str() == Some("localhost");
        if should_normalize_localhost && url.set_host(Some("127.0.0.1")).is_err() {
            return server;
        }
        let mut normalized = url.to_string();
        while normalized.ends_with('/') {
            normalized.pop();
        }
        return normalized;
    }
    server
}

fn resolve_server(server: Option<String>) -> String {
    server
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_CLI_SERVER_URL.to_string())
}

fn pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| format!("response encoding error: {}", err))
}

fn format_types_output(types: &[PostTypeDescriptor], json: bool) -> Result<String, String> {
    if json {
        return pretty(&types);
    }
    Ok(types
        .iter()
        .map(|t| {
            let scope = if t.included_in_all() { "" } else { " (hidden from all)" };
            format!("{:<20} {}{}", t.name, t.label, scope)
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

fn format_grid_output(grid: &GridPage, json: bool) -> Result<String, String> {
    if json {
        return pretty(grid);
    }
    let mut lines = Vec::with_capacity(grid.rows.len() + 2);
    let mut header = format!("{:<8} {:<24}", "ID", "Title");
    for column in &grid.columns {
        header.push_str(&format!(" {:<16}", column.label));
    }
    lines.push(header.trim_end().to_string());
    for row in &grid.rows {
        let mut line = format!("{:<8} {:<24}", row.post.id, row.post.title);
        for column in &grid.columns {
            let cell = row
                .fields
                .get(&column.key)
                .map(|value| value.to_input())
                .unwrap_or_default();
            line.push_str(&format!(" {:<16}", cell));
        }
        lines.push(line.trim_end().to_string());
    }
    lines.push(format!(
        "page {}/{} ({} post(s), type {})",
        grid.page, grid.total_pages, grid.total_posts, grid.post_type
    ));
    Ok(lines.join("\n"))
}

fn marker(state: ToggleState) -> &'static str {
    match state {
        ToggleState::Normal => "",
        ToggleState::Cleared => "*",
    }
}

fn format_session_output(session: &EditSession, json: bool) -> Result<String, String> {
    let rows = session.visible_rows();
    let fields = session.visible_fields();
    if json {
        let columns: Vec<Value> = fields
            .iter()
            .map(|column| {
                json!({
                    "key": column.key,
                    "label": column.label,
                    "state": session.column_state(&column.key),
                })
            })
            .collect();
        let rows: Vec<Value> = rows
            .iter()
            .map(|post| {
                let cells: serde_json::Map<String, Value> = fields
                    .iter()
                    .filter_map(|column| {
                        let value = session.value(post.id, &column.key)?;
                        Some((column.key.clone(), json!(value)))
                    })
                    .collect();
                json!({
                    "id": post.id,
                    "title": post.title,
                    "state": session.row_state(post.id),
                    "fields": cells,
                })
            })
            .collect();
        return pretty(&json!({
            "stats": session.stats(),
            "global": session.global_state(),
            "columns": columns,
            "rows": rows,
        }));
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    let mut header = format!("{:<8} {:<24}", "ID", "Title");
    for column in &fields {
        let label = format!("{}{}", column.label, marker(session.column_state(&column.key)));
        header.push_str(&format!(" {:<16}", label));
    }
    lines.push(header.trim_end().to_string());
    for post in &rows {
        let id = format!("{}{}", post.id, marker(session.row_state(post.id)));
        let mut line = format!("{:<8} {:<24}", id, post.title);
        for column in &fields {
            let cell = session
                .value(post.id, &column.key)
                .map(|value| value.to_input())
                .unwrap_or_default();
            line.push_str(&format!(" {:<16}", cell));
        }
        lines.push(line.trim_end().to_string());
    }
    let stats = session.stats();
    lines.push(format!(
        "{} row(s), {} field(s), {}/{} empty cell(s){}",
        stats.rows,
        stats.fields,
        stats.empty_cells,
        stats.cells,
        if stats.global_cleared { ", all cleared" } else { "" }
    ));
    Ok(lines.join("\n"))
}

fn format_sync_output(outcome: &SyncOutcome, json: bool) -> Result<String, String> {
    if json {
        return pretty(&json!({
            "saved_count": outcome.saved,
            "batches_sent": outcome.batches_sent,
        }));
    }
    Ok(format!(
        "Saved {} field(s) in {} batch(es)",
        outcome.saved, outcome.batches_sent
    ))
}

fn report_progress(progress: SyncProgress) {
    eprintln!(
        "[save] batch {}/{} ({}%)",
        progress.batch, progress.total_batches, progress.percent
    );
}

fn parse_save_input(raw: &str) -> Result<SaveBatch, String> {
    serde_json::from_str(raw).map_err(|err| format!("invalid edit map: {}", err))
}

async fn run_sync(
    driver: &SyncDriver<HttpTransport>,
    batch: SaveBatch,
    json: bool,
) -> Result<(), SyncError> {
    let outcome = driver.sync_entries(batch.entries, report_progress).await?;
    match format_sync_output(&outcome, json) {
        Ok(output) => println!("{}", output),
        Err(message) => fail("Save", message),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldgrid=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let Cli {
        server,
        json,
        timeout,
        batch_size,
        pause_ms,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let server = normalize_server(resolve_server(server));
    let transport = match HttpTransport::new(server, Duration::from_secs(timeout)) {
        Ok(transport) => transport,
        Err(err) => fail("Connect", err),
    };
    let driver = SyncDriver::new(
        transport,
        SyncOptions {
            batch_size,
            pause: Duration::from_millis(pause_ms),
        },
    );

    match command {
        Commands::Completions { .. } => unreachable!("completions handled before client setup"),
        Commands::Types => {
            let types = match driver.transport().post_types().await {
                Ok(types) => types,
                Err(err) => fail("Types", err),
            };
            match format_types_output(&types, json) {
                Ok(output) => println!("{}", output),
                Err(message) => fail("Types", message),
            }
        }
        Commands::Grid { post_type, page } => {
            let filter = PostTypeFilter::parse(Some(post_type.as_str()));
            let grid = match driver.transport().grid(&filter, page).await {
                Ok(grid) => grid,
                Err(err) => fail("Grid", err),
            };
            match format_grid_output(&grid, json) {
                Ok(output) => println!("{}", output),
                Err(message) => fail("Grid", message),
            }
        }
        Commands::Edit {
            post_type,
            page,
            ops,
            save,
        } => {
            let filter = PostTypeFilter::parse(Some(post_type.as_str()));
            let grid = match driver.transport().grid(&filter, page).await {
                Ok(grid) => grid,
                Err(err) => fail("Edit", err),
            };
            let mut session = EditSession::from_grid(&grid);
            for op in &ops {
                if !op.apply(&mut session) {
                    eprintln!("note: {:?} changed nothing", op);
                }
            }
            match format_session_output(&session, json) {
                Ok(output) => println!("{}", output),
                Err(message) => fail("Edit", message),
            }
            if save {
                let outcome = match driver.sync_session(&session, report_progress).await {
                    Ok(outcome) => outcome,
                    Err(err) => fail("Save", err),
                };
                match format_sync_output(&outcome, json) {
                    Ok(output) => println!("{}", output),
                    Err(message) => fail("Save", message),
                }
            }
        }
        Commands::Save { file } => {
            let raw = if let Some(path) = file {
                std::fs::read_to_string(path)?
            } else {
                let mut buffer = String::new();
                io::stdin().read_to_string(&mut buffer)?;
                buffer
            };
            let batch = match parse_save_input(&raw) {
                Ok(batch) => batch,
                Err(message) => fail("Save", message),
            };
            if let Err(err) = run_sync(&driver, batch, json).await {
                fail("Save", err);
            }
        }
        Commands::DeleteField { key, post } => {
            let summary = match driver.transport().delete_field(post, &key).await {
                Ok(summary) => summary,
                Err(err) => fail("Delete field", err),
            };
            if json {
                println!("{}", pretty(&summary)?);
            } else {
                println!("{}", summary.message);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
