//! Headless API server entrypoint.

use fieldgrid_core::config::env_flag_enabled;
use fieldgrid_core::constants::DEFAULT_PAGE_SIZE;
use fieldgrid_server::{shutdown_signal, Config, DEFAULT_PORT};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => flags.help = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldgrid=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli_flags = parse_cli_flags(&args)?;
    if cli_flags.help {
        print_help();
        return Ok(());
    }

    let config = Config::from_env();
    let allow_public = env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    fieldgrid_server::run(config, allow_public, shutdown_signal()).await
}

fn print_help() {
    println!("FieldGrid Server\n");
    println!("Usage: fieldgrid-server [OPTIONS]\n");
    println!("Options:");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!("  DB_PATH           Database directory (default: ~/.cache/fieldgrid/db)");
    println!("  PORT              Server port (default: {})", DEFAULT_PORT);
    println!("  MAX_REQUEST_SIZE  Maximum request body in bytes (default: 8MB)");
    println!(
        "  PAGE_SIZE         Posts per grid page (default: {})",
        DEFAULT_PAGE_SIZE
    );
    println!("  TOKEN_TTL_SECS    Anti-forgery token lifetime (default: 43200)");
    println!("  ALLOW_PUBLIC_ACCESS  Allow CORS from any origin and non-loopback binds");
    println!(
        "  BIND              Override bind address (e.g. 0.0.0.0:{})",
        DEFAULT_PORT
    );
}
