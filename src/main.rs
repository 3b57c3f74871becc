//! Headless API server entrypoint.

use fieldgrid::{config::env_flag_enabled, shutdown_signal, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

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
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    let config = Config::from_env();
    tracing::info!("Using database at {}", config.db_path);
    fieldgrid::run(config, env_flag_enabled("ALLOW_PUBLIC_ACCESS"), shutdown_signal()).await
}

fn print_help() {
    println!("FieldGrid - bulk custom-field editor server\n");
    println!("Usage: fieldgrid [OPTIONS]\n");
    println!("Options:");
    println!("  --help  Show this help message");
    println!("\nSee `fieldgrid-server --help` for environment variables.");
}
