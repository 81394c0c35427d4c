//! Mindia CLI binary.
//!
//! This binary provides command-line access to Mindia's functionality:
//! - Upload, inspect, move, copy and delete media
//! - Download originals or transformed variants
//! - Manage named transformations and inspect tasks
//! - Run the background scheduler

use clap::Parser;
use mindia::{Mindia, MindiaConfig, ObservabilityConfig, init_observability_with_config};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, run};

    // Secrets such as REPLICATE_API_TOKEN may live in .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = MindiaConfig::load(cli.config.as_deref())?;

    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    init_observability_with_config(
        ObservabilityConfig::new("mindia")
            .with_log_level(log_level)
            .with_json_logs(config.logging.json),
    )?;

    let mindia = Mindia::from_config(&config)?;
    run(&mindia, cli.command).await?;

    Ok(())
}
