//! Fantasy League command line
//!
//! Loads the configured league, runs one command, and saves the league if
//! the command changed it.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use league_service::{initialize_logging_with_config, load_configuration, Command, LeagueService};

#[derive(Parser)]
#[command(name = "fantasy-league")]
#[command(about = "Run a head-to-head fantasy water polo league")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "LEAGUE_CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = load_configuration(cli.config.as_deref())?;
    initialize_logging_with_config(&config.logging)?;
    info!(league = %config.league.name, data_dir = ?config.persistence.data_dir, "Opening league");

    let service = LeagueService::open(config).await.context("Failed to open league")?;
    let output = service.run(&cli.command).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output.report).context("Failed to render report")?);
    } else {
        print!("{}", output.report);
    }

    Ok(if output.report.is_failure() { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
