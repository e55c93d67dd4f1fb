//! Fantasy League Service Library
//!
//! Configuration, logging, statistics-feed loading and the command layer
//! behind the `fantasy-league` binary. Each command runs against the latest
//! saved state of the configured league and saves a new snapshot when it
//! changes anything.

use anyhow::{Context, Result};
use std::path::Path;

pub mod commands;
pub mod config;
pub mod feed;
pub mod logging;
pub mod service;

pub use commands::{Command, PoolEntry, Report};
pub use config::ServiceConfig;
pub use logging::{initialize_logging, initialize_logging_with_config};
pub use service::{CommandOutput, LeagueService, MAX_SAVE_ATTEMPTS};

/// Load configuration from an optional file and `LEAGUE_*` environment variables
pub fn load_configuration(config_file: Option<&Path>) -> Result<ServiceConfig> {
    config::load_config(config_file).context("Failed to load service configuration")
}
