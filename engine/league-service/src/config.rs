//! Service configuration management
//!
//! Defaults, then an optional TOML file, then `LEAGUE_*` environment
//! variables, then validation.

use anyhow::{anyhow, Context, Result};
use league_engine::{Week, DEFAULT_LEAGUE_NAME, DEFAULT_STARTING_WEEK};
use league_persistence::PersistenceConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a configuration file
pub const CONFIG_FILE_ENV: &str = "LEAGUE_CONFIG_FILE";

/// Main service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub league: LeagueSettings,
    pub persistence: PersistenceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueSettings {
    /// League loaded and saved by every command
    pub name: String,

    /// Current week of a league that has no saved state yet
    pub starting_week: Week,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LeagueSettings {
    fn default() -> Self {
        Self { name: DEFAULT_LEAGUE_NAME.to_string(), starting_week: DEFAULT_STARTING_WEEK }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

/// Load configuration from an optional file and the process environment
pub fn load_config(config_file: Option<&Path>) -> Result<ServiceConfig> {
    load_config_with(config_file, |key| std::env::var(key).ok())
}

/// Same as [`load_config`], reading variables through `lookup`
pub fn load_config_with(
    config_file: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ServiceConfig> {
    let config_file = config_file.map(Path::to_path_buf).or_else(|| lookup(CONFIG_FILE_ENV).map(PathBuf::from));

    let mut config = match &config_file {
        Some(path) => {
            tracing::debug!(path = ?path, "Loading configuration from file");
            load_from_file(path)?
        }
        None => ServiceConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config)?;

    Ok(config)
}

/// Load configuration from a TOML file; missing sections keep their defaults
pub fn load_from_file(path: &Path) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {path:?}"))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse configuration file: {path:?}"))
}

fn apply_env_overrides(config: &mut ServiceConfig, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(name) = lookup("LEAGUE_NAME") {
        config.league.name = name;
    }

    if let Some(data_dir) = lookup("LEAGUE_DATA_DIR") {
        config.persistence.data_dir = PathBuf::from(data_dir);
    }

    if let Some(level) = lookup("LEAGUE_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Some(format) = lookup("LEAGUE_LOG_FORMAT") {
        config.logging.format = format;
    }

    if let Some(max_snapshots) = lookup("LEAGUE_MAX_SNAPSHOTS") {
        config.persistence.snapshot.max_snapshots = max_snapshots
            .parse()
            .with_context(|| format!("Invalid LEAGUE_MAX_SNAPSHOTS: {max_snapshots}"))?;
    }

    Ok(())
}

pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    if config.league.name.trim().is_empty() {
        return Err(anyhow!("League name must not be empty"));
    }

    if config.league.starting_week == 0 {
        return Err(anyhow!("Starting week must be at least 1"));
    }

    config.persistence.validate().map_err(|e| anyhow!("Invalid persistence configuration: {e}"))?;

    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.logging.level)),
    }

    match config.logging.format.as_str() {
        "json" | "pretty" => {}
        _ => return Err(anyhow!("Invalid log format: {}", config.logging.format)),
    }

    Ok(())
}

/// Save configuration to a TOML file
pub fn save_config(config: &ServiceConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write configuration file: {path:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = load_config_with(None, env(&[])).unwrap();
        assert_eq!(config.league.name, "Fantasy Water Polo League");
        assert_eq!(config.league.starting_week, 1);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_file_then_env() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("league.toml");
        std::fs::write(
            &path,
            r#"
[league]
name = "Adriatic Cup"
starting_week = 3

[persistence]
data_dir = "/var/lib/league"

[persistence.snapshot]
max_snapshots = 4
"#,
        )
        .unwrap();

        let config = load_config_with(Some(&path), env(&[("LEAGUE_LOG_LEVEL", "debug")])).unwrap();
        assert_eq!(config.league.name, "Adriatic Cup");
        assert_eq!(config.league.starting_week, 3);
        assert_eq!(config.persistence.data_dir, PathBuf::from("/var/lib/league"));
        assert_eq!(config.persistence.snapshot.max_snapshots, 4);
        assert!(config.persistence.snapshot.pretty);
        assert_eq!(config.logging.level, "debug");

        let config = load_config_with(
            None,
            env(&[
                (CONFIG_FILE_ENV, path.to_str().unwrap()),
                ("LEAGUE_NAME", "Override"),
                ("LEAGUE_MAX_SNAPSHOTS", "9"),
            ]),
        )
        .unwrap();
        assert_eq!(config.league.name, "Override");
        assert_eq!(config.persistence.snapshot.max_snapshots, 9);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(load_config_with(None, env(&[("LEAGUE_LOG_LEVEL", "loud")])).is_err());
        assert!(load_config_with(None, env(&[("LEAGUE_LOG_FORMAT", "xml")])).is_err());
        assert!(load_config_with(None, env(&[("LEAGUE_MAX_SNAPSHOTS", "many")])).is_err());
        assert!(load_config_with(None, env(&[("LEAGUE_MAX_SNAPSHOTS", "0")])).is_err());
        assert!(load_config_with(None, env(&[("LEAGUE_NAME", "  ")])).is_err());
        assert!(load_config_with(Some(Path::new("/nonexistent/league.toml")), env(&[])).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved.toml");

        let mut config = ServiceConfig::default();
        config.league.name = "Saved".to_string();
        config.logging.format = "json".to_string();
        save_config(&config, &path).unwrap();

        assert_eq!(load_from_file(&path).unwrap(), config);
    }
}
