//! Configuration file management for wayfarer.
//!
//! Provides a TOML-based config file at `~/.config/wayfarer/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use wayfarer_db::config::DbConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    pub services: ServicesSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServicesSection {
    /// Base URL of the itinerary planning backend.
    pub planner_url: String,
    /// Base URL of the routing/geocoding provider.
    pub routing_url: String,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the wayfarer config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/wayfarer` or
/// `~/.config/wayfarer`. We intentionally ignore the platform-specific
/// `dirs::config_dir()` (which returns `~/Library/Application Support` on
/// macOS).
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("wayfarer");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("wayfarer")
}

/// Return the path to the wayfarer config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct WayfarerConfig {
    pub db_config: DbConfig,
    pub planner_url: String,
    pub routing_url: String,
}

impl WayfarerConfig {
    pub const DEFAULT_PLANNER_URL: &str = "http://localhost:8090";
    pub const DEFAULT_ROUTING_URL: &str = "http://localhost:8091";

    /// Resolve configuration using the chain:
    /// CLI flag > env var > config file > default.
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        let file = load_config().ok();

        let database_url = cli_db_url
            .map(str::to_owned)
            .or_else(|| std::env::var("WAYFARER_DATABASE_URL").ok())
            .or_else(|| file.as_ref().map(|f| f.database.url.clone()))
            .unwrap_or_else(|| DbConfig::DEFAULT_URL.to_owned());

        let planner_url = std::env::var("WAYFARER_PLANNER_URL")
            .ok()
            .or_else(|| file.as_ref().map(|f| f.services.planner_url.clone()))
            .unwrap_or_else(|| Self::DEFAULT_PLANNER_URL.to_owned());

        let routing_url = std::env::var("WAYFARER_ROUTING_URL")
            .ok()
            .or_else(|| file.as_ref().map(|f| f.services.routing_url.clone()))
            .unwrap_or_else(|| Self::DEFAULT_ROUTING_URL.to_owned());

        Ok(Self {
            db_config: DbConfig::new(database_url),
            planner_url,
            routing_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_roundtrip() {
        let cfg = ConfigFile {
            database: DatabaseSection {
                url: "postgresql://localhost:5432/wayfarer".to_owned(),
            },
            services: ServicesSection {
                planner_url: "http://localhost:8090".to_owned(),
                routing_url: "http://localhost:8091".to_owned(),
            },
        };
        let serialized = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ConfigFile = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.database.url, cfg.database.url);
        assert_eq!(parsed.services.planner_url, cfg.services.planner_url);
    }

    #[test]
    fn cli_flag_wins_over_default() {
        let resolved = WayfarerConfig::resolve(Some("postgresql://elsewhere:5432/trips")).unwrap();
        assert_eq!(
            resolved.db_config.database_url,
            "postgresql://elsewhere:5432/trips"
        );
    }
}
