//! Service configuration resolution
//!
//! Provides two-tier configuration resolution with ENV → TOML priority,
//! falling back to the service's built-in defaults. Each service resolves
//! its own keys under a `BDCRM_<SERVICE>_` environment prefix and a
//! `bdcrm-<service>.toml` file in the working directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

/// Resolved runtime configuration for one service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// SQLite database file path
    pub database_path: PathBuf,
    /// Socket address the HTTP server binds
    pub bind_address: String,
}

/// Optional overrides loaded from the service's TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub bind_address: Option<String>,
}

/// Per-service configuration resolver
///
/// **Priority:** environment variable → TOML → default
pub struct ConfigResolver {
    service: String,
}

impl ConfigResolver {
    /// Create a resolver for the named service (e.g. `"wp"`)
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Path of the service's TOML config file
    pub fn config_path(&self) -> PathBuf {
        PathBuf::from(format!("bdcrm-{}.toml", self.service))
    }

    fn env_var(&self, key: &str) -> String {
        format!(
            "BDCRM_{}_{}",
            self.service.to_uppercase().replace('-', "_"),
            key
        )
    }

    /// Resolve the service configuration
    ///
    /// Reads the TOML file when present, then applies environment overrides.
    /// A malformed TOML file is a configuration error; missing files are not.
    pub fn resolve(&self, defaults: ServiceConfig) -> Result<ServiceConfig> {
        let toml_config = self.load_toml(&self.config_path())?;
        let mut config = defaults;

        if let Some(path) = toml_config.database_path {
            config.database_path = path;
        }
        if let Some(bind) = toml_config.bind_address {
            config.bind_address = bind;
        }

        let db_var = self.env_var("DATABASE");
        if let Ok(path) = std::env::var(&db_var) {
            if !path.trim().is_empty() {
                info!("Database path taken from {}", db_var);
                config.database_path = PathBuf::from(path);
            }
        }

        let bind_var = self.env_var("BIND");
        if let Ok(bind) = std::env::var(&bind_var) {
            if !bind.trim().is_empty() {
                info!("Bind address taken from {}", bind_var);
                config.bind_address = bind;
            }
        }

        Ok(config)
    }

    fn load_toml(&self, path: &Path) -> Result<TomlConfig> {
        if !path.exists() {
            return Ok(TomlConfig::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let parsed = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
        info!("Configuration loaded from {}", path.display());
        Ok(parsed)
    }
}

/// Write a TOML config file (best-effort companion to ENV overrides)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    if let Err(e) = std::fs::write(path, content) {
        warn!("TOML write failed: {}", e);
        return Err(Error::Io(e));
    }
    Ok(())
}
