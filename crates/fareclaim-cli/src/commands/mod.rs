//! Subcommand implementations.

pub mod config;
pub mod scan;
pub mod submit;

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use fareclaim_core::models::config::FareclaimConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fareclaim")
        .join("config.json")
}

/// The file `--config` points at, or the default location.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load configuration.
///
/// An explicit `--config` file must exist; the default file is optional and
/// falls back to built-in defaults.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<FareclaimConfig> {
    if let Some(path) = explicit {
        return read_config(Path::new(path));
    }

    let path = default_config_path();
    if path.exists() {
        read_config(&path)
    } else {
        debug!("No config file at {}, using defaults", path.display());
        Ok(FareclaimConfig::default())
    }
}

fn read_config(path: &Path) -> anyhow::Result<FareclaimConfig> {
    debug!("Loading config from {}", path.display());
    FareclaimConfig::from_file(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}
