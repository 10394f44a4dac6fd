//! Config file reading and path resolution.

use crate::schema::PagesConfig;
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Config file used when neither the CLI nor the environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "config/pages.yaml";

/// Read the config file as a raw value tree, before env substitution.
///
/// An empty file yields an empty mapping.
pub async fn load_raw(path: &Path) -> Result<Value> {
    if !path.exists() {
        bail!("Config file not found: {}", path.display());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    if raw.trim().is_empty() {
        debug!(path = %path.display(), "Config file is empty");
        return Ok(Value::Object(Default::default()));
    }

    let value: Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    debug!(path = %path.display(), bytes = raw.len(), "Read config file");
    Ok(value)
}

/// Convert a substituted value tree into the typed config.
pub fn parse_config(value: Value, path: &Path) -> Result<PagesConfig> {
    let config: PagesConfig = serde_json::from_value(value)
        .with_context(|| format!("Invalid agent configuration in: {}", path.display()))?;
    info!(path = %path.display(), agents = config.agents.len(), "Loaded config");
    Ok(config)
}

/// Directory that relative prompt paths are resolved against.
pub fn base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_path(base: &Path, path: &str) -> PathBuf {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base.join(candidate)
    }
}
