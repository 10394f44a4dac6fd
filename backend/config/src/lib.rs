//! `discovery-config` — agent and page configuration.
//!
//! Provides:
//! - Typed schema for `pages.yaml` (agent definitions, catalog sections)
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Cross-reference validation
//! - Page catalog filtering by role
//! - Runtime settings from the environment

pub mod catalog;
pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod settings;
pub mod validation;

pub use catalog::{available_agents, default_agent, AgentPage};
pub use defaults::apply_all_defaults;
pub use env::{collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{base_dir, resolve_path, DEFAULT_CONFIG_PATH};
pub use schema::{AgentDefinition, AgentKind, AgentRoute, PageEntry, PagesConfig};
pub use settings::{load_env_file, BackendSettings, Settings};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// A config file after substitution, defaults and validation.
#[derive(Debug)]
pub struct LoadedConfig {
    pub path: PathBuf,
    /// Directory relative prompt paths resolve against.
    pub base_dir: PathBuf,
    pub pages: PagesConfig,
    pub report: ValidationReport,
}

/// Load, apply env substitution, and apply defaults to a config file.
///
/// This is the main entry point for loading a config at runtime. Validation
/// problems are logged and returned in the report; callers decide whether
/// errors are fatal.
pub async fn load_and_prepare(path: &Path) -> Result<LoadedConfig> {
    let value = io::load_raw(path).await?;

    // Substitute ${VAR} env vars.
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;

    let pages = apply_all_defaults(io::parse_config(value, path)?);

    let report = validate(&pages);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }

    Ok(LoadedConfig {
        path: path.to_path_buf(),
        base_dir: base_dir(path),
        pages,
        report,
    })
}
