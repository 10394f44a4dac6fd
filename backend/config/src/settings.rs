//! Runtime settings read from the environment.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::io::DEFAULT_CONFIG_PATH;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AZURE_API_VERSION: &str = "2025-04-01-preview";

/// Which chat completion service to talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendSettings {
    OpenAi {
        base_url: String,
        api_key: Option<String>,
    },
    Azure {
        endpoint: String,
        api_key: Option<String>,
        api_version: String,
    },
}

impl BackendSettings {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi { .. } => "openai",
            Self::Azure { .. } => "azure",
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        match self {
            Self::OpenAi { api_key, .. } | Self::Azure { api_key, .. } => api_key.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Agent/page configuration file.
    pub config_path: PathBuf,
    /// Replaces the built-in guardrail text when set.
    pub guardrails_path: Option<PathBuf>,
    /// Directory for the rolling JSON log; `None` logs to the console only.
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
    pub backend: BackendSettings,
}

impl Settings {
    /// Load settings from environment variables with sensible defaults.
    ///
    /// Azure is selected when `AZURE_OPENAI_ENDPOINT` is set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match var("AZURE_OPENAI_ENDPOINT") {
            Some(endpoint) => BackendSettings::Azure {
                endpoint,
                api_key: var("AZURE_OPENAI_API_KEY"),
                api_version: var("AZURE_OPENAI_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string()),
            },
            None => BackendSettings::OpenAi {
                base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                api_key: var("OPENAI_API_KEY"),
            },
        };

        Self {
            config_path: var("DISCOVERY_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
            guardrails_path: var("DISCOVERY_GUARDRAILS").map(PathBuf::from),
            log_dir: var("DISCOVERY_LOG_DIR").map(PathBuf::from),
            log_level: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            backend,
        }
    }
}

/// Load a `.env` file into the process environment. Variables that are
/// already set keep their value.
///
/// Without `path` the file is looked up from the current directory upwards.
/// A missing file is not an error. Returns the file that was read.
pub fn load_env_file(path: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    let result = match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match result {
        Ok(path) => Ok(Some(path)),
        Err(err) if err.not_found() => Ok(None),
        Err(err) => Err(err).context("Failed to read environment file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_to_openai() {
        let s = settings(&[]);
        assert_eq!(s.config_path, PathBuf::from("config/pages.yaml"));
        assert_eq!(s.log_level, "info");
        assert_eq!(
            s.backend,
            BackendSettings::OpenAi { base_url: DEFAULT_OPENAI_BASE_URL.into(), api_key: None }
        );
    }

    #[test]
    fn azure_endpoint_selects_azure() {
        let s = settings(&[
            ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com"),
            ("AZURE_OPENAI_API_KEY", "secret"),
            ("OPENAI_API_KEY", "ignored"),
        ]);
        assert_eq!(s.backend.name(), "azure");
        assert_eq!(s.backend.api_key(), Some("secret"));
        match s.backend {
            BackendSettings::Azure { api_version, .. } => assert_eq!(api_version, "2025-04-01-preview"),
            other => panic!("unexpected backend {other:?}"),
        }
    }

    #[test]
    fn blank_values_count_as_unset() {
        let s = settings(&[("DISCOVERY_CONFIG", "  "), ("AZURE_OPENAI_ENDPOINT", "")]);
        assert_eq!(s.config_path, PathBuf::from("config/pages.yaml"));
        assert_eq!(s.backend.name(), "openai");
    }

    #[test]
    fn env_file_fills_unset_variables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "DISCOVERY_ENV_FILE_MODEL=gpt-4o-mini\nDISCOVERY_ENV_FILE_KEPT=from-file\n",
        )
        .unwrap();
        std::env::set_var("DISCOVERY_ENV_FILE_KEPT", "from-shell");

        let loaded = load_env_file(Some(&path)).unwrap();
        assert_eq!(loaded.as_deref(), Some(path.as_path()));
        assert_eq!(std::env::var("DISCOVERY_ENV_FILE_MODEL").unwrap(), "gpt-4o-mini");
        assert_eq!(std::env::var("DISCOVERY_ENV_FILE_KEPT").unwrap(), "from-shell");
    }

    #[test]
    fn missing_env_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_env_file(Some(&dir.path().join(".env"))).unwrap(), None);
    }
}
