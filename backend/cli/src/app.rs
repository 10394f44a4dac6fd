//! Startup wiring: settings, configuration, chat client and agent context.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use discovery_agent::{AgentContext, AgentRegistry, PromptLoader};
use discovery_config::{load_and_prepare, BackendSettings, LoadedConfig, Settings};
use discovery_core::ChatClient;
use discovery_providers::{Endpoint, OpenAiClient, ScriptedClient};

/// Reply of the `--offline` client.
pub const OFFLINE_REPLY: &str = "(offline) No model is connected, so this is a placeholder reply.";

pub struct App {
    pub loaded: LoadedConfig,
    pub ctx: Arc<AgentContext>,
}

impl App {
    /// Load the configuration and build the shared agent context.
    /// Validation errors are kept in the report; see [`App::ensure_valid`].
    pub async fn load(settings: &Settings, client: Arc<dyn ChatClient>) -> Result<Self> {
        let loaded = load_and_prepare(&settings.config_path)
            .await
            .with_context(|| format!("Failed to load {}", settings.config_path.display()))?;

        let mut prompts = PromptLoader::new(loaded.base_dir.clone());
        if let Some(path) = &settings.guardrails_path {
            prompts = prompts.with_guardrails_file(path)?;
        }

        let registry = AgentRegistry::from_config(&loaded.pages);
        info!(
            config = %loaded.path.display(),
            agents = registry.len(),
            backend = client.name(),
            "Configuration loaded"
        );

        let ctx = AgentContext::new(registry, prompts, client);
        Ok(Self { loaded, ctx: Arc::new(ctx) })
    }

    pub fn ensure_valid(&self) -> Result<()> {
        let report = &self.loaded.report;
        if !report.is_valid() {
            let first = report.errors.iter().map(ToString::to_string).next().unwrap_or_default();
            bail!(
                "{} has {} configuration error(s), run `discovery validate` for details. First: {first}",
                self.loaded.path.display(),
                report.errors.len()
            );
        }
        Ok(())
    }
}

/// The chat client for the configured backend, or a canned one when offline.
pub fn chat_client(settings: &Settings, offline: bool) -> Result<Arc<dyn ChatClient>> {
    if offline {
        let client = ScriptedClient::new().with_name("offline").with_default_reply(OFFLINE_REPLY);
        return Ok(Arc::new(client));
    }
    Ok(Arc::new(OpenAiClient::new(endpoint(&settings.backend)?)))
}

fn endpoint(backend: &BackendSettings) -> Result<Endpoint> {
    let endpoint = match backend {
        BackendSettings::OpenAi { base_url, api_key } => Endpoint::OpenAi {
            base_url: base_url.clone(),
            api_key: api_key.clone().context("OPENAI_API_KEY is not set (use --offline to chat without a model)")?,
        },
        BackendSettings::Azure { endpoint, api_key, api_version } => Endpoint::Azure {
            endpoint: endpoint.clone(),
            api_key: api_key.clone().context("AZURE_OPENAI_API_KEY is not set")?,
            api_version: api_version.clone(),
        },
    };
    Ok(endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_azure_settings() {
        let backend = BackendSettings::Azure {
            endpoint: "https://example.openai.azure.com".into(),
            api_key: Some("k".into()),
            api_version: "2025-04-01-preview".into(),
        };
        let endpoint = endpoint(&backend).unwrap();
        assert_eq!(endpoint.name(), "azure");
        assert!(endpoint.url("gpt-4o").contains("/openai/deployments/gpt-4o/"));
    }

    #[test]
    fn missing_key_is_an_error() {
        let backend = BackendSettings::OpenAi { base_url: "https://api.openai.com/v1".into(), api_key: None };
        assert!(endpoint(&backend).unwrap_err().to_string().contains("OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn loads_sample_style_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("facilitator.md"), "You facilitate.").unwrap();
        let path = dir.path().join("pages.yaml");
        std::fs::write(
            &path,
            "agents:\n  facilitator:\n    persona: facilitator.md\nsections:\n  Workshop:\n    - type: agent\n      agent: facilitator\n      title: Facilitator\n      default: true\n",
        )
        .unwrap();

        let settings = Settings {
            config_path: path,
            ..Settings::from_lookup(|_| None)
        };
        let app = App::load(&settings, chat_client(&settings, true).unwrap()).await.unwrap();
        app.ensure_valid().unwrap();
        assert!(app.ctx.registry.contains("facilitator"));
        assert_eq!(app.ctx.clients.backend_name(), "offline");
    }
}
