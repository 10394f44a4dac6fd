use std::sync::Arc;

use moka::sync::Cache;
use tracing::debug;

use discovery_core::{ChatClient, ChatMessage, ChatRequest};

/// A chat client bound to one model and temperature.
pub struct ModelHandle {
    pub client: Arc<dyn ChatClient>,
    pub model: String,
    pub temperature: f32,
}

impl ModelHandle {
    pub fn request(&self, messages: Vec<ChatMessage>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages,
        }
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("client", &self.client.name())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Process-wide model handles, keyed by (model, temperature).
///
/// Handles are immutable once built; every session asking for the same
/// pair shares one.
pub struct ClientCache {
    client: Arc<dyn ChatClient>,
    handles: Cache<(String, u32), Arc<ModelHandle>>,
}

impl ClientCache {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self {
            client,
            handles: Cache::builder().max_capacity(256).build(),
        }
    }

    pub fn handle(&self, model: &str, temperature: f32) -> Arc<ModelHandle> {
        let key = (model.to_string(), temperature.to_bits());
        self.handles.get_with(key, || {
            debug!(model, temperature, backend = self.client.name(), "Creating model handle");
            Arc::new(ModelHandle {
                client: Arc::clone(&self.client),
                model: model.to_string(),
                temperature,
            })
        })
    }

    pub fn backend_name(&self) -> &str {
        self.client.name()
    }
}
