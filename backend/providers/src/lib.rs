//! Chat completion backends.
//!
//! - `OpenAiClient`: streaming client for OpenAI-compatible and Azure OpenAI endpoints
//! - `ScriptedClient`: deterministic client for tests and offline runs
//! - `ClientCache`: shared model handles keyed by (model, temperature)

pub mod cache;
pub mod openai;
pub mod scripted;
pub mod sse;

pub use cache::{ClientCache, ModelHandle};
pub use openai::{Endpoint, OpenAiClient, DEFAULT_AZURE_API_VERSION, DEFAULT_OPENAI_BASE_URL};
pub use scripted::{Script, ScriptedClient};
pub use sse::{SseDecoder, SseEvent};
