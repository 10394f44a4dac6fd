pub mod error;
pub mod message;
pub mod traits;
pub mod types;

pub use error::DiscoveryError;
pub use message::{contains_markup, guard_user_input, last_turns, wrap_document, ChatMessage, Conversation, Role};
pub use traits::{ChatChunk, ChatClient, ChatRequest, ChatStream, Completion};
pub use types::TokenUsage;
