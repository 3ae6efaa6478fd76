use synapse_domain::error::Result;
use synapse_domain::message::{Message, Usage};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / Response types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A provider-agnostic chat completion request.
///
/// Sampling settings live on the handle, fixed at resolution time.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// The conversation messages to send, oldest first.
    pub messages: Vec<Message>,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

/// A provider-agnostic chat completion response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Textual content of the reply.
    pub content: String,
    pub usage: Option<Usage>,
    /// The model that actually produced the response.
    pub model: String,
    /// Normalized stop reason ("stop", "length", ...).
    pub finish_reason: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core capability trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A ready-to-call chat model.
///
/// Handles are built once by [`crate::registry::resolve`] and shared across
/// all requests, so `chat` takes `&self` and must not mutate the handle.
#[async_trait::async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the conversation and wait for the full reply.
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse>;

    /// Provider tag this handle was built for (`google`, `ollama`, ...).
    fn provider_id(&self) -> &str;

    /// Effective model name sent to the provider.
    fn model(&self) -> &str;
}
