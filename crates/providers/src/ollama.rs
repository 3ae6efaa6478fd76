//! Ollama adapter.
//!
//! Talks to a local or remote Ollama daemon via its native non-streaming
//! `/api/chat` endpoint.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use synapse_domain::error::{Error, Result};
use synapse_domain::message::{Message, Usage};

use crate::traits::{ChatModel, ChatRequest, ChatResponse};
use crate::util::{build_client, send_json, trace_request};

/// A chat model served by an Ollama daemon.
pub struct OllamaProvider {
    base_url: String,
    model: String,
    temperature: Option<f32>,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// `base_url` is the daemon root, e.g. `http://localhost:11434`.
    pub fn new(base_url: &str, model: &str, temperature: Option<f32>) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_owned(),
            temperature,
            client: build_client("ollama")?,
        })
    }

    fn build_request<'a>(&'a self, req: &'a ChatRequest) -> OllamaRequest<'a> {
        let options = self
            .temperature
            .map(|temperature| OllamaOptions { temperature });
        OllamaRequest {
            model: &self.model,
            messages: req.messages.iter().map(OllamaMessage::from).collect(),
            stream: false,
            options,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a Message> for OllamaMessage<'a> {
    fn from(msg: &'a Message) -> Self {
        Self {
            role: msg.role.as_str(),
            content: &msg.content,
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    model: Option<String>,
    message: OllamaReply,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaReply {
    #[serde(default)]
    content: String,
}

impl OllamaResponse {
    fn into_chat_response(self, fallback_model: &str) -> ChatResponse {
        let usage = match (self.prompt_eval_count, self.eval_count) {
            (Some(p), Some(c)) => Some(Usage {
                prompt_tokens: p,
                completion_tokens: c,
                total_tokens: p.saturating_add(c),
            }),
            _ => None,
        };
        ChatResponse {
            content: self.message.content,
            usage,
            model: self.model.unwrap_or_else(|| fallback_model.to_owned()),
            finish_reason: self.done_reason,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl ChatModel for OllamaProvider {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/api/chat", self.base_url);
        let body = self.build_request(req);
        let started = Instant::now();

        tracing::debug!(url = %url, "ollama chat request");

        let resp_json = send_json("ollama", self.client.post(&url).json(&body)).await?;
        let parsed: OllamaResponse = serde_json::from_value(resp_json).map_err(|e| Error::Provider {
            provider: "ollama".into(),
            message: format!("unexpected /api/chat response: {e}"),
        })?;

        let resp = parsed.into_chat_response(&self.model);
        trace_request("ollama", &self.model, started, resp.usage.as_ref());
        Ok(resp)
    }

    fn provider_id(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
