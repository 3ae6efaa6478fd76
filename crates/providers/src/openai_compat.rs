//! OpenAI-compatible adapter.
//!
//! Serves the `openai`, `mistral` and `openai-compatible` provider tags: all
//! three speak the OpenAI chat completions contract and differ only in base
//! URL, credential and temperature defaults.

use std::time::Instant;

use serde_json::Value;
use synapse_domain::config::ModelConfiguration;
use synapse_domain::error::{Error, Result};
use synapse_domain::message::{Message, Usage};

use crate::traits::{ChatModel, ChatRequest, ChatResponse};
use crate::util::{build_client, send_json, trace_request, u32_field};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const MISTRAL_BASE_URL: &str = "https://api.mistral.ai/v1";

/// Credential sent to internal OpenAI-compatible gateways that do not check it.
const PLACEHOLDER_KEY: &str = "EMPTY";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A chat model behind any OpenAI chat-completions endpoint.
pub struct OpenAiCompatProvider {
    id: &'static str,
    base_url: String,
    api_key: String,
    model: String,
    temperature: Option<f32>,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Hosted OpenAI. Requires an API key.
    pub fn openai(cfg: &ModelConfiguration, model: &str) -> Result<Self> {
        let api_key = require_api_key(cfg, "OpenAI")?;
        Self::new("openai", cfg.base_url().unwrap_or(OPENAI_BASE_URL), api_key, model, cfg.temperature)
    }

    /// Hosted Mistral. Requires an API key.
    pub fn mistral(cfg: &ModelConfiguration, model: &str) -> Result<Self> {
        let api_key = require_api_key(cfg, "Mistral")?;
        Self::new("mistral", cfg.base_url().unwrap_or(MISTRAL_BASE_URL), api_key, model, cfg.temperature)
    }

    /// A trusted internal endpoint speaking the OpenAI contract (vLLM, TGI,
    /// LiteLLM, ...). Requires a base URL and a model name; no real key.
    pub fn compatible(cfg: &ModelConfiguration, model: &str) -> Result<Self> {
        let Some(base_url) = cfg.base_url() else {
            tracing::error!("A 'baseURL' is required for the 'openai-compatible' provider.");
            return Err(Error::Config("missing base url".into()));
        };
        if model.trim().is_empty() {
            tracing::error!("A model 'name' is required for the 'openai-compatible' provider.");
            return Err(Error::Config("no model name available".into()));
        }
        let api_key = cfg.api_key().unwrap_or(PLACEHOLDER_KEY);
        Self::new(
            "openai-compatible",
            base_url,
            api_key,
            model,
            Some(cfg.temperature.unwrap_or(0.0)),
        )
    }

    fn new(
        id: &'static str,
        base_url: &str,
        api_key: &str,
        model: &str,
        temperature: Option<f32>,
    ) -> Result<Self> {
        Ok(Self {
            id,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            temperature,
            client: build_client(id)?,
        })
    }

    fn build_chat_body(&self, req: &ChatRequest) -> Value {
        let messages: Vec<Value> = req.messages.iter().map(msg_to_openai).collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
        });

        if let Some(temp) = self.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        body
    }
}

fn require_api_key<'a>(cfg: &'a ModelConfiguration, vendor: &str) -> Result<&'a str> {
    cfg.api_key().ok_or_else(|| {
        tracing::error!("API key not set. Cannot initialize {vendor} model.");
        Error::Config("missing api key".into())
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire conversion
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn msg_to_openai(msg: &Message) -> Value {
    serde_json::json!({
        "role": msg.role.as_str(),
        "content": msg.content,
    })
}

fn parse_chat_response(provider: &str, body: &Value) -> Result<ChatResponse> {
    let choice = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .ok_or_else(|| Error::Provider {
            provider: provider.into(),
            message: "no choices in response".into(),
        })?;

    let message = choice.get("message").ok_or_else(|| Error::Provider {
        provider: provider.into(),
        message: "no message in choice".into(),
    })?;

    let content = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let finish_reason = choice
        .get("finish_reason")
        .and_then(|v| v.as_str())
        .map(String::from);

    let model = body
        .get("model")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    let usage = body.get("usage").and_then(parse_openai_usage);

    Ok(ChatResponse {
        content,
        usage,
        model,
        finish_reason,
    })
}

fn parse_openai_usage(v: &Value) -> Option<Usage> {
    Some(Usage {
        prompt_tokens: u32_field(v, "prompt_tokens")?,
        completion_tokens: u32_field(v, "completion_tokens")?,
        total_tokens: u32_field(v, "total_tokens")?,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl ChatModel for OpenAiCompatProvider {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_chat_body(req);
        let started = Instant::now();

        tracing::debug!(provider = %self.id, url = %url, "openai_compat chat request");

        let request = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body);
        let resp_json = send_json(self.id, request).await?;

        let resp = parse_chat_response(self.id, &resp_json)?;
        trace_request(self.id, &self.model, started, resp.usage.as_ref());
        Ok(resp)
    }

    fn provider_id(&self) -> &str {
        self.id
    }

    fn model(&self) -> &str {
        &self.model
    }
}
