//! Google Gemini adapter.
//!
//! Implements the Gemini `generateContent` API. Auth is via an API key
//! passed in the `x-goog-api-key` header, never in the URL.

use std::time::Instant;

use serde_json::Value;
use synapse_domain::config::ModelConfiguration;
use synapse_domain::error::{Error, Result};
use synapse_domain::message::{Message, Role, Usage};

use crate::traits::{ChatModel, ChatRequest, ChatResponse};
use crate::util::{build_client, send_json, trace_request, u32_field};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const API_KEY_HEADER: &str = "x-goog-api-key";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A chat model backed by the Google Gemini API.
pub struct GoogleProvider {
    base_url: String,
    api_key: String,
    model: String,
    temperature: Option<f32>,
    client: reqwest::Client,
}

impl GoogleProvider {
    /// Build a handle for `model`. Requires a non-empty API key.
    pub fn from_config(cfg: &ModelConfiguration, model: &str) -> Result<Self> {
        let Some(api_key) = cfg.api_key() else {
            tracing::error!("API key not set. Cannot initialize Google Gemini model.");
            return Err(Error::Config("missing api key".into()));
        };

        Ok(Self {
            base_url: cfg
                .base_url()
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            temperature: cfg.temperature,
            client: build_client("google")?,
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_body(&self, req: &ChatRequest) -> Value {
        let mut contents: Vec<Value> = Vec::new();
        let mut system_parts: Vec<Value> = Vec::new();

        for msg in &req.messages {
            match msg.role {
                Role::System => system_parts.push(serde_json::json!({"text": msg.content})),
                Role::User | Role::Assistant => contents.push(to_gemini(msg)),
            }
        }

        let mut body = serde_json::json!({
            "contents": contents,
        });

        if !system_parts.is_empty() {
            body["systemInstruction"] = serde_json::json!({ "parts": system_parts });
        }

        if let Some(temp) = self.temperature {
            body["generationConfig"] = serde_json::json!({ "temperature": temp });
        }

        body
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire conversion
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn to_gemini(msg: &Message) -> Value {
    // Gemini calls the assistant side "model".
    let role = match msg.role {
        Role::Assistant => "model",
        _ => "user",
    };
    serde_json::json!({
        "role": role,
        "parts": [{"text": msg.content}],
    })
}

fn parse_gemini_response(body: &Value, model: &str) -> Result<ChatResponse> {
    let candidate = match body
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
    {
        Some(c) => c,
        None => {
            let reason = body
                .get("promptFeedback")
                .and_then(|f| f.get("blockReason"))
                .and_then(|r| r.as_str());
            let message = match reason {
                Some(r) => format!("prompt blocked: {r}"),
                None => "no candidates in response".into(),
            };
            return Err(Error::Provider {
                provider: "google".into(),
                message,
            });
        }
    };

    let content: String = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect()
        })
        .unwrap_or_default();

    let finish_reason = candidate
        .get("finishReason")
        .and_then(|v| v.as_str())
        .map(|s| match s {
            "STOP" => "stop".to_string(),
            "MAX_TOKENS" => "length".to_string(),
            other => other.to_lowercase(),
        });

    let usage = body.get("usageMetadata").and_then(parse_gemini_usage);

    Ok(ChatResponse {
        content,
        usage,
        model: body
            .get("modelVersion")
            .and_then(|v| v.as_str())
            .unwrap_or(model)
            .to_string(),
        finish_reason,
    })
}

fn parse_gemini_usage(v: &Value) -> Option<Usage> {
    let prompt = u32_field(v, "promptTokenCount")?;
    let completion = u32_field(v, "candidatesTokenCount").unwrap_or(0);
    Some(Usage {
        prompt_tokens: prompt,
        completion_tokens: completion,
        total_tokens: u32_field(v, "totalTokenCount").unwrap_or(prompt.saturating_add(completion)),
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl ChatModel for GoogleProvider {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        let body = self.build_body(req);
        let started = Instant::now();

        tracing::debug!(url = %self.generate_url(), "google chat request");

        let request = self
            .client
            .post(self.generate_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body);
        let resp_json = send_json("google", request).await?;

        let resp = parse_gemini_response(&resp_json, &self.model)?;
        trace_request("google", &self.model, started, resp.usage.as_ref());
        Ok(resp)
    }

    fn provider_id(&self) -> &str {
        "google"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
