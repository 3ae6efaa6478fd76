use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Model configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Which provider to talk to and how.
///
/// The API key is accepted on input but never serialized, so the value can
/// be reported on `/status` and by `show-config` as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfiguration {
    /// Provider tag, e.g. `google`, `openai`, `ollama`.
    #[serde(default)]
    pub provider: String,
    /// Model identifier. Empty means "use the provider's default".
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Endpoint for `openai-compatible` and `ollama`; optional override
    /// for the hosted providers.
    #[serde(default, rename = "baseURL", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Reserved for providers backed by a local model file.
    #[serde(default, rename = "modelPath", skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
}

impl ModelConfiguration {
    /// The API key if set and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        non_empty(self.api_key.as_deref())
    }

    /// The base URL if set and non-empty.
    pub fn base_url(&self) -> Option<&str> {
        non_empty(self.base_url.as_deref())
    }
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}
