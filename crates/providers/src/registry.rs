//! Provider registry.
//!
//! Maps a provider tag to the constructor for its adapter and resolves a
//! [`ModelConfiguration`] into a ready-to-call [`ChatModel`]. The set of tags
//! is closed: adding a provider means adding one [`ProviderEntry`] to
//! [`PROVIDERS`]. Each constructor validates its own required fields.

use std::sync::Arc;

use synapse_domain::config::ModelConfiguration;
use synapse_domain::error::{Error, Result};
use synapse_domain::trace::TraceEvent;

use crate::google::GoogleProvider;
use crate::openai_compat::OpenAiCompatProvider;
use crate::traits::ChatModel;

type BuildFn = fn(&ModelConfiguration, &str) -> Result<Arc<dyn ChatModel>>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Registry table
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One supported provider.
pub struct ProviderEntry {
    /// Tag as it appears in `LLM_PROVIDER`.
    pub tag: &'static str,
    /// Model used when the configuration names none.
    pub default_model: Option<&'static str>,
    build: BuildFn,
}

impl std::fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("tag", &self.tag)
            .field("default_model", &self.default_model)
            .finish_non_exhaustive()
    }
}

pub static PROVIDERS: &[ProviderEntry] = &[
    ProviderEntry {
        tag: "google",
        default_model: Some("gemini-1.5-flash-latest"),
        build: build_google,
    },
    ProviderEntry {
        tag: "openai",
        default_model: Some("gpt-4o-mini"),
        build: build_openai,
    },
    ProviderEntry {
        tag: "mistral",
        default_model: Some("mistral-large-latest"),
        build: build_mistral,
    },
    ProviderEntry {
        tag: "openai-compatible",
        default_model: None,
        build: build_openai_compatible,
    },
    ProviderEntry {
        tag: "ollama",
        default_model: None,
        build: build_ollama,
    },
];

/// Look up a provider by tag (exact match).
pub fn lookup(tag: &str) -> Option<&'static ProviderEntry> {
    PROVIDERS.iter().find(|p| p.tag == tag)
}

/// All supported provider tags, in registry order.
pub fn known_providers() -> impl Iterator<Item = &'static str> {
    PROVIDERS.iter().map(|p| p.tag)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Resolution
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The model name to use: the configured name verbatim when non-empty,
/// otherwise the provider's default. `None` when neither exists.
pub fn effective_model_name(cfg: &ModelConfiguration) -> Option<String> {
    if !cfg.name.is_empty() {
        return Some(cfg.name.clone());
    }
    lookup(&cfg.provider)
        .and_then(|p| p.default_model)
        .map(String::from)
}

/// Resolve a configuration into a chat model handle.
///
/// Called once at startup. Any error is fatal for the host; no handle is
/// ever returned for a configuration that failed validation.
pub fn resolve(cfg: &ModelConfiguration) -> Result<Arc<dyn ChatModel>> {
    let Some(model) = effective_model_name(cfg) else {
        tracing::error!(
            provider = %cfg.provider,
            "cannot find a model name to use for the provider; set LLM_NAME"
        );
        return Err(Error::Config("no model name available".into()));
    };

    tracing::info!(provider = %cfg.provider, model = %model, "using LLM provider");

    let Some(entry) = lookup(&cfg.provider) else {
        tracing::error!(
            provider = %cfg.provider,
            known = ?known_providers().collect::<Vec<_>>(),
            "unknown LLM provider specified"
        );
        return Err(Error::Config("unknown provider".into()));
    };

    let handle = (entry.build)(cfg, &model)?;

    TraceEvent::ProviderResolved {
        provider: entry.tag.to_owned(),
        model: handle.model().to_owned(),
    }
    .emit();

    Ok(handle)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Constructors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn build_google(cfg: &ModelConfiguration, model: &str) -> Result<Arc<dyn ChatModel>> {
    Ok(Arc::new(GoogleProvider::from_config(cfg, model)?))
}

fn build_openai(cfg: &ModelConfiguration, model: &str) -> Result<Arc<dyn ChatModel>> {
    Ok(Arc::new(OpenAiCompatProvider::openai(cfg, model)?))
}

fn build_mistral(cfg: &ModelConfiguration, model: &str) -> Result<Arc<dyn ChatModel>> {
    Ok(Arc::new(OpenAiCompatProvider::mistral(cfg, model)?))
}

fn build_openai_compatible(cfg: &ModelConfiguration, model: &str) -> Result<Arc<dyn ChatModel>> {
    Ok(Arc::new(OpenAiCompatProvider::compatible(cfg, model)?))
}

fn build_ollama(cfg: &ModelConfiguration, model: &str) -> Result<Arc<dyn ChatModel>> {
    let Some(base_url) = cfg.base_url() else {
        tracing::error!(
            "A 'baseURL' is required for the 'ollama' provider (e.g., http://localhost:11434)."
        );
        return Err(Error::Config("missing base url".into()));
    };

    ollama_backend(base_url, model, cfg.temperature).map_err(ollama_init_failed)
}

/// Log the real cause of an Ollama acquisition failure and report it to the
/// caller as a plain init failure.
fn ollama_init_failed(e: Error) -> Error {
    tracing::error!(
        error = %e,
        backend_unavailable = matches!(e, Error::BackendUnavailable { .. }),
        "failed to initialize Ollama model"
    );
    Error::Config("ollama init failed".into())
}

#[cfg(feature = "ollama")]
fn ollama_backend(base_url: &str, model: &str, temperature: Option<f32>) -> Result<Arc<dyn ChatModel>> {
    Ok(Arc::new(crate::ollama::OllamaProvider::new(base_url, model, temperature)?))
}

#[cfg(not(feature = "ollama"))]
fn ollama_backend(_base_url: &str, _model: &str, _temperature: Option<f32>) -> Result<Arc<dyn ChatModel>> {
    Err(Error::BackendUnavailable {
        provider: "ollama".into(),
        message: "built without the `ollama` feature".into(),
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
