//! AppState construction extracted from `main.rs`.
//!
//! Shared by `serve` (which then binds a listener) and `check` (which stops
//! after proving the configuration resolves).

use std::sync::Arc;

use anyhow::Context;

use synapse_domain::config::{Config, ConfigSeverity, HistoryBackend, HistoryConfig};
use synapse_providers::ChatModel;
use synapse_sessions::{FileHistoryStore, HistoryStore, MemoryHistoryStore};

use crate::state::AppState;

/// Log every config issue and fail if any of them is an error.
pub fn validate_config(config: &Config) -> anyhow::Result<()> {
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("config validation failed with {errors} error(s)");
    }
    Ok(())
}

/// Resolve the configured model. Any failure is fatal for the host.
pub fn resolve_model(config: &Config) -> anyhow::Result<Arc<dyn ChatModel>> {
    synapse_providers::resolve(&config.model).map_err(|e| {
        tracing::error!(
            error = %e,
            "Fatal: Could not initialize language model. Please check configuration."
        );
        anyhow::Error::new(e).context("Cannot configure an LLM model provider")
    })
}

/// Open the configured history backing.
pub fn open_history(cfg: &HistoryConfig) -> anyhow::Result<Arc<dyn HistoryStore>> {
    let store: Arc<dyn HistoryStore> = match cfg.backend {
        HistoryBackend::File => Arc::new(
            FileHistoryStore::open(&cfg.dir)
                .with_context(|| format!("opening history directory {}", cfg.dir.display()))?,
        ),
        HistoryBackend::Memory => Arc::new(MemoryHistoryStore::new()),
    };
    tracing::info!(backend = store.backend(), dir = %cfg.dir.display(), "history store ready");
    Ok(store)
}

/// Validate config, resolve the model and open history storage.
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    validate_config(&config)?;
    let model = resolve_model(&config)?;
    tracing::info!(
        provider = model.provider_id(),
        model = model.model(),
        "Model initialized successfully."
    );
    let history = open_history(&config.history)?;

    Ok(AppState {
        config,
        model,
        history,
    })
}
