use synapse_domain::config::Config;

use crate::{bootstrap, tls};

/// Validate the configuration, resolve the provider and load TLS material.
/// Nothing is bound and no request is sent to the provider.
pub fn check(config: &Config) -> anyhow::Result<()> {
    bootstrap::validate_config(config)?;
    let model = bootstrap::resolve_model(config)?;
    let tls = tls::load(&config.server.tls)?;

    println!(
        "Config OK: provider={} model={} tls={}",
        model.provider_id(),
        model.model(),
        if tls.is_some() { "on" } else { "off" },
    );
    Ok(())
}

/// Render the resolved config (with all defaults filled in) as TOML.
///
/// The API key is never serialized; a comment notes whether one is set.
pub fn render(config: &Config) -> anyhow::Result<String> {
    let mut output = toml::to_string_pretty(config)?;
    if config.model.api_key().is_some() {
        output.push_str("\n# model.apiKey is set (redacted)\n");
    }
    Ok(output)
}

pub fn show(config: &Config) -> anyhow::Result<()> {
    print!("{}", render(config)?);
    Ok(())
}
