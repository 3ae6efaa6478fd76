pub mod config;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use synapse_domain::config::{
    Config, CorsConfig, HistoryBackend, HistoryConfig, LogFormat, ModelConfiguration,
    ObservabilityConfig, ServerConfig, TlsConfig,
};

/// Synapse host: forwards chat turns to an LLM provider with per-session
/// history.
#[derive(Debug, Parser)]
#[command(name = "synapse-host", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server (default when no subcommand is given).
    Serve,
    /// Resolve the provider and load TLS material, then exit.
    Check,
    /// Print the resolved configuration as TOML (API key redacted).
    ShowConfig,
}

/// Every setting is a flag with an environment variable fallback.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Running mode label.
    #[arg(long = "env", env = "SYNAPSE_ENV", default_value = "development")]
    pub environment: String,

    #[arg(long, env = "SYNAPSE_APP_PORT", default_value_t = 3000)]
    pub port: u16,

    #[arg(long, env = "SYNAPSE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Tracing filter directive; `RUST_LOG` takes precedence.
    #[arg(long, env = "SYNAPSE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(
        long,
        env = "SYNAPSE_LOG_FORMAT",
        default_value = "json",
        value_parser = ["json", "pretty"]
    )]
    pub log_format: String,

    /// OTLP/gRPC endpoint for span export.
    #[arg(long, env = "SYNAPSE_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Provider tag: google, openai, mistral, openai-compatible, ollama.
    #[arg(long, env = "LLM_PROVIDER", default_value = "")]
    pub provider: String,

    /// Model name; empty selects the provider default.
    #[arg(long = "model", env = "LLM_NAME", default_value = "")]
    pub model_name: String,

    #[arg(long, env = "LLM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "LLM_TEMPERATURE", default_value_t = 0.2)]
    pub temperature: f32,

    #[arg(long, env = "LLM_BASE_URL")]
    pub base_url: Option<String>,

    #[arg(long, env = "LLM_MODEL_PATH")]
    pub model_path: Option<String>,

    #[arg(long, env = "SYNAPSE_SSL_KEY")]
    pub ssl_key: Option<PathBuf>,

    #[arg(long, env = "SYNAPSE_SSL_CERTIFICATE")]
    pub ssl_certificate: Option<PathBuf>,

    #[arg(long, env = "SYNAPSE_SSL_CERTIFICATE_CA")]
    pub ssl_certificate_ca: Option<PathBuf>,

    /// Comma-separated allowed origins; empty mirrors the request origin.
    #[arg(long, env = "SYNAPSE_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    #[arg(
        long,
        env = "SYNAPSE_HISTORY_BACKEND",
        default_value = "file",
        value_parser = ["file", "memory"]
    )]
    pub history_backend: String,

    #[arg(long, env = "SYNAPSE_HISTORY_DIR", default_value = "./.synapse/history")]
    pub history_dir: PathBuf,
}

impl Settings {
    /// Assemble the immutable host configuration.
    pub fn into_config(self) -> Config {
        let log_format = match self.log_format.as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        };
        let backend = match self.history_backend.as_str() {
            "memory" => HistoryBackend::Memory,
            _ => HistoryBackend::File,
        };

        Config {
            environment: self.environment,
            server: ServerConfig {
                port: self.port,
                host: self.host,
                log_level: self.log_level,
                log_format,
                cors: CorsConfig {
                    allowed_origins: self
                        .cors_origins
                        .into_iter()
                        .map(|o| o.trim().to_owned())
                        .filter(|o| !o.is_empty())
                        .collect(),
                },
                tls: TlsConfig {
                    key: non_empty_path(self.ssl_key),
                    certificate: non_empty_path(self.ssl_certificate),
                    certificate_ca: non_empty_path(self.ssl_certificate_ca),
                },
            },
            model: ModelConfiguration {
                provider: self.provider.trim().to_owned(),
                name: self.model_name.trim().to_owned(),
                api_key: self.api_key,
                temperature: Some(self.temperature),
                base_url: self.base_url,
                model_path: self.model_path,
            },
            history: HistoryConfig {
                backend,
                dir: self.history_dir,
            },
            observability: ObservabilityConfig {
                otlp_endpoint: self.otlp_endpoint.filter(|e| !e.trim().is_empty()),
                ..Default::default()
            },
        }
    }
}

fn non_empty_path(p: Option<PathBuf>) -> Option<PathBuf> {
    p.filter(|p| !p.as_os_str().is_empty())
}
