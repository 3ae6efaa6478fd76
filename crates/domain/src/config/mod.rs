mod history;
mod llm;
mod observability;
mod server;

pub use history::*;
pub use llm::*;
pub use observability::*;
pub use server::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything the host reads once at startup. Immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Running mode label (`development`, `production`, ...).
    #[serde(default = "d_environment")]
    pub environment: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfiguration,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: d_environment(),
            server: ServerConfig::default(),
            model: ModelConfiguration::default(),
            history: HistoryConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

fn d_environment() -> String {
    "development".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Static checks that do not touch the filesystem or the network.
    ///
    /// Provider-specific rules (API keys, base URLs) are enforced by the
    /// provider registry, not here.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.server.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }

        if self.model.provider.trim().is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "model.provider".into(),
                message: "no LLM provider configured (set LLM_PROVIDER)".into(),
            });
        }

        if let Some(t) = self.model.temperature {
            if !(0.0..=2.0).contains(&t) {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Warning,
                    field: "model.temperature".into(),
                    message: format!("temperature {t} is outside the usual 0.0 - 2.0 range"),
                });
            }
        }

        if self.server.tls.certificate.is_none()
            && (self.server.tls.key.is_some() || self.server.tls.certificate_ca.is_some())
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "server.tls".into(),
                message: "TLS key/CA set without a certificate; serving plain HTTP".into(),
            });
        }

        if self.history.backend == HistoryBackend::Memory {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "history.backend".into(),
                message: "in-memory history is lost on restart".into(),
            });
        }

        if self.server.cors.allowed_origins.len() == 1
            && self.server.cors.allowed_origins[0] == "*"
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "server.cors.allowed_origins".into(),
                message: "wildcard \"*\" allows all origins (not recommended for production)".into(),
            });
        }

        errors
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Config {
        let mut cfg = Config::default();
        cfg.model.provider = "openai".into();
        cfg
    }

    #[test]
    fn default_config_flags_missing_provider() {
        let issues = Config::default().validate();
        assert!(issues
            .iter()
            .any(|e| e.field == "model.provider" && e.severity == ConfigSeverity::Error));
    }

    #[test]
    fn configured_provider_has_no_errors() {
        let issues = configured().validate();
        assert!(issues.iter().all(|e| e.severity != ConfigSeverity::Error));
    }

    #[test]
    fn zero_port_is_an_error() {
        let mut cfg = configured();
        cfg.server.port = 0;
        let issues = cfg.validate();
        assert!(issues.iter().any(|e| e.field == "server.port"));
    }

    #[test]
    fn orphan_tls_key_warns() {
        let mut cfg = configured();
        cfg.server.tls.key = Some("/tmp/key.pem".into());
        let issues = cfg.validate();
        let tls = issues.iter().find(|e| e.field == "server.tls").unwrap();
        assert_eq!(tls.severity, ConfigSeverity::Warning);
    }

    #[test]
    fn display_includes_severity_tag() {
        let e = ConfigError {
            severity: ConfigSeverity::Warning,
            field: "history.backend".into(),
            message: "volatile".into(),
        };
        assert_eq!(e.to_string(), "[WARN] history.backend: volatile");
    }
}
