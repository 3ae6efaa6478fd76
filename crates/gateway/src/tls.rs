//! TLS material loading.
//!
//! TLS is enabled by setting a certificate. Once it is, the key and the CA
//! certificate become mandatory and all three files must exist; anything
//! else is a startup failure naming the missing item.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use axum_server::tls_rustls::RustlsConfig;

use synapse_domain::config::TlsConfig;

/// PEM bytes ready to hand to rustls.
#[derive(Debug, Clone)]
pub struct TlsMaterial {
    /// Server certificate followed by the CA certificate.
    pub cert_chain: Vec<u8>,
    pub key: Vec<u8>,
}

/// `None` when TLS is not requested.
pub fn load(tls: &TlsConfig) -> anyhow::Result<Option<TlsMaterial>> {
    if !tls.is_requested() {
        return Ok(None);
    }

    let key = require_file(tls.key.as_deref(), "SSL certificate key")?;
    let cert = require_file(tls.certificate.as_deref(), "SSL certificate")?;
    let ca = require_file(tls.certificate_ca.as_deref(), "SSL certificate authority")?;

    let mut cert_chain = read(&cert)?;
    if !cert_chain.ends_with(b"\n") {
        cert_chain.push(b'\n');
    }
    cert_chain.extend(read(&ca)?);

    tracing::info!(
        certificate = %cert.display(),
        ca = %ca.display(),
        "TLS material loaded"
    );

    Ok(Some(TlsMaterial {
        cert_chain,
        key: read(&key)?,
    }))
}

/// Build the rustls server configuration from loaded material.
pub async fn rustls_config(material: &TlsMaterial) -> anyhow::Result<RustlsConfig> {
    // Only one provider is compiled in for the server side; ignore the error
    // if it was already installed.
    let _ = rustls::crypto::ring::default_provider().install_default();

    RustlsConfig::from_pem(material.cert_chain.clone(), material.key.clone())
        .await
        .context("building TLS configuration from PEM material")
}

fn require_file(path: Option<&Path>, item: &str) -> anyhow::Result<PathBuf> {
    let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
        bail!("An {item} is required but has not been specified");
    };
    if !path.exists() {
        bail!("The {item} assigned at \"{}\" does not exist", path.display());
    }
    Ok(path.to_path_buf())
}

fn read(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}
