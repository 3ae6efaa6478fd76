use std::path::{Path, PathBuf};

use synapse_domain::config::TlsConfig;
use synapse_gateway::tls;

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn no_certificate_means_plain_http() {
    let dir = tempfile::tempdir().unwrap();
    // A key alone does not turn TLS on.
    let cfg = TlsConfig {
        key: Some(write(dir.path(), "key.pem", "KEY")),
        ..Default::default()
    };
    assert!(tls::load(&cfg).unwrap().is_none());
    assert!(tls::load(&TlsConfig::default()).unwrap().is_none());
}

#[test]
fn certificate_requires_key_and_ca() {
    let dir = tempfile::tempdir().unwrap();
    let cert = write(dir.path(), "cert.pem", "CERT");

    let cfg = TlsConfig {
        certificate: Some(cert.clone()),
        ..Default::default()
    };
    let err = tls::load(&cfg).unwrap_err().to_string();
    assert!(err.contains("SSL certificate key"), "{err}");
    assert!(err.contains("has not been specified"), "{err}");

    let cfg = TlsConfig {
        certificate: Some(cert),
        key: Some(write(dir.path(), "key.pem", "KEY")),
        certificate_ca: None,
    };
    let err = tls::load(&cfg).unwrap_err().to_string();
    assert!(err.contains("SSL certificate authority"), "{err}");
}

#[test]
fn missing_file_is_named() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = TlsConfig {
        key: Some(write(dir.path(), "key.pem", "KEY")),
        certificate: Some(dir.path().join("absent.pem")),
        certificate_ca: Some(write(dir.path(), "ca.pem", "CA")),
    };
    let err = tls::load(&cfg).unwrap_err().to_string();
    assert!(err.contains("absent.pem"), "{err}");
    assert!(err.contains("does not exist"), "{err}");
}

#[test]
fn chain_is_certificate_then_ca() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = TlsConfig {
        key: Some(write(dir.path(), "key.pem", "KEY\n")),
        certificate: Some(write(dir.path(), "cert.pem", "CERT")),
        certificate_ca: Some(write(dir.path(), "ca.pem", "CA\n")),
    };
    let material = tls::load(&cfg).unwrap().unwrap();
    assert_eq!(material.cert_chain, b"CERT\nCA\n");
    assert_eq!(material.key, b"KEY\n");
}

#[tokio::test]
async fn garbage_pem_fails_cleanly() {
    let material = tls::TlsMaterial {
        cert_chain: b"not a certificate".to_vec(),
        key: b"not a key".to_vec(),
    };
    assert!(tls::rustls_config(&material).await.is_err());
}
