// Shared fixtures for integration tests

#![allow(dead_code)]

use bmc_cert_sync::{Config, CredentialPaths, Target};
use rcgen::{CertificateParams, KeyPair};
use rustls::ServerConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_rustls::TlsAcceptor;

/// A freshly generated self-signed certificate
pub struct TestCert {
    pub cert_pem: String,
    pub key_pem: String,
    pub der: CertificateDer<'static>,
    key_der: Vec<u8>,
}

impl TestCert {
    pub fn generate(name: &str) -> Self {
        let key = KeyPair::generate().unwrap();
        let cert = CertificateParams::new(vec![name.to_string()])
            .unwrap()
            .self_signed(&key)
            .unwrap();

        Self {
            cert_pem: cert.pem(),
            key_pem: key.serialize_pem(),
            der: cert.der().clone(),
            key_der: key.serialize_der(),
        }
    }

    fn server_config(&self) -> Arc<ServerConfig> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.key_der.clone()));

        let config = ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_no_client_auth()
            .with_single_cert(vec![self.der.clone()], key)
            .unwrap();

        Arc::new(config)
    }
}

/// TLS listener on localhost standing in for a BMC web interface
pub struct TestBmc {
    pub port: u16,
    acceptor: Arc<RwLock<TlsAcceptor>>,
    handle: JoinHandle<()>,
}

impl TestBmc {
    pub async fn start(cert: &TestCert) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let acceptor = Arc::new(RwLock::new(TlsAcceptor::from(cert.server_config())));

        let shared = Arc::clone(&acceptor);
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let acceptor = shared.read().unwrap().clone();
                tokio::spawn(async move {
                    let _ = acceptor.accept(stream).await;
                });
            }
        });

        Self {
            port,
            acceptor,
            handle,
        }
    }

    /// Present `cert` to every later connection
    pub fn present(&self, cert: &TestCert) {
        *self.acceptor.write().unwrap() = TlsAcceptor::from(cert.server_config());
    }
}

impl Drop for TestBmc {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Scratch directory with credential files and a staged certificate
pub struct Staging {
    pub dir: tempfile::TempDir,
}

impl Staging {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("username"), "ADMIN\n").unwrap();
        fs::write(dir.path().join("password"), "hunter2\n").unwrap();
        Self { dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn stage(&self, cert: &TestCert) {
        fs::write(self.path("bmc.crt"), &cert.cert_pem).unwrap();
        fs::write(self.path("bmc.key"), &cert.key_pem).unwrap();
    }

    pub fn target(&self, name: &str) -> Target {
        Target {
            name: name.to_string(),
            host: "127.0.0.1".to_string(),
            cert_path: self.path("bmc.crt"),
            key_path: self.path("bmc.key"),
            credentials: CredentialPaths {
                username_file: self.path("username"),
                password_file: self.path("password"),
            },
        }
    }

    pub fn config(&self, name: &str, saa_binary: &Path) -> Config {
        Config {
            poll_interval: Duration::from_millis(50),
            tls_dial_timeout: Duration::from_secs(2),
            saa_binary: saa_binary.to_path_buf(),
            servers: vec![self.target(name)],
        }
    }
}

/// Write an executable shell script standing in for the vendor tool
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}
