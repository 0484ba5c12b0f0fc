// Certificate Fingerprinting
//
// Certificates are compared by the SHA-256 digest of their DER encoding, never
// by parsed fields. Two sources are supported:
// - a PEM file on local disk (the staged certificate)
// - the leaf certificate a BMC presents during a TLS handshake

pub mod local;
pub mod remote;

use crate::constants::MANAGEMENT_PORT;
use crate::error::SyncError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use x509_parser::prelude::*;

pub use local::fingerprint_file;
pub use remote::fingerprint_remote;

/// SHA-256 digest of a DER-encoded certificate
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Hash raw DER bytes
    pub fn of(der: &[u8]) -> Self {
        Self(Sha256::digest(der).into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self
            .0
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(":");
        f.write_str(&hex)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

/// Digest of a certificate plus its expiry, when it could be read
///
/// Equality only looks at the digest.
#[derive(Debug, Clone, Copy)]
pub struct Fingerprint {
    pub digest: Digest,
    pub not_after: Option<DateTime<Utc>>,
}

impl Fingerprint {
    /// Fingerprint DER bytes, reading the expiry if the bytes parse as X.509
    pub fn from_der(der: &[u8]) -> Self {
        let not_after = X509Certificate::from_der(der)
            .ok()
            .and_then(|(_, cert)| expiry_of(&cert));

        Self {
            digest: Digest::of(der),
            not_after,
        }
    }

    /// Time left until expiry; negative once expired
    pub fn expires_in(&self) -> Option<chrono::Duration> {
        self.not_after.map(|not_after| not_after - Utc::now())
    }
}

impl PartialEq for Fingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest
    }
}

impl Eq for Fingerprint {}

pub(crate) fn expiry_of(cert: &X509Certificate<'_>) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(cert.validity().not_after.timestamp(), 0)
}

/// Everything the watcher needs to observe about a certificate
///
/// The watcher only talks to this trait, so a check can be driven against
/// instrumented sources in tests.
#[async_trait]
pub trait FingerprintSource: Send + Sync {
    /// Modification time of the staged certificate
    fn modified(&self, path: &Path) -> Result<SystemTime, SyncError>;

    /// Fingerprint of the staged certificate
    fn local(&self, path: &Path) -> Result<Fingerprint, SyncError>;

    /// Fingerprint of the certificate the BMC currently presents
    async fn remote(&self, host: &str, timeout: Duration) -> Result<Fingerprint, SyncError>;
}

/// Reads certificates from disk and from live BMCs
#[derive(Debug, Clone)]
pub struct SystemSource {
    port: u16,
}

impl SystemSource {
    pub fn new() -> Self {
        Self {
            port: MANAGEMENT_PORT,
        }
    }

    /// Probe a port other than the management port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

impl Default for SystemSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FingerprintSource for SystemSource {
    // Blocking file access; a stat and one small PEM read per tick
    fn modified(&self, path: &Path) -> Result<SystemTime, SyncError> {
        fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(|source| SyncError::Stat {
                path: path.to_path_buf(),
                source,
            })
    }

    fn local(&self, path: &Path) -> Result<Fingerprint, SyncError> {
        fingerprint_file(path)
    }

    async fn remote(&self, host: &str, timeout: Duration) -> Result<Fingerprint, SyncError> {
        fingerprint_remote(host, self.port, timeout).await
    }
}
