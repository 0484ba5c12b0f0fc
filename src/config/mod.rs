// Daemon configuration

pub mod credentials;
pub mod duration;

use crate::Result;
use crate::constants::{DEFAULT_POLL_INTERVAL, DEFAULT_SAA_BINARY, DEFAULT_TLS_DIAL_TIMEOUT};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use credentials::{CredentialPaths, Credentials};

/// Main daemon configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_poll_interval", deserialize_with = "duration::deserialize")]
    pub poll_interval: Duration,
    #[serde(
        default = "default_tls_dial_timeout",
        deserialize_with = "duration::deserialize"
    )]
    pub tls_dial_timeout: Duration,
    #[serde(default = "default_saa_binary")]
    pub saa_binary: PathBuf,
    #[serde(default)]
    pub servers: Vec<Target>,
}

/// A BMC kept in sync with a staged certificate
///
/// Loaded once at startup and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "ipmi_host", default)]
    pub host: String,
    #[serde(default)]
    pub cert_path: PathBuf,
    #[serde(default)]
    pub key_path: PathBuf,
    #[serde(default)]
    pub credentials: CredentialPaths,
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

fn default_tls_dial_timeout() -> Duration {
    DEFAULT_TLS_DIAL_TIMEOUT
}

fn default_saa_binary() -> PathBuf {
    PathBuf::from(DEFAULT_SAA_BINARY)
}

impl Config {
    /// Read, parse and validate a YAML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|e| {
            anyhow::anyhow!("Failed to read config file {:?}: {}", path.as_ref(), e)
        })?;

        let config = Self::parse(&contents)?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid config: {}", e))?;

        Ok(config)
    }

    /// Parse YAML without validating it
    pub fn parse(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))
    }

    /// Check the configuration is usable before any target is polled
    pub fn validate(&self) -> Result<()> {
        if self.servers.is_empty() {
            return Err(anyhow::anyhow!("at least one server must be configured"));
        }

        if self.poll_interval.is_zero() {
            return Err(anyhow::anyhow!("poll_interval must be greater than zero"));
        }

        if self.tls_dial_timeout.is_zero() {
            return Err(anyhow::anyhow!("tls_dial_timeout must be greater than zero"));
        }

        if let Err(e) = fs::metadata(&self.saa_binary) {
            return Err(anyhow::anyhow!(
                "SAA binary not found at {}: {}",
                self.saa_binary.display(),
                e
            ));
        }

        let mut names = HashSet::new();
        for (i, server) in self.servers.iter().enumerate() {
            server.validate(i)?;

            if !names.insert(server.name.as_str()) {
                return Err(anyhow::anyhow!(
                    "server[{}] ({}): duplicate server name",
                    i,
                    server.name
                ));
            }
        }

        Ok(())
    }
}

impl Target {
    fn validate(&self, index: usize) -> Result<()> {
        if self.name.is_empty() {
            return Err(anyhow::anyhow!("server[{}]: name is required", index));
        }

        let missing = if self.host.is_empty() {
            Some("ipmi_host")
        } else if self.cert_path.as_os_str().is_empty() {
            Some("cert_path")
        } else if self.key_path.as_os_str().is_empty() {
            Some("key_path")
        } else if self.credentials.username_file.as_os_str().is_empty() {
            Some("credentials.username_file")
        } else if self.credentials.password_file.as_os_str().is_empty() {
            Some("credentials.password_file")
        } else {
            None
        };

        match missing {
            Some(key) => Err(anyhow::anyhow!(
                "server[{}] ({}): {} is required",
                index,
                self.name,
                key
            )),
            None => Ok(()),
        }
    }
}
