// Error types for bmc-cert-sync
//
// Every variant here is scoped to a single target check: it is logged, counted
// and ends that target's check for the current tick. Startup failures
// (configuration, missing tool binary) go through anyhow instead.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Failure of one stage of a target check
#[derive(Debug, Error)]
pub enum SyncError {
    /// Certificate file could not be stat'ed
    #[error("Cannot stat {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Certificate file could not be read
    #[error("Failed to read certificate file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No PEM block, or the first block is not a certificate
    #[error("Invalid certificate in {}: {reason}", path.display())]
    Format { path: PathBuf, reason: String },

    /// TCP connect or TLS handshake to the BMC failed
    #[error("TLS dial to {host} failed: {reason}")]
    Dial { host: String, reason: String },

    /// TLS dial did not complete in time
    #[error("TLS dial to {host} timed out after {timeout:?}")]
    DialTimeout { host: String, timeout: Duration },

    /// Handshake completed without any peer certificate
    #[error("No peer certificates from {host}")]
    NoCertificate { host: String },

    /// A credential file could not be read
    #[error("Failed to read credential file {}: {source}", path.display())]
    Credentials {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The vendor tool did not install the certificate
    #[error(transparent)]
    Push(#[from] PushError),
}

/// Failure of a single vendor tool invocation
#[derive(Debug, Error)]
pub enum PushError {
    /// Temporary configuration artifact could not be written
    #[error("Failed to write SAA config artifact: {0}")]
    Artifact(#[source] io::Error),

    /// The tool binary could not be started
    #[error("Failed to launch {}: {source}", binary.display())]
    Launch {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The tool ran and exited unsuccessfully
    #[error("SAA failed for {host}: {status}\nstdout: {stdout}\nstderr: {stderr}")]
    Exit {
        host: String,
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },

    /// The tool exceeded its execution ceiling and was killed
    #[error("SAA for {host} killed after {timeout:?}")]
    Timeout { host: String, timeout: Duration },

    /// Shutdown was requested while the tool was running
    #[error("SAA for {host} cancelled")]
    Cancelled { host: String },
}

impl SyncError {
    pub(crate) fn dial(host: &str, err: impl std::fmt::Display) -> Self {
        SyncError::Dial {
            host: host.to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_names_path() {
        let err = SyncError::Format {
            path: PathBuf::from("/etc/ssl/bmc01.pem"),
            reason: "no PEM block found".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("/etc/ssl/bmc01.pem"));
        assert!(msg.contains("no PEM block found"));
    }

    #[test]
    fn test_dial_timeout_message() {
        let err = SyncError::DialTimeout {
            host: "10.0.0.12".to_string(),
            timeout: Duration::from_secs(10),
        };

        let msg = err.to_string();
        assert!(msg.contains("10.0.0.12"));
        assert!(msg.contains("timed out"));
    }

    #[test]
    fn test_error_chain_preserved() {
        use std::error::Error;

        let err = SyncError::Read {
            path: PathBuf::from("/missing.pem"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };

        assert!(err.source().is_some());
    }

    #[test]
    fn test_push_error_is_transparent() {
        let err: SyncError = PushError::Cancelled {
            host: "bmc01".to_string(),
        }
        .into();

        assert_eq!(err.to_string(), "SAA for bmc01 cancelled");
    }
}
