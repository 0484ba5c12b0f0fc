// bmc-cert-sync - Keeps BMC TLS certificates in sync with staged certificate files
// Licensed under GPL-3.0

//! bmc-cert-sync watches locally staged TLS certificates and pushes them to
//! baseboard management controllers whenever the certificate a BMC presents
//! differs from the staged one.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod fingerprint;
pub mod metrics;
pub mod monitor;
pub mod remediation;

// Re-export commonly used types
pub use crate::cli::Args;
pub use crate::config::{Config, CredentialPaths, Credentials, Target};
pub use crate::error::{PushError, SyncError};
pub use crate::fingerprint::{Digest, Fingerprint, FingerprintSource, SystemSource};
pub use crate::monitor::{CheckOutcome, CheckStage, TargetState, Watcher};
pub use crate::remediation::{Remediator, SaaExecutor};

/// Result type for startup and configuration paths
pub type Result<T> = anyhow::Result<T>;
