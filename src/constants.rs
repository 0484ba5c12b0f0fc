// bmc-cert-sync - Keeps BMC TLS certificates in sync with staged certificate files
// Licensed under GPL-3.0

//! Fixed protocol values and configuration defaults
//!
//! Centralizes the magic numbers of the sync daemon: the management port every
//! BMC is probed on, the vendor tool's action code, and the defaults applied
//! when the configuration file leaves a setting out.

use std::time::Duration;

// =============================================================================
// Management endpoint
// =============================================================================

/// HTTPS port of the BMC web interface
///
/// The certificate presented on this port is the one being compared against
/// the staged file.
pub const MANAGEMENT_PORT: u16 = 443;

// =============================================================================
// Vendor tool
// =============================================================================

/// Action code that makes the vendor tool apply a BMC configuration file
pub const SAA_ACTION_CHANGE_CONFIG: &str = "ChangeBmcCfg";

/// Ceiling on a single vendor tool run (5 minutes)
///
/// Applied inside the executor regardless of the caller's cancellation, so a
/// hung tool cannot stall the poll loop indefinitely.
pub const SAA_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Prefix of the generated configuration artifact
pub const SAA_ARTIFACT_PREFIX: &str = "saa-config-";

/// Suffix of the generated configuration artifact
pub const SAA_ARTIFACT_SUFFIX: &str = ".xml";

// =============================================================================
// Configuration defaults
// =============================================================================

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/bmc-cert-sync/config.yaml";

/// Default interval between two passes over all targets (5 minutes)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default bound on the TLS connect + handshake to a BMC (10 seconds)
pub const DEFAULT_TLS_DIAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Default location of the vendor tool binary
pub const DEFAULT_SAA_BINARY: &str = "/opt/saa/saa";

/// Default listen address of the metrics endpoint
pub const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:8080";
