// Core types for target checks

use crate::error::SyncError;
use std::fmt;

/// Stage of a target check that can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckStage {
    Stat,
    FingerprintLocal,
    FingerprintRemote,
    Credentials,
    Push,
}

impl CheckStage {
    /// Metric label
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStage::Stat => "stat",
            CheckStage::FingerprintLocal => "fingerprint_local",
            CheckStage::FingerprintRemote => "fingerprint_remote",
            CheckStage::Credentials => "credentials",
            CheckStage::Push => "saa_push",
        }
    }

    pub(crate) fn failure_message(&self) -> &'static str {
        match self {
            CheckStage::Stat => "cert file not accessible, skipping",
            CheckStage::FingerprintLocal => "failed to read local cert, skipping",
            CheckStage::FingerprintRemote => {
                "failed to get remote cert, skipping (BMC may be rebooting)"
            }
            CheckStage::Credentials => "failed to read credentials, skipping",
            CheckStage::Push => "SAA push failed",
        }
    }
}

impl fmt::Display for CheckStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How one target check ended
#[derive(Debug)]
pub enum CheckOutcome {
    /// Modification time unchanged; nothing else looked at
    Unchanged,
    /// File rewritten with the content already settled on
    Touched,
    /// BMC already presents the staged certificate
    InSync,
    /// Staged certificate pushed to the BMC
    Pushed,
    /// A stage failed; retried on the next tick
    Failed { stage: CheckStage, error: SyncError },
    /// Shutdown interrupted the check
    Cancelled,
}

impl CheckOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, CheckOutcome::Failed { .. })
    }

    pub fn failed_stage(&self) -> Option<CheckStage> {
        match self {
            CheckOutcome::Failed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Unchanged => write!(f, "Unchanged"),
            CheckOutcome::Touched => write!(f, "Touched"),
            CheckOutcome::InSync => write!(f, "In Sync"),
            CheckOutcome::Pushed => write!(f, "Pushed"),
            CheckOutcome::Failed { stage, error } => write!(f, "Failed at {}: {}", stage, error),
            CheckOutcome::Cancelled => write!(f, "Cancelled"),
        }
    }
}
