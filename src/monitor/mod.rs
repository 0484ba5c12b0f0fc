// Drift watcher
//
// Polls each configured BMC, compares the certificate it presents against the
// one staged on disk, and pushes the staged one through SAA when they differ.

pub mod daemon;
pub mod state;
pub mod types;

pub use daemon::Watcher;
pub use state::TargetState;
pub use types::{CheckOutcome, CheckStage};
