// Certificate remediation
//
// Pushes a staged certificate/key pair to a BMC by generating a vendor tool
// configuration file and running the tool against the BMC.

pub mod artifact;
pub mod executor;

pub use artifact::{ConfigArtifact, render_config};
pub use executor::{PushOutput, Remediator, SaaExecutor};
