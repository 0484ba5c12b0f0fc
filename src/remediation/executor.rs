// SAA executor

use super::artifact::{ConfigArtifact, render_config};
use crate::config::{Credentials, Target};
use crate::constants::{SAA_ACTION_CHANGE_CONFIG, SAA_TIMEOUT};
use crate::error::PushError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Captured output of a successful push
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Installs a staged certificate/key pair on a BMC
///
/// One attempt per call; retrying is left to the next poll tick.
#[async_trait]
pub trait Remediator: Send + Sync {
    async fn push(
        &self,
        target: &Target,
        credentials: &Credentials,
        cancel: &CancellationToken,
    ) -> Result<PushOutput, PushError>;
}

/// Runs the vendor configuration tool against a BMC
#[derive(Debug, Clone)]
pub struct SaaExecutor {
    binary: PathBuf,
    timeout: Duration,
    artifact_dir: Option<PathBuf>,
}

impl SaaExecutor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: SAA_TIMEOUT,
            artifact_dir: None,
        }
    }

    /// Override the execution ceiling
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Write configuration artifacts to `dir` instead of the temp directory
    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = Some(dir.into());
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn write_artifact(&self, target: &Target) -> Result<ConfigArtifact, PushError> {
        let contents = render_config(&target.cert_path, &target.key_path);

        match &self.artifact_dir {
            Some(dir) => ConfigArtifact::create_in(dir, &contents),
            None => ConfigArtifact::create(&contents),
        }
        .map_err(PushError::Artifact)
    }
}

#[async_trait]
impl Remediator for SaaExecutor {
    async fn push(
        &self,
        target: &Target,
        credentials: &Credentials,
        cancel: &CancellationToken,
    ) -> Result<PushOutput, PushError> {
        // Lives until this function returns, on every path
        let artifact = self.write_artifact(target)?;

        let mut cmd = Command::new(&self.binary);
        cmd.arg("-u")
            .arg(&credentials.username)
            .arg("-p")
            .arg(&credentials.password)
            .arg("-c")
            .arg(SAA_ACTION_CHANGE_CONFIG)
            .arg("-i")
            .arg(&target.host)
            .arg("--file")
            .arg(artifact.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::info!(
            host = %target.host,
            user = %credentials.username,
            "invoking SAA"
        );

        let started = Instant::now();
        let child = cmd.spawn().map_err(|source| PushError::Launch {
            binary: self.binary.clone(),
            source,
        })?;

        // Dropping the wait future drops the child, which kills it
        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(PushError::Cancelled {
                    host: target.host.clone(),
                });
            }
            result = tokio::time::timeout(self.timeout, child.wait_with_output()) => match result {
                Ok(Ok(output)) => output,
                Ok(Err(source)) => {
                    return Err(PushError::Launch {
                        binary: self.binary.clone(),
                        source,
                    });
                }
                Err(_) => {
                    return Err(PushError::Timeout {
                        host: target.host.clone(),
                        timeout: self.timeout,
                    });
                }
            },
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(PushError::Exit {
                host: target.host.clone(),
                status: output.status,
                stdout,
                stderr,
            });
        }

        tracing::debug!(
            host = %target.host,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "SAA exited successfully"
        );

        Ok(PushOutput { stdout, stderr })
    }
}
