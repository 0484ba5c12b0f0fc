// Drift Watcher - poll loop and per-target decision sequence

use crate::config::{Config, Target};
use crate::constants::DEFAULT_POLL_INTERVAL;
use crate::error::PushError;
use crate::fingerprint::{FingerprintSource, SystemSource};
use crate::metrics;
use crate::monitor::state::{TargetState, TrackedTarget};
use crate::monitor::types::{CheckOutcome, CheckStage};
use crate::remediation::{Remediator, SaaExecutor};
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Keeps every configured BMC presenting its staged certificate
///
/// Targets are checked one after another, in configuration order. The state
/// of each target is owned here and never handed out mutably.
pub struct Watcher<S = SystemSource, R = SaaExecutor> {
    tracked: Vec<TrackedTarget>,
    source: S,
    remediator: R,
    poll_interval: Duration,
    dial_timeout: Duration,
}

impl Watcher<SystemSource, SaaExecutor> {
    /// Watcher probing real BMCs and pushing with the configured SAA binary
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config,
            SystemSource::new(),
            SaaExecutor::new(config.saa_binary.clone()),
        )
    }
}

impl<S: FingerprintSource, R: Remediator> Watcher<S, R> {
    /// A zero poll interval falls back to the default interval
    pub fn new(config: &Config, source: S, remediator: R) -> Self {
        let poll_interval = if config.poll_interval.is_zero() {
            tracing::warn!(
                default = ?DEFAULT_POLL_INTERVAL,
                "poll_interval is zero, using default"
            );
            DEFAULT_POLL_INTERVAL
        } else {
            config.poll_interval
        };

        Self {
            tracked: config
                .servers
                .iter()
                .cloned()
                .map(TrackedTarget::new)
                .collect(),
            source,
            remediator,
            poll_interval,
            dial_timeout: config.tls_dial_timeout,
        }
    }

    /// State recorded for the target called `name`
    pub fn state(&self, name: &str) -> Option<&TargetState> {
        self.tracked
            .iter()
            .find(|t| t.target.name == name)
            .map(|t| &t.state)
    }

    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.tracked.iter().map(|t| &t.target)
    }

    /// Check every target now, then once per poll interval until cancelled
    ///
    /// A pass that overruns the interval is followed immediately by the next
    /// one; missed ticks are not replayed.
    pub async fn run(&mut self, cancel: CancellationToken) {
        tracing::info!(
            targets = self.tracked.len(),
            poll_interval = ?self.poll_interval,
            "running initial certificate check"
        );

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("shutting down watcher");
                    return;
                }
                _ = ticker.tick() => {
                    self.check_all(&cancel).await;
                }
            }
        }
    }

    /// One pass over all targets, in configuration order
    ///
    /// Stops before the next target once `cancel` fires.
    pub async fn check_all(&mut self, cancel: &CancellationToken) -> Vec<CheckOutcome> {
        let mut outcomes = Vec::with_capacity(self.tracked.len());

        for tracked in self.tracked.iter_mut() {
            if cancel.is_cancelled() {
                break;
            }

            let span = tracing::info_span!(
                "check",
                server = %tracked.target.name,
                host = %tracked.target.host
            );

            let outcome = check_target(
                &self.source,
                &self.remediator,
                self.dial_timeout,
                tracked,
                cancel,
            )
            .instrument(span)
            .await;

            outcomes.push(outcome);
        }

        outcomes
    }
}

async fn check_target<S: FingerprintSource, R: Remediator>(
    source: &S,
    remediator: &R,
    dial_timeout: Duration,
    tracked: &mut TrackedTarget,
    cancel: &CancellationToken,
) -> CheckOutcome {
    let server = tracked.target.name.clone();

    metrics::record_check(&server);
    let _timer = metrics::check_timer(&server);

    let outcome = decide(source, remediator, dial_timeout, tracked, cancel).await;

    if let CheckOutcome::Failed { stage, error } = &outcome {
        metrics::record_error(&server, stage.as_str());

        match stage {
            CheckStage::Credentials | CheckStage::Push => {
                tracing::error!(stage = %stage, error = %error, "{}", stage.failure_message());
            }
            _ => {
                tracing::warn!(stage = %stage, error = %error, "{}", stage.failure_message());
            }
        }
    }

    outcome
}

/// The decision sequence for one target
///
/// Cheapest checks first: stat, then hashing, then the network, then the
/// vendor tool. State only changes once the BMC is known to present the
/// staged certificate.
async fn decide<S: FingerprintSource, R: Remediator>(
    source: &S,
    remediator: &R,
    dial_timeout: Duration,
    tracked: &mut TrackedTarget,
    cancel: &CancellationToken,
) -> CheckOutcome {
    let TrackedTarget { target, state } = tracked;

    // Step 1: Check cert file modification time
    let mod_time = match source.modified(&target.cert_path) {
        Ok(mod_time) => mod_time,
        Err(error) => {
            return CheckOutcome::Failed {
                stage: CheckStage::Stat,
                error,
            };
        }
    };

    if state.is_unchanged(mod_time) {
        tracing::debug!("cert file unchanged, skipping");
        return CheckOutcome::Unchanged;
    }

    // Step 2: Compute local fingerprint
    let local = match source.local(&target.cert_path) {
        Ok(fp) => fp,
        Err(error) => {
            return CheckOutcome::Failed {
                stage: CheckStage::FingerprintLocal,
                error,
            };
        }
    };

    if state.matches(&local.digest) {
        tracing::debug!("local fingerprint unchanged, skipping");
        state.touch(mod_time);
        return CheckOutcome::Touched;
    }

    // Step 3: Get remote fingerprint
    let remote = tokio::select! {
        biased;
        _ = cancel.cancelled() => return CheckOutcome::Cancelled,
        result = source.remote(&target.host, dial_timeout) => result,
    };

    let remote = match remote {
        Ok(fp) => fp,
        Err(error) => {
            return CheckOutcome::Failed {
                stage: CheckStage::FingerprintRemote,
                error,
            };
        }
    };

    if let Some(expires_in) = remote.expires_in() {
        metrics::record_expiry(&target.name, expires_in.num_seconds() as f64);
    }

    // Step 4: Compare fingerprints
    if local == remote {
        tracing::info!(fingerprint = %local.digest, "certificates match, no push needed");
        state.settle(local.digest, mod_time);
        return CheckOutcome::InSync;
    }

    tracing::info!(
        local = %local.digest,
        remote = %remote.digest,
        "certificate mismatch detected, pushing new cert"
    );

    // Step 5: Read credentials and push
    let credentials = match target.credentials.read() {
        Ok(credentials) => credentials,
        Err(error) => {
            return CheckOutcome::Failed {
                stage: CheckStage::Credentials,
                error,
            };
        }
    };

    match remediator.push(target, &credentials, cancel).await {
        Ok(output) => {
            metrics::record_push(&target.name);
            tracing::info!(stdout = %output.stdout.trim(), "certificate pushed successfully");
            state.settle(local.digest, mod_time);
            CheckOutcome::Pushed
        }
        Err(PushError::Cancelled { .. }) => {
            tracing::info!("certificate push interrupted by shutdown");
            CheckOutcome::Cancelled
        }
        Err(error) => CheckOutcome::Failed {
            stage: CheckStage::Push,
            error: error.into(),
        },
    }
}
