// bmc-cert-sync - Keeps BMC TLS certificates in sync with staged certificate files
// Licensed under GPL-3.0

use anyhow::Result;
use bmc_cert_sync::{Args, Config, Watcher, metrics};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    let args = Args::parse();
    args.init_logging()?;

    let config = Config::load(&args.config)?;

    info!(
        config = %args.config.display(),
        servers = config.servers.len(),
        poll_interval = ?config.poll_interval,
        tls_dial_timeout = ?config.tls_dial_timeout,
        saa_binary = %config.saa_binary.display(),
        "bmc-cert-sync starting"
    );
    for server in &config.servers {
        info!(
            server = %server.name,
            host = %server.host,
            cert = %server.cert_path.display(),
            "configured server"
        );
    }

    let mut watcher = Watcher::from_config(&config);

    if args.once {
        let outcomes = watcher.check_all(&CancellationToken::new()).await;
        let failures = outcomes.iter().filter(|o| o.is_failure()).count();
        for (server, outcome) in watcher.targets().zip(&outcomes) {
            info!(server = %server.name, outcome = %outcome, "check finished");
        }
        if failures > 0 {
            anyhow::bail!("{} of {} servers failed", failures, outcomes.len());
        }
        return Ok(());
    }

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone());

    let metrics_addr = args.metrics_addr.clone();
    let metrics_cancel = cancel.clone();
    let metrics_task = tokio::spawn(async move {
        if let Err(e) = metrics::serve(&metrics_addr, metrics_cancel).await {
            tracing::error!(error = %e, "metrics server failed");
        }
    });

    watcher.run(cancel.clone()).await;

    cancel.cancel();
    let _ = metrics_task.await;

    info!("shutdown complete");
    Ok(())
}

/// Cancel `cancel` on SIGTERM or SIGINT
fn spawn_signal_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let (mut sigterm, mut sigint) =
                match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                    (Ok(term), Ok(int)) => (term, int),
                    (Err(e), _) | (_, Err(e)) => {
                        tracing::error!(error = %e, "failed to set up signal handlers");
                        return;
                    }
                };

            tokio::select! {
                _ = sigterm.recv() => {
                    info!("received SIGTERM");
                }
                _ = sigint.recv() => {
                    info!("received SIGINT");
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to set up Ctrl+C handler");
                return;
            }
            info!("received Ctrl+C");
        }

        cancel.cancel();
    });
}
