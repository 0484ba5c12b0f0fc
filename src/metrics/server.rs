// Metrics HTTP endpoint

use crate::Result;
use axum::Router;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

fn build_router() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

async fn metrics_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], super::gather())
}

/// Serve `GET /metrics` on `addr` until `cancel` fires
pub async fn serve(addr: &str, cancel: CancellationToken) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind metrics listener on {}: {}", addr, e))?;

    tracing::info!(addr = %addr, "starting metrics server");
    serve_listener(listener, cancel).await
}

pub(crate) async fn serve_listener(listener: TcpListener, cancel: CancellationToken) -> Result<()> {
    axum::serve(listener, build_router())
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

    Ok(())
}
