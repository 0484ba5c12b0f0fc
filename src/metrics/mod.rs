// Prometheus metrics for target checks

pub mod server;

use once_cell::sync::Lazy;
use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramTimer, HistogramVec, Opts, Registry,
    TextEncoder,
};

pub use server::serve;

const NAMESPACE: &str = "bmc_cert_sync";

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

pub static CHECK_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    let c = CounterVec::new(
        Opts::new("check_requests_total", "Total number of server checks performed.")
            .namespace(NAMESPACE),
        &["server"],
    )
    .expect("valid metric definition");
    REGISTRY
        .register(Box::new(c.clone()))
        .expect("metric registered once");
    c
});

pub static CHECK_ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    let c = CounterVec::new(
        Opts::new("check_errors_total", "Total number of errors during server checks.")
            .namespace(NAMESPACE),
        &["server", "stage"],
    )
    .expect("valid metric definition");
    REGISTRY
        .register(Box::new(c.clone()))
        .expect("metric registered once");
    c
});

pub static CHECK_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let h = HistogramVec::new(
        HistogramOpts::new(
            "check_duration_seconds",
            "Duration of each server check in seconds.",
        )
        .namespace(NAMESPACE),
        &["server"],
    )
    .expect("valid metric definition");
    REGISTRY
        .register(Box::new(h.clone()))
        .expect("metric registered once");
    h
});

pub static PUSH_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    let c = CounterVec::new(
        Opts::new("push_total", "Total number of successful SAA certificate pushes.")
            .namespace(NAMESPACE),
        &["server"],
    )
    .expect("valid metric definition");
    REGISTRY
        .register(Box::new(c.clone()))
        .expect("metric registered once");
    c
});

pub static CERTIFICATE_EXPIRY_SECONDS: Lazy<GaugeVec> = Lazy::new(|| {
    let g = GaugeVec::new(
        Opts::new(
            "certificate_expiry_seconds",
            "Seconds until the certificate presented by the BMC expires.",
        )
        .namespace(NAMESPACE),
        &["server"],
    )
    .expect("valid metric definition");
    REGISTRY
        .register(Box::new(g.clone()))
        .expect("metric registered once");
    g
});

pub fn record_check(server: &str) {
    CHECK_REQUESTS_TOTAL.with_label_values(&[server]).inc();
}

/// Start timing a check; the duration is observed when the timer drops
pub fn check_timer(server: &str) -> HistogramTimer {
    CHECK_DURATION_SECONDS
        .with_label_values(&[server])
        .start_timer()
}

pub fn record_error(server: &str, stage: &str) {
    CHECK_ERRORS_TOTAL.with_label_values(&[server, stage]).inc();
}

pub fn record_push(server: &str) {
    PUSH_TOTAL.with_label_values(&[server]).inc();
}

pub fn record_expiry(server: &str, seconds: f64) {
    CERTIFICATE_EXPIRY_SECONDS
        .with_label_values(&[server])
        .set(seconds);
}

/// Render every registered metric in the Prometheus text format
pub fn gather() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        tracing::warn!(error = %e, "failed to encode metrics");
    }

    String::from_utf8(buffer).unwrap_or_default()
}
