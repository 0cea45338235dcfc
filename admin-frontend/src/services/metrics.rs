use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

pub struct Metrics {
    pub registry: Registry,
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
    pub gate_decisions_total: IntCounterVec,
}

// Global registry
pub static METRICS: OnceLock<Metrics> = OnceLock::new();

impl Metrics {
    fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "path", "status"],
        )?;

        let gate_decisions_total = IntCounterVec::new(
            Opts::new("gate_decisions_total", "Route gate decisions by outcome"),
            &["gate", "outcome"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(gate_decisions_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            gate_decisions_total,
        })
    }
}

/// Idempotent; the first successful call wins.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if METRICS.get().is_none() {
        let _ = METRICS.set(Metrics::new()?);
    }
    Ok(())
}

/// No-op until `init_metrics` has run.
pub fn record_request(method: &str, path: &str, status: &str, seconds: f64) {
    if let Some(metrics) = METRICS.get() {
        let labels = [method, path, status];
        metrics.http_requests_total.with_label_values(&labels).inc();
        metrics
            .http_request_duration_seconds
            .with_label_values(&labels)
            .observe(seconds);
    }
}

pub fn record_decision(gate: &str, outcome: &str) {
    if let Some(metrics) = METRICS.get() {
        metrics
            .gate_decisions_total
            .with_label_values(&[gate, outcome])
            .inc();
    }
}

pub fn get_metrics() -> String {
    let Some(metrics) = METRICS.get() else {
        return String::new();
    };

    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&metrics.registry.gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
