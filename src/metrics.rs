use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use lazy_static::lazy_static;
#[cfg(target_os = "linux")]
use prometheus::process_collector::ProcessCollector;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;
use std::time::Instant;

use crate::http_server::AppState;

lazy_static! {
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    )
    .unwrap();
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new("http_request_duration_seconds", "HTTP request duration in seconds").buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0
        ]),
        &["method", "endpoint"]
    )
    .unwrap();
    pub static ref HTTP_REQUESTS_IN_FLIGHT: IntGauge = IntGauge::new(
        "http_requests_in_flight",
        "Number of HTTP requests currently being processed"
    )
    .unwrap();
    pub static ref SIGNATURE_VERIFICATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "signature_verifications_total",
            "Verification requests by outcome (valid, invalid, rejected)"
        ),
        &["outcome"]
    )
    .unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Signer recovered.
    Valid,
    /// Well-formed input, recovery failed.
    Invalid,
    /// Input failed validation.
    Rejected,
}

impl VerificationOutcome {
    fn label(self) -> &'static str {
        match self {
            VerificationOutcome::Valid => "valid",
            VerificationOutcome::Invalid => "invalid",
            VerificationOutcome::Rejected => "rejected",
        }
    }
}

pub fn track_verification(outcome: VerificationOutcome) {
    SIGNATURE_VERIFICATIONS_TOTAL
        .with_label_values(&[outcome.label()])
        .inc();
}

#[derive(Debug, Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        #[cfg(target_os = "linux")]
        {
            let process_collector = ProcessCollector::for_self();
            registry.register(Box::new(process_collector)).unwrap();
        }

        registry.register(Box::new(HTTP_REQUESTS_TOTAL.clone())).unwrap();
        registry.register(Box::new(HTTP_REQUEST_DURATION.clone())).unwrap();
        registry.register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone())).unwrap();
        registry
            .register(Box::new(SIGNATURE_VERIFICATIONS_TOTAL.clone()))
            .unwrap();

        Self {
            registry: Arc::new(registry),
        }
    }
}

/// Collapse numeric segments so label cardinality stays bounded.
pub fn normalize_path(path: &str) -> String {
    let path_only = path.split('?').next().unwrap_or(path);

    path_only
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| if s.parse::<i64>().is_ok() { ":id" } else { s })
        .collect::<Vec<_>>()
        .join("/")
}

pub async fn track_metrics(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    if path == "/metrics" {
        return next.run(req).await;
    }

    let endpoint = normalize_path(&path);

    HTTP_REQUESTS_IN_FLIGHT.inc();
    let start = Instant::now();

    let response = next.run(req).await;

    HTTP_REQUEST_DURATION
        .with_label_values(&[method.as_str(), endpoint.as_str()])
        .observe(start.elapsed().as_secs_f64());

    let status = response.status().as_u16().to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), endpoint.as_str(), status.as_str()])
        .inc();

    HTTP_REQUESTS_IN_FLIGHT.dec();

    response
}

pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            String::from("Failed to encode metrics"),
        );
    }

    match String::from_utf8(buffer) {
        Ok(v) => (StatusCode::OK, v),
        Err(e) => {
            tracing::error!("Metrics output is not valid UTF-8: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("Failed to encode metrics"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_strips_ids_and_query() {
        assert_eq!(normalize_path("/verify-signature"), "verify-signature");
        assert_eq!(normalize_path("/history/42?lang=en"), "history/:id");
        assert_eq!(normalize_path("/"), "");
    }

    #[test]
    fn verification_outcomes_are_counted() {
        let before = SIGNATURE_VERIFICATIONS_TOTAL.with_label_values(&["rejected"]).get();
        track_verification(VerificationOutcome::Rejected);
        let after = SIGNATURE_VERIFICATIONS_TOTAL.with_label_values(&["rejected"]).get();
        assert!(after > before);
    }
}
