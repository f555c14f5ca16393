/// Prometheus metrics for social actions and feed reads
use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec_with_registry, register_histogram_with_registry,
    register_int_counter_vec_with_registry, Encoder, Histogram, HistogramVec, IntCounterVec,
    Registry, TextEncoder,
};

use crate::error::AppError;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    /// Mutations by action (follow, unfollow, like, unlike, comment, ...) and result
    pub static ref SOCIAL_ACTIONS_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
        "social_actions_total",
        "Total social mutations by action and result",
        &["action", "result"],
        REGISTRY
    )
    .unwrap();

    /// Feed assembly latency (labels: paged=true|false)
    pub static ref FEED_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec_with_registry!(
        "feed_request_duration_seconds",
        "Time to assemble a feed page",
        &["paged"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5],
        REGISTRY
    )
    .unwrap();

    pub static ref FEED_ITEMS_RETURNED: Histogram = register_histogram_with_registry!(
        "feed_items_returned",
        "Number of items in each feed response",
        vec![0.0, 1.0, 5.0, 10.0, 20.0, 50.0, 100.0, 500.0],
        REGISTRY
    )
    .unwrap();
}

/// Record the result of a social mutation
pub fn record_action<T>(action: &str, result: &Result<T, AppError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(err) => err.code(),
    };
    SOCIAL_ACTIONS_TOTAL
        .with_label_values(&[action, outcome])
        .inc();
}

/// Gather all metrics in Prometheus text format
pub fn gather_metrics() -> Result<String, AppError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| AppError::Internal(format!("metrics encoding failed: {}", e)))?;
    String::from_utf8(buffer).map_err(|e| AppError::Internal(e.to_string()))
}

/// GET /metrics
pub async fn serve_metrics() -> Result<HttpResponse, AppError> {
    let body = gather_metrics()?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}
