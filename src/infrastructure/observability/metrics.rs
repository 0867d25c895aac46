//! Prometheus metrics infrastructure

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;

use super::config::MetricsConfig;
use crate::domain::{DomainError, VariantKind, WorkflowResponse};

static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
    path: String,
}

impl fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrometheusMetrics")
            .field("path", &self.path)
            .finish()
    }
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Initialize Prometheus metrics; `None` when disabled or a recorder is already installed
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("inline_crud_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
                path: config.path.clone(),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router<S>(metrics: PrometheusMetrics) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let path = metrics.path.clone();
    Router::new()
        .route(&path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// How a workflow request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowOutcome {
    Rendered,
    Invalid,
    Saved,
    NotFound,
    Error,
}

impl WorkflowOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rendered => "rendered",
            Self::Invalid => "invalid",
            Self::Saved => "saved",
            Self::NotFound => "not_found",
            Self::Error => "error",
        }
    }

    /// Classify the result of a read (`is_write == false`) or write request
    pub fn of(result: &Result<WorkflowResponse, DomainError>, is_write: bool) -> Self {
        match result {
            Ok(WorkflowResponse::Redirect(_)) => Self::Saved,
            Ok(WorkflowResponse::Render(_)) if is_write => Self::Invalid,
            Ok(WorkflowResponse::Render(_)) => Self::Rendered,
            Err(e) if e.is_not_found() => Self::NotFound,
            Err(_) => Self::Error,
        }
    }
}

/// Record the outcome of one workflow request
pub fn record_workflow_outcome(variant: VariantKind, outcome: WorkflowOutcome) {
    counter!(
        "inline_workflow_requests_total",
        "variant" => variant.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Replace numeric ids in a path to bound label cardinality
fn sanitize_path(path: &str) -> String {
    let path = NUMERIC_SEGMENT.replace_all(path, "/{id}$1");

    if path.len() > 50 {
        path[..50].to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_numeric_id() {
        assert_eq!(sanitize_path("/author/update/12/"), "/author/update/{id}/");
        assert_eq!(sanitize_path("/author/7"), "/author/{id}");
    }

    #[test]
    fn test_sanitize_path_no_id() {
        assert_eq!(sanitize_path("/authors/"), "/authors/");
    }

    #[test]
    fn test_sanitize_path_truncates_long_paths() {
        let path = "/very/long/path/that/exceeds/the/maximum/allowed/length/for/metrics";
        assert!(sanitize_path(path).len() <= 50);
    }

    #[test]
    fn test_workflow_outcome_classification() {
        let redirect = Ok(WorkflowResponse::Redirect("/author/1/".to_string()));
        assert_eq!(WorkflowOutcome::of(&redirect, true), WorkflowOutcome::Saved);

        let missing = Err(DomainError::not_found("author 3 not found"));
        assert_eq!(WorkflowOutcome::of(&missing, false), WorkflowOutcome::NotFound);

        let failed = Err(DomainError::storage("connection reset"));
        assert_eq!(WorkflowOutcome::of(&failed, true), WorkflowOutcome::Error);
        assert_eq!(WorkflowOutcome::Invalid.as_str(), "invalid");
    }

    #[test]
    fn test_record_workflow_outcome_without_recorder() {
        record_workflow_outcome(VariantKind::Create, WorkflowOutcome::Saved);
    }
}
