//! Prometheus metrics infrastructure

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use regex::Regex;

use super::config::MetricsConfig;

static UUID_SEGMENT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").ok()
});

static NUMERIC_SEGMENT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"/\d+(/|$)").ok());

const MAX_PATH_LABEL_LEN: usize = 50;

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("humanizer_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router serving `path`
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
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

/// Record a quota decision; `outcome` is `admitted` or a rejection code
pub fn record_admission(tier: &str, outcome: &str) {
    counter!(
        "humanizer_admissions_total",
        "tier" => tier.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record how long a caller waited for a gate slot and the resulting occupancy
pub fn record_gate_wait(wait: Duration, in_use: usize) {
    histogram!("humanizer_gate_wait_seconds").record(wait.as_secs_f64());
    record_gate_in_use(in_use);
}

/// Record the number of held gate slots
pub fn record_gate_in_use(in_use: usize) {
    gauge!("humanizer_gate_in_use").set(in_use as f64);
}

/// Parameters for generation metrics
pub struct GenerationMetricParams<'a> {
    pub engine: &'a str,
    pub model: &'a str,
    pub duration: Duration,
    pub success: bool,
    pub words: u32,
}

/// Record one guarded generation call, retries included
pub fn record_generation(params: GenerationMetricParams) {
    let labels = [
        ("engine", params.engine.to_string()),
        ("model", params.model.to_string()),
        ("status", if params.success { "success" } else { "error" }.to_string()),
    ];

    counter!("humanizer_generations_total", &labels).increment(1);
    histogram!("humanizer_generation_duration_seconds", &labels)
        .record(params.duration.as_secs_f64());

    if params.success {
        counter!("humanizer_words_total", "model" => params.model.to_string())
            .increment(u64::from(params.words));
    }
}

/// Record a swallowed post-success write failure (`ledger` or `history`)
pub fn record_usage_write_failure(target: &str) {
    counter!("humanizer_usage_write_failures_total", "target" => target.to_string()).increment(1);
}

/// Sanitize URL path for metric labels (remove IDs, limit cardinality)
fn sanitize_path(path: &str) -> String {
    let mut path = path.to_string();

    if let Some(re) = UUID_SEGMENT.as_ref() {
        path = re.replace_all(&path, "{id}").into_owned();
    }

    if let Some(re) = NUMERIC_SEGMENT.as_ref() {
        path = re.replace_all(&path, "/{id}$1").into_owned();
    }

    path.chars().take(MAX_PATH_LABEL_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_uuid() {
        let path = "/v1/history/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(sanitize_path(path), "/v1/history/{id}");
    }

    #[test]
    fn test_sanitize_path_numeric_id() {
        assert_eq!(sanitize_path("/v1/history/123/x"), "/v1/history/{id}/x");
    }

    #[test]
    fn test_sanitize_path_no_id() {
        assert_eq!(sanitize_path("/health"), "/health");
    }

    #[test]
    fn test_sanitize_path_truncates_long_paths() {
        let path = "/very/long/path/that/exceeds/the/maximum/allowed/length/for/metrics";
        assert!(sanitize_path(path).len() <= MAX_PATH_LABEL_LEN);
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_admission("free", "admitted");
        record_gate_wait(Duration::from_millis(5), 1);
        record_generation(GenerationMetricParams {
            engine: "mock",
            model: "m",
            duration: Duration::from_millis(10),
            success: true,
            words: 3,
        });
        record_usage_write_failure("ledger");
    }

    #[test]
    fn test_gate_gauge_follows_latest_value() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        ::metrics::with_local_recorder(&recorder, || {
            record_gate_wait(Duration::from_millis(5), 2);
            record_gate_in_use(0);
        });

        assert!(handle.render().contains("humanizer_gate_in_use 0"));
    }
}
