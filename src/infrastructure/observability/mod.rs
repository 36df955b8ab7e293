//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    create_metrics_router, init_metrics, record_admission, record_gate_in_use, record_gate_wait,
    record_generation, record_http_request, record_usage_write_failure, GenerationMetricParams,
    PrometheusMetrics,
};
