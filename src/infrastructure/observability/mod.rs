//! Observability infrastructure
//!
//! Prometheus metrics for HTTP traffic and account lifecycle events.

pub mod metrics;

pub use metrics::{
    create_metrics_router, init_metrics, record_account_event, record_http_request, AccountEvent,
    PrometheusMetrics,
};
