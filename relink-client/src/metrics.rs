//! Proxy metrics definitions
//!
//! OpenTelemetry instruments recorded by `ServiceProxy` when observability is
//! enabled through `ProxyBuilder::with_observability()`.
//!
//! # Metrics Collected
//!
//! - **calls_total**: Calls made, by method and outcome (counter)
//! - **call_duration**: Call latency in seconds (histogram)
//! - **errors_total**: Failed calls, by error kind (counter)
//! - **bindings**: Methods bound by the most recently built proxy (gauge)
//!
//! # Examples
//!
//! ```rust,no_run
//! use relink_client::ProxyMetrics;
//!
//! let metrics = ProxyMetrics::new("settings-proxy");
//! metrics.record_call("getValue", "success", 0.004);
//! ```

use opentelemetry::{
    global,
    metrics::{Counter, Gauge, Histogram, Meter},
    KeyValue,
};

/// Proxy metrics for monitoring
pub struct ProxyMetrics {
    /// Total number of calls made
    pub calls_total: Counter<u64>,
    /// Call duration in seconds
    pub call_duration: Histogram<f64>,
    /// Total number of failed calls
    pub errors_total: Counter<u64>,
    /// Number of bound methods
    pub bindings: Gauge<i64>,
}

impl ProxyMetrics {
    /// Create a new ProxyMetrics instance
    pub fn new(service_name: impl Into<String>) -> Self {
        let name: &'static str = Box::leak(service_name.into().into_boxed_str());
        let meter = global::meter(name);
        Self::new_with_meter(&meter)
    }

    /// Create a new ProxyMetrics instance with a custom meter
    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            calls_total: meter
                .u64_counter("relink.proxy.calls.total")
                .with_description("Total number of calls made through the proxy")
                .build(),
            call_duration: meter
                .f64_histogram("relink.proxy.call.duration")
                .with_description("Call duration in seconds")
                .build(),
            errors_total: meter
                .u64_counter("relink.proxy.errors.total")
                .with_description("Total number of failed calls")
                .build(),
            bindings: meter
                .i64_gauge("relink.proxy.bindings")
                .with_description("Number of methods bound by the proxy")
                .build(),
        }
    }

    /// Record a completed call
    pub fn record_call(&self, method: &str, status: &str, duration_secs: f64) {
        let attributes = &[
            KeyValue::new("method", method.to_string()),
            KeyValue::new("status", status.to_string()),
        ];
        self.calls_total.add(1, attributes);
        self.call_duration.record(duration_secs, attributes);
    }

    /// Record a failed call
    pub fn record_error(&self, error_type: &str) {
        let attributes = &[KeyValue::new("error_type", error_type.to_string())];
        self.errors_total.add(1, attributes);
    }

    /// Record how many methods a proxy bound
    pub fn record_bindings(&self, count: usize) {
        self.bindings.record(count as i64, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = ProxyMetrics::new("test-proxy");

        metrics.record_bindings(3);
        metrics.record_call("getValue", "success", 0.05);
        metrics.record_error("transport");
    }

    #[test]
    fn test_call_metrics() {
        let metrics = ProxyMetrics::new("test-proxy-calls");

        metrics.record_call("add", "success", 0.05);
        metrics.record_call("add", "status_404", 0.01);
        metrics.record_call("divide", "error", 0.02);
        metrics.record_error("argument_count");
    }
}
