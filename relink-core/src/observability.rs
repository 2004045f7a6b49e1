//! OpenTelemetry observability configuration and initialization
//!
//! relink logs through `tracing` everywhere: binding construction, every
//! invocation's response status, and transport failures. This module wires
//! those events (and the proxy metrics in `relink-client`) to an OTLP
//! collector and to a local JSON log stream.
//!
//! # Usage Pattern
//!
//! Initialize once at startup, before building proxies:
//!
//! ```rust,no_run
//! use relink_core::ObservabilityConfig;
//!
//! let config = ObservabilityConfig::new("billing-client")
//!     .with_endpoint("http://localhost:4317")
//!     .with_log_level("debug");
//!
//! relink_core::init_observability(config).expect("Failed to init observability");
//!
//! // ... build proxies, make calls ...
//!
//! relink_core::shutdown_observability();
//! ```
//!
//! The OTLP exporters talk gRPC through tonic and must be initialized inside
//! a Tokio runtime. With traces and metrics disabled only the local
//! subscriber is installed, and no runtime is needed.
//!
//! # Environment Variables
//!
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: Collector endpoint
//! - `RUST_LOG`: Log level filter (e.g., "info", "relink_client=debug")

use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Boxed error returned by the initialization functions
pub type InitError = Box<dyn std::error::Error + Send + Sync>;

/// Observability configuration for OpenTelemetry
///
/// # Defaults
///
/// - Service name: "relink"
/// - Service version: Current crate version
/// - OTLP endpoint: `$OTEL_EXPORTER_OTLP_ENDPOINT`, or "http://localhost:4317"
/// - Traces, metrics and logs enabled
/// - Log level: `$RUST_LOG`, or "info"
///
/// # Examples
///
/// ```rust
/// use relink_core::ObservabilityConfig;
///
/// let config = ObservabilityConfig::new("settings-proxy")
///     .with_endpoint("http://collector:4317")
///     .with_metrics(false);
///
/// assert_eq!(config.service_name, "settings-proxy");
/// assert!(!config.enable_metrics);
/// ```
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name attached to every span, metric and log record
    pub service_name: String,

    /// Service version attached to every span, metric and log record
    pub service_version: String,

    /// gRPC endpoint of the OpenTelemetry collector
    pub otlp_endpoint: String,

    /// Export spans to the collector
    pub enable_traces: bool,

    /// Export metrics to the collector
    pub enable_metrics: bool,

    /// Emit JSON log lines on stdout
    pub enable_logs: bool,

    /// Log level filter, used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "relink".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
            enable_traces: true,
            enable_metrics: true,
            enable_logs: true,
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl ObservabilityConfig {
    /// Create a new configuration with a custom service name
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the OTLP collector endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = endpoint.into();
        self
    }

    /// Set the log level filter ("error", "warn", "info", "debug", "trace")
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the service version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    /// Enable or disable span export
    pub fn with_traces(mut self, enable: bool) -> Self {
        self.enable_traces = enable;
        self
    }

    /// Enable or disable metric export
    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Enable or disable local JSON logs
    pub fn with_logs(mut self, enable: bool) -> Self {
        self.enable_logs = enable;
        self
    }

    /// Resource identifying this service to the collector
    fn resource(&self) -> Resource {
        Resource::builder_empty()
            .with_attributes(vec![
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                    self.service_name.clone(),
                ),
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
                    self.service_version.clone(),
                ),
            ])
            .build()
    }
}

/// Initialize OpenTelemetry with the given configuration
///
/// Sets up, for whichever pillars are enabled:
///
/// 1. **Tracer provider**: batch OTLP span export
/// 2. **Meter provider**: OTLP metric export every 30 seconds
/// 3. **Tracing subscriber**: env filter, optional OpenTelemetry layer,
///    optional JSON fmt layer
///
/// Call once per process. A second call fails because the global subscriber
/// is already installed.
pub fn init_observability(config: ObservabilityConfig) -> Result<(), InitError> {
    let tracer = if config.enable_traces {
        Some(init_tracer(&config)?)
    } else {
        None
    };

    if config.enable_metrics {
        init_metrics(&config)?;
    }

    init_tracing_subscriber(&config, tracer)?;

    tracing::info!(
        service_name = %config.service_name,
        otlp_endpoint = %config.otlp_endpoint,
        traces = config.enable_traces,
        metrics = config.enable_metrics,
        logs = config.enable_logs,
        "OpenTelemetry initialized"
    );

    Ok(())
}

/// Providers registered by `init_observability`, kept for `shutdown_observability`
static PROVIDERS: Mutex<Providers> = Mutex::new(Providers {
    tracer: None,
    meter: None,
});

struct Providers {
    tracer: Option<SdkTracerProvider>,
    meter: Option<SdkMeterProvider>,
}

/// Fail unless a Tokio runtime is running on this thread
///
/// The tonic exporters spawn their connection tasks while being built.
fn require_runtime() -> Result<(), InitError> {
    tokio::runtime::Handle::try_current()
        .map(|_| ())
        .map_err(|_| "OTLP export requires a Tokio runtime".into())
}

/// Register the global tracer provider and return a tracer for the subscriber layer
fn init_tracer(config: &ObservabilityConfig) -> Result<opentelemetry_sdk::trace::Tracer, InitError> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler};

    require_runtime()?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(config.resource())
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .build();

    // The layer needs the tracer before the provider moves into the global slot.
    let tracer = provider.tracer(config.service_name.clone());
    lock_providers().tracer = Some(provider.clone());
    global::set_tracer_provider(provider);

    Ok(tracer)
}

/// Register the global meter provider
fn init_metrics(config: &ObservabilityConfig) -> Result<(), InitError> {
    require_runtime()?;

    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build()?;

    let reader = opentelemetry_sdk::metrics::PeriodicReader::builder(exporter)
        .with_interval(Duration::from_secs(30))
        .build();

    let provider = SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(config.resource())
        .build();

    lock_providers().meter = Some(provider.clone());
    global::set_meter_provider(provider);
    Ok(())
}

fn lock_providers() -> MutexGuard<'static, Providers> {
    PROVIDERS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` takes precedence over `config.log_level`.
fn init_tracing_subscriber(
    config: &ObservabilityConfig,
    tracer: Option<opentelemetry_sdk::trace::Tracer>,
) -> Result<(), InitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let telemetry_layer = tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    let fmt_layer = config.enable_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .json()
    });

    tracing_subscriber::registry()
        .with(telemetry_layer)
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Flush and shut down telemetry
///
/// Exports any spans still batched and the final metric interval, then stops
/// both providers. The global slots keep the stopped providers, so later
/// spans and measurements are dropped. Safe to call any number of times.
pub fn shutdown_observability() {
    tracing::info!("Shutting down OpenTelemetry");

    let (tracer, meter) = {
        let mut providers = lock_providers();
        (providers.tracer.take(), providers.meter.take())
    };

    if let Some(provider) = tracer {
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error = %e, "Tracer provider shutdown failed");
        }
    }
    if let Some(provider) = meter {
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error = %e, "Meter provider shutdown failed");
        }
    }

    tracing::info!("OpenTelemetry shutdown complete");
}
