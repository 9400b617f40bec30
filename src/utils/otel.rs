//! Observability (OpenTelemetry)
//!
//! Sets up the tracing subscriber and, when possible, OTLP export of spans,
//! metrics and logs. Export is optional: if a collector pipeline cannot be
//! built the service logs to stdout and counts nothing.

use std::sync::Arc;
use std::time::Duration;

use opentelemetry::metrics::Counter;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::logs::LoggerProvider;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::{propagation::TraceContextPropagator, runtime, trace as sdktrace, Resource};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::ServiceConfig;
use crate::observer::{NoopObserver, Operation, SurveyObserver};

const INSTRUMENTATION_NAME: &str = "survey_intake";

/// Flushes and shuts down whatever providers were installed
pub struct OtelGuard {
    tracing_exported: bool,
    meter_provider: Option<SdkMeterProvider>,
    logger_provider: Option<LoggerProvider>,
}

impl OtelGuard {
    pub fn is_exporting(&self) -> bool {
        self.tracing_exported || self.meter_provider.is_some() || self.logger_provider.is_some()
    }
}

impl Drop for OtelGuard {
    fn drop(&mut self) {
        if self.tracing_exported {
            global::shutdown_tracer_provider();
        }
        if let Some(provider) = self.meter_provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("meter provider shutdown failed: {}", e);
            }
        }
        if let Some(provider) = self.logger_provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("logger provider shutdown failed: {}", e);
            }
        }
    }
}

/// Counts successful operations on the `surveys.requests` counter
pub struct OtelObserver {
    counter: Counter<u64>,
}

impl OtelObserver {
    pub fn new() -> Self {
        let meter = global::meter(INSTRUMENTATION_NAME);
        let counter = meter
            .u64_counter("surveys.requests")
            .with_description("Successful survey operations")
            .init();
        Self { counter }
    }
}

impl Default for OtelObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl SurveyObserver for OtelObserver {
    fn operation_succeeded(&self, op: Operation) {
        self.counter.add(1, &[KeyValue::new("operation", op.as_str())]);
    }
}

fn resource(config: &ServiceConfig) -> Resource {
    Resource::new(vec![
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("telemetry.sdk.language", "rust"),
    ])
}

fn build_tracer_provider(config: &ServiceConfig) -> anyhow::Result<sdktrace::TracerProvider> {
    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(config.otlp_endpoint.clone())
        .build_span_exporter()?;

    let trace_config = sdktrace::Config::default().with_resource(resource(config));

    Ok(sdktrace::TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_config(trace_config)
        .build())
}

fn build_meter_provider(config: &ServiceConfig) -> anyhow::Result<SdkMeterProvider> {
    let provider = opentelemetry_otlp::new_pipeline()
        .metrics(runtime::Tokio)
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(config.otlp_endpoint.clone()),
        )
        .with_resource(resource(config))
        .with_period(Duration::from_secs(5))
        .build()?;
    Ok(provider)
}

fn build_logger_provider(config: &ServiceConfig) -> anyhow::Result<LoggerProvider> {
    let provider = opentelemetry_otlp::new_pipeline()
        .logging()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(config.otlp_endpoint.clone()),
        )
        .with_resource(resource(config))
        .install_batch(runtime::Tokio)?;
    Ok(provider)
}

/// Install the global subscriber and pick an observer.
///
/// Must run inside the tokio runtime. Never fails: export problems are
/// logged and the no-op observer is returned instead.
pub fn init_telemetry(config: &ServiceConfig) -> (OtelGuard, Arc<dyn SurveyObserver>) {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let mut setup_errors = Vec::new();

    let tracer_provider = if config.telemetry_enabled {
        build_tracer_provider(config)
            .map_err(|e| setup_errors.push(format!("span exporter: {}", e)))
            .ok()
    } else {
        None
    };

    let meter_provider = if config.telemetry_enabled {
        build_meter_provider(config)
            .map_err(|e| setup_errors.push(format!("metric exporter: {}", e)))
            .ok()
    } else {
        None
    };

    let logger_provider = if config.telemetry_enabled {
        build_logger_provider(config)
            .map_err(|e| setup_errors.push(format!("log exporter: {}", e)))
            .ok()
    } else {
        None
    };

    let telemetry = tracer_provider.as_ref().map(|provider| {
        global::set_tracer_provider(provider.clone());
        tracing_opentelemetry::layer().with_tracer(provider.tracer(INSTRUMENTATION_NAME))
    });

    // Every `tracing` event, including the per-request line, becomes a log record
    let log_bridge = logger_provider.as_ref().map(OpenTelemetryTracingBridge::new);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("survey_intake=info,tower_http=info"));

    Registry::default()
        .with(filter)
        .with(telemetry)
        .with(log_bridge)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    for err in &setup_errors {
        warn!("telemetry export disabled ({})", err);
    }

    let observer: Arc<dyn SurveyObserver> = match &meter_provider {
        Some(provider) => {
            global::set_meter_provider(provider.clone());
            Arc::new(OtelObserver::new())
        }
        None => Arc::new(NoopObserver),
    };

    let guard = OtelGuard {
        tracing_exported: tracer_provider.is_some(),
        meter_provider,
        logger_provider,
    };

    if guard.is_exporting() {
        info!(endpoint = %config.otlp_endpoint, service = %config.service_name, "telemetry export enabled");
    } else {
        info!("telemetry export off, logging to stdout only");
    }

    (guard, observer)
}
