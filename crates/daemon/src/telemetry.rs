//! Telemetry setup for OpenTelemetry integration

use anyhow::Result;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

const ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

/// Whether an OTLP endpoint is configured
pub fn requested() -> bool {
    std::env::var(ENDPOINT_VAR).is_ok()
}

/// Whether this build can export traces
pub const fn compiled_in() -> bool {
    cfg!(feature = "telemetry")
}

/// Build the OpenTelemetry layer if enabled
///
/// # Environment Variables
///
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (e.g., http://localhost:4317)
/// - `OTEL_SERVICE_NAME`: Service name (default: vaidya-queue-engine)
///
/// # Example
///
/// ```text
/// OTEL_EXPORTER_OTLP_ENDPOINT=http://localhost:4317 \
/// OTEL_SERVICE_NAME=vaidya-dev \
///     ./vaidya-queue-engine
/// ```
#[cfg(feature = "telemetry")]
pub fn otel_layer<S>() -> Result<Option<Box<dyn Layer<S> + Send + Sync + 'static>>>
where
    S: Subscriber + for<'a> LookupSpan<'a> + Send + Sync,
{
    match std::env::var(ENDPOINT_VAR) {
        Ok(endpoint) => build_layer(&endpoint).map(Some),
        Err(_) => Ok(None),
    }
}

/// Without the `telemetry` feature no layer is ever built
#[cfg(not(feature = "telemetry"))]
pub fn otel_layer<S>() -> Result<Option<Box<dyn Layer<S> + Send + Sync + 'static>>>
where
    S: Subscriber + for<'a> LookupSpan<'a> + Send + Sync,
{
    Ok(None)
}

#[cfg(feature = "telemetry")]
fn build_layer<S>(endpoint: &str) -> Result<Box<dyn Layer<S> + Send + Sync + 'static>>
where
    S: Subscriber + for<'a> LookupSpan<'a> + Send + Sync,
{
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "vaidya-queue-engine".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .build();
    let tracer = provider.tracer(service_name);
    opentelemetry::global::set_tracer_provider(provider);

    Ok(tracing_opentelemetry::layer().with_tracer(tracer).boxed())
}
