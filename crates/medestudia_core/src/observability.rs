//! Logging and metrics bootstrap shared by the binaries.

use medestudia_error::ConfigError;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "metrics")]
use opentelemetry::{KeyValue, global};
#[cfg(feature = "metrics")]
use opentelemetry_otlp::{MetricExporter as OtlpExporter, WithExportConfig};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::{
    Resource,
    metrics::{PeriodicReader, SdkMeterProvider},
};
#[cfg(feature = "metrics")]
use opentelemetry_stdout::MetricExporter as StdoutExporter;
#[cfg(feature = "metrics")]
use std::time::Duration;

/// Installs the global `tracing` subscriber.
///
/// Filtering follows `RUST_LOG` (default `info`). With `json` set, events are
/// written as one JSON object per line.
pub fn init_tracing(json: bool) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| ConfigError::new(format!("Failed to install tracing subscriber: {}", e)))
}

/// Initializes OpenTelemetry metrics export.
///
/// `OTEL_EXPORTER=otlp` exports to `OTEL_EXPORTER_OTLP_ENDPOINT`
/// (default `http://localhost:4318`); anything else exports to stdout.
/// Without the `metrics` feature this does nothing.
#[instrument(skip_all, fields(service_name))]
pub fn init_observability(
    service_name: &'static str,
    export_interval_secs: u64,
) -> Result<(), ConfigError> {
    #[cfg(not(feature = "metrics"))]
    {
        let _ = export_interval_secs;
        info!(service_name, "Metrics feature disabled, skipping exporter setup");
        Ok(())
    }

    #[cfg(feature = "metrics")]
    {
        let provider = build_meter_provider(service_name, export_interval_secs)?;
        global::set_meter_provider(provider);
        info!(service_name, export_interval_secs, "Meter provider registered globally");
        Ok(())
    }
}

#[cfg(feature = "metrics")]
fn build_meter_provider(
    service_name: &'static str,
    export_interval_secs: u64,
) -> Result<SdkMeterProvider, ConfigError> {
    let resource = Resource::builder_empty()
        .with_attributes([KeyValue::new("service.name", service_name)])
        .build();
    let interval = Duration::from_secs(export_interval_secs);
    let exporter_type = std::env::var("OTEL_EXPORTER").unwrap_or_else(|_| "stdout".to_string());

    let provider = match exporter_type.as_str() {
        "otlp" => {
            let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4318".to_string());
            info!(endpoint = %endpoint, "Using OTLP metrics exporter");
            let exporter = OtlpExporter::builder()
                .with_http()
                .with_endpoint(&endpoint)
                .with_timeout(Duration::from_secs(10))
                .build()
                .map_err(|e| ConfigError::new(format!("Failed to create OTLP exporter: {}", e)))?;
            let reader = PeriodicReader::builder(exporter).with_interval(interval).build();
            SdkMeterProvider::builder()
                .with_resource(resource)
                .with_reader(reader)
                .build()
        }
        _ => {
            info!("Using stdout metrics exporter");
            let reader = PeriodicReader::builder(StdoutExporter::default())
                .with_interval(interval)
                .build();
            SdkMeterProvider::builder()
                .with_resource(resource)
                .with_reader(reader)
                .build()
        }
    };
    Ok(provider)
}

/// Logs shutdown; the meter provider flushes when dropped.
#[instrument]
pub fn shutdown_observability() {
    info!("Shutting down observability");
}
