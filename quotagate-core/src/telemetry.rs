//! OpenTelemetry meter provider setup and lifecycle.
//!
//! Builds an `SdkMeterProvider` with a periodic reader over the configured
//! exporter and installs it as the global meter provider. The returned
//! [`MetricsGuard`] owns the provider; call `shutdown()` before exit so the
//! final batch is flushed.

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry::metrics::{Meter, MeterProvider};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use tracing::info;

use crate::admission::AdmissionCounter;
use crate::config::{ExporterKind, MetricsConfig, QuotaConfig};
use crate::error::TelemetryError;
use crate::meter::GatedMeter;

/// RAII guard holding the `SdkMeterProvider`.
///
/// Tests should use `provider()` and build meters from it directly rather
/// than going through the global provider.
pub struct MetricsGuard {
    provider: SdkMeterProvider,
}

impl MetricsGuard {
    pub fn provider(&self) -> &SdkMeterProvider {
        &self.provider
    }

    /// Meter scoped to `name` from the owned provider.
    pub fn meter(&self, name: &'static str) -> Meter {
        self.provider.meter(name)
    }

    /// Gated meter over a fresh counter built from `quota`.
    pub fn gated_meter(&self, quota: &QuotaConfig) -> GatedMeter {
        let meter = self.provider.meter_with_scope(
            opentelemetry::InstrumentationScope::builder(quota.meter_name.clone()).build(),
        );
        GatedMeter::new(meter, Arc::new(AdmissionCounter::from_config(quota)))
    }

    pub fn force_flush(&self) -> Result<(), TelemetryError> {
        self.provider
            .force_flush()
            .map_err(|e| TelemetryError::Flush {
                reason: e.to_string(),
            })
    }

    /// Flush pending metrics and stop the reader.
    pub fn shutdown(&self) -> Result<(), TelemetryError> {
        self.provider
            .shutdown()
            .map_err(|e| TelemetryError::Shutdown {
                reason: e.to_string(),
            })
    }
}

/// Initializes the metrics export pipeline.
///
/// With `ExporterKind::None` the provider has no reader: instruments accept
/// measurements and nothing leaves the process.
pub fn init_metrics(config: &MetricsConfig) -> Result<MetricsGuard, TelemetryError> {
    let resource = Resource::builder()
        .with_service_name(config.service_name.clone())
        .build();

    let builder = SdkMeterProvider::builder().with_resource(resource);

    let provider = match config.exporter {
        ExporterKind::None => builder.build(),
        ExporterKind::Stdout => {
            let exporter = opentelemetry_stdout::MetricExporter::default();
            let reader = PeriodicReader::builder(exporter)
                .with_interval(config.export_interval)
                .build();
            builder.with_reader(reader).build()
        }
        ExporterKind::Otlp => {
            let mut exporter_builder = opentelemetry_otlp::MetricExporter::builder().with_http();

            if let Some(ref endpoint) = config.otlp_endpoint {
                exporter_builder = exporter_builder.with_endpoint(endpoint);
            }

            let exporter = exporter_builder
                .build()
                .map_err(|e| TelemetryError::ExporterBuild {
                    reason: e.to_string(),
                })?;
            let reader = PeriodicReader::builder(exporter)
                .with_interval(config.export_interval)
                .build();
            builder.with_reader(reader).build()
        }
    };

    global::set_meter_provider(provider.clone());

    info!(
        exporter = %config.exporter,
        service_name = %config.service_name,
        "Metrics pipeline initialized"
    );

    Ok(MetricsGuard { provider })
}
