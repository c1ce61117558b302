//! CLI argument types for `quotagate`.
//!
//! Kept apart from `main.rs` so integration tests can parse them directly.

use clap::{Args, ValueEnum};
use quotagate_core::{ExporterKind, MetricsConfig, QuotaConfig};

/// Arguments for replaying a burst of observations through the gate.
#[derive(Args, Debug, Clone)]
pub struct BurstArgs {
    /// Base instrument name. A `<name>.samples` integer histogram is created alongside.
    #[arg(long, default_value = "build-latency")]
    pub instrument: String,

    /// Total number of record calls to issue.
    #[arg(long, default_value_t = 250)]
    pub records: u64,

    /// Worker threads issuing record calls concurrently.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub threads: u16,

    /// Override the lifetime record ceiling (QUOTAGATE_MAX_RECORDS).
    #[arg(long)]
    pub max_records: Option<u64>,

    /// Metrics exporter (QUOTAGATE_METRICS_EXPORTER).
    #[arg(long, value_enum)]
    pub exporter: Option<CliExporter>,

    /// OTLP HTTP endpoint (OTEL_EXPORTER_OTLP_ENDPOINT).
    #[arg(long)]
    pub otlp_endpoint: Option<String>,

    /// Enable debug logging, including every skipped observation.
    #[arg(long)]
    pub verbose: bool,
}

impl BurstArgs {
    /// Environment-derived quota config with CLI overrides applied.
    pub fn quota_config(&self, mut base: QuotaConfig) -> QuotaConfig {
        if let Some(max_records) = self.max_records {
            base.max_records = max_records;
        }
        base
    }

    /// Environment-derived metrics config with CLI overrides applied.
    pub fn metrics_config(&self, mut base: MetricsConfig) -> MetricsConfig {
        if let Some(exporter) = self.exporter {
            base.exporter = exporter.into();
        }
        if let Some(ref endpoint) = self.otlp_endpoint {
            base.otlp_endpoint = Some(endpoint.clone());
        }
        base
    }
}

/// CLI-level exporter selection.
///
/// Maps 1:1 to `quotagate_core::ExporterKind`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CliExporter {
    /// Keep measurements in-process.
    None,
    /// Print exported metrics to stdout.
    Stdout,
    /// Push to an OTLP collector over HTTP.
    Otlp,
}

impl From<CliExporter> for ExporterKind {
    fn from(value: CliExporter) -> Self {
        match value {
            CliExporter::None => ExporterKind::None,
            CliExporter::Stdout => ExporterKind::Stdout,
            CliExporter::Otlp => ExporterKind::Otlp,
        }
    }
}
