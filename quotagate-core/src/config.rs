//! Quota and metrics pipeline configuration.
//!
//! Both structs follow the same pattern: `Default` carries the reference
//! values, `from_env()` overrides them from environment variables and falls
//! back (with a warning) on unparsable input.

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::admission::DEFAULT_MAX_RECORDS;
use crate::error::ConfigError;

/// Environment variable overriding the record ceiling.
pub const ENV_MAX_RECORDS: &str = "QUOTAGATE_MAX_RECORDS";
/// Environment variable overriding the meter name.
pub const ENV_METER_NAME: &str = "QUOTAGATE_METER_NAME";
/// Environment variable selecting the metrics exporter.
pub const ENV_METRICS_EXPORTER: &str = "QUOTAGATE_METRICS_EXPORTER";
/// Environment variable overriding the export interval in seconds.
pub const ENV_EXPORT_INTERVAL_SECS: &str = "QUOTAGATE_EXPORT_INTERVAL_SECS";

/// Admission quota settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaConfig {
    /// Lifetime ceiling on forwarded observations.
    pub max_records: u64,
    /// Name of the OpenTelemetry meter gated instruments are created from.
    pub meter_name: String,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            meter_name: "quotagate".to_string(),
        }
    }
}

impl QuotaConfig {
    /// Create configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `QUOTAGATE_MAX_RECORDS` | `200` |
    /// | `QUOTAGATE_METER_NAME` | `"quotagate"` |
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_records: parse_env_warn(ENV_MAX_RECORDS, default.max_records),
            meter_name: std::env::var(ENV_METER_NAME).unwrap_or(default.meter_name),
        }
    }

    /// Like [`QuotaConfig::from_env`] but rejects unparsable values.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            max_records: parse_env_strict(ENV_MAX_RECORDS, default.max_records)?,
            meter_name: std::env::var(ENV_METER_NAME).unwrap_or(default.meter_name),
        })
    }
}

/// Which exporter the metrics pipeline pushes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExporterKind {
    /// Instruments are live but nothing is exported.
    #[default]
    None,
    /// Pretty-printed to stdout.
    Stdout,
    /// OTLP over HTTP/protobuf.
    Otlp,
}

impl ExporterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExporterKind::None => "none",
            ExporterKind::Stdout => "stdout",
            ExporterKind::Otlp => "otlp",
        }
    }
}

impl FromStr for ExporterKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(ExporterKind::None),
            "stdout" => Ok(ExporterKind::Stdout),
            "otlp" => Ok(ExporterKind::Otlp),
            other => Err(ConfigError::UnknownExporter {
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ExporterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metrics export pipeline settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    pub exporter: ExporterKind,
    /// OTLP HTTP endpoint. If None, uses the OTel SDK default.
    pub otlp_endpoint: Option<String>,
    /// OTel resource `service.name` attribute.
    pub service_name: String,
    /// Periodic reader export interval.
    pub export_interval: Duration,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            exporter: ExporterKind::None,
            otlp_endpoint: None,
            service_name: "quotagate".to_string(),
            export_interval: Duration::from_secs(60),
        }
    }
}

impl MetricsConfig {
    /// Create configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `QUOTAGATE_METRICS_EXPORTER` | `none` |
    /// | `QUOTAGATE_EXPORT_INTERVAL_SECS` | `60` |
    /// | `OTEL_EXPORTER_OTLP_ENDPOINT` | OTel SDK default |
    /// | `OTEL_SERVICE_NAME` | `"quotagate"` |
    pub fn from_env() -> Self {
        let default = Self::default();

        let exporter = match std::env::var(ENV_METRICS_EXPORTER) {
            Ok(val) => val.parse::<ExporterKind>().unwrap_or_else(|e: ConfigError| {
                warn!(
                    env_var = ENV_METRICS_EXPORTER,
                    error = %e,
                    default = %default.exporter,
                    "Invalid value for environment variable, using default"
                );
                default.exporter
            }),
            Err(_) => default.exporter,
        };

        Self {
            exporter,
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok(),
            service_name: std::env::var("OTEL_SERVICE_NAME").unwrap_or(default.service_name),
            export_interval: Duration::from_secs(parse_env_warn(
                ENV_EXPORT_INTERVAL_SECS,
                default.export_interval.as_secs(),
            )),
        }
    }
}

fn parse_env_warn<T: FromStr + std::fmt::Display>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(val) => match val.parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    env_var = name,
                    value = %val,
                    default = %default,
                    "Invalid value for environment variable, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_strict<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(val) => val.parse::<T>().map_err(|_| ConfigError::InvalidEnvValue {
            var: name.to_string(),
            value: val,
        }),
        Err(_) => Ok(default),
    }
}
