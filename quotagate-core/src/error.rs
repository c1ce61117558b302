//! Error types.
//!
//! Quota exhaustion is deliberately absent: a rejected observation is
//! dropped and logged, never reported. These errors only cover configuration
//! and the export pipeline around the gate.

use thiserror::Error;

/// Configuration parsing errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value that does not parse.
    #[error("invalid value '{value}' for environment variable '{var}'")]
    InvalidEnvValue { var: String, value: String },

    /// Unknown metrics exporter name.
    #[error("unknown metrics exporter '{value}' (expected none, stdout or otlp)")]
    UnknownExporter { value: String },
}

/// Errors that can occur during metrics pipeline initialization or shutdown.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to build the OTLP metric exporter.
    #[error("failed to build OTLP exporter: {reason}")]
    ExporterBuild { reason: String },

    /// Flushing pending metrics failed.
    #[error("meter provider flush failed: {reason}")]
    Flush { reason: String },

    /// Shutdown of the meter provider failed.
    #[error("meter provider shutdown failed: {reason}")]
    Shutdown { reason: String },
}
