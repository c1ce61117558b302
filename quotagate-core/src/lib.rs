//! QuotaGate Core: a lifetime quota in front of OpenTelemetry instruments.
//!
//! Some metric backends cap how many time series a single write may carry
//! (Cloud Monitoring accepts 200). This crate puts one shared
//! [`AdmissionCounter`] in front of every instrument: the first `ceiling`
//! observations across all [`GatedRecorder`]s are forwarded, everything after
//! is dropped with a debug log and never reported to the caller.
//!
//! ```ignore
//! let gated = GatedMeter::new(meter, Arc::new(AdmissionCounter::new(200)));
//! let latency = gated.f64_histogram("build-latency", &InstrumentOptions::new());
//! latency.record(1.25, &[KeyValue::new("step", "compile")]);
//! ```

pub mod admission;
pub mod config;
pub mod error;
pub mod meter;
pub mod recorder;
pub mod telemetry;

pub use admission::{AdmissionCounter, DEFAULT_MAX_RECORDS, QuotaStatus};
pub use config::{ExporterKind, MetricsConfig, QuotaConfig};
pub use error::{ConfigError, TelemetryError};
pub use meter::{GatedMeter, InstrumentOptions};
pub use recorder::{GatedRecorder, LabeledRecord, Measurement, MeasurementKind};
pub use telemetry::{MetricsGuard, init_metrics};
