//! Quota-gated metric recorders.
//!
//! A [`GatedRecorder`] wraps any instrument implementing [`LabeledRecord`]
//! and asks the shared [`AdmissionCounter`] before every forward. Rejected
//! observations are dropped with a single debug event; callers never see a
//! difference between "recorded" and "dropped".

use std::fmt;
use std::sync::Arc;

use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Gauge, Histogram, UpDownCounter};
use tracing::debug;

use crate::admission::AdmissionCounter;

/// Numeric kind of a measurement, carried for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementKind {
    F64,
    U64,
    I64,
}

impl MeasurementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementKind::F64 => "f64",
            MeasurementKind::U64 => "u64",
            MeasurementKind::I64 => "i64",
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numeric value an instrument can record.
pub trait Measurement: Copy + Send + Sync + fmt::Debug + 'static {
    const KIND: MeasurementKind;
}

impl Measurement for f64 {
    const KIND: MeasurementKind = MeasurementKind::F64;
}

impl Measurement for u64 {
    const KIND: MeasurementKind = MeasurementKind::U64;
}

impl Measurement for i64 {
    const KIND: MeasurementKind = MeasurementKind::I64;
}

/// Anything that can record one labeled numeric observation.
pub trait LabeledRecord {
    type Value: Measurement;

    fn record(&self, value: Self::Value, labels: &[KeyValue]);
}

impl<I: LabeledRecord + ?Sized> LabeledRecord for Arc<I> {
    type Value = I::Value;

    fn record(&self, value: Self::Value, labels: &[KeyValue]) {
        (**self).record(value, labels)
    }
}

macro_rules! impl_labeled_record {
    ($instrument:ident, $method:ident, $($value:ty),+) => {
        $(
            impl LabeledRecord for $instrument<$value> {
                type Value = $value;

                #[inline]
                fn record(&self, value: $value, labels: &[KeyValue]) {
                    self.$method(value, labels)
                }
            }
        )+
    };
}

impl_labeled_record!(Histogram, record, f64, u64);
impl_labeled_record!(Gauge, record, f64, u64, i64);
impl_labeled_record!(Counter, add, f64, u64);
impl_labeled_record!(UpDownCounter, add, f64, i64);

/// An instrument guarded by the shared admission quota.
#[derive(Clone)]
pub struct GatedRecorder<I> {
    name: Arc<str>,
    instrument: I,
    admission: Arc<AdmissionCounter>,
}

impl<I: LabeledRecord> GatedRecorder<I> {
    /// Bind an existing instrument to a diagnostic name and a quota.
    ///
    /// Construction does not consume quota.
    pub fn new(name: impl Into<Arc<str>>, instrument: I, admission: Arc<AdmissionCounter>) -> Self {
        Self {
            name: name.into(),
            instrument,
            admission,
        }
    }

    /// Record `value` with `labels` if the quota still allows it.
    pub fn record(&self, value: I::Value, labels: &[KeyValue]) {
        if !self.admission.try_admit() {
            debug!(
                instrument = %self.name,
                kind = %self.kind(),
                ceiling = self.admission.ceiling(),
                "skipping metric recording, maximum quota exceeded"
            );
            return;
        }
        self.instrument.record(value, labels);
    }

    pub fn kind(&self) -> MeasurementKind {
        <I::Value as Measurement>::KIND
    }
}

impl<I> GatedRecorder<I> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn admission(&self) -> &Arc<AdmissionCounter> {
        &self.admission
    }

    pub fn instrument(&self) -> &I {
        &self.instrument
    }
}

impl<I> fmt::Debug for GatedRecorder<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatedRecorder")
            .field("name", &self.name)
            .field("admission", &self.admission)
            .finish_non_exhaustive()
    }
}
