//! Factory for gated instruments.
//!
//! [`GatedMeter`] pairs an OpenTelemetry [`Meter`] with an admission counter
//! and hands out [`GatedRecorder`]s that all share that counter.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter, UpDownCounter};

use crate::admission::{self, AdmissionCounter};
use crate::recorder::{GatedRecorder, LabeledRecord};

/// Provider-side options applied when an instrument is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentOptions {
    pub description: Option<Cow<'static, str>>,
    pub unit: Option<Cow<'static, str>>,
    /// Explicit bucket boundaries. Only histograms use them.
    pub boundaries: Option<Vec<f64>>,
}

impl InstrumentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<Cow<'static, str>>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_boundaries(mut self, boundaries: Vec<f64>) -> Self {
        self.boundaries = Some(boundaries);
        self
    }
}

// Every OTel instrument builder exposes `with_description` and `with_unit`
// but they share no trait, so the common options are applied by macro.
macro_rules! apply_common {
    ($builder:expr, $options:expr) => {{
        let mut builder = $builder;
        if let Some(description) = $options.description.clone() {
            builder = builder.with_description(description);
        }
        if let Some(unit) = $options.unit.clone() {
            builder = builder.with_unit(unit);
        }
        builder
    }};
}

macro_rules! histogram_factory {
    ($fn_name:ident, $meter_fn:ident, $value:ty) => {
        #[doc = concat!("Build a `", stringify!($value), "` histogram behind the quota.")]
        pub fn $fn_name(
            &self,
            name: impl Into<Cow<'static, str>>,
            options: &InstrumentOptions,
        ) -> GatedRecorder<Histogram<$value>> {
            let name = name.into();
            let mut builder = apply_common!(self.meter.$meter_fn(name.clone()), options);
            if let Some(boundaries) = options.boundaries.clone() {
                builder = builder.with_boundaries(boundaries);
            }
            self.bind(name, builder.build())
        }
    };
}

macro_rules! instrument_factory {
    ($fn_name:ident, $meter_fn:ident, $instrument:ident, $value:ty) => {
        #[doc = concat!(
            "Build a `", stringify!($value), "` ", stringify!($instrument), " behind the quota."
        )]
        pub fn $fn_name(
            &self,
            name: impl Into<Cow<'static, str>>,
            options: &InstrumentOptions,
        ) -> GatedRecorder<$instrument<$value>> {
            let name = name.into();
            let builder = apply_common!(self.meter.$meter_fn(name.clone()), options);
            self.bind(name, builder.build())
        }
    };
}

/// Builds instruments from a meter and gates them behind one counter.
#[derive(Clone)]
pub struct GatedMeter {
    meter: Meter,
    admission: Arc<AdmissionCounter>,
}

impl GatedMeter {
    pub fn new(meter: Meter, admission: Arc<AdmissionCounter>) -> Self {
        Self { meter, admission }
    }

    /// Gate instruments from `meter` behind the process-wide counter.
    pub fn global(meter: Meter) -> Self {
        Self::new(meter, admission::global())
    }

    pub fn admission(&self) -> &Arc<AdmissionCounter> {
        &self.admission
    }

    pub fn meter(&self) -> &Meter {
        &self.meter
    }

    histogram_factory!(f64_histogram, f64_histogram, f64);
    histogram_factory!(u64_histogram, u64_histogram, u64);

    instrument_factory!(f64_gauge, f64_gauge, Gauge, f64);
    instrument_factory!(u64_gauge, u64_gauge, Gauge, u64);
    instrument_factory!(i64_gauge, i64_gauge, Gauge, i64);
    instrument_factory!(f64_counter, f64_counter, Counter, f64);
    instrument_factory!(u64_counter, u64_counter, Counter, u64);
    instrument_factory!(f64_up_down_counter, f64_up_down_counter, UpDownCounter, f64);
    instrument_factory!(i64_up_down_counter, i64_up_down_counter, UpDownCounter, i64);

    fn bind<I>(&self, name: Cow<'static, str>, instrument: I) -> GatedRecorder<I>
    where
        I: LabeledRecord,
    {
        GatedRecorder::new(name.as_ref(), instrument, Arc::clone(&self.admission))
    }
}

impl fmt::Debug for GatedMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatedMeter")
            .field("admission", &self.admission)
            .finish_non_exhaustive()
    }
}
