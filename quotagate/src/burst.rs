//! Synthetic burst driver.
//!
//! Splits `records` calls over worker threads. Even-numbered calls go to an
//! f64 latency histogram, odd ones to a u64 sample histogram; both share one
//! admission counter, so the combined forwarded count never exceeds the
//! ceiling.

use std::thread;

use opentelemetry::KeyValue;
use quotagate_core::{GatedMeter, InstrumentOptions, QuotaStatus};
use tracing::{info, info_span};

/// Shape of one burst.
#[derive(Debug, Clone)]
pub struct BurstPlan {
    pub instrument: String,
    pub records: u64,
    pub threads: u16,
}

/// Issue every call in `plan` against recorders built from `gated`.
///
/// Returns the counter status once all workers have finished.
pub fn run_burst(gated: &GatedMeter, plan: &BurstPlan) -> QuotaStatus {
    let latency = gated.f64_histogram(
        plan.instrument.clone(),
        &InstrumentOptions::new()
            .with_description("Synthetic step latency")
            .with_unit("s"),
    );
    let samples = gated.u64_histogram(
        format!("{}.samples", plan.instrument),
        &InstrumentOptions::new().with_description("Synthetic sample size"),
    );

    let threads = u64::from(plan.threads.max(1));
    thread::scope(|scope| {
        for worker in 0..threads {
            let latency = &latency;
            let samples = &samples;
            // Calls are numbered globally; each worker takes every `threads`-th one.
            scope.spawn(move || {
                let _span = info_span!("burst_worker", worker).entered();
                let mut call = worker;
                while call < plan.records {
                    let labels = [
                        KeyValue::new("worker", worker as i64),
                        KeyValue::new("call", call as i64),
                    ];
                    if call % 2 == 0 {
                        latency.record(call as f64 / 1000.0, &labels);
                    } else {
                        samples.record(call, &labels);
                    }
                    call += threads;
                }
            });
        }
    });

    let status = gated.admission().status();
    info!(
        instrument = %plan.instrument,
        attempts = status.attempts,
        admitted = status.admitted,
        dropped = status.dropped,
        ceiling = status.ceiling,
        "Burst complete"
    );
    status
}
