//! End-to-end behaviour of the shared admission quota.
//!
//! Covers forwarding up to the ceiling, permanent rejection, sharing across
//! recorders of different value kinds, concurrency, and the debug event
//! emitted for every dropped observation.

mod helpers;

use std::sync::Arc;
use std::thread;

use opentelemetry::KeyValue;
use quotagate_core::{AdmissionCounter, GatedRecorder, MeasurementKind};

use helpers::{RecordingInstrument, with_captured_logs};

// ─────────────────────────────────────────────────────────────────────────────
// Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_build_latency_first_200_forwarded() {
    let admission = Arc::new(AdmissionCounter::new(200));
    let instrument = RecordingInstrument::<f64>::new();
    let recorder = GatedRecorder::new("build-latency", Arc::clone(&instrument), admission);

    let ((), logs) = with_captured_logs(|| {
        for i in 0..250 {
            recorder.record(
                i as f64 * 0.5,
                &[
                    KeyValue::new("call", i as i64),
                    KeyValue::new("step", format!("step-{i}")),
                ],
            );
        }
    });

    let calls = instrument.calls();
    assert_eq!(calls.len(), 200);
    for (i, (value, labels)) in calls.iter().enumerate() {
        assert_eq!(*value, i as f64 * 0.5);
        assert_eq!(
            labels,
            &vec![
                KeyValue::new("call", i as i64),
                KeyValue::new("step", format!("step-{i}")),
            ]
        );
    }

    let skipped = logs.skipped();
    assert_eq!(skipped.len(), 50);
    for event in &skipped {
        assert_eq!(event.level, tracing::Level::DEBUG);
        assert_eq!(event.field("instrument"), Some("build-latency"));
        assert_eq!(event.field("ceiling"), Some("200"));
        assert_eq!(event.field("kind"), Some("f64"));
    }
}

#[test]
fn test_quota_shared_across_value_kinds() {
    let admission = Arc::new(AdmissionCounter::new(2));
    let a_inst = RecordingInstrument::<f64>::new();
    let b_inst = RecordingInstrument::<i64>::new();
    let a = GatedRecorder::new("a", Arc::clone(&a_inst), Arc::clone(&admission));
    let b = GatedRecorder::new("b", Arc::clone(&b_inst), Arc::clone(&admission));
    assert_eq!(b.kind(), MeasurementKind::I64);

    let ((), logs) = with_captured_logs(|| {
        a.record(1.0, &[]);
        b.record(2, &[]);
        a.record(3.0, &[]);
        b.record(4, &[]);
    });

    assert_eq!(a_inst.calls(), vec![(1.0, vec![])]);
    assert_eq!(b_inst.calls(), vec![(2, vec![])]);

    let skipped: Vec<_> = logs
        .skipped()
        .iter()
        .map(|e| e.field("instrument").unwrap_or_default().to_string())
        .collect();
    assert_eq!(skipped, vec!["a", "b"]);
}

#[test]
fn test_zero_ceiling_rejects_first_call() {
    let admission = Arc::new(AdmissionCounter::new(0));
    let instrument = RecordingInstrument::<u64>::new();
    let recorder = GatedRecorder::new("never", Arc::clone(&instrument), admission);

    let ((), logs) = with_captured_logs(|| {
        for n in 0..5 {
            recorder.record(n, &[KeyValue::new("n", n as i64)]);
        }
    });

    assert_eq!(instrument.len(), 0);
    assert_eq!(logs.skipped().len(), 5);
    assert!(
        logs.skipped()
            .iter()
            .all(|e| e.field("ceiling") == Some("0"))
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Invariants
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_gate_never_reopens() {
    let admission = Arc::new(AdmissionCounter::new(3));
    let first = RecordingInstrument::<f64>::new();
    let recorder = GatedRecorder::new("first", Arc::clone(&first), Arc::clone(&admission));

    for _ in 0..10 {
        recorder.record(1.0, &[]);
    }
    assert_eq!(first.len(), 3);

    // Recorders created after exhaustion are rejected too.
    let late = RecordingInstrument::<u64>::new();
    let late_recorder = GatedRecorder::new("late", Arc::clone(&late), Arc::clone(&admission));
    for _ in 0..10 {
        late_recorder.record(1, &[]);
    }
    assert_eq!(late.len(), 0);
    assert_eq!(first.len(), 3);
    assert!(admission.is_exhausted());
}

#[test]
fn test_construction_does_not_consume_quota() {
    let admission = Arc::new(AdmissionCounter::new(1));
    let instrument = RecordingInstrument::<f64>::new();

    let recorders: Vec<_> = (0..100)
        .map(|n| {
            GatedRecorder::new(
                format!("r{n}"),
                Arc::clone(&instrument),
                Arc::clone(&admission),
            )
        })
        .collect();
    assert_eq!(admission.attempts(), 0);

    recorders[99].record(9.0, &[]);
    assert_eq!(instrument.calls(), vec![(9.0, vec![])]);
}

#[test]
fn test_admitted_path_emits_no_skip_event() {
    let admission = Arc::new(AdmissionCounter::new(10));
    let instrument = RecordingInstrument::<f64>::new();
    let recorder = GatedRecorder::new("quiet", Arc::clone(&instrument), admission);

    let ((), logs) = with_captured_logs(|| {
        for _ in 0..10 {
            recorder.record(0.0, &[]);
        }
    });

    assert_eq!(instrument.len(), 10);
    assert!(logs.skipped().is_empty());
}

#[test]
fn test_independent_counters_do_not_interfere() {
    let left = Arc::new(AdmissionCounter::new(1));
    let right = Arc::new(AdmissionCounter::new(1));
    let left_inst = RecordingInstrument::<f64>::new();
    let right_inst = RecordingInstrument::<f64>::new();
    let l = GatedRecorder::new("l", Arc::clone(&left_inst), left);
    let r = GatedRecorder::new("r", Arc::clone(&right_inst), right);

    l.record(1.0, &[]);
    l.record(1.0, &[]);
    r.record(2.0, &[]);

    assert_eq!(left_inst.len(), 1);
    assert_eq!(right_inst.len(), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Concurrency
// ─────────────────────────────────────────────────────────────────────────────

fn run_concurrent(threads: usize, per_thread: usize, ceiling: u64) -> (usize, usize) {
    let admission = Arc::new(AdmissionCounter::new(ceiling));
    let floats = RecordingInstrument::<f64>::new();
    let ints = RecordingInstrument::<i64>::new();
    let f = GatedRecorder::new("f", Arc::clone(&floats), Arc::clone(&admission));
    let i = GatedRecorder::new("i", Arc::clone(&ints), Arc::clone(&admission));

    thread::scope(|scope| {
        for t in 0..threads {
            let f = &f;
            let i = &i;
            scope.spawn(move || {
                for n in 0..per_thread {
                    let labels = [KeyValue::new("thread", t as i64)];
                    if (t + n) % 2 == 0 {
                        f.record(n as f64, &labels);
                    } else {
                        i.record(n as i64, &labels);
                    }
                }
            });
        }
    });

    assert_eq!(admission.attempts(), (threads * per_thread) as u64);
    (floats.len() + ints.len(), threads * per_thread)
}

#[test]
fn test_concurrent_records_admit_exactly_ceiling() {
    let (forwarded, total) = run_concurrent(16, 250, 200);
    assert_eq!(total, 4_000);
    assert_eq!(forwarded, 200);
}

#[test]
fn test_admitted_count_independent_of_thread_count() {
    for threads in [1, 2, 4, 8, 32] {
        let per_thread = 960 / threads;
        let (forwarded, _) = run_concurrent(threads, per_thread, 500);
        assert_eq!(forwarded, 500, "threads = {threads}");
    }
}

#[test]
fn test_concurrent_under_ceiling_forwards_everything() {
    let (forwarded, total) = run_concurrent(8, 10, 1_000);
    assert_eq!(forwarded, total);
}
