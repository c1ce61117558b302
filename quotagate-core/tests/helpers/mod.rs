//! Shared test doubles for quota gate integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use opentelemetry::KeyValue;
use parking_lot::Mutex;
use quotagate_core::{LabeledRecord, Measurement};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

// ─────────────────────────────────────────────────────────────────────────────
// Recording Instrument
// ─────────────────────────────────────────────────────────────────────────────

/// Instrument double that keeps every forwarded observation.
pub struct RecordingInstrument<V> {
    calls: Mutex<Vec<(V, Vec<KeyValue>)>>,
}

impl<V> RecordingInstrument<V> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<V: Clone> RecordingInstrument<V> {
    pub fn calls(&self) -> Vec<(V, Vec<KeyValue>)> {
        self.calls.lock().clone()
    }
}

impl<V: Measurement> LabeledRecord for RecordingInstrument<V> {
    type Value = V;

    fn record(&self, value: V, labels: &[KeyValue]) {
        self.calls.lock().push((value, labels.to_vec()));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Log Capture
// ─────────────────────────────────────────────────────────────────────────────

/// A captured tracing event.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Tracing layer that stores every event it sees.
#[derive(Clone, Default)]
pub struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureLayer {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().clone()
    }

    /// Events whose message marks a skipped recording.
    pub fn skipped(&self) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| {
                e.field("message")
                    .is_some_and(|m| m.contains("skipping metric recording"))
            })
            .collect()
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events.lock().push(CapturedEvent {
            level: *event.metadata().level(),
            fields: visitor.0,
        });
    }
}

#[derive(Default)]
struct FieldVisitor(BTreeMap<String, String>);

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

/// Run `f` with a capturing subscriber installed on this thread.
pub fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, CaptureLayer) {
    use tracing_subscriber::layer::SubscriberExt;

    let layer = CaptureLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, layer)
}
