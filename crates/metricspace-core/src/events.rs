//! Analytics event sinks.
//!
//! Core code reports what happened through an [`EventSink`] and never waits
//! on, or fails because of, the sink. Use [`emit_best_effort`] at call sites.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::Result;

/// Event attributes, keyed by attribute name.
pub type EventAttrs = BTreeMap<String, serde_json::Value>;

/// Builds [`EventAttrs`] from `(name, value)` pairs.
pub fn attrs<I, K, V>(pairs: I) -> EventAttrs
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Destination for analytics events.
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    fn emit(&self, name: &str, attrs: &EventAttrs) -> Result<()>;
}

/// Emits through `sink`, logging and discarding any failure.
pub fn emit_best_effort(sink: &dyn EventSink, name: &str, attrs: &EventAttrs) {
    if let Err(e) = sink.emit(name, attrs) {
        tracing::warn!(event = name, error = %e, "Dropping analytics event");
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _name: &str, _attrs: &EventAttrs) -> Result<()> {
        Ok(())
    }
}

/// Logs every event at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, name: &str, attrs: &EventAttrs) -> Result<()> {
        let rendered = serde_json::to_string(attrs)?;
        tracing::info!(target: "metricspace::analytics", event = name, attrs = %rendered);
        Ok(())
    }
}

/// A recorded event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Event name.
    pub name: String,
    /// Event attributes.
    pub attrs: EventAttrs,
}

/// Keeps every event in memory, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All events received so far, oldest first.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Events with the given name, oldest first.
    pub fn named(&self, name: &str) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.name == name)
            .collect()
    }

    /// The most recent event with the given name.
    pub fn last(&self, name: &str) -> Option<Event> {
        self.named(name).pop()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, name: &str, attrs: &EventAttrs) -> Result<()> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Event {
                name: name.to_string(),
                attrs: attrs.clone(),
            });
        Ok(())
    }
}
