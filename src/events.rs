//! Notification Events
//!
//! The controller emits three structured notifications - Opened, Claimed,
//! Swept - for external observers (indexers, front-ends, log aggregation).
//! No core logic depends on delivery: sinks must not fail the operation
//! that emitted the event.

use std::sync::Mutex;

use serde::Serialize;
use tracing::info;

use crate::types::Identity;

/// Structured distributor notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DropEvent {
    /// Distribution funded and opened
    Opened {
        /// Commitment root, hex encoded
        commitment: String,
        amount: u64,
        timestamp: i64,
    },
    /// A recipient extracted its allotment
    Claimed { identity: Identity, amount: u64 },
    /// Residue returned to the operating role
    Swept { destination: Identity, amount: u64 },
}

/// Event sink interface. Implementations must be infallible from the
/// controller's point of view.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DropEvent);
}

/// Production sink: serializes each event into the structured log stream
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: DropEvent) {
        let payload = serde_json::to_string(&event).unwrap_or_else(|_| format!("{:?}", event));
        info!(target: "zdrop::events", %payload, "distributor event");
    }
}

/// Test sink collecting events in memory
#[derive(Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<DropEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn events(&self) -> Vec<DropEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: DropEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
