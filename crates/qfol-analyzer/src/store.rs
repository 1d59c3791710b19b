//! Event storage — trait + in-memory implementation.
//!
//! The analyzer keeps its history in process memory only. Events are stored
//! in arrival order and are never modified once appended.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use qfol_core::QfolEvent;

/// Trait for event retention backends.
pub trait EventStore: Send {
    /// Append a fully populated event at the end of the log.
    fn append(&mut self, event: QfolEvent);

    /// Borrowed view of the events with `timestamp >= cutoff`, in insertion
    /// order.
    fn window(&self, cutoff: DateTime<Utc>) -> Vec<&QfolEvent>;

    /// Owned copies of [`EventStore::window`].
    fn since(&self, cutoff: DateTime<Utc>) -> Vec<QfolEvent> {
        self.window(cutoff).into_iter().cloned().collect()
    }

    /// Timestamp of the most recently appended event.
    fn last_timestamp(&self) -> Option<DateTime<Utc>>;

    /// Number of retained events.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Append-only in-memory event log.
///
/// Without a capacity the log grows for the life of the process: nothing is
/// ever evicted, so long-running hosts should set `max_events`. With a
/// capacity, the oldest event is dropped once the log is full.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: VecDeque<QfolEvent>,
    capacity: Option<usize>,
}

impl InMemoryEventStore {
    /// Unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that retains at most `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(4096)),
            capacity: Some(capacity.max(1)),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

impl EventStore for InMemoryEventStore {
    fn append(&mut self, event: QfolEvent) {
        if let Some(capacity) = self.capacity {
            while self.events.len() >= capacity {
                if let Some(evicted) = self.events.pop_front() {
                    tracing::debug!(
                        event_id = %evicted.id,
                        capacity,
                        "Evicted oldest event"
                    );
                }
            }
        }
        self.events.push_back(event);
    }

    fn window(&self, cutoff: DateTime<Utc>) -> Vec<&QfolEvent> {
        self.events
            .iter()
            .filter(|e| e.timestamp >= cutoff)
            .collect()
    }

    fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.events.back().map(|e| e.timestamp)
    }

    fn len(&self) -> usize {
        self.events.len()
    }
}
