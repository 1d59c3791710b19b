//! qfol-analyzer: Quantum-Fractal Operating Loop scoring for assistant interactions.
//!
//! Ingests query, response, action, and feedback events from the host
//! application, attaches Discovery Entropy (DEI), Holonic Intent (HIG), and
//! Ethical Equilibrium (EEG) metrics at ingestion time, and derives a health
//! status and a deployment gate from the recent window.
//!
//! ```
//! use qfol_analyzer::heuristics::FixedHeuristics;
//! use qfol_analyzer::store::InMemoryEventStore;
//! use qfol_analyzer::QfolAnalyzer;
//! use qfol_core::{NewEvent, QfolConfig};
//!
//! let analyzer = QfolAnalyzer::with_parts(
//!     QfolConfig::default(),
//!     InMemoryEventStore::new(),
//!     FixedHeuristics::default(),
//! );
//! let event = analyzer.log_event(NewEvent::response(
//!     "session-1",
//!     "Some Amanita species are toxic; consult an expert before foraging.",
//! ));
//! assert_eq!(event.metrics.unwrap().eeg.safety_score, 0.9);
//! assert!(!analyzer.should_gate_deployment().gate);
//! ```

pub mod error;
pub mod heuristics;
pub mod metrics;
pub mod replay;
pub mod report;
pub mod status;
pub mod store;
pub mod topics;

pub use error::AnalyzerError;
pub use status::{GateDecision, HealthStatus, StatusSnapshot};

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use qfol_core::{NewEvent, QfolConfig, QfolEvent};

use crate::heuristics::{HeuristicProvider, RandomHeuristics};
use crate::store::{EventStore, InMemoryEventStore};

struct Inner<S, H> {
    store: S,
    heuristics: H,
}

/// The QFOL analyzer.
///
/// Owned by the host's composition root; share it with `Arc` when several
/// threads log events. All operations run to completion under one lock.
pub struct QfolAnalyzer<S = InMemoryEventStore, H = RandomHeuristics> {
    config: QfolConfig,
    inner: Mutex<Inner<S, H>>,
}

impl QfolAnalyzer {
    /// Analyzer with an in-memory store and the randomized placeholder
    /// heuristics, both configured from `config`.
    pub fn new(config: QfolConfig) -> Self {
        let store = match config.max_events {
            Some(capacity) => InMemoryEventStore::with_capacity(capacity),
            None => InMemoryEventStore::new(),
        };
        let heuristics = RandomHeuristics::from_seed(config.heuristic_seed);
        Self::with_parts(config, store, heuristics)
    }
}

impl Default for QfolAnalyzer {
    fn default() -> Self {
        Self::new(QfolConfig::default())
    }
}

impl<S: EventStore, H: HeuristicProvider> QfolAnalyzer<S, H> {
    pub fn with_parts(config: QfolConfig, store: S, heuristics: H) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner { store, heuristics }),
        }
    }

    pub fn config(&self) -> &QfolConfig {
        &self.config
    }


    /// Operations never leave the store half-written, so a poisoned lock
    /// still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Inner<S, H>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ingest an event: assign id and timestamp, compute metrics over the
    /// lookback window including this event, then append it.
    pub fn log_event(&self, new_event: NewEvent) -> QfolEvent {
        let mut guard = self.lock();
        let Inner { store, heuristics } = &mut *guard;

        // Keep arrival order monotonic even if the wall clock steps back.
        let now = Utc::now();
        let timestamp = match store.last_timestamp() {
            Some(last) if last > now => last,
            _ => now,
        };

        let mut event = QfolEvent::from_new(new_event, timestamp);
        let mut window = store.window(window_start(timestamp, self.config.lookback_hours));
        window.push(&event);
        let window_size = window.len();

        let metrics = metrics::compute_metrics(&event, &window, heuristics, timestamp);
        drop(window);
        event.metrics = Some(metrics);
        store.append(event.clone());

        tracing::debug!(
            event_id = %event.id,
            event_type = %event.event_type,
            session_id = %event.session_id,
            window_size,
            entropy = metrics.dei.entropy_score,
            safety = metrics.eeg.safety_score,
            "Event logged"
        );

        event
    }

    /// Events logged within the last `hours` hours, in arrival order.
    pub fn recent_events(&self, hours: u32) -> Vec<QfolEvent> {
        self.recent_events_at(Utc::now(), hours)
    }

    fn recent_events_at(&self, now: DateTime<Utc>, hours: u32) -> Vec<QfolEvent> {
        self.lock().store.since(window_start(now, hours))
    }

    /// Aggregate the lookback window into a status snapshot.
    pub fn current_status(&self) -> StatusSnapshot {
        let now = Utc::now();
        let window = self.recent_events_at(now, self.config.lookback_hours);
        let snapshot = status::evaluate(&window, &self.config.thresholds, now);

        tracing::debug!(
            status = ?snapshot.status,
            window_size = window.len(),
            recommendations = snapshot.recommendations.len(),
            "QFOL status evaluated"
        );

        snapshot
    }

    /// Decide whether a release should be blocked on the current EEG scores.
    pub fn should_gate_deployment(&self) -> GateDecision {
        let snapshot = self.current_status();
        let decision = status::gate(&snapshot.metrics, &self.config.thresholds);

        match &decision.reason {
            Some(reason) => tracing::warn!(%reason, "Deployment gated"),
            None => tracing::info!("Deployment gate open"),
        }

        decision
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Start of an `hours`-long window ending at `now`. Windows reaching past
/// the representable range cover the whole history.
fn window_start(now: DateTime<Utc>, hours: u32) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::hours(i64::from(hours)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
