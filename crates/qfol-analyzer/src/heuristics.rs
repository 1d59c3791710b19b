//! Placeholder heuristics for sub-scores that have no real signal yet.
//!
//! Divergence, intent alignment, actionable insights, and ethical compliance
//! are not derived from event content. [`RandomHeuristics`] draws uniformly
//! from fixed ranges; [`FixedHeuristics`] returns constants so results are
//! reproducible.

use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use qfol_core::QfolEvent;

use crate::metrics::QueryResponsePair;

/// Source of the sub-scores that are not computed from event text.
pub trait HeuristicProvider: Send {
    /// How far the window's queries deviate from common patterns.
    fn divergence_index(&mut self, queries: &[&QfolEvent]) -> f64;

    /// How well responses address the queries they answer. `pairs` holds
    /// each response of the window matched with the oldest unanswered query
    /// of its session.
    fn intent_alignment(&mut self, pairs: &[QueryResponsePair<'_>]) -> f64;

    /// Share of outputs in the window that led to user action.
    fn actionable_insights(&mut self, window: &[&QfolEvent]) -> f64;

    /// Compliance of the triggering event with ethical guidelines.
    fn ethical_compliance(&mut self, event: &QfolEvent) -> f64;
}

pub const DIVERGENCE_RANGE: Range<f64> = 0.1..0.9;
pub const INTENT_ALIGNMENT_RANGE: Range<f64> = 0.6..1.0;
pub const ACTIONABLE_RANGE: Range<f64> = 0.4..0.9;
pub const ETHICAL_COMPLIANCE_RANGE: Range<f64> = 0.7..1.0;

/// Uniform random draws from the default ranges.
#[derive(Debug)]
pub struct RandomHeuristics {
    rng: StdRng,
}

impl RandomHeuristics {
    /// Seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(),
        }
    }
}

impl Default for RandomHeuristics {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicProvider for RandomHeuristics {
    fn divergence_index(&mut self, _queries: &[&QfolEvent]) -> f64 {
        self.rng.gen_range(DIVERGENCE_RANGE)
    }

    fn intent_alignment(&mut self, _pairs: &[QueryResponsePair<'_>]) -> f64 {
        self.rng.gen_range(INTENT_ALIGNMENT_RANGE)
    }

    fn actionable_insights(&mut self, _window: &[&QfolEvent]) -> f64 {
        self.rng.gen_range(ACTIONABLE_RANGE)
    }

    fn ethical_compliance(&mut self, _event: &QfolEvent) -> f64 {
        self.rng.gen_range(ETHICAL_COMPLIANCE_RANGE)
    }
}

/// Constant sub-scores. Defaults sit at the midpoint of each default range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedHeuristics {
    pub divergence_index: f64,
    pub intent_alignment: f64,
    pub actionable_insights: f64,
    pub ethical_compliance: f64,
}

impl Default for FixedHeuristics {
    fn default() -> Self {
        Self {
            divergence_index: 0.5,
            intent_alignment: 0.8,
            actionable_insights: 0.65,
            ethical_compliance: 0.85,
        }
    }
}

impl HeuristicProvider for FixedHeuristics {
    fn divergence_index(&mut self, _queries: &[&QfolEvent]) -> f64 {
        self.divergence_index
    }

    fn intent_alignment(&mut self, _pairs: &[QueryResponsePair<'_>]) -> f64 {
        self.intent_alignment
    }

    fn actionable_insights(&mut self, _window: &[&QfolEvent]) -> f64 {
        self.actionable_insights
    }

    fn ethical_compliance(&mut self, _event: &QfolEvent) -> f64 {
        self.ethical_compliance
    }
}
