//! Metric groups derived by the QFOL analyzer.
//!
//! Every score lies in `[0.0, 1.0]`. Each group carries the instant it was
//! computed so that consumers can tell stale snapshots apart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Score used for every field when no data is available.
pub const NEUTRAL_SCORE: f64 = 0.5;

// ── Discovery Entropy Index ───────────────────────────────────────

/// Diversity and novelty of recent user queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeiMetrics {
    /// Normalized Shannon entropy of the query topic distribution.
    pub entropy_score: f64,
    /// Distinct topics divided by total topics.
    pub novelty_rate: f64,
    /// Deviation of queries from common patterns.
    pub divergence_index: f64,
    pub last_updated: DateTime<Utc>,
}

impl DeiMetrics {
    pub fn zero(now: DateTime<Utc>) -> Self {
        Self {
            entropy_score: 0.0,
            novelty_rate: 0.0,
            divergence_index: 0.0,
            last_updated: now,
        }
    }
}

// ── Holonic Intent Graph ──────────────────────────────────────────

/// How well outputs map to user intent and to the mycology domain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HigMetrics {
    pub intent_alignment: f64,
    /// Mycology keyword density of the triggering event.
    pub contextual_relevance: f64,
    pub actionable_insights: f64,
    /// Mean explicit feedback score over the window.
    pub user_satisfaction: f64,
    pub last_updated: DateTime<Utc>,
}

// ── Ethical Equilibrium Gauge ─────────────────────────────────────

/// Bias, safety, and transparency of a model output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EegMetrics {
    /// Inverted bias heuristic: 1.0 means no bias indicators were found.
    pub bias_score: f64,
    pub safety_score: f64,
    pub transparency_index: f64,
    pub ethical_compliance: f64,
    pub last_updated: DateTime<Utc>,
}

/// The full metric snapshot attached to an event or aggregated for status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct QfolMetrics {
    pub dei: DeiMetrics,
    pub hig: HigMetrics,
    pub eeg: EegMetrics,
}

impl QfolMetrics {
    /// Metrics with every score at [`NEUTRAL_SCORE`].
    pub fn neutral(now: DateTime<Utc>) -> Self {
        Self {
            dei: DeiMetrics {
                entropy_score: NEUTRAL_SCORE,
                novelty_rate: NEUTRAL_SCORE,
                divergence_index: NEUTRAL_SCORE,
                last_updated: now,
            },
            hig: HigMetrics {
                intent_alignment: NEUTRAL_SCORE,
                contextual_relevance: NEUTRAL_SCORE,
                actionable_insights: NEUTRAL_SCORE,
                user_satisfaction: NEUTRAL_SCORE,
                last_updated: now,
            },
            eeg: EegMetrics {
                bias_score: NEUTRAL_SCORE,
                safety_score: NEUTRAL_SCORE,
                transparency_index: NEUTRAL_SCORE,
                ethical_compliance: NEUTRAL_SCORE,
                last_updated: now,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_use_camel_case_fields() {
        let metrics = QfolMetrics::neutral(Utc::now());
        let json = serde_json::to_value(metrics).unwrap();
        assert_eq!(json["dei"]["entropyScore"], 0.5);
        assert_eq!(json["hig"]["userSatisfaction"], 0.5);
        assert_eq!(json["eeg"]["ethicalCompliance"], 0.5);
        assert!(json["eeg"]["lastUpdated"].is_string());
    }

    #[test]
    fn zero_dei() {
        let dei = DeiMetrics::zero(Utc::now());
        assert_eq!(dei.entropy_score, 0.0);
        assert_eq!(dei.novelty_rate, 0.0);
        assert_eq!(dei.divergence_index, 0.0);
    }
}
