//! Status classification, recommendations, and the deployment gate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use qfol_core::{DeiMetrics, EegMetrics, HigMetrics, QfolEvent, QfolMetrics, Thresholds};

pub const EMPTY_WINDOW_RECOMMENDATION: &str = "Start using the system to generate QFOL metrics";
pub const LOW_ENTROPY_RECOMMENDATION: &str = "Encourage more diverse query exploration";
pub const LOW_ALIGNMENT_RECOMMENDATION: &str = "Improve response relevance to user intents";
pub const LOW_ETHICS_RECOMMENDATION: &str = "Review and improve ethical compliance measures";
pub const OPTIMAL_RECOMMENDATION: &str = "QFOL metrics are optimal - continue current practices";

/// Overall health tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Optimal,
    Warning,
    Critical,
}

/// Aggregated view of the recent window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusSnapshot {
    pub status: HealthStatus,
    pub metrics: QfolMetrics,
    pub recommendations: Vec<String>,
}

/// Outcome of the deployment gate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GateDecision {
    pub gate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl GateDecision {
    pub fn open() -> Self {
        Self {
            gate: false,
            reason: None,
        }
    }

    pub fn closed(reason: String) -> Self {
        Self {
            gate: true,
            reason: Some(reason),
        }
    }
}

/// Mean of the metrics attached to `events`. Events without metrics are
/// skipped; if none carry metrics the neutral snapshot is returned.
pub fn aggregate_metrics(events: &[QfolEvent], now: DateTime<Utc>) -> QfolMetrics {
    let attached: Vec<&QfolMetrics> = events.iter().filter_map(|e| e.metrics.as_ref()).collect();
    if attached.is_empty() {
        return QfolMetrics::neutral(now);
    }

    let n = attached.len() as f64;
    let mean = |f: fn(&QfolMetrics) -> f64| attached.iter().map(|m| f(m)).sum::<f64>() / n;

    QfolMetrics {
        dei: DeiMetrics {
            entropy_score: mean(|m| m.dei.entropy_score),
            novelty_rate: mean(|m| m.dei.novelty_rate),
            divergence_index: mean(|m| m.dei.divergence_index),
            last_updated: now,
        },
        hig: HigMetrics {
            intent_alignment: mean(|m| m.hig.intent_alignment),
            contextual_relevance: mean(|m| m.hig.contextual_relevance),
            actionable_insights: mean(|m| m.hig.actionable_insights),
            user_satisfaction: mean(|m| m.hig.user_satisfaction),
            last_updated: now,
        },
        eeg: EegMetrics {
            bias_score: mean(|m| m.eeg.bias_score),
            safety_score: mean(|m| m.eeg.safety_score),
            transparency_index: mean(|m| m.eeg.transparency_index),
            ethical_compliance: mean(|m| m.eeg.ethical_compliance),
            last_updated: now,
        },
    }
}

/// Critical on ethics or safety, warning on entropy or alignment.
pub fn classify(metrics: &QfolMetrics, thresholds: &Thresholds) -> HealthStatus {
    if metrics.eeg.ethical_compliance < thresholds.ethical_compliance
        || metrics.eeg.safety_score < thresholds.safety
    {
        return HealthStatus::Critical;
    }

    if metrics.dei.entropy_score < thresholds.entropy
        || metrics.hig.intent_alignment < thresholds.alignment
    {
        return HealthStatus::Warning;
    }

    HealthStatus::Optimal
}

/// One recommendation per breached threshold, in fixed order.
pub fn recommendations(metrics: &QfolMetrics, thresholds: &Thresholds) -> Vec<String> {
    let mut out = Vec::new();

    if metrics.dei.entropy_score < thresholds.entropy {
        out.push(LOW_ENTROPY_RECOMMENDATION.to_string());
    }
    if metrics.hig.intent_alignment < thresholds.alignment {
        out.push(LOW_ALIGNMENT_RECOMMENDATION.to_string());
    }
    if metrics.eeg.ethical_compliance < thresholds.ethical_compliance {
        out.push(LOW_ETHICS_RECOMMENDATION.to_string());
    }

    if out.is_empty() {
        out.push(OPTIMAL_RECOMMENDATION.to_string());
    }
    out
}

/// Build the snapshot for a window. An empty window is reported as optimal.
pub fn evaluate(events: &[QfolEvent], thresholds: &Thresholds, now: DateTime<Utc>) -> StatusSnapshot {
    if events.is_empty() {
        return StatusSnapshot {
            status: HealthStatus::Optimal,
            metrics: QfolMetrics::neutral(now),
            recommendations: vec![EMPTY_WINDOW_RECOMMENDATION.to_string()],
        };
    }

    let metrics = aggregate_metrics(events, now);
    StatusSnapshot {
        status: classify(&metrics, thresholds),
        recommendations: recommendations(&metrics, thresholds),
        metrics,
    }
}

/// Close the gate on low ethical compliance, else on low safety.
/// The ethical check runs first and only one reason is reported.
pub fn gate(metrics: &QfolMetrics, thresholds: &Thresholds) -> GateDecision {
    let eeg = &metrics.eeg;

    if eeg.ethical_compliance < thresholds.ethical_compliance {
        return GateDecision::closed(format!(
            "Ethical compliance score {:.3} below threshold {}",
            eeg.ethical_compliance, thresholds.ethical_compliance
        ));
    }

    if eeg.safety_score < thresholds.safety {
        return GateDecision::closed(format!(
            "Safety score {:.3} below threshold {}",
            eeg.safety_score, thresholds.safety
        ));
    }

    GateDecision::open()
}

#[cfg(test)]
mod tests {
    use super::*;
    use qfol_core::NewEvent;

    /// Metrics where every threshold is comfortably met.
    fn healthy() -> QfolMetrics {
        let mut m = QfolMetrics::neutral(Utc::now());
        m.dei.entropy_score = 0.9;
        m.hig.intent_alignment = 0.9;
        m.eeg.ethical_compliance = 0.9;
        m.eeg.safety_score = 0.9;
        m
    }

    #[test]
    fn test_healthy_is_optimal() {
        let t = Thresholds::default();
        let m = healthy();
        assert_eq!(classify(&m, &t), HealthStatus::Optimal);
        assert_eq!(recommendations(&m, &t), vec![OPTIMAL_RECOMMENDATION]);
        assert_eq!(gate(&m, &t), GateDecision::open());
    }

    #[test]
    fn test_low_entropy_is_warning() {
        let t = Thresholds::default();
        let mut m = healthy();
        m.dei.entropy_score = 0.4;
        assert_eq!(classify(&m, &t), HealthStatus::Warning);
        assert_eq!(recommendations(&m, &t), vec![LOW_ENTROPY_RECOMMENDATION]);
    }

    #[test]
    fn test_low_safety_is_critical_without_ethics_recommendation() {
        let t = Thresholds::default();
        let mut m = healthy();
        m.eeg.safety_score = 0.3;
        assert_eq!(classify(&m, &t), HealthStatus::Critical);
        assert_eq!(recommendations(&m, &t), vec![OPTIMAL_RECOMMENDATION]);
    }

    #[test]
    fn test_recommendations_keep_fixed_order() {
        let t = Thresholds::default();
        let mut m = healthy();
        m.eeg.ethical_compliance = 0.1;
        m.hig.intent_alignment = 0.1;
        m.dei.entropy_score = 0.1;
        assert_eq!(
            recommendations(&m, &t),
            vec![
                LOW_ENTROPY_RECOMMENDATION,
                LOW_ALIGNMENT_RECOMMENDATION,
                LOW_ETHICS_RECOMMENDATION,
            ]
        );
    }

    #[test]
    fn test_gate_checks_ethics_first() {
        let t = Thresholds::default();
        let mut m = healthy();
        m.eeg.ethical_compliance = 0.5;
        m.eeg.safety_score = 0.1;
        let decision = gate(&m, &t);
        assert!(decision.gate);
        assert!(decision.reason.unwrap().starts_with("Ethical compliance score 0.500"));
    }

    #[test]
    fn test_gate_on_safety() {
        let t = Thresholds::default();
        let mut m = healthy();
        m.eeg.safety_score = 0.7;
        let decision = gate(&m, &t);
        assert!(decision.gate);
        assert!(decision.reason.unwrap().starts_with("Safety score"));
    }

    #[test]
    fn test_thresholds_are_configurable() {
        let strict = Thresholds {
            entropy: 0.95,
            ..Default::default()
        };
        assert_eq!(classify(&healthy(), &strict), HealthStatus::Warning);
    }

    #[test]
    fn test_evaluate_empty_window() {
        let snapshot = evaluate(&[], &Thresholds::default(), Utc::now());
        assert_eq!(snapshot.status, HealthStatus::Optimal);
        assert_eq!(snapshot.recommendations, vec![EMPTY_WINDOW_RECOMMENDATION]);
        assert_eq!(snapshot.metrics.eeg.safety_score, 0.5);
    }

    #[test]
    fn test_aggregate_averages_and_skips_unscored() {
        let now = Utc::now();
        let mut a = QfolEvent::from_new(NewEvent::query("s", "a"), now);
        let mut b = QfolEvent::from_new(NewEvent::query("s", "b"), now);
        let c = QfolEvent::from_new(NewEvent::query("s", "c"), now);

        let mut ma = healthy();
        ma.eeg.safety_score = 1.0;
        let mut mb = healthy();
        mb.eeg.safety_score = 0.5;
        a.metrics = Some(ma);
        b.metrics = Some(mb);

        let agg = aggregate_metrics(&[a, b, c], now);
        assert!((agg.eeg.safety_score - 0.75).abs() < 1e-9);
        assert!((agg.dei.entropy_score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_unscored_window_falls_back_to_neutral() {
        let now = Utc::now();
        let unscored = QfolEvent::from_new(NewEvent::query("s", "a"), now);
        let snapshot = evaluate(&[unscored], &Thresholds::default(), now);
        assert_eq!(snapshot.metrics, QfolMetrics::neutral(now));
        assert_eq!(snapshot.status, HealthStatus::Critical);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Warning).unwrap(),
            "\"warning\""
        );
    }
}
