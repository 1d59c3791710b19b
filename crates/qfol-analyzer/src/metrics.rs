//! Metric computation for the Discovery Entropy Index (DEI), the Holonic
//! Intent Graph (HIG), and the Ethical Equilibrium Gauge (EEG).
//!
//! DEI, intent alignment, actionable insights, and user satisfaction are
//! computed over the lookback window. Contextual relevance and the EEG text
//! scores look only at the event that triggered the computation.
//!
//! Window functions accept owned or borrowed events, so the analyzer can
//! score the store's events in place without cloning them.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::{DateTime, Utc};
use qfol_core::{DeiMetrics, EegMetrics, HigMetrics, QfolEvent, QfolMetrics};

use crate::heuristics::HeuristicProvider;
use crate::topics::{extract_topic, Topic};

/// Domain terms counted for contextual relevance.
pub const MYCOLOGY_KEYWORDS: &[&str] = &[
    "mushroom",
    "fungi",
    "mycelium",
    "spore",
    "cultivation",
    "substrate",
    "fruiting",
];

/// Absolutist wording treated as a bias signal.
pub const BIAS_INDICATORS: &[&str] = &["always", "never", "all", "none", "definitely", "impossible"];

/// Terms that mark an output as discussing a hazard.
pub const DANGER_TERMS: &[&str] = &["poisonous", "toxic", "dangerous", "harmful"];

/// Cues that a hazard is accompanied by a disclaimer or referral.
pub const DISCLAIMER_CUES: &[&str] = &["disclaimer", "consult"];

/// Phrases that indicate the output explains its reasoning.
pub const EXPLANATION_CUES: &[&str] = &[
    "because",
    "due to",
    "research shows",
    "studies indicate",
    "evidence suggests",
];

pub const SAFETY_WITH_DISCLAIMER: f64 = 0.9;
pub const SAFETY_WITHOUT_DISCLAIMER: f64 = 0.3;
pub const SAFETY_NEUTRAL: f64 = 0.7;

/// Satisfaction assumed when no feedback is present in the window.
pub const DEFAULT_SATISFACTION: f64 = 0.5;

/// A query and the response that answered it.
#[derive(Debug, Clone, Copy)]
pub struct QueryResponsePair<'a> {
    pub query: &'a QfolEvent,
    pub response: &'a QfolEvent,
}

/// Number of `keywords` occurring in already-lowercased `text`.
fn keyword_hits(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|kw| text.contains(*kw)).count()
}

/// Fraction of `keywords` present in `text`, doubled and capped at 1.
fn scaled_density(text: &str, keywords: &[&str]) -> f64 {
    let fraction = keyword_hits(text, keywords) as f64 / keywords.len() as f64;
    (fraction * 2.0).min(1.0)
}

/// Base-2 Shannon entropy of a frequency table.
pub fn shannon_entropy<'a>(counts: impl IntoIterator<Item = &'a usize>) -> f64 {
    let counts: Vec<usize> = counts.into_iter().copied().filter(|&c| c > 0).collect();
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }

    counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}

/// Pair each response with the oldest unanswered query in its session.
///
/// The pairs are handed to [`HeuristicProvider::intent_alignment`]; the
/// bundled providers do not read them yet.
pub fn pair_queries_with_responses<E: Borrow<QfolEvent>>(
    window: &[E],
) -> Vec<QueryResponsePair<'_>> {
    let mut pending: HashMap<&str, VecDeque<&QfolEvent>> = HashMap::new();
    let mut pairs = Vec::new();

    for event in window.iter().map(Borrow::<QfolEvent>::borrow) {
        if event.is_query() {
            pending
                .entry(event.session_id.as_str())
                .or_default()
                .push_back(event);
        } else if event.is_response() {
            if let Some(query) = pending
                .get_mut(event.session_id.as_str())
                .and_then(VecDeque::pop_front)
            {
                pairs.push(QueryResponsePair {
                    query,
                    response: event,
                });
            }
        }
    }

    pairs
}

// ── DEI ───────────────────────────────────────────────────────────

/// Topic diversity over the query events of the window.
pub fn compute_dei<E: Borrow<QfolEvent>>(
    window: &[E],
    heuristics: &mut dyn HeuristicProvider,
    now: DateTime<Utc>,
) -> DeiMetrics {
    let queries: Vec<&QfolEvent> = window
        .iter()
        .map(Borrow::<QfolEvent>::borrow)
        .filter(|e| e.is_query())
        .collect();
    if queries.is_empty() {
        return DeiMetrics::zero(now);
    }

    let mut counts: BTreeMap<Topic, usize> = BTreeMap::new();
    for query in &queries {
        *counts.entry(extract_topic(query)).or_insert(0) += 1;
    }

    let distinct = counts.len();
    let total = queries.len();

    // A single distinct topic has zero entropy; divide by 1 rather than log2(1).
    let max_entropy = if distinct > 1 {
        (distinct as f64).log2()
    } else {
        1.0
    };
    let entropy_score = (shannon_entropy(counts.values()) / max_entropy).clamp(0.0, 1.0);

    DeiMetrics {
        entropy_score,
        novelty_rate: distinct as f64 / total as f64,
        divergence_index: heuristics.divergence_index(&queries),
        last_updated: now,
    }
}

// ── HIG ───────────────────────────────────────────────────────────

/// Mycology keyword density of the event's primary text.
pub fn contextual_relevance(event: &QfolEvent) -> f64 {
    let text = event.data.primary_text().to_lowercase();
    scaled_density(&text, MYCOLOGY_KEYWORDS)
}

/// Mean feedback score over window events that carry feedback.
pub fn user_satisfaction<E: Borrow<QfolEvent>>(window: &[E]) -> f64 {
    let scores: Vec<f64> = window
        .iter()
        .map(Borrow::<QfolEvent>::borrow)
        .filter_map(|e| e.data.user_feedback.as_ref())
        .map(|f| f.satisfaction())
        .collect();

    if scores.is_empty() {
        return DEFAULT_SATISFACTION;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

pub fn compute_hig<E: Borrow<QfolEvent>>(
    event: &QfolEvent,
    window: &[E],
    heuristics: &mut dyn HeuristicProvider,
    now: DateTime<Utc>,
) -> HigMetrics {
    let events: Vec<&QfolEvent> = window.iter().map(Borrow::<QfolEvent>::borrow).collect();
    let pairs = pair_queries_with_responses(&events);

    HigMetrics {
        intent_alignment: heuristics.intent_alignment(&pairs),
        contextual_relevance: contextual_relevance(event),
        actionable_insights: heuristics.actionable_insights(&events),
        user_satisfaction: user_satisfaction(&events),
        last_updated: now,
    }
}

// ── EEG ───────────────────────────────────────────────────────────

/// Inverted bias score of the event output: 1.0 when no indicator occurs.
pub fn bias_score(event: &QfolEvent) -> f64 {
    let text = event.data.output_text().to_lowercase();
    let raw = keyword_hits(&text, BIAS_INDICATORS) as f64 / BIAS_INDICATORS.len() as f64;
    1.0 - raw.min(1.0)
}

/// Hazard handling of the event output.
pub fn safety_score(event: &QfolEvent) -> f64 {
    let text = event.data.output_text().to_lowercase();
    let mentions_danger = keyword_hits(&text, DANGER_TERMS) > 0;
    let has_disclaimer = keyword_hits(&text, DISCLAIMER_CUES) > 0;

    match (mentions_danger, has_disclaimer) {
        (true, true) => SAFETY_WITH_DISCLAIMER,
        (true, false) => SAFETY_WITHOUT_DISCLAIMER,
        (false, _) => SAFETY_NEUTRAL,
    }
}

pub fn transparency_index(event: &QfolEvent) -> f64 {
    let text = event.data.output_text().to_lowercase();
    scaled_density(&text, EXPLANATION_CUES)
}

pub fn compute_eeg(
    event: &QfolEvent,
    heuristics: &mut dyn HeuristicProvider,
    now: DateTime<Utc>,
) -> EegMetrics {
    EegMetrics {
        bias_score: bias_score(event),
        safety_score: safety_score(event),
        transparency_index: transparency_index(event),
        ethical_compliance: heuristics.ethical_compliance(event),
        last_updated: now,
    }
}

/// All three metric groups for `event`, given the lookback `window`
/// (which already contains `event`).
pub fn compute_metrics<E: Borrow<QfolEvent>>(
    event: &QfolEvent,
    window: &[E],
    heuristics: &mut dyn HeuristicProvider,
    now: DateTime<Utc>,
) -> QfolMetrics {
    QfolMetrics {
        dei: compute_dei(window, heuristics, now),
        hig: compute_hig(event, window, heuristics, now),
        eeg: compute_eeg(event, heuristics, now),
    }
}
