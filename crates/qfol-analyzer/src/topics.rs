//! Topic classification for mycology queries.
//!
//! Classification walks an ordered rule table and returns the first topic
//! whose keywords appear in the event text. The order is significant: a
//! query mentioning both "substrate" and "contamination" is `Substrates`.

use serde::{Deserialize, Serialize};

use qfol_core::QfolEvent;

/// A mycology topic label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Cultivation,
    Identification,
    Substrates,
    Contamination,
    Harvesting,
    General,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cultivation => "cultivation",
            Self::Identification => "identification",
            Self::Substrates => "substrates",
            Self::Contamination => "contamination",
            Self::Harvesting => "harvesting",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the classification table.
#[derive(Debug, Clone, Copy)]
pub struct TopicRule {
    pub topic: Topic,
    pub keywords: &'static [&'static str],
}

/// Rules in evaluation order. `General` is the fallback and has no entry.
pub const TOPIC_RULES: &[TopicRule] = &[
    TopicRule {
        topic: Topic::Cultivation,
        keywords: &["cultivation", "growing"],
    },
    TopicRule {
        topic: Topic::Identification,
        keywords: &["identification", "species"],
    },
    TopicRule {
        topic: Topic::Substrates,
        keywords: &["substrate", "medium"],
    },
    TopicRule {
        topic: Topic::Contamination,
        keywords: &["contamination", "sterile"],
    },
    TopicRule {
        topic: Topic::Harvesting,
        keywords: &["harvest", "yield"],
    },
];

/// Classify free text. Matching is case-insensitive substring search.
pub fn classify_text(text: &str) -> Topic {
    let lowered = text.to_lowercase();
    TOPIC_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|rule| rule.topic)
        .unwrap_or(Topic::General)
}

/// Classify an event by its input, falling back to its output when the
/// input is empty.
pub fn extract_topic(event: &QfolEvent) -> Topic {
    classify_text(event.data.primary_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_rule_matches_its_keywords() {
        assert_eq!(classify_text("Tips for growing lion's mane"), Topic::Cultivation);
        assert_eq!(classify_text("Which species is this?"), Topic::Identification);
        assert_eq!(classify_text("best medium for oysters"), Topic::Substrates);
        assert_eq!(classify_text("keeping the hood sterile"), Topic::Contamination);
        assert_eq!(classify_text("when to harvest shiitake"), Topic::Harvesting);
        assert_eq!(classify_text("hello there"), Topic::General);
    }

    #[test]
    fn first_rule_wins() {
        assert_eq!(
            classify_text("How do I prevent contamination in my substrate?"),
            Topic::Substrates
        );
        assert_eq!(
            classify_text("cultivation yield of different species"),
            Topic::Cultivation
        );
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(classify_text("CONTAMINATION everywhere"), Topic::Contamination);
    }

    #[test]
    fn empty_text_is_general() {
        assert_eq!(classify_text(""), Topic::General);
    }

    #[test]
    fn rule_order_is_fixed() {
        let order: Vec<Topic> = TOPIC_RULES.iter().map(|r| r.topic).collect();
        assert_eq!(
            order,
            vec![
                Topic::Cultivation,
                Topic::Identification,
                Topic::Substrates,
                Topic::Contamination,
                Topic::Harvesting,
            ]
        );
    }
}
