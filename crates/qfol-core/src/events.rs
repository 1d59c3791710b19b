//! Interaction events ingested by the QFOL analyzer.
//!
//! The host application emits one event per query, model response, user
//! action, or feedback submission. Identity, timestamp, and metrics are
//! assigned at ingestion; callers only supply a [`NewEvent`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::QfolMetrics;

/// Unique identifier for an ingested event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "qfol_{}", self.0.simple())
    }
}

/// Kind of interaction an event records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Query,
    Response,
    Action,
    Feedback,
}

impl EventType {
    /// Parse the lowercase wire name (`query`, `response`, `action`, `feedback`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "query" => Some(Self::Query),
            "response" => Some(Self::Response),
            "action" => Some(Self::Action),
            "feedback" => Some(Self::Feedback),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Response => "response",
            Self::Action => "action",
            Self::Feedback => "feedback",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit user rating attached to an interaction.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserFeedback {
    pub helpful: bool,
    pub accurate: bool,
    pub actionable: bool,
    pub biased: bool,
}

impl UserFeedback {
    /// Satisfaction contribution in `[0.0, 1.0]`: 0.25 per positive signal,
    /// where "not biased" counts as positive.
    pub fn satisfaction(&self) -> f64 {
        [self.helpful, self.accurate, self.actionable, !self.biased]
            .iter()
            .filter(|&&signal| signal)
            .count() as f64
            * 0.25
    }
}

/// Free-form event payload. Every field is optional; absent text reads as "".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
    /// Model latency in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_feedback: Option<UserFeedback>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl EventData {
    pub fn input_text(&self) -> &str {
        self.input.as_deref().unwrap_or("")
    }

    pub fn output_text(&self) -> &str {
        self.output.as_deref().unwrap_or("")
    }

    /// The text an event is "about": its input when non-empty, otherwise its output.
    pub fn primary_text(&self) -> &str {
        match self.input_text() {
            "" => self.output_text(),
            input => input,
        }
    }
}

/// An event as submitted by the host application, before ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub data: EventData,
}

impl NewEvent {
    pub fn new(event_type: EventType, session_id: impl Into<String>, data: EventData) -> Self {
        Self {
            event_type,
            session_id: session_id.into(),
            user_id: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Convenience constructor for a query carrying `input` text.
    pub fn query(session_id: impl Into<String>, input: impl Into<String>) -> Self {
        Self::new(
            EventType::Query,
            session_id,
            EventData {
                input: Some(input.into()),
                ..Default::default()
            },
        )
    }

    /// Convenience constructor for a model response carrying `output` text.
    pub fn response(session_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self::new(
            EventType::Response,
            session_id,
            EventData {
                output: Some(output.into()),
                ..Default::default()
            },
        )
    }

    /// Convenience constructor for a feedback submission.
    pub fn feedback(session_id: impl Into<String>, feedback: UserFeedback) -> Self {
        Self::new(
            EventType::Feedback,
            session_id,
            EventData {
                user_feedback: Some(feedback),
                ..Default::default()
            },
        )
    }
}

/// A fully ingested event.
///
/// `metrics` reflects the lookback window at the moment of ingestion and is
/// never recomputed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QfolEvent {
    pub id: EventId,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub session_id: String,
    pub data: EventData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<QfolMetrics>,
}

impl QfolEvent {
    /// Materialize a submitted event with a fresh id and the given timestamp.
    /// Metrics are left unset.
    pub fn from_new(event: NewEvent, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: EventId::new(),
            timestamp,
            event_type: event.event_type,
            user_id: event.user_id,
            session_id: event.session_id,
            data: event.data,
            metrics: None,
        }
    }

    pub fn is_query(&self) -> bool {
        self.event_type == EventType::Query
    }

    pub fn is_response(&self) -> bool {
        self.event_type == EventType::Response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_wire_names() {
        let json = serde_json::to_string(&EventType::Feedback).unwrap();
        assert_eq!(json, "\"feedback\"");
        assert_eq!(EventType::parse("query"), Some(EventType::Query));
        assert_eq!(EventType::parse("Query"), None);
    }

    #[test]
    fn new_event_accepts_host_payload() {
        let raw = r#"{
            "type": "response",
            "sessionId": "s-1",
            "data": {
                "output": "Mycelium colonizes the substrate.",
                "model": "grok-2",
                "tokensUsed": 120,
                "userFeedback": {"helpful": true, "accurate": true, "actionable": false, "biased": false},
                "metadata": {"route": "/api/chat"}
            }
        }"#;

        let event: NewEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.event_type, EventType::Response);
        assert_eq!(event.session_id, "s-1");
        assert_eq!(event.data.tokens_used, Some(120));
        assert_eq!(event.data.metadata["route"], "/api/chat");
        assert!(event.data.user_feedback.unwrap().helpful);
    }

    #[test]
    fn missing_text_reads_as_empty() {
        let data = EventData::default();
        assert_eq!(data.input_text(), "");
        assert_eq!(data.output_text(), "");
        assert_eq!(data.primary_text(), "");
    }

    #[test]
    fn primary_text_prefers_input() {
        let data = EventData {
            input: Some("growing oysters".to_string()),
            output: Some("use straw".to_string()),
            ..Default::default()
        };
        assert_eq!(data.primary_text(), "growing oysters");

        let data = EventData {
            input: Some(String::new()),
            output: Some("use straw".to_string()),
            ..Default::default()
        };
        assert_eq!(data.primary_text(), "use straw");
    }

    #[test]
    fn feedback_satisfaction() {
        let all_good = UserFeedback {
            helpful: true,
            accurate: true,
            actionable: true,
            biased: false,
        };
        assert!((all_good.satisfaction() - 1.0).abs() < f64::EPSILON);

        let all_bad = UserFeedback {
            helpful: false,
            accurate: false,
            actionable: false,
            biased: true,
        };
        assert!(all_bad.satisfaction().abs() < f64::EPSILON);

        let half = UserFeedback {
            helpful: true,
            accurate: false,
            actionable: false,
            biased: false,
        };
        assert!((half.satisfaction() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn event_id_display_is_prefixed() {
        let id = EventId::new();
        let shown = id.to_string();
        assert!(shown.starts_with("qfol_"));
        assert_eq!(shown.len(), "qfol_".len() + 32);
    }
}
