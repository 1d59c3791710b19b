//! Monitoring views over the analyzer and validation of inbound event payloads.
//!
//! Three read views are available: the full status report, the deployment
//! check, and a metrics-only snapshot. Inbound events arrive loosely typed
//! (e.g. decoded from a JSON request body) and are validated into a
//! [`NewEvent`] before ingestion.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use qfol_core::{EventData, EventType, NewEvent, QfolMetrics};

use crate::error::{AnalyzerError, Result};
use crate::heuristics::HeuristicProvider;
use crate::status::StatusSnapshot;
use crate::store::EventStore;
use crate::QfolAnalyzer;

/// Which view to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportAction {
    #[default]
    Status,
    GateCheck,
    MetricsOnly,
}

impl FromStr for ReportAction {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "status" => Ok(Self::Status),
            "gate-check" => Ok(Self::GateCheck),
            "metrics-only" => Ok(Self::MetricsOnly),
            other => Err(AnalyzerError::InvalidAction {
                action: other.to_string(),
            }),
        }
    }
}

/// Status snapshot plus reporting metadata.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    #[serde(flatten)]
    pub snapshot: StatusSnapshot,
    pub timestamp: DateTime<Utc>,
    pub system: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentCheck {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentReport {
    pub deployment: DeploymentCheck,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub metrics: QfolMetrics,
    pub timestamp: DateTime<Utc>,
}

/// A rendered view.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Report {
    Status(StatusReport),
    Deployment(DeploymentReport),
    Metrics(MetricsReport),
}

/// Loosely-typed event payload as received from the host application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    #[serde(default, rename = "type")]
    pub event_type: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub data: Option<EventData>,
}

impl EventRequest {
    /// Require a non-empty `type` and `sessionId`; a missing `data` becomes empty.
    pub fn validate(self) -> Result<NewEvent> {
        let event_type = self.event_type.filter(|t| !t.is_empty());
        let session_id = self.session_id.filter(|s| !s.is_empty());

        let (event_type, session_id) = match (event_type, session_id) {
            (Some(t), Some(s)) => (t, s),
            (t, s) => {
                let mut missing = Vec::new();
                if t.is_none() {
                    missing.push("type");
                }
                if s.is_none() {
                    missing.push("sessionId");
                }
                return Err(AnalyzerError::MissingFields {
                    fields: missing.join(", "),
                });
            }
        };

        let event_type = EventType::parse(&event_type)
            .ok_or(AnalyzerError::UnknownEventType { event_type })?;

        Ok(NewEvent {
            event_type,
            session_id,
            user_id: self.user_id,
            data: self.data.unwrap_or_default(),
        })
    }
}

/// Acknowledgement returned after a request has been ingested.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReceipt {
    pub success: bool,
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<QfolMetrics>,
    pub timestamp: DateTime<Utc>,
}

impl<S: EventStore, H: HeuristicProvider> QfolAnalyzer<S, H> {
    /// Validate and log an inbound request.
    pub fn ingest(&self, request: EventRequest) -> Result<IngestReceipt> {
        let event = self.log_event(request.validate()?);
        Ok(IngestReceipt {
            success: true,
            event_id: event.id.to_string(),
            metrics: event.metrics,
            timestamp: event.timestamp,
        })
    }

    /// Render the requested view.
    pub fn report(&self, action: ReportAction) -> Report {
        let timestamp = Utc::now();
        match action {
            ReportAction::Status => Report::Status(StatusReport {
                snapshot: self.current_status(),
                timestamp,
                system: self.config().system_name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            }),
            ReportAction::GateCheck => {
                let decision = self.should_gate_deployment();
                Report::Deployment(DeploymentReport {
                    deployment: DeploymentCheck {
                        allowed: !decision.gate,
                        reason: decision.reason,
                        timestamp,
                    },
                })
            }
            ReportAction::MetricsOnly => Report::Metrics(MetricsReport {
                metrics: self.current_status().metrics,
                timestamp,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::FixedHeuristics;
    use crate::store::InMemoryEventStore;
    use qfol_core::QfolConfig;

    fn analyzer() -> QfolAnalyzer<InMemoryEventStore, FixedHeuristics> {
        QfolAnalyzer::with_parts(
            QfolConfig::default(),
            InMemoryEventStore::new(),
            FixedHeuristics::default(),
        )
    }

    fn request(json: &str) -> EventRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!("status".parse::<ReportAction>().unwrap(), ReportAction::Status);
        assert_eq!(
            "gate-check".parse::<ReportAction>().unwrap(),
            ReportAction::GateCheck
        );
        assert_eq!(
            "metrics-only".parse::<ReportAction>().unwrap(),
            ReportAction::MetricsOnly
        );
        let err = "summary".parse::<ReportAction>().unwrap_err();
        assert!(err.to_string().contains("status, gate-check, or metrics-only"));
    }

    #[test]
    fn test_validate_reports_missing_fields() {
        let err = request(r#"{"data": {"input": "hi"}}"#).validate().unwrap_err();
        match err {
            AnalyzerError::MissingFields { fields } => assert_eq!(fields, "type, sessionId"),
            other => panic!("unexpected error: {other}"),
        }

        let err = request(r#"{"type": "query", "sessionId": ""}"#)
            .validate()
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::MissingFields { fields } if fields == "sessionId"));
    }

    #[test]
    fn test_validate_rejects_unknown_type() {
        let err = request(r#"{"type": "click", "sessionId": "s"}"#)
            .validate()
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::UnknownEventType { .. }));
    }

    #[test]
    fn test_validate_defaults_data() {
        let event = request(r#"{"type": "action", "sessionId": "s", "userId": "u"}"#)
            .validate()
            .unwrap();
        assert_eq!(event.event_type, EventType::Action);
        assert_eq!(event.user_id.as_deref(), Some("u"));
        assert_eq!(event.data, EventData::default());
    }

    #[test]
    fn test_ingest_returns_receipt() {
        let analyzer = analyzer();
        let receipt = analyzer
            .ingest(request(
                r#"{"type": "query", "sessionId": "s", "data": {"input": "growing oysters"}}"#,
            ))
            .unwrap();
        assert!(receipt.success);
        assert!(receipt.event_id.starts_with("qfol_"));
        assert!(receipt.metrics.is_some());
        assert_eq!(analyzer.len(), 1);
    }

    #[test]
    fn test_status_report_shape() {
        let analyzer = analyzer();
        let json = serde_json::to_value(analyzer.report(ReportAction::Status)).unwrap();
        assert_eq!(json["status"], "optimal");
        assert_eq!(json["system"], "Crowe Logic GPT - Mycology Research Suite");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert!(json["recommendations"].is_array());
        assert!(json["metrics"]["eeg"].is_object());
    }

    #[test]
    fn test_gate_check_report() {
        let analyzer = analyzer();
        // Neutral safety (0.7) is below the 0.8 threshold.
        analyzer.log_event(NewEvent::response("s", "Pasteurize the straw."));
        let json = serde_json::to_value(analyzer.report(ReportAction::GateCheck)).unwrap();
        assert_eq!(json["deployment"]["allowed"], false);
        assert!(json["deployment"]["reason"]
            .as_str()
            .unwrap()
            .starts_with("Safety score"));
    }

    #[test]
    fn test_metrics_only_report() {
        let analyzer = analyzer();
        let json = serde_json::to_value(analyzer.report(ReportAction::MetricsOnly)).unwrap();
        assert!(json["metrics"]["dei"].is_object());
        assert!(json.get("status").is_none());
    }
}
