#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resources::Resource;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceStep {
    pub subject: String,
    #[serde(default)]
    pub body: String,
    /// Days to wait after the previous step.
    pub delay_days: u32,
}

/// A timed series of emails sent to a contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSequence {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub steps: Vec<SequenceStep>,
    #[serde(default)]
    pub active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for EmailSequence {
    const NAME: &'static str = "email sequence";
    const PATH: &'static str = "email-sequences";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationKind {
    Social,
    Video,
    #[default]
    #[serde(other)]
    Other,
}

/// A connected social or video-call account (LinkedIn, Zoom, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub id: String,
    pub provider: String,
    /// Records saved without a kind still load, as `Other`.
    #[serde(default)]
    pub kind: IntegrationKind,
    #[serde(default)]
    pub connected: bool,
    pub handle: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for Integration {
    const NAME: &'static str = "integration";
    const PATH: &'static str = "integrations";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sequence_steps_deserialize_in_order() {
        let sequence: EmailSequence = serde_json::from_value(json!({
            "id": "s1",
            "name": "Candidate follow-up",
            "steps": [
                {"subject": "Intro", "delayDays": 0},
                {"subject": "Checking in", "delayDays": 3},
                {"subject": "Last call", "delayDays": 7}
            ]
        }))
        .unwrap();
        let delays: Vec<u32> = sequence.steps.iter().map(|s| s.delay_days).collect();
        assert_eq!(delays, vec![0, 3, 7]);
        assert_eq!(sequence.steps[1].body, "");
        assert!(!sequence.active);
    }

    #[test]
    fn test_integration_without_kind_loads_as_other() {
        let integration: Integration =
            serde_json::from_value(json!({"id": "i1", "provider": "zoom"})).unwrap();
        assert_eq!(integration.kind, IntegrationKind::Other);

        let linkedin: Integration = serde_json::from_value(
            json!({"id": "i2", "provider": "linkedin", "kind": "social", "connected": true}),
        )
        .unwrap();
        assert_eq!(linkedin.kind, IntegrationKind::Social);
        assert!(linkedin.connected);
    }
}
