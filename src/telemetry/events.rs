//! Telemetry event schema.
//!
//! Events arrive from the content player and the app shell; unknown fields are kept in
//! `extra` maps so a processed event can be persisted without loss.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Event id. Only the kinds the summarizer reacts to get their own variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Eid {
    Start,
    Assess,
    End,
    Other(String),
}

impl From<String> for Eid {
    fn from(value: String) -> Self {
        match value.as_str() {
            "START" => Eid::Start,
            "ASSESS" => Eid::Assess,
            "END" => Eid::End,
            _ => Eid::Other(value),
        }
    }
}

impl From<Eid> for String {
    fn from(value: Eid) -> Self {
        match value {
            Eid::Start => "START".to_string(),
            Eid::Assess => "ASSESS".to_string(),
            Eid::End => "END".to_string(),
            Eid::Other(other) => other,
        }
    }
}

impl fmt::Display for Eid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eid::Start => f.write_str("START"),
            Eid::Assess => f.write_str("ASSESS"),
            Eid::End => f.write_str("END"),
            Eid::Other(other) => f.write_str(other),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub actor_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryObject {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ver: Option<String>,
}

/// Producer of an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProducerData {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ver: Option<String>,
}

/// Correlation tag, e.g. `{ "id": "...", "type": "AttemptId" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationData {
    pub id: String,
    #[serde(rename = "type")]
    pub cdata_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdata: Option<ProducerData>,
    #[serde(default)]
    pub cdata: Vec<CorrelationData>,
}

/// One playback-summary sample. Samples without `progress` never satisfy a threshold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SummaryEntry {
    pub fn progress(progress: f64) -> Self {
        Self {
            progress: Some(progress),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub summary: Vec<SummaryEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A learner telemetry event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub eid: Eid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ets: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid: Option<String>,
    #[serde(default)]
    pub actor: Actor,
    #[serde(default)]
    pub context: TelemetryContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<TelemetryObject>,
    #[serde(default)]
    pub edata: EventData,
}

impl Telemetry {
    pub fn new(eid: Eid, actor_id: impl Into<String>) -> Self {
        Self {
            eid,
            ets: None,
            mid: None,
            actor: Actor {
                id: actor_id.into(),
                actor_type: None,
            },
            context: TelemetryContext::default(),
            object: None,
            edata: EventData::default(),
        }
    }

    pub fn with_object(mut self, id: impl Into<String>, object_type: Option<&str>) -> Self {
        self.object = Some(TelemetryObject {
            id: id.into(),
            object_type: object_type.map(str::to_string),
            ver: None,
        });
        self
    }

    pub fn with_pid(mut self, pid: impl Into<String>) -> Self {
        self.context.pdata = Some(ProducerData {
            id: String::new(),
            pid: Some(pid.into()),
            ver: None,
        });
        self
    }

    pub fn with_cdata(mut self, cdata_type: impl Into<String>, id: impl Into<String>) -> Self {
        self.context.cdata.push(CorrelationData {
            id: id.into(),
            cdata_type: cdata_type.into(),
        });
        self
    }

    pub fn with_summary(mut self, summary: Vec<SummaryEntry>) -> Self {
        self.edata.summary = summary;
        self
    }

    pub fn object_id(&self) -> Option<&str> {
        self.object.as_ref().map(|o| o.id.as_str())
    }

    pub fn object_type(&self) -> Option<&str> {
        self.object.as_ref().and_then(|o| o.object_type.as_deref())
    }

    pub fn producer_id(&self) -> Option<&str> {
        self.context.pdata.as_ref().and_then(|p| p.pid.as_deref())
    }

    pub fn has_cdata_type(&self, cdata_type: &str) -> bool {
        self.context.cdata.iter().any(|c| c.cdata_type == cdata_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_player_end_event() {
        let raw = r#"{
            "eid": "END",
            "ets": 1700000000000,
            "actor": { "id": "u1", "type": "User" },
            "context": {
                "pdata": { "id": "app", "pid": "sunbird.app.contentplayer", "ver": "4.1" },
                "cdata": [{ "id": "att-1", "type": "AttemptId" }]
            },
            "object": { "id": "c1", "type": "Resource" },
            "edata": { "summary": [{ "progress": 25 }, { "totallength": 300 }], "duration": 12 }
        }"#;
        let event: Telemetry = serde_json::from_str(raw).unwrap();
        assert_eq!(event.eid, Eid::End);
        assert_eq!(event.object_id(), Some("c1"));
        assert_eq!(event.producer_id(), Some("sunbird.app.contentplayer"));
        assert!(event.has_cdata_type("AttemptId"));
        assert_eq!(event.edata.summary.len(), 2);
        assert_eq!(event.edata.summary[0].progress, Some(25.0));
        assert_eq!(event.edata.summary[1].progress, None);
        assert!(event.edata.extra.contains_key("duration"));
    }

    #[test]
    fn unknown_eids_are_preserved() {
        let event: Telemetry =
            serde_json::from_str(r#"{ "eid": "INTERACT", "actor": { "id": "u1" } }"#).unwrap();
        assert_eq!(event.eid, Eid::Other("INTERACT".to_string()));
        let back = serde_json::to_value(&event).unwrap();
        assert_eq!(back["eid"], "INTERACT");
    }
}
