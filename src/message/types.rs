//! Change message types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Resolved names attached to a message, e.g. `UserName -> "Rupert Barrow"`
pub type Context = BTreeMap<String, String>;

/// A change-data-capture message as delivered by the transport
///
/// Record mutation:
/// `{"schema": "...", "payload": {"Name": "...", "ChangeEventHeader": {...}}, "event": {"replayId": 3217203}}`
///
/// Custom event:
/// `{"schema": "...", "payload": {"CreatedById": "...", "Type__c": "Commande", "Payload__c": "..."}, "event": {"replayId": 288436}}`
///
/// `schema`, `payload`, `event` and any other top-level keys stay in
/// `fields` exactly as received, explicit nulls included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeMessage {
    #[serde(flatten)]
    pub fields: Map<String, Value>,

    /// Enrichment output, replaced wholesale on every enrichment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
}

/// The parts of a record mutation header the enricher reads
///
/// Each field is lifted on its own, so one malformed field never hides
/// the others.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeEventHeader {
    pub commit_user: Option<String>,
    pub entity_name: Option<String>,

    /// `recordIds[0]`; later ids are never resolved
    pub first_record_id: Option<String>,
}

impl ChangeMessage {
    /// Parse a message from its JSON text
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Serialize the message back to a single JSON line
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Schema identifier, passed through untouched
    pub fn schema(&self) -> Option<&Value> {
        self.fields.get("schema")
    }

    /// Record fields or custom event fields
    pub fn payload(&self) -> Option<&Value> {
        self.fields.get("payload")
    }

    pub fn payload_mut(&mut self) -> Option<&mut Value> {
        self.fields.get_mut("payload")
    }

    /// Delivery metadata (carries `replayId`)
    pub fn event(&self) -> Option<&Value> {
        self.fields.get("event")
    }

    /// The record mutation header, if the payload carries one as an object
    pub fn change_event_header(&self) -> Option<ChangeEventHeader> {
        let raw = self.payload()?.get("ChangeEventHeader")?.as_object()?;

        Some(ChangeEventHeader {
            commit_user: raw.get("commitUser").and_then(scalar_to_string),
            entity_name: raw.get("entityName").and_then(scalar_to_string),
            first_record_id: raw
                .get("recordIds")
                .and_then(|ids| ids.get(0))
                .and_then(scalar_to_string),
        })
    }

    /// A scalar payload field rendered as a string
    pub fn payload_field(&self, name: &str) -> Option<String> {
        self.payload()
            .and_then(|payload| payload.get(name))
            .and_then(scalar_to_string)
    }

    /// `event.replayId` rendered as a string
    pub fn replay_id(&self) -> Option<String> {
        self.event()
            .and_then(|event| event.get("replayId"))
            .and_then(scalar_to_string)
    }
}

/// Render a JSON scalar as a string; null, arrays and objects yield `None`
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
