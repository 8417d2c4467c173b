//! Inbound inspector messages
//!
//! The inspector reports user actions as JSON objects of the form
//! `{"itemKey": "m1", "type": "edit", "valuePath": ["uniforms", "color", 0], "value": 0}`.

use serde::Deserialize;

use crate::path::PropertyPath;
use crate::registry::ModelId;
use crate::value::Value;

/// Raw message delivered by the inspector transport
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectorMessage {
    pub item_key: ModelId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value_path: PropertyPath,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl InspectorMessage {
    /// Parse a message from its JSON text
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// What the user did in the inspector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Edit,
    Other(String),
}

impl From<&str> for EventKind {
    fn from(kind: &str) -> Self {
        match kind {
            "edit" => EventKind::Edit,
            other => EventKind::Other(other.to_string()),
        }
    }
}

/// An inspector event addressed to one model
#[derive(Debug, Clone, PartialEq)]
pub struct EditEvent {
    pub object_id: ModelId,
    pub kind: EventKind,
    pub path: PropertyPath,
    pub value: Value,
}

impl EditEvent {
    /// Build an edit event
    pub fn edit(object_id: impl Into<ModelId>, path: PropertyPath, value: impl Into<Value>) -> Self {
        Self {
            object_id: object_id.into(),
            kind: EventKind::Edit,
            path,
            value: value.into(),
        }
    }
}

impl From<InspectorMessage> for EditEvent {
    fn from(message: InspectorMessage) -> Self {
        Self {
            object_id: message.item_key,
            kind: EventKind::from(message.kind.as_str()),
            path: message.value_path,
            value: Value::from(message.value),
        }
    }
}
