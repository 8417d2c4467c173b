//! In-memory transport that queues outbound messages

use std::time::Duration;

use serde::Serialize;

use super::{Throttle, Transport, Update};
use crate::registry::ModelId;

/// Message sent from the bridge to the inspector
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundMessage {
    RegisterItem {
        namespace: String,
        id: ModelId,
    },
    BatchUpdate {
        namespace: String,
        id: ModelId,
        updates: Vec<Update>,
    },
}

/// Transport that queues messages until the host drains them
#[derive(Debug, Default)]
pub struct BufferedTransport {
    queue: Vec<OutboundMessage>,
    throttle: Throttle,
}

impl BufferedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages queued since the last drain
    pub fn messages(&self) -> &[OutboundMessage] {
        &self.queue
    }

    /// Take all queued messages
    pub fn drain(&mut self) -> Vec<OutboundMessage> {
        std::mem::take(&mut self.queue)
    }

    /// Serialize queued messages as newline-delimited JSON
    pub fn to_json_lines(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for message in &self.queue {
            out.push_str(&serde_json::to_string(message)?);
            out.push('\n');
        }
        Ok(out)
    }

    pub fn throttle_mut(&mut self) -> &mut Throttle {
        &mut self.throttle
    }
}

impl Transport for BufferedTransport {
    fn register_item(&mut self, namespace: &str, id: &ModelId) {
        self.queue.push(OutboundMessage::RegisterItem {
            namespace: namespace.to_string(),
            id: id.clone(),
        });
    }

    fn batch_update(&mut self, namespace: &str, id: &ModelId, updates: Vec<Update>) {
        self.queue.push(OutboundMessage::BatchUpdate {
            namespace: namespace.to_string(),
            id: id.clone(),
            updates,
        });
    }

    fn throttle(&mut self, key: &str, interval: Duration) -> bool {
        self.throttle.should_suppress(key, interval)
    }
}
