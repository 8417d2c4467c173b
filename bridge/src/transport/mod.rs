//! Inspector transport
//!
//! The bridge talks to the inspector through [`Transport`]. Hosts plug in
//! whatever carries the messages (websocket, devtools channel); the
//! [`BufferedTransport`] queues them in memory for the host to pump.

mod buffered;
mod throttle;

pub use buffered::{BufferedTransport, OutboundMessage};
pub use throttle::Throttle;

use std::time::Duration;

use serde::Serialize;

use crate::payload::Payload;
use crate::registry::ModelId;

/// One entry of a batched snapshot update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Update {
    /// Logical path in the inspector's item tree (e.g. "objects.uniforms")
    pub path: String,
    pub data: Payload,
}

/// Outbound side of the inspector connection
pub trait Transport {
    /// Announce a new item under `namespace`
    fn register_item(&mut self, namespace: &str, id: &ModelId);

    /// Send several updates for one item as a single message
    fn batch_update(&mut self, namespace: &str, id: &ModelId, updates: Vec<Update>);

    /// Returns true if a call for `key` should be suppressed
    fn throttle(&mut self, key: &str, interval: Duration) -> bool;
}
