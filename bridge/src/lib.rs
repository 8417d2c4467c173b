//! Nethercore Inspect Bridge - live render state for external inspectors
//!
//! Lets an inspector tool watch per-draw uniforms and vertex attributes of a
//! running renderer, and push uniform edits back that take effect on the
//! next draw.
//!
//! # Architecture
//!
//! - [`ModelRegistry`] - Weak handles to the live [`Renderable`]s an inspector can target
//! - [`payload`] - Turns uniform/attribute maps into transport-safe snapshots
//! - [`OverrideStore`] - Inspector edits per model and [`PropertyPath`], re-applied on every snapshot
//! - [`path`] - Best-effort mutation of nested values by path
//! - [`DebugBridge`] - Orchestrates snapshot publishing and edit ingestion over a [`Transport`]
//!
//! # Usage
//!
//! ```rust,ignore
//! let flag = DebugFlag::new(false);
//! let mut bridge = DebugBridge::new(BridgeConfig::default(), flag.clone(), BufferedTransport::new());
//!
//! bridge.register(&model);
//!
//! // Host detected an attached inspector
//! flag.set(true);
//!
//! // Every frame, per draw
//! bridge.publish(&*model.borrow(), &draw_uniforms);
//!
//! // Whenever the inspector sends something
//! bridge.handle_raw_message("nethercore", &json);
//! ```

pub mod bridge;
pub mod config;
pub mod flag;
#[cfg(test)]
mod integration;
pub mod message;
pub mod overrides;
pub mod path;
pub mod payload;
pub mod registry;
#[cfg(test)]
pub mod test_utils;
pub mod transport;
pub mod value;

// Re-export core types
pub use bridge::{DebugBridge, UNIFORMS_ROOT};
pub use config::{BridgeConfig, ConfigError};
pub use flag::DebugFlag;
pub use message::{EditEvent, EventKind, InspectorMessage};
pub use overrides::OverrideStore;
pub use path::{PathError, PathSegment, PropertyPath};
pub use payload::{Payload, ValueKind, classify, transform};
pub use registry::{ModelId, ModelRegistry, Renderable, SharedRenderable};
pub use transport::{BufferedTransport, OutboundMessage, Throttle, Transport, Update};
pub use value::{BufferError, ElementType, HostFunction, NumericBuffer, Value, ValueMap, value_map};
