//! Debug bridge orchestration
//!
//! Ties the registry, override store and transport together:
//!
//! - **Publish**: render code calls [`DebugBridge::publish`] every frame; at most
//!   once per throttle window per model, the merged uniforms (with pending
//!   overrides re-applied) and attributes are transformed and sent as one batch.
//! - **Ingest**: the transport hands inspector messages to
//!   [`DebugBridge::handle_message`]; uniform edits are stored as overrides and
//!   written into the live model immediately.
//!
//! Nothing here returns an error. A missing model, a bad path or an
//! uninitialized inspector all end in a no-op, so the overlay can never
//! interrupt rendering.

use crate::config::BridgeConfig;
use crate::flag::DebugFlag;
use crate::message::{EditEvent, EventKind, InspectorMessage};
use crate::overrides::OverrideStore;
use crate::path;
use crate::payload;
use crate::registry::{ModelId, ModelRegistry, Renderable, SharedRenderable};
use crate::transport::{Transport, Update};
use crate::value::ValueMap;

/// Leading path segment of edits the bridge accepts
pub const UNIFORMS_ROOT: &str = "uniforms";

/// Debug bridge context, one per render engine instance
pub struct DebugBridge<T: Transport> {
    config: BridgeConfig,
    flag: DebugFlag,
    registry: ModelRegistry,
    overrides: OverrideStore,
    transport: T,
}

impl<T: Transport> DebugBridge<T> {
    pub fn new(config: BridgeConfig, flag: DebugFlag, transport: T) -> Self {
        Self {
            config,
            overrides: OverrideStore::new(flag.clone()),
            flag,
            registry: ModelRegistry::new(),
            transport,
        }
    }

    /// Whether the host has flagged the inspector as initialized
    pub fn is_initialized(&self) -> bool {
        self.flag.is_set()
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a model and announce it to the inspector
    ///
    /// Duplicate ids are ignored; the announcement fires once per id.
    pub fn register(&mut self, model: &SharedRenderable) -> bool {
        if !self.registry.add(model) {
            return false;
        }

        if let Ok(model) = model.try_borrow() {
            tracing::debug!("debug bridge: registered model {}", model.id());
            self.transport.register_item(&self.config.namespace, model.id());
        }
        true
    }

    /// Unregister a model (on disposal)
    pub fn unregister(&mut self, id: &ModelId) {
        self.registry.remove(id);

        if self.config.prune_overrides_on_remove {
            let pruned = self.overrides.clear_model(id);
            if pruned > 0 {
                tracing::debug!("debug bridge: dropped {} overrides for {}", pruned, id);
            }
        }
    }

    // =========================================================================
    // Snapshot publishing
    // =========================================================================

    /// Publish a snapshot of a model's uniforms and attributes
    ///
    /// `extra_uniforms` are the per-draw uniforms, layered over the model's
    /// own. Returns true if a batch was sent.
    pub fn publish(&mut self, model: &dyn Renderable, extra_uniforms: &ValueMap) -> bool {
        if !self.flag.is_set() {
            return false;
        }

        let id = model.id();
        let key = format!("{}:{}", self.config.namespace, id);
        if self.transport.throttle(&key, self.config.throttle_interval()) {
            return false;
        }

        let mut uniforms = model.uniforms().clone();
        uniforms.extend(extra_uniforms.iter().map(|(k, v)| (k.clone(), v.clone())));
        let applied = self.overrides.apply_to(id, &mut uniforms);

        let mut attributes = model.geometry_attributes().cloned().unwrap_or_default();
        attributes.extend(model.attributes().iter().map(|(k, v)| (k.clone(), v.clone())));

        let updates = vec![
            Update {
                path: self.config.uniforms_path.clone(),
                data: payload::transform(&uniforms),
            },
            Update {
                path: self.config.attributes_path.clone(),
                data: payload::transform(&attributes),
            },
        ];

        tracing::trace!(
            "debug bridge: publishing {} ({} uniforms, {} attributes, {} overrides)",
            id,
            uniforms.len(),
            attributes.len(),
            applied
        );
        self.transport.batch_update(&self.config.namespace, id, updates);
        true
    }

    /// Publish a registered model by id
    pub fn publish_registered(&mut self, id: &ModelId, extra_uniforms: &ValueMap) -> bool {
        let Some(model) = self.registry.lookup(id) else {
            return false;
        };
        let Ok(model) = model.try_borrow() else {
            tracing::warn!("debug bridge: model {} is mutably borrowed - skipping publish", id);
            return false;
        };
        self.publish(&*model, extra_uniforms)
    }

    // =========================================================================
    // Edit ingestion
    // =========================================================================

    /// Apply an inspector event
    ///
    /// Only `edit` events under `uniforms` for a live, registered model are
    /// accepted. The edit is stored as an override and written into the
    /// model's uniforms right away. Returns true if the event was accepted.
    pub fn ingest_edit(&mut self, event: EditEvent) -> bool {
        if event.kind != EventKind::Edit {
            return false;
        }
        let Some(value_path) = event.path.strip_prefix(UNIFORMS_ROOT) else {
            tracing::trace!("debug bridge: ignoring edit outside uniforms: {}", event.path);
            return false;
        };
        if value_path.is_empty() {
            return false;
        }
        let Some(model) = self.registry.lookup(&event.object_id) else {
            tracing::trace!("debug bridge: edit for unknown model {}", event.object_id);
            return false;
        };

        self.overrides
            .set(&event.object_id, value_path.clone(), event.value.clone());

        let Ok(mut model) = model.try_borrow_mut() else {
            tracing::warn!(
                "debug bridge: model {} is borrowed - edit applies on next publish",
                event.object_id
            );
            return true;
        };

        let mut uniforms = model.uniforms().clone();
        if let Err(err) = path::apply_to_map(&mut uniforms, value_path.segments(), event.value) {
            tracing::debug!(
                "debug bridge: edit {} on {} not applied: {}",
                value_path,
                event.object_id,
                err
            );
        }
        model.set_uniforms(uniforms);
        true
    }

    /// Handle a message delivered for `namespace`
    pub fn handle_message(&mut self, namespace: &str, message: InspectorMessage) -> bool {
        if namespace != self.config.namespace {
            return false;
        }
        self.ingest_edit(EditEvent::from(message))
    }

    /// Handle a raw JSON message; malformed messages are logged and dropped
    pub fn handle_raw_message(&mut self, namespace: &str, json: &str) -> bool {
        match InspectorMessage::parse(json) {
            Ok(message) => self.handle_message(namespace, message),
            Err(err) => {
                tracing::warn!("debug bridge: malformed inspector message: {}", err);
                false
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn flag(&self) -> &DebugFlag {
        &self.flag
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn overrides(&self) -> &OverrideStore {
        &self.overrides
    }

    pub fn overrides_mut(&mut self) -> &mut OverrideStore {
        &mut self.overrides
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
