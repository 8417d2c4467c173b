//! Override store
//!
//! Remembers inspector edits per model and property path so they survive
//! render code recomputing uniforms from scratch every frame.

use hashbrown::HashMap;

use crate::flag::DebugFlag;
use crate::path::{self, PropertyPath};
use crate::registry::ModelId;
use crate::value::{Value, ValueMap};

/// Pending uniform overrides, keyed by model id then property path
pub struct OverrideStore {
    flag: DebugFlag,
    overrides: HashMap<ModelId, HashMap<PropertyPath, Value>>,
}

impl OverrideStore {
    pub fn new(flag: DebugFlag) -> Self {
        Self {
            flag,
            overrides: HashMap::new(),
        }
    }

    /// Record an override; a later value for the same path replaces it
    ///
    /// Ignored while the inspector isn't initialized.
    pub fn set(&mut self, id: &ModelId, path: PropertyPath, value: Value) {
        if !self.flag.is_set() {
            return;
        }

        self.overrides
            .entry(id.clone())
            .or_default()
            .insert(path, value);
    }

    /// Pending overrides for a model
    ///
    /// Returns `None` while the inspector isn't initialized, for an empty id,
    /// or when the model has no overrides. Iteration order is unspecified.
    pub fn get_all(
        &self,
        id: &ModelId,
    ) -> Option<impl Iterator<Item = (&PropertyPath, &Value)> + '_> {
        if !self.flag.is_set() || id.is_empty() {
            return None;
        }
        self.overrides.get(id).map(|paths| paths.iter())
    }

    /// Re-apply a model's overrides onto a uniform map
    ///
    /// Returns how many overrides landed. Paths that don't resolve in this
    /// map are skipped.
    pub fn apply_to(&self, id: &ModelId, uniforms: &mut ValueMap) -> usize {
        let Some(pending) = self.get_all(id) else {
            return 0;
        };

        let mut applied = 0;
        for (value_path, value) in pending {
            match path::apply_to_map(uniforms, value_path.segments(), value.clone()) {
                Ok(()) => applied += 1,
                Err(err) => {
                    tracing::trace!("debug bridge: override {} on {} skipped: {}", value_path, id, err)
                }
            }
        }
        applied
    }

    /// Drop a single override
    pub fn remove(&mut self, id: &ModelId, path: &PropertyPath) -> Option<Value> {
        let paths = self.overrides.get_mut(id)?;
        let removed = paths.remove(path);
        if paths.is_empty() {
            self.overrides.remove(id);
        }
        removed
    }

    /// Drop every override for a model, returning how many were pending
    pub fn clear_model(&mut self, id: &ModelId) -> usize {
        self.overrides.remove(id).map_or(0, |paths| paths.len())
    }

    /// Number of pending overrides for a model
    pub fn count(&self, id: &ModelId) -> usize {
        self.overrides.get(id).map_or(0, HashMap::len)
    }

    /// Number of models with at least one override
    pub fn model_count(&self) -> usize {
        self.overrides.len()
    }
}
