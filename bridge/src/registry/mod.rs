//! Live model registry
//!
//! Keeps weak handles to the renderable objects the inspector can target.
//! Render code owns the objects; the registry only looks them up.


use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::value::ValueMap;

/// Stable identity of a renderable object
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawModelId", into = "String")]
pub struct ModelId(String);

/// Wire form of a model id: the inspector echoes back strings or numbers
#[derive(Deserialize)]
#[serde(untagged)]
enum RawModelId {
    Text(String),
    Number(u64),
}

impl From<RawModelId> for ModelId {
    fn from(raw: RawModelId) -> Self {
        match raw {
            RawModelId::Text(id) => Self(id),
            RawModelId::Number(id) => Self(id.to_string()),
        }
    }
}

impl ModelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty id never addresses a model
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ModelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u32> for ModelId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for ModelId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<ModelId> for String {
    fn from(id: ModelId) -> Self {
        id.0
    }
}

/// A renderable object whose uniforms and attributes can be inspected
pub trait Renderable {
    fn id(&self) -> &ModelId;

    /// Current uniform values
    fn uniforms(&self) -> &ValueMap;

    /// Replace the uniform values used for the next draw
    fn set_uniforms(&mut self, uniforms: ValueMap);

    /// Attributes owned by the object itself
    fn attributes(&self) -> &ValueMap;

    /// Attributes owned by the object's geometry, if it has one
    fn geometry_attributes(&self) -> Option<&ValueMap> {
        None
    }
}

/// Shared handle to a live renderable, as held by render code
pub type SharedRenderable = Rc<RefCell<dyn Renderable>>;

/// Registry of live renderables, keyed by id
#[derive(Default)]
pub struct ModelRegistry {
    models: HashMap<ModelId, Weak<RefCell<dyn Renderable>>>,
}

impl ModelRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model
    ///
    /// The first registration for an id wins; later ones are ignored. An entry
    /// whose model has already been dropped counts as vacant. Returns true if
    /// the model was newly stored.
    pub fn add(&mut self, model: &SharedRenderable) -> bool {
        let Ok(borrowed) = model.try_borrow() else {
            tracing::warn!("debug bridge: model is mutably borrowed during registration - ignored");
            return false;
        };
        let id = borrowed.id().clone();

        if let Some(existing) = self.models.get(&id) {
            if existing.strong_count() > 0 {
                tracing::trace!("debug bridge: model {} already registered", id);
                return false;
            }
        }

        self.models.insert(id, Rc::downgrade(model));
        true
    }

    /// Remove a model; absent ids are ignored
    pub fn remove(&mut self, id: &ModelId) -> bool {
        self.models.remove(id).is_some()
    }

    /// Look up a live model by id
    pub fn lookup(&self, id: &ModelId) -> Option<SharedRenderable> {
        self.models.get(id).and_then(Weak::upgrade)
    }

    pub fn contains(&self, id: &ModelId) -> bool {
        self.lookup(id).is_some()
    }

    /// Drop entries whose models no longer exist, returning their ids
    pub fn prune_dropped(&mut self) -> Vec<ModelId> {
        let dropped: Vec<ModelId> = self
            .models
            .iter()
            .filter(|(_, model)| model.strong_count() == 0)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &dropped {
            self.models.remove(id);
        }
        dropped
    }

    /// Get number of registered entries
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
