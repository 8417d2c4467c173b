//! Shared test utilities for unit and integration tests

use std::cell::RefCell;
use std::rc::Rc;

use crate::registry::{ModelId, Renderable};
use crate::value::ValueMap;

/// Minimal renderable for tests
#[derive(Debug, Default)]
pub struct TestModel {
    pub id: ModelId,
    pub uniforms: ValueMap,
    pub attributes: ValueMap,
    pub geometry: Option<ValueMap>,
    /// Number of times `set_uniforms` was called
    pub set_uniforms_calls: u32,
}

impl TestModel {
    pub fn new(id: &str, uniforms: ValueMap) -> Self {
        Self {
            id: ModelId::from(id),
            uniforms,
            ..Default::default()
        }
    }

    pub fn with_attributes(mut self, attributes: ValueMap) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_geometry(mut self, geometry: ValueMap) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn into_shared(self) -> Rc<RefCell<TestModel>> {
        Rc::new(RefCell::new(self))
    }

    pub fn shared(id: &str, uniforms: ValueMap) -> Rc<RefCell<TestModel>> {
        Self::new(id, uniforms).into_shared()
    }
}

impl Renderable for TestModel {
    fn id(&self) -> &ModelId {
        &self.id
    }

    fn uniforms(&self) -> &ValueMap {
        &self.uniforms
    }

    fn set_uniforms(&mut self, uniforms: ValueMap) {
        self.uniforms = uniforms;
        self.set_uniforms_calls += 1;
    }

    fn attributes(&self) -> &ValueMap {
        &self.attributes
    }

    fn geometry_attributes(&self) -> Option<&ValueMap> {
        self.geometry.as_ref()
    }
}
