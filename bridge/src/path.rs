//! Property paths and best-effort path mutation
//!
//! A [`PropertyPath`] addresses a location inside a nested value graph, e.g.
//! `["lights", 0, "color"]`. Paths are plain values with structural equality,
//! so they can key the override store.
//!
//! Mutation is "soft": a missing intermediate is expected (the uniform block
//! may not exist yet) and reported as a [`PathError`] instead of panicking.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::value::{Value, ValueMap};

/// One segment of a property path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl PathSegment {
    /// Segment as a map key (indices become their decimal string)
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            PathSegment::Key(key) => Cow::Borrowed(key),
            PathSegment::Index(index) => Cow::Owned(index.to_string()),
        }
    }

    /// Segment as a sequence index, if it is one or parses as one
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Index(index) => Some(*index),
            PathSegment::Key(key) => key.parse().ok(),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Ordered sequence of segments identifying a nested location
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<PathSegment>", into = "Vec<PathSegment>")]
pub struct PropertyPath(SmallVec<[PathSegment; 4]>);

impl PropertyPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments<S: Into<PathSegment>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn first(&self) -> Option<&PathSegment> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.0.push(segment.into());
    }

    /// Drop a leading key segment, returning the remainder
    ///
    /// Returns `None` if the path doesn't start with `key`.
    pub fn strip_prefix(&self, key: &str) -> Option<PropertyPath> {
        match self.0.first() {
            Some(PathSegment::Key(first)) if first == key => {
                Some(Self(self.0[1..].iter().cloned().collect()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl From<Vec<PathSegment>> for PropertyPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(SmallVec::from_vec(segments))
    }
}

impl From<PropertyPath> for Vec<PathSegment> {
    fn from(path: PropertyPath) -> Self {
        path.0.into_vec()
    }
}

impl FromIterator<PathSegment> for PropertyPath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Why a path edit had no effect
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("target does not exist")]
    MissingRoot,
    #[error("empty property path")]
    EmptyPath,
    #[error("cannot assign segment '{0}' on a non-container value")]
    NotAContainer(PathSegment),
    #[error("segment '{0}' is not a valid sequence index")]
    InvalidIndex(PathSegment),
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("numeric buffers only accept numeric values")]
    NonNumericBufferWrite,
}

/// Set `value` at `path` below `root`
///
/// A `None` root, or an intermediate segment that doesn't resolve to a
/// container, leaves everything untouched and yields `MissingRoot`.
pub fn apply(root: Option<&mut Value>, path: &[PathSegment], value: Value) -> Result<(), PathError> {
    let Some(root) = root else {
        return Err(PathError::MissingRoot);
    };

    match path {
        [] => Err(PathError::EmptyPath),
        [last] => assign(root, last, value),
        [head, rest @ ..] => apply(child_mut(root, head), rest, value),
    }
}

/// Set `value` at `path` below a top-level map (a model's uniforms)
pub fn apply_to_map(map: &mut ValueMap, path: &[PathSegment], value: Value) -> Result<(), PathError> {
    match path {
        [] => Err(PathError::EmptyPath),
        [last] => {
            map.insert(last.as_key().into_owned(), value);
            Ok(())
        }
        [head, rest @ ..] => apply(map.get_mut(head.as_key().as_ref()), rest, value),
    }
}

fn child_mut<'a>(value: &'a mut Value, segment: &PathSegment) -> Option<&'a mut Value> {
    match value {
        Value::Map(map) => map.get_mut(segment.as_key().as_ref()),
        Value::List(items) => segment.as_index().and_then(|i| items.get_mut(i)),
        _ => None,
    }
}

fn assign(target: &mut Value, segment: &PathSegment, value: Value) -> Result<(), PathError> {
    match target {
        Value::Map(map) => {
            map.insert(segment.as_key().into_owned(), value);
            Ok(())
        }
        Value::List(items) => {
            let index = segment
                .as_index()
                .ok_or_else(|| PathError::InvalidIndex(segment.clone()))?;
            let len = items.len();
            let slot = items
                .get_mut(index)
                .ok_or(PathError::IndexOutOfBounds { index, len })?;
            *slot = value;
            Ok(())
        }
        Value::Buffer(buffer) => {
            let index = segment
                .as_index()
                .ok_or_else(|| PathError::InvalidIndex(segment.clone()))?;
            let number = value.as_f64().ok_or(PathError::NonNumericBufferWrite)?;
            if buffer.set(index, number) {
                Ok(())
            } else {
                Err(PathError::IndexOutOfBounds {
                    index,
                    len: buffer.len(),
                })
            }
        }
        _ => Err(PathError::NotAContainer(segment.clone())),
    }
}
