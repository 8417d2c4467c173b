//! Dynamic value model for uniforms and vertex attributes
//!
//! Render code hands the bridge loosely structured state: scalars, vectors,
//! typed numeric buffers, nested uniform blocks and the occasional callback.
//! [`Value`] is the common representation that snapshots, overrides and path
//! edits all operate on.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::ser::{Serialize, Serializer};

/// Ordered name -> value mapping (uniform blocks, attribute sets, payloads)
pub type ValueMap = BTreeMap<String, Value>;

/// Element type of a typed numeric buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    F32,
    F64,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
}

impl ElementType {
    /// Get the byte size of a single element
    pub fn byte_size(&self) -> usize {
        match self {
            ElementType::I8 | ElementType::U8 => 1,
            ElementType::I16 | ElementType::U16 => 2,
            ElementType::F32 | ElementType::I32 | ElementType::U32 => 4,
            ElementType::F64 => 8,
        }
    }

    /// Get a human-readable type name
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
            ElementType::I8 => "i8",
            ElementType::U8 => "u8",
            ElementType::I16 => "i16",
            ElementType::U16 => "u16",
            ElementType::I32 => "i32",
            ElementType::U32 => "u32",
        }
    }
}

/// Errors from decoding raw buffer bytes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("buffer of {len} bytes is not a multiple of the {element} element size ({size} bytes)")]
    Misaligned {
        len: usize,
        element: &'static str,
        size: usize,
    },
}

/// Typed numeric buffer (vertex data, packed uniform arrays)
#[derive(Debug, Clone, PartialEq)]
pub enum NumericBuffer {
    F32(Vec<f32>),
    F64(Vec<f64>),
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    I32(Vec<i32>),
    U32(Vec<u32>),
}

macro_rules! each_buffer {
    ($buffer:expr, $elems:ident => $body:expr) => {
        match $buffer {
            NumericBuffer::F32($elems) => $body,
            NumericBuffer::F64($elems) => $body,
            NumericBuffer::I8($elems) => $body,
            NumericBuffer::U8($elems) => $body,
            NumericBuffer::I16($elems) => $body,
            NumericBuffer::U16($elems) => $body,
            NumericBuffer::I32($elems) => $body,
            NumericBuffer::U32($elems) => $body,
        }
    };
}

impl NumericBuffer {
    /// Decode native-endian bytes into a buffer of the given element type
    pub fn from_bytes(element: ElementType, bytes: &[u8]) -> Result<Self, BufferError> {
        let size = element.byte_size();
        if bytes.len() % size != 0 {
            return Err(BufferError::Misaligned {
                len: bytes.len(),
                element: element.type_name(),
                size,
            });
        }

        let chunks = bytes.chunks_exact(size);
        Ok(match element {
            ElementType::F32 => NumericBuffer::F32(chunks.map(bytemuck::pod_read_unaligned).collect()),
            ElementType::F64 => NumericBuffer::F64(chunks.map(bytemuck::pod_read_unaligned).collect()),
            ElementType::I8 => NumericBuffer::I8(chunks.map(bytemuck::pod_read_unaligned).collect()),
            ElementType::U8 => NumericBuffer::U8(bytes.to_vec()),
            ElementType::I16 => NumericBuffer::I16(chunks.map(bytemuck::pod_read_unaligned).collect()),
            ElementType::U16 => NumericBuffer::U16(chunks.map(bytemuck::pod_read_unaligned).collect()),
            ElementType::I32 => NumericBuffer::I32(chunks.map(bytemuck::pod_read_unaligned).collect()),
            ElementType::U32 => NumericBuffer::U32(chunks.map(bytemuck::pod_read_unaligned).collect()),
        })
    }

    /// Raw bytes of the buffer, as uploaded to the GPU
    pub fn as_bytes(&self) -> &[u8] {
        each_buffer!(self, elems => bytemuck::cast_slice(elems.as_slice()))
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            NumericBuffer::F32(_) => ElementType::F32,
            NumericBuffer::F64(_) => ElementType::F64,
            NumericBuffer::I8(_) => ElementType::I8,
            NumericBuffer::U8(_) => ElementType::U8,
            NumericBuffer::I16(_) => ElementType::I16,
            NumericBuffer::U16(_) => ElementType::U16,
            NumericBuffer::I32(_) => ElementType::I32,
            NumericBuffer::U32(_) => ElementType::U32,
        }
    }

    pub fn len(&self) -> usize {
        each_buffer!(self, elems => elems.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read an element widened to f64
    pub fn get(&self, index: usize) -> Option<f64> {
        each_buffer!(self, elems => elems.get(index).map(|v| *v as f64))
    }

    /// Write an element, narrowing with `as` semantics (saturating for integers)
    ///
    /// Returns false if `index` is out of bounds.
    pub fn set(&mut self, index: usize, value: f64) -> bool {
        each_buffer!(self, elems => match elems.get_mut(index) {
            Some(slot) => {
                *slot = value as _;
                true
            }
            None => false,
        })
    }

    /// Copy the elements into a plain list of numbers, preserving order
    pub fn to_values(&self) -> Vec<Value> {
        each_buffer!(self, elems => elems.iter().map(|v| Value::Number(*v as f64)).collect())
    }
}

impl Serialize for NumericBuffer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        each_buffer!(self, elems => serializer.collect_seq(elems))
    }
}

/// Host callback stored alongside uniforms (e.g. a lazily evaluated uniform)
///
/// Never crosses the transport; equality is identity.
#[derive(Clone)]
pub struct HostFunction(Rc<dyn Fn(&[Value]) -> Value>);

impl HostFunction {
    pub fn new(f: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HostFunction(..)")
    }
}

impl PartialEq for HostFunction {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Runtime value for uniform and attribute state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Buffer(NumericBuffer),
    List(Vec<Value>),
    Map(ValueMap),
    Function(HostFunction),
}

impl Value {
    /// Numeric view of scalars (bools map to 0/1)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Build a plain list of numbers
    pub fn numbers(values: impl IntoIterator<Item = f64>) -> Self {
        Value::List(values.into_iter().map(Value::Number).collect())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Callbacks can't cross the transport; they show up as null if they get this far
            Value::Null | Value::Function(_) => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Buffer(buffer) => buffer.serialize(serializer),
            Value::List(items) => serializer.collect_seq(items),
            Value::Map(map) => serializer.collect_map(map),
        }
    }
}

/// Build a [`ValueMap`] from name/value pairs
pub fn value_map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> ValueMap
where
    K: Into<String>,
    V: Into<Value>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

// =============================================================================
// Conversions
// =============================================================================

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(v as f64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Number(v as f64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<ValueMap> for Value {
    fn from(v: ValueMap) -> Self {
        Value::Map(v)
    }
}

impl From<NumericBuffer> for Value {
    fn from(v: NumericBuffer) -> Self {
        Value::Buffer(v)
    }
}

impl From<HostFunction> for Value {
    fn from(v: HostFunction) -> Self {
        Value::Function(v)
    }
}

impl From<Vec<f32>> for Value {
    fn from(v: Vec<f32>) -> Self {
        Value::Buffer(NumericBuffer::F32(v))
    }
}

impl From<glam::Vec2> for Value {
    fn from(v: glam::Vec2) -> Self {
        Value::Buffer(NumericBuffer::F32(v.to_array().to_vec()))
    }
}

impl From<glam::Vec3> for Value {
    fn from(v: glam::Vec3) -> Self {
        Value::Buffer(NumericBuffer::F32(v.to_array().to_vec()))
    }
}

impl From<glam::Vec4> for Value {
    fn from(v: glam::Vec4) -> Self {
        Value::Buffer(NumericBuffer::F32(v.to_array().to_vec()))
    }
}

// Matrices are column-major, matching how they are uploaded
impl From<glam::Mat3> for Value {
    fn from(m: glam::Mat3) -> Self {
        Value::Buffer(NumericBuffer::F32(m.to_cols_array().to_vec()))
    }
}

impl From<glam::Mat4> for Value {
    fn from(m: glam::Mat4) -> Self {
        Value::Buffer(NumericBuffer::F32(m.to_cols_array().to_vec()))
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}
