use std::fmt;
use std::sync::Arc;

use crate::schema::{AggregateDescriptor, Deferred, FieldDescriptor, Shape};

/// Runtime value handled by the engine.
///
/// Strategy by variant:
/// - Scalars (`Int`, `UInt`, `Float`, `Text`): converted by the scalar rules
/// - `Aggregate`, `Sequence`: recursed into
/// - `Indirection`: resolved one layer at a time, may be empty
/// - `Bool`, `Opaque`: carried as data, never produced by a conversion
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bool(bool),
    Aggregate(AggregateValue),
    Sequence(SequenceValue),
    /// Reference, optional or boxed wrapper. `None` is an absent value.
    Indirection(Option<Box<Value>>),
    /// Uncategorized kind (function, channel, ...), identified by name only.
    Opaque(Box<str>),
}

/// Shape tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    SignedInt,
    UnsignedInt,
    Float,
    Text,
    Bool,
    Aggregate,
    Sequence,
    Indirection,
    /// An empty indirection reached where a concrete value was required.
    Absent,
    Opaque,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::SignedInt => "signed int",
            Kind::UnsignedInt => "unsigned int",
            Kind::Float => "float",
            Kind::Text => "text",
            Kind::Bool => "bool",
            Kind::Aggregate => "aggregate",
            Kind::Sequence => "sequence",
            Kind::Indirection => "indirection",
            Kind::Absent => "absent value",
            Kind::Opaque => "opaque",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Int(_) => Kind::SignedInt,
            Value::UInt(_) => Kind::UnsignedInt,
            Value::Float(_) => Kind::Float,
            Value::Text(_) => Kind::Text,
            Value::Bool(_) => Kind::Bool,
            Value::Aggregate(_) => Kind::Aggregate,
            Value::Sequence(_) => Kind::Sequence,
            Value::Indirection(_) => Kind::Indirection,
            Value::Opaque(_) => Kind::Opaque,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }

    /// Present indirection around `inner`.
    pub fn some(inner: Value) -> Self {
        Value::Indirection(Some(Box::new(inner)))
    }

    /// Empty indirection.
    pub fn none() -> Self {
        Value::Indirection(None)
    }

    /// Aggregate whose descriptor is inferred from the given fields.
    pub fn aggregate<N, I>(type_name: &str, fields: I) -> Self
    where
        N: Into<Box<str>>,
        I: IntoIterator<Item = (N, Value)>,
    {
        Value::Aggregate(AggregateValue::from_fields(type_name, fields))
    }

    /// Sequence of loosely-typed items.
    pub fn sequence(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Sequence(SequenceValue::new(
            Deferred::ready(Shape::Any),
            items.into_iter().collect(),
        ))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_aggregate(&self) -> Option<&AggregateValue> {
        match self {
            Value::Aggregate(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&SequenceValue> {
        match self {
            Value::Sequence(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Aggregate instance: one value per descriptor field, in declaration order.
///
/// The value list always has exactly as many entries as the descriptor has fields.
#[derive(Debug, Clone)]
pub struct AggregateValue {
    descriptor: Arc<AggregateDescriptor>,
    values: Vec<Value>,
}

impl AggregateValue {
    /// Every field set to the zero value of its shape.
    pub fn zeroed(descriptor: Arc<AggregateDescriptor>) -> Self {
        let values = descriptor
            .fields
            .iter()
            .map(|field| field.shape.zero_value())
            .collect();
        Self { descriptor, values }
    }

    /// Pairs `values` with the descriptor positionally. Missing trailing values
    /// are zero-filled and surplus ones dropped.
    pub fn from_parts(descriptor: Arc<AggregateDescriptor>, mut values: Vec<Value>) -> Self {
        values.truncate(descriptor.fields.len());
        for field in &descriptor.fields[values.len()..] {
            values.push(field.shape.zero_value());
        }
        Self { descriptor, values }
    }

    /// Builds the descriptor from the values themselves; every field is visible.
    /// A repeated name replaces the earlier value.
    pub fn from_fields<N, I>(type_name: &str, fields: I) -> Self
    where
        N: Into<Box<str>>,
        I: IntoIterator<Item = (N, Value)>,
    {
        let mut descriptors: Vec<FieldDescriptor> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        for (name, value) in fields {
            let name = name.into();
            if let Some(index) = descriptors.iter().position(|f| f.name == name) {
                descriptors[index].shape = Shape::of(&value);
                values[index] = value;
            } else {
                descriptors.push(FieldDescriptor::new(name, Shape::of(&value), true));
                values.push(value);
            }
        }
        Self {
            descriptor: Arc::new(AggregateDescriptor::new(type_name, descriptors)),
            values,
        }
    }

    pub fn descriptor(&self) -> &Arc<AggregateDescriptor> {
        &self.descriptor
    }

    pub fn type_name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.descriptor.position(name).map(|index| &self.values[index])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.descriptor
            .position(name)
            .map(|index| &mut self.values[index])
    }

    /// Replaces the named field, returning the previous value.
    pub fn set(&mut self, name: &str, value: Value) -> Option<Value> {
        self.get_mut(name).map(|slot| std::mem::replace(slot, value))
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn fields(&self) -> impl Iterator<Item = (&FieldDescriptor, &Value)> {
        self.descriptor.fields.iter().zip(&self.values)
    }

    pub(crate) fn fields_mut(&mut self) -> impl Iterator<Item = (&FieldDescriptor, &mut Value)> {
        self.descriptor.fields.iter().zip(self.values.iter_mut())
    }
}

/// Aggregates compare by type name, field names and field values.
impl PartialEq for AggregateValue {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.name == other.descriptor.name
            && self.values == other.values
            && self
                .descriptor
                .fields
                .iter()
                .map(|f| &f.name)
                .eq(other.descriptor.fields.iter().map(|f| &f.name))
    }
}

/// Ordered sequence. `element` is the shape new items are allocated from.
#[derive(Debug, Clone)]
pub struct SequenceValue {
    element: Deferred,
    items: Vec<Value>,
}

impl SequenceValue {
    pub fn new(element: Deferred, items: Vec<Value>) -> Self {
        Self { element, items }
    }

    pub fn empty(element: Deferred) -> Self {
        Self::new(element, Vec::new())
    }

    pub fn element(&self) -> &Deferred {
        &self.element
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replaces the items with `len` zero values of the element shape.
    pub(crate) fn reset(&mut self, len: usize) -> &mut [Value] {
        let zero = self.element.resolve().zero_value();
        self.items = vec![zero; len];
        &mut self.items
    }
}

/// Sequences compare by items only.
impl PartialEq for SequenceValue {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}
