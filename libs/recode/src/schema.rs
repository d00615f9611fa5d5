use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, Serializer};

use crate::value::{AggregateValue, Kind, SequenceValue, Value};

/// Type descriptor of a value slot. Used to allocate destination storage
/// (nested aggregates, sequence elements) during recursion.
///
/// Aggregates are nominal here: serializing a `Shape` writes the aggregate
/// name only, the field list lives in [`AggregateDescriptor`].
#[derive(Debug, Clone)]
pub enum Shape {
    SignedInt,
    UnsignedInt,
    Float,
    Text,
    Bool,
    Aggregate(Arc<AggregateDescriptor>),
    Sequence(Deferred),
    /// Optional slot; starts empty.
    Indirection(Deferred),
    /// Boxed slot; always allocated.
    Boxed(Deferred),
    /// Dynamically typed slot. Zero value is an empty indirection.
    Any,
    Opaque(Box<str>),
}

impl Shape {
    pub fn kind(&self) -> Kind {
        match self {
            Shape::SignedInt => Kind::SignedInt,
            Shape::UnsignedInt => Kind::UnsignedInt,
            Shape::Float => Kind::Float,
            Shape::Text => Kind::Text,
            Shape::Bool => Kind::Bool,
            Shape::Aggregate(_) => Kind::Aggregate,
            Shape::Sequence(_) => Kind::Sequence,
            Shape::Indirection(_) | Shape::Boxed(_) | Shape::Any => Kind::Indirection,
            Shape::Opaque(_) => Kind::Opaque,
        }
    }

    /// Default value for freshly allocated storage of this shape.
    ///
    /// Optional indirections start empty, so recoding into one fails with
    /// `NilDestination` until the caller allocates it. Boxed slots start
    /// allocated with the zero value of their target.
    pub fn zero_value(&self) -> Value {
        match self {
            Shape::SignedInt => Value::Int(0),
            Shape::UnsignedInt => Value::UInt(0),
            Shape::Float => Value::Float(0.0),
            Shape::Text => Value::Text(String::new()),
            Shape::Bool => Value::Bool(false),
            Shape::Aggregate(descriptor) => {
                Value::Aggregate(AggregateValue::zeroed(Arc::clone(descriptor)))
            }
            Shape::Sequence(element) => Value::Sequence(SequenceValue::empty(element.clone())),
            Shape::Indirection(_) | Shape::Any => Value::Indirection(None),
            Shape::Boxed(inner) => Value::some(inner.resolve().zero_value()),
            Shape::Opaque(name) => Value::Opaque(name.clone()),
        }
    }

    /// Shape inferred from a concrete value.
    pub fn of(value: &Value) -> Shape {
        match value {
            Value::Int(_) => Shape::SignedInt,
            Value::UInt(_) => Shape::UnsignedInt,
            Value::Float(_) => Shape::Float,
            Value::Text(_) => Shape::Text,
            Value::Bool(_) => Shape::Bool,
            Value::Aggregate(aggregate) => Shape::Aggregate(Arc::clone(aggregate.descriptor())),
            Value::Sequence(sequence) => Shape::Sequence(sequence.element().clone()),
            Value::Indirection(Some(inner)) => Shape::Indirection(Deferred::ready(Shape::of(inner))),
            Value::Indirection(None) => Shape::Indirection(Deferred::ready(Shape::Any)),
            Value::Opaque(name) => Shape::Opaque(name.clone()),
        }
    }
}

impl Serialize for Shape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Shape::SignedInt => serializer.serialize_unit_variant("Shape", 0, "signed_int"),
            Shape::UnsignedInt => serializer.serialize_unit_variant("Shape", 1, "unsigned_int"),
            Shape::Float => serializer.serialize_unit_variant("Shape", 2, "float"),
            Shape::Text => serializer.serialize_unit_variant("Shape", 3, "text"),
            Shape::Bool => serializer.serialize_unit_variant("Shape", 4, "bool"),
            Shape::Aggregate(descriptor) => {
                serializer.serialize_newtype_variant("Shape", 5, "aggregate", &*descriptor.name)
            }
            Shape::Sequence(element) => {
                serializer.serialize_newtype_variant("Shape", 6, "sequence", &element.resolve())
            }
            Shape::Indirection(inner) => {
                serializer.serialize_newtype_variant("Shape", 7, "indirection", &inner.resolve())
            }
            Shape::Boxed(inner) => {
                serializer.serialize_newtype_variant("Shape", 8, "boxed", &inner.resolve())
            }
            Shape::Any => serializer.serialize_unit_variant("Shape", 9, "any"),
            Shape::Opaque(name) => serializer.serialize_newtype_variant("Shape", 10, "opaque", &**name),
        }
    }
}

/// Shape resolved on demand.
///
/// Sequence elements and indirection targets are the only places a Rust type
/// can refer to itself (`Vec<Node>` inside `Node`), so building them lazily
/// keeps recursive descriptors finite.
#[derive(Clone)]
pub enum Deferred {
    Ready(Box<Shape>),
    Pending(fn() -> Shape),
}

impl Deferred {
    pub fn ready(shape: Shape) -> Self {
        Deferred::Ready(Box::new(shape))
    }

    pub fn resolve(&self) -> Shape {
        match self {
            Deferred::Ready(shape) => (**shape).clone(),
            Deferred::Pending(build) => build(),
        }
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deferred::Ready(shape) => shape.fmt(f),
            Deferred::Pending(_) => f.write_str("<deferred>"),
        }
    }
}

/// A single aggregate field.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FieldDescriptor {
    pub name: Box<str>,
    pub shape: Shape,
    /// Visible to callers outside the aggregate's defining scope.
    /// Hidden fields never take part in a recode.
    pub visible: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<Box<str>>, shape: Shape, visible: bool) -> Self {
        Self {
            name: name.into(),
            shape,
            visible,
        }
    }

    pub fn visible(name: impl Into<Box<str>>, shape: Shape) -> Self {
        Self::new(name, shape, true)
    }

    pub fn hidden(name: impl Into<Box<str>>, shape: Shape) -> Self {
        Self::new(name, shape, false)
    }
}

/// Aggregate type description: name plus fields in declaration order.
///
/// Generated by `#[derive(Reflect)]` or built by hand for dynamic data.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AggregateDescriptor {
    pub name: Box<str>,
    pub fields: Vec<FieldDescriptor>,
}

impl AggregateDescriptor {
    pub fn new(name: impl Into<Box<str>>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Index of the field with exactly this name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| &*f.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.position(name).map(|index| &self.fields[index])
    }

    pub fn visible_fields(&self) -> impl Iterator<Item = (usize, &FieldDescriptor)> {
        self.fields.iter().enumerate().filter(|(_, f)| f.visible)
    }

    /// Shorthand for `Shape::Aggregate(Arc::new(self))`.
    pub fn into_shape(self) -> Shape {
        Shape::Aggregate(Arc::new(self))
    }
}
