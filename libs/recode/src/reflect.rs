//! Mapping between Rust types and [`Value`].
//!
//! Structs implement [`Reflect`] through `#[derive(Reflect)]`; the impls
//! below cover the scalar widths and the std wrappers.

use crate::engine::{scalar, unwrap};
use crate::error::{FieldPath, RecodeError, Result, Segment};
use crate::schema::{Deferred, Shape};
use crate::value::{AggregateValue, Kind, SequenceValue, Value};

/// A Rust type with a fixed [`Shape`] that can be lowered to a [`Value`]
/// and rebuilt from one.
pub trait Reflect: Sized {
    fn shape() -> Shape;

    fn to_value(&self) -> Value;

    fn from_value(value: &Value) -> Result<Self>;

    /// Writes `value` into `self`. Aggregates override this to touch visible
    /// fields only.
    fn assign(&mut self, value: &Value) -> Result<()> {
        *self = Self::from_value(value)?;
        Ok(())
    }
}

macro_rules! reflect_signed {
    ($($ty:ty),*) => {$(
        impl Reflect for $ty {
            fn shape() -> Shape {
                Shape::SignedInt
            }

            fn to_value(&self) -> Value {
                Value::Int(*self as i64)
            }

            fn from_value(value: &Value) -> Result<Self> {
                Ok(scalar::to_signed(value, &FieldPath::root())? as $ty)
            }
        }
    )*};
}

macro_rules! reflect_unsigned {
    ($($ty:ty),*) => {$(
        impl Reflect for $ty {
            fn shape() -> Shape {
                Shape::UnsignedInt
            }

            fn to_value(&self) -> Value {
                Value::UInt(*self as u64)
            }

            fn from_value(value: &Value) -> Result<Self> {
                Ok(scalar::to_unsigned(value, &FieldPath::root())? as $ty)
            }
        }
    )*};
}

reflect_signed!(i8, i16, i32, i64, isize);
reflect_unsigned!(u8, u16, u32, u64, usize);

impl Reflect for f64 {
    fn shape() -> Shape {
        Shape::Float
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: &Value) -> Result<Self> {
        scalar::to_float(value, &FieldPath::root())
    }
}

impl Reflect for f32 {
    fn shape() -> Shape {
        Shape::Float
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(scalar::to_float(value, &FieldPath::root())? as f32)
    }
}

impl Reflect for String {
    fn shape() -> Shape {
        Shape::Text
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: &Value) -> Result<Self> {
        scalar::to_text(value, &FieldPath::root())
    }
}

/// Carried through a recode but never produced by one.
impl Reflect for bool {
    fn shape() -> Shape {
        Shape::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> Result<Self> {
        match unwrap::source(value) {
            Some(Value::Bool(v)) => Ok(*v),
            other => Err(RecodeError::mismatch(
                Kind::Bool,
                unwrap::found_kind(other),
                &FieldPath::root(),
            )),
        }
    }
}

/// Dynamically typed slot, the field type of loosely-typed inputs.
impl Reflect for Value {
    fn shape() -> Shape {
        Shape::Any
    }

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn shape() -> Shape {
        Shape::Sequence(Deferred::Pending(T::shape))
    }

    fn to_value(&self) -> Value {
        Value::Sequence(SequenceValue::new(
            Deferred::Pending(T::shape),
            self.iter().map(T::to_value).collect(),
        ))
    }

    fn from_value(value: &Value) -> Result<Self> {
        match unwrap::source(value) {
            Some(Value::Sequence(sequence)) => {
                sequence
                    .items()
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        T::from_value(item).map_err(|e| e.within(Segment::Index(index)))
                    })
                    .collect()
            }
            other => Err(RecodeError::mismatch(
                Kind::Sequence,
                unwrap::found_kind(other),
                &FieldPath::root(),
            )),
        }
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn shape() -> Shape {
        Shape::Indirection(Deferred::Pending(T::shape))
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => Value::some(inner.to_value()),
            None => Value::none(),
        }
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Indirection(None) => Ok(None),
            Value::Indirection(Some(inner)) => T::from_value(inner).map(Some),
            other => T::from_value(other).map(Some),
        }
    }

    fn assign(&mut self, value: &Value) -> Result<()> {
        if let (Some(current), Value::Indirection(Some(inner))) = (self.as_mut(), value) {
            return current.assign(inner);
        }
        *self = Self::from_value(value)?;
        Ok(())
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn shape() -> Shape {
        Shape::Boxed(Deferred::Pending(T::shape))
    }

    fn to_value(&self) -> Value {
        Value::some((**self).to_value())
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Indirection(Some(inner)) => T::from_value(inner).map(Box::new),
            other => T::from_value(other).map(Box::new),
        }
    }

    fn assign(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Indirection(Some(inner)) => (**self).assign(inner),
            other => (**self).assign(other),
        }
    }
}

/// Aggregate behind `value`, as expected by derived `from_value`/`assign`.
#[doc(hidden)]
pub fn expect_aggregate(value: &Value) -> Result<&AggregateValue> {
    match unwrap::source(value) {
        Some(Value::Aggregate(aggregate)) => Ok(aggregate),
        other => Err(RecodeError::mismatch(
            Kind::Aggregate,
            unwrap::found_kind(other),
            &FieldPath::root(),
        )),
    }
}

/// Rebuilds field `name` of a derived struct.
#[doc(hidden)]
pub fn read_field<T: Reflect>(aggregate: &AggregateValue, name: &str) -> Result<T> {
    let value = aggregate.get(name).ok_or_else(|| missing(aggregate, name))?;
    T::from_value(value).map_err(|e| e.within(Segment::Field(name.into())))
}

/// Writes field `name` back into a derived struct.
#[doc(hidden)]
pub fn assign_field<T: Reflect>(slot: &mut T, aggregate: &AggregateValue, name: &str) -> Result<()> {
    let value = aggregate.get(name).ok_or_else(|| missing(aggregate, name))?;
    slot.assign(value).map_err(|e| e.within(Segment::Field(name.into())))
}

fn missing(aggregate: &AggregateValue, name: &str) -> RecodeError {
    let mut path = FieldPath::root();
    path.push(Segment::Field(name.into()));
    RecodeError::FieldNotFound {
        aggregate: aggregate.type_name().into(),
        field: name.into(),
        path,
    }
}
