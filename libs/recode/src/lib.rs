//! Field-by-field value coercion between aggregates.
//!
//! [`recode`] copies every visible field of a destination aggregate from the
//! same-named field of a source aggregate, converting between signed, unsigned,
//! float and text scalars and recursing into nested aggregates and sequences.
//! Typed callers derive [`Reflect`] and use [`recode_into`].

extern crate self as recode;

pub mod config;
pub mod engine;
pub mod error;
pub mod json;
pub mod reflect;
pub mod schema;
pub mod value;

pub use config::RecodeConfig;
pub use engine::{Recoder, recode, recode_into};
pub use error::{ErrorKind, FieldPath, RecodeError, Result};
pub use recode_derive::Reflect;
pub use reflect::Reflect;
pub use schema::{AggregateDescriptor, Deferred, FieldDescriptor, Shape};
pub use value::{AggregateValue, Kind, SequenceValue, Value};
