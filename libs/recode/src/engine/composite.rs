use super::{matcher, scalar, unwrap};
use crate::config::RecodeConfig;
use crate::error::{FieldPath, RecodeError, Result, Segment};
use crate::value::{AggregateValue, Kind, SequenceValue, Value};

/// State of one depth-first descent: where we are and how deep.
pub(crate) struct Walk<'c> {
    config: &'c RecodeConfig,
    path: FieldPath,
    depth: usize,
}

impl<'c> Walk<'c> {
    pub(crate) fn new(config: &'c RecodeConfig) -> Self {
        Self {
            config,
            path: FieldPath::root(),
            depth: 0,
        }
    }

    /// Recodes every visible destination field from its same-named source field.
    /// Stops at the first failure; fields written before it keep their values.
    pub(crate) fn aggregate(
        &mut self,
        source: &AggregateValue,
        destination: &mut AggregateValue,
    ) -> Result<()> {
        for (field, output) in destination.fields_mut().filter(|(field, _)| field.visible) {
            self.nested(Segment::Field(field.name.clone()), |walk| {
                let input = matcher::lookup(source, &field.name, &walk.path)?;
                tracing::trace!(path = %walk.path, source = %input.kind(), "recode field");
                walk.value(input, output)
            })?;
        }
        Ok(())
    }

    /// Dispatches on the destination's shape after resolving its indirections.
    pub(crate) fn value(&mut self, source: &Value, destination: &mut Value) -> Result<()> {
        match unwrap::destination(destination, &self.path)? {
            Value::Int(out) => *out = scalar::to_signed(source, &self.path)?,
            Value::UInt(out) => *out = scalar::to_unsigned(source, &self.path)?,
            Value::Float(out) => *out = scalar::to_float(source, &self.path)?,
            Value::Text(out) => *out = scalar::to_text(source, &self.path)?,
            Value::Aggregate(out) => match unwrap::source(source) {
                Some(Value::Aggregate(input)) => self.aggregate(input, out)?,
                other => return Err(self.mismatch(Kind::Aggregate, other)),
            },
            Value::Sequence(out) => match unwrap::source(source) {
                Some(Value::Sequence(input)) => self.sequence(input, out)?,
                other => return Err(self.mismatch(Kind::Sequence, other)),
            },
            other => {
                return Err(RecodeError::UnsupportedShape {
                    found: other.kind(),
                    path: self.path.clone(),
                });
            }
        }
        Ok(())
    }

    /// Reallocates the destination to the source length and converts positionally.
    fn sequence(&mut self, source: &SequenceValue, destination: &mut SequenceValue) -> Result<()> {
        let outputs = destination.reset(source.len());
        for (index, (input, output)) in source.items().iter().zip(outputs).enumerate() {
            self.nested(Segment::Index(index), |walk| walk.value(input, output))?;
        }
        Ok(())
    }

    fn nested<F>(&mut self, segment: Segment, step: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.path.push(segment);
        self.depth += 1;
        let result = match self.config.max_depth {
            Some(limit) if self.depth > limit => Err(RecodeError::DepthExceeded {
                limit,
                path: self.path.clone(),
            }),
            _ => step(self),
        };
        self.depth -= 1;
        self.path.pop();
        result
    }

    fn mismatch(&self, expected: Kind, found: Option<&Value>) -> RecodeError {
        RecodeError::mismatch(expected, unwrap::found_kind(found), &self.path)
    }
}
