use std::fmt;

use crate::value::Kind;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, RecodeError>;

/// One step on the way from the destination root to a failing value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(Box<str>),
    Index(usize),
}

/// Location of a value inside the destination, rendered as `$.Data.Items[2]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn push(&mut self, segment: Segment) {
        self.0.push(segment);
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }

    pub(crate) fn prepend(&mut self, segment: Segment) {
        self.0.insert(0, segment);
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Error kind, for callers that branch on the failure class only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidSource,
    InvalidDestination,
    NilDestination,
    FieldNotFound,
    TypeMismatch,
    ParseFailure,
    UnsupportedShape,
    DepthExceeded,
}

/// Failure of a recode call. The first error aborts the whole call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecodeError {
    #[error("source must resolve to an aggregate, found {found}")]
    InvalidSource { found: Kind },

    #[error("destination must resolve to an aggregate, found {found}")]
    InvalidDestination { found: Kind },

    #[error("destination indirection at {path} is empty")]
    NilDestination { path: FieldPath },

    #[error("aggregate '{aggregate}' has no field '{field}' (needed at {path})")]
    FieldNotFound {
        aggregate: Box<str>,
        field: Box<str>,
        path: FieldPath,
    },

    #[error("cannot map {found} to {expected} at {path}")]
    TypeMismatch {
        expected: Kind,
        found: Kind,
        path: FieldPath,
    },

    #[error("cannot parse {text:?} as {expected} at {path}: {reason}")]
    ParseFailure {
        expected: Kind,
        text: String,
        reason: String,
        path: FieldPath,
    },

    #[error("cannot map to {found} at {path}")]
    UnsupportedShape { found: Kind, path: FieldPath },

    #[error("recursion depth limit {limit} exceeded at {path}")]
    DepthExceeded { limit: usize, path: FieldPath },
}

impl RecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecodeError::InvalidSource { .. } => ErrorKind::InvalidSource,
            RecodeError::InvalidDestination { .. } => ErrorKind::InvalidDestination,
            RecodeError::NilDestination { .. } => ErrorKind::NilDestination,
            RecodeError::FieldNotFound { .. } => ErrorKind::FieldNotFound,
            RecodeError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            RecodeError::ParseFailure { .. } => ErrorKind::ParseFailure,
            RecodeError::UnsupportedShape { .. } => ErrorKind::UnsupportedShape,
            RecodeError::DepthExceeded { .. } => ErrorKind::DepthExceeded,
        }
    }

    /// Location of the failure. `None` for the top-level argument checks.
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            RecodeError::InvalidSource { .. } | RecodeError::InvalidDestination { .. } => None,
            RecodeError::NilDestination { path }
            | RecodeError::FieldNotFound { path, .. }
            | RecodeError::TypeMismatch { path, .. }
            | RecodeError::ParseFailure { path, .. }
            | RecodeError::UnsupportedShape { path, .. }
            | RecodeError::DepthExceeded { path, .. } => Some(path),
        }
    }

    /// Re-roots the error one level up: `$.b` raised inside field `a`
    /// becomes `$.a.b`. Errors without a path pass through unchanged.
    pub(crate) fn within(mut self, segment: Segment) -> Self {
        match &mut self {
            RecodeError::InvalidSource { .. } | RecodeError::InvalidDestination { .. } => {}
            RecodeError::NilDestination { path }
            | RecodeError::FieldNotFound { path, .. }
            | RecodeError::TypeMismatch { path, .. }
            | RecodeError::ParseFailure { path, .. }
            | RecodeError::UnsupportedShape { path, .. }
            | RecodeError::DepthExceeded { path, .. } => path.prepend(segment),
        }
        self
    }

    pub(crate) fn mismatch(expected: Kind, found: Kind, path: &FieldPath) -> Self {
        RecodeError::TypeMismatch {
            expected,
            found,
            path: path.clone(),
        }
    }

    pub(crate) fn parse(
        expected: Kind,
        text: &str,
        reason: impl fmt::Display,
        path: &FieldPath,
    ) -> Self {
        RecodeError::ParseFailure {
            expected,
            text: text.to_string(),
            reason: reason.to_string(),
            path: path.clone(),
        }
    }
}

/// Failure to load a [`RecodeConfig`](crate::config::RecodeConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
