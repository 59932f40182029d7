use thiserror::Error;

use crate::key::PropertyKey;

/// Errors raised by runtime operations.
///
/// A rejected mutation is not an error: `set`, `define_property` and
/// `delete` report it as `Ok(false)`. These variants cover the cases where
/// the operation cannot proceed at all.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    #[error("{0} is not a function")]
    NotCallable(String),
    #[error("expected an object, got {0}")]
    NotAnObject(&'static str),
    #[error("method {method} called on incompatible receiver")]
    IncompatibleReceiver { method: &'static str },
    #[error("cannot assign to read only property '{0}'")]
    ReadOnly(PropertyKey),
    #[error("invalid array length")]
    InvalidLength,
    #[error("invalid time value")]
    InvalidDate,
    #[error("{0} values cannot be cloned")]
    NotCloneable(&'static str),
    #[error("converting circular structure")]
    Cycle,
    #[error("{0}")]
    Thrown(String),
}

/// Convenience alias for runtime results.
pub type ValueResult<T> = Result<T, ValueError>;
