pub mod constants;
pub mod utility;

use thiserror::Error;

/// Errors raised by the algebra layer and the storage collaborators beneath it.
///
/// Storage-level errors (e.g. `DiskFull`) are passed through the operators
/// verbatim and never reinterpreted.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    #[error("relation '{0}' is not open")]
    RelationNotOpen(String),
    #[error("relation '{0}' does not exist")]
    RelationNotFound(String),
    #[error("relation '{0}' already exists")]
    RelationExists(String),
    #[error("relation '{0}' is open")]
    RelationOpen(String),
    #[error("attribute '{0}' does not exist")]
    AttributeNotFound(String),
    #[error("attribute type mismatch: {0}")]
    AttributeTypeMismatch(String),
    #[error("expected {expected} attributes, got {actual}")]
    AttributeCountMismatch { expected: usize, actual: usize },
    #[error("duplicate attribute '{0}'")]
    DuplicateAttribute(String),
    #[error("operation not permitted: {0}")]
    OperationNotPermitted(String),
    #[error("open relation table is full")]
    CacheFull,
    #[error("no free blocks left on disk")]
    DiskFull,
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("io error: {0}")]
    IO(String),
}

/// Constructs an Error::InvalidInput via format!() and into().
#[macro_export]
macro_rules! errinput {
    ($($args:tt)*) => { $crate::common::Error::InvalidInput(format!($($args)*)).into() };
}

/// Constructs an Error::InvalidData via format!() and into().
#[macro_export]
macro_rules! errdata {
    ($($args:tt)*) => { $crate::common::Error::InvalidData(format!($($args)*)).into() };
}

/// A rustybase Result returning Error.
pub type Result<T> = std::result::Result<T, Error>;

impl<T> From<Error> for Result<T> {
    fn from(error: Error) -> Self {
        Err(error)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IO(err.to_string())
    }
}

impl From<::config::ConfigError> for Error {
    fn from(err: ::config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<rustyline::error::ReadlineError> for Error {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        Error::IO(err.to_string())
    }
}
