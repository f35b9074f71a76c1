//! Types for working with errors produced by the connector.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::io;

use crate::db2::Db2DatabaseError;

/// A specialized `Result` type for the connector.
pub type Result<T, E = Error> = std::result::Result<T, E>;

// Convenience type alias for usage within the crate.
// Do not make this type public.
pub type BoxDynError = Box<dyn StdError + 'static + Send + Sync>;

/// Represents all the ways a method can fail.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Error occurred while parsing connection settings.
    #[error("error with configuration: {0}")]
    Configuration(#[source] BoxDynError),

    /// The caller broke the calling contract (e.g. no completion handler was given).
    #[error("invalid usage: {0}")]
    Usage(Cow<'static, str>),

    /// The pool could not hand out a connection.
    #[error("error acquiring a connection: {0}")]
    Connect(#[source] BoxDynError),

    /// Error returned from the database while executing a statement.
    #[error("error returned from database: {0}")]
    Database(#[source] Box<Db2DatabaseError>),

    /// Returning a connection to the pool failed.
    #[error("error releasing a connection: {0}")]
    Release(#[source] BoxDynError),

    /// [`Pool::close`][crate::pool::Pool::close] was called while we were waiting in
    /// [`Pool::acquire`][crate::pool::Pool::acquire].
    #[error("attempted to acquire a connection on a closed pool")]
    PoolClosed,

    /// Unexpected or invalid data encountered while communicating with the driver.
    #[error("encountered unexpected or invalid data: {0}")]
    Protocol(String),

    /// Error occurred while converting a driver value into a property value.
    #[error("error occurred while decoding: {0}")]
    Decode(#[source] BoxDynError),

    /// Error occurred while converting a property value into a column value.
    #[error("error occurred while encoding a value: {0}")]
    Encode(#[source] BoxDynError),

    /// No column found for the given name.
    #[error("no column found for name: {0}")]
    ColumnNotFound(String),

    /// A background worker has crashed.
    #[error("attempted to communicate with a crashed background worker")]
    WorkerCrashed,

    /// Error communicating with the database backend.
    #[error("error communicating with database: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub fn into_database_error(self) -> Option<Box<Db2DatabaseError>> {
        match self {
            Error::Database(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_database_error(&self) -> Option<&Db2DatabaseError> {
        match self {
            Error::Database(err) => Some(&**err),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn config(err: impl StdError + Send + Sync + 'static) -> Self {
        Error::Configuration(err.into())
    }

    /// Wraps a driver failure raised while producing a connection.
    pub(crate) fn connect(err: Error) -> Self {
        match err {
            err @ (Error::Connect(_) | Error::PoolClosed) => err,
            err => Error::Connect(Box::new(err)),
        }
    }

    /// Wraps a failure raised while handing a connection back.
    pub(crate) fn release(err: Error) -> Self {
        match err {
            err @ Error::Release(_) => err,
            err => Error::Release(Box::new(err)),
        }
    }
}

impl From<Db2DatabaseError> for Error {
    #[inline]
    fn from(error: Db2DatabaseError) -> Self {
        Error::Database(Box::new(error))
    }
}

/// The classification of an error returned by the database, derived from its SQLSTATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Unique/primary key constraint violation.
    UniqueViolation,
    /// Foreign key constraint violation.
    ForeignKeyViolation,
    /// Not-null constraint violation.
    NotNullViolation,
    /// Check constraint violation.
    CheckViolation,
    /// An unmapped error.
    Other,
}
