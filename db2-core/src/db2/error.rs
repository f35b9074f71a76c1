use crate::error::ErrorKind;
use std::fmt::{self, Display, Formatter};

/// An error returned by the DB2 server or its driver while executing a statement.
///
/// The message is the driver-native diagnostic text, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Db2DatabaseError {
    pub(crate) message: String,
    pub(crate) sqlstate: Option<String>,
    pub(crate) native_code: Option<i32>,
}

impl Db2DatabaseError {
    pub fn new(
        message: impl Into<String>,
        sqlstate: Option<String>,
        native_code: Option<i32>,
    ) -> Self {
        Self {
            message: message.into(),
            sqlstate,
            native_code,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The five character SQLSTATE reported with the error.
    pub fn code(&self) -> Option<&str> {
        self.sqlstate.as_deref()
    }

    /// The DB2 SQLCODE, e.g. `-803` for a duplicate key.
    pub fn native_code(&self) -> Option<i32> {
        self.native_code
    }

    pub fn kind(&self) -> ErrorKind {
        match self.sqlstate.as_deref() {
            Some("23505") => ErrorKind::UniqueViolation,
            Some("23503") => ErrorKind::ForeignKeyViolation,
            Some("23502") => ErrorKind::NotNullViolation,
            Some("23513") => ErrorKind::CheckViolation,
            _ => ErrorKind::Other,
        }
    }
}

impl Display for Db2DatabaseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.sqlstate {
            Some(state) => write!(f, "{}: {}", state, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for Db2DatabaseError {}

#[cfg(feature = "odbc")]
impl From<odbc_api::Error> for Db2DatabaseError {
    fn from(error: odbc_api::Error) -> Self {
        let (sqlstate, native_code) = match &error {
            odbc_api::Error::Diagnostics { record, .. } => {
                (Some(record.state.as_str().to_owned()), Some(record.native_error))
            }
            _ => (None, None),
        };

        Db2DatabaseError {
            message: error.to_string(),
            sqlstate,
            native_code,
        }
    }
}

#[cfg(feature = "odbc")]
impl From<odbc_api::Error> for crate::error::Error {
    fn from(value: odbc_api::Error) -> Self {
        crate::error::Error::Database(Box::new(Db2DatabaseError::from(value)))
    }
}
