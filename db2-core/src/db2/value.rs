use serde::Serialize;
use std::borrow::Cow;

/// A value as exchanged with the DB2 driver, either bound as a parameter or read from a row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Db2Value {
    Null,
    Int(i64),
    Double(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Db2Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Db2Value::Null)
    }

    /// Try to get the value as text. Bytes are read as UTF-8, lossily.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Db2Value::Text(s) => Some(Cow::Borrowed(s)),
            Db2Value::Bytes(b) => Some(String::from_utf8_lossy(b)),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Db2Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Db2Value::Int(i) => Some(*i as f64),
            Db2Value::Double(f) => Some(*f),
            _ => None,
        }
    }
}

impl From<i64> for Db2Value {
    fn from(value: i64) -> Self {
        Db2Value::Int(value)
    }
}

impl From<i32> for Db2Value {
    fn from(value: i32) -> Self {
        Db2Value::Int(i64::from(value))
    }
}

impl From<f64> for Db2Value {
    fn from(value: f64) -> Self {
        Db2Value::Double(value)
    }
}

impl From<String> for Db2Value {
    fn from(value: String) -> Self {
        Db2Value::Text(value)
    }
}

impl From<&str> for Db2Value {
    fn from(value: &str) -> Self {
        Db2Value::Text(value.to_owned())
    }
}

impl From<Vec<u8>> for Db2Value {
    fn from(value: Vec<u8>) -> Self {
        Db2Value::Bytes(value)
    }
}

impl<T> From<Option<T>> for Db2Value
where
    T: Into<Db2Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Db2Value::Null, Into::into)
    }
}
