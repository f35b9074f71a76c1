//! The capabilities an ORM expects from a SQL data-source connector.

use crate::db2::types::ColumnValue;
use crate::db2::{Db2QueryResult, Db2Value, Filter};
use crate::error::Error;
use crate::model::{PropertyDescriptor, PropertyValue};
use crate::sql::ParameterizedSql;
use futures_core::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Vendor-specific options passed along with a statement.
///
/// The connector does not interpret any of them yet; they are kept so that callers can hand
/// over whatever the ORM attached to the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecuteOptions(serde_json::Map<String, serde_json::Value>);

impl ExecuteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A connector translating ORM requests to one SQL dialect.
pub trait SqlConnector: Send + Sync + 'static {
    /// The connector name the ORM registers it under.
    fn name(&self) -> &'static str;

    /// Executes a statement with its bound values.
    fn execute_sql<'a>(
        &'a self,
        sql: &'a str,
        params: Vec<Db2Value>,
        options: &'a ExecuteOptions,
    ) -> BoxFuture<'a, Result<Db2QueryResult, Error>>;

    /// Quotes an identifier for use in generated SQL.
    fn escape_name<'n>(&self, name: &'n str) -> Cow<'n, str>;

    fn from_column_value(
        &self,
        prop: Option<&PropertyDescriptor>,
        value: Db2Value,
    ) -> Result<PropertyValue, Error>;

    fn to_column_value(
        &self,
        prop: Option<&PropertyDescriptor>,
        value: &PropertyValue,
    ) -> Result<ColumnValue, Error>;

    /// Restricts `stmt` to the window of rows described by `filter`.
    fn apply_pagination(&self, stmt: ParameterizedSql, filter: &Filter) -> ParameterizedSql;

    /// Checks that the database can be reached.
    fn ping(&self) -> BoxFuture<'_, Result<(), Error>>;
}
