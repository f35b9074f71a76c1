//! The seam between the connector and the native DB2 driver.
//!
//! The connector never talks to the database directly. A [`Driver`] opens connections from a
//! connection string and each [`DriverConnection`] runs statements. The ODBC binding in
//! [`crate::db2::odbc`] is the production implementation; tests inject their own.

use crate::db2::{Db2QueryResult, Db2Value};
use crate::error::Error;
use futures_core::future::BoxFuture;

/// Opens connections to a DB2 server.
pub trait Driver: Send + Sync + 'static {
    type Connection: DriverConnection;

    /// Open a new connection described by `connection_string`.
    fn open<'a>(&'a self, connection_string: &'a str)
        -> BoxFuture<'a, Result<Self::Connection, Error>>;
}

/// A single open connection, owned by the pool between statements.
pub trait DriverConnection: Send + 'static {
    /// Run `sql` as a plain (unprepared, unbound) statement.
    fn query<'c>(&'c mut self, sql: &'c str) -> BoxFuture<'c, Result<Db2QueryResult, Error>>;

    /// Run `sql` with `params` bound to its placeholders, in order.
    fn query_with<'c>(
        &'c mut self,
        sql: &'c str,
        params: Vec<Db2Value>,
    ) -> BoxFuture<'c, Result<Db2QueryResult, Error>>;

    /// Checks if the connection is still valid.
    fn ping(&mut self) -> BoxFuture<'_, Result<(), Error>>;

    /// Prepare the connection for reuse by the next borrower.
    fn reset(&mut self) -> BoxFuture<'_, Result<(), Error>>;

    /// Explicitly close this connection.
    fn close(self) -> BoxFuture<'static, Result<(), Error>>;
}
