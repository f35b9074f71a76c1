//! The native DB2 driver, through the ODBC driver manager and IBM's CLI driver.
//!
//! ODBC is a blocking C API, so every connection owns a worker thread that holds the ODBC
//! connection handle and runs one command at a time on behalf of the async side.

use crate::db2::{Db2QueryResult, Db2Value};
use crate::driver::{Driver, DriverConnection};
use crate::error::Error;
use futures_core::future::BoxFuture;
use worker::ConnectionWorker;

mod worker;

/// Opens DB2 connections through `odbc_api`.
///
/// Needs the IBM Data Server Driver registered with the driver manager under the name `DB2`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OdbcDriver;

impl OdbcDriver {
    pub fn new() -> Self {
        OdbcDriver
    }
}

impl Driver for OdbcDriver {
    type Connection = OdbcConnection;

    fn open<'a>(
        &'a self,
        connection_string: &'a str,
    ) -> BoxFuture<'a, Result<OdbcConnection, Error>> {
        Box::pin(async move {
            let worker = ConnectionWorker::establish(connection_string.to_owned()).await?;
            Ok(OdbcConnection { worker })
        })
    }
}

/// A connection to a DB2 database, served by its own worker thread.
#[derive(Debug)]
pub struct OdbcConnection {
    worker: ConnectionWorker,
}

impl DriverConnection for OdbcConnection {
    fn query<'c>(&'c mut self, sql: &'c str) -> BoxFuture<'c, Result<Db2QueryResult, Error>> {
        Box::pin(self.worker.query(sql, None))
    }

    fn query_with<'c>(
        &'c mut self,
        sql: &'c str,
        params: Vec<Db2Value>,
    ) -> BoxFuture<'c, Result<Db2QueryResult, Error>> {
        Box::pin(self.worker.query(sql, Some(params)))
    }

    fn ping(&mut self) -> BoxFuture<'_, Result<(), Error>> {
        Box::pin(self.worker.ping())
    }

    fn reset(&mut self) -> BoxFuture<'_, Result<(), Error>> {
        let alive = self.worker.is_alive();
        Box::pin(async move {
            if alive {
                Ok(())
            } else {
                Err(Error::WorkerCrashed)
            }
        })
    }

    fn close(mut self) -> BoxFuture<'static, Result<(), Error>> {
        Box::pin(async move {
            // the worker is joined when it drops
            self.worker.shutdown().await
        })
    }
}
