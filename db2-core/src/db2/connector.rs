use crate::connector::{ExecuteOptions, SqlConnector};
use crate::db2::pagination::{self, Filter};
use crate::db2::types::{self, ColumnValue};
use crate::db2::{DataSourceSettings, Db2ConnectOptions, Db2QueryResult, Db2Row, Db2Value};
use crate::driver::{Driver, DriverConnection};
use crate::error::Error;
use crate::logger::QueryLogger;
use crate::model::{ModelDefinition, PropertyDescriptor, PropertyValue};
use crate::pool::{Pool, PoolOptions};
use crate::sql::ParameterizedSql;
use futures_core::future::BoxFuture;
use std::borrow::Cow;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// The health check statement; `sysibm.sysdummy1` always holds exactly one row.
pub const PING_SQL: &str = "SELECT 1 FROM sysibm.sysdummy1";

/// A DB2 data source: its settings and the pool its statements run on.
///
/// Cloning shares the pool. Every statement borrows one connection for its own duration and
/// gives it back before its outcome is delivered.
pub struct Db2Connector<D: Driver> {
    options: Arc<Db2ConnectOptions>,
    pool: Pool<D>,
}

impl<D: Driver> Db2Connector<D> {
    /// Creates a connector with a default-sized pool.
    pub fn new(driver: D, options: Db2ConnectOptions) -> Self {
        Self::with_pool_options(driver, options, PoolOptions::default())
    }

    pub fn with_pool_options(driver: D, options: Db2ConnectOptions, pool: PoolOptions) -> Self {
        let pool = Pool::new(driver, options.connection_string(), pool);

        Self {
            options: Arc::new(options),
            pool,
        }
    }

    /// Creates the connector for a data source from its raw settings.
    pub fn initialize(driver: D, settings: &DataSourceSettings) -> Self {
        let options = Db2ConnectOptions::from_settings(settings);
        log::debug!("settings {:?}", options);

        Self::new(driver, options)
    }

    pub fn options(&self) -> &Db2ConnectOptions {
        &self.options
    }

    pub fn connection_string(&self) -> &str {
        self.pool.connection_string()
    }

    pub fn pool(&self) -> &Pool<D> {
        &self.pool
    }

    /// Executes `sql` on a pooled connection.
    ///
    /// Without `params` the statement runs as a plain query, otherwise `params` are bound to
    /// its placeholders in order. The connection is released whatever the outcome; a failed
    /// statement is reported over a failed release.
    pub async fn execute(
        &self,
        sql: &str,
        params: Vec<Db2Value>,
        _options: &ExecuteOptions,
    ) -> Result<Db2QueryResult, Error> {
        let mut conn = self.pool.acquire().await?;

        let result = {
            let mut logger = QueryLogger::new(sql, &params, &self.options.log_settings);

            let result = if params.is_empty() {
                conn.query(sql).await
            } else {
                conn.query_with(sql, params).await
            };

            match &result {
                Ok(done) => {
                    logger.increase_rows_returned(done.rows().len() as u64);
                    logger.increase_rows_affected(done.rows_affected());
                }
                Err(_) => logger.set_failed(),
            }

            result
        };

        let released = conn.release().await;

        let done = result?;
        released?;

        Ok(done)
    }

    /// Executes a [`ParameterizedSql`] statement.
    pub async fn execute_stmt(
        &self,
        stmt: ParameterizedSql,
        options: &ExecuteOptions,
    ) -> Result<Db2QueryResult, Error> {
        let (sql, params) = stmt.into_parts();
        self.execute(&sql, params, options).await
    }

    /// Completion-handler form of [`execute`][Db2Connector::execute].
    ///
    /// Fails right away with [`Error::Usage`] when no handler is given; nothing is acquired in
    /// that case. Otherwise the returned future runs the statement and hands its outcome to
    /// `handler`.
    pub fn execute_with_handler<H>(
        &self,
        sql: impl Into<String>,
        params: Vec<Db2Value>,
        options: ExecuteOptions,
        handler: Option<H>,
    ) -> Result<BoxFuture<'static, ()>, Error>
    where
        H: FnOnce(Result<Db2QueryResult, Error>) + Send + 'static,
    {
        let handler =
            handler.ok_or_else(|| Error::Usage(Cow::Borrowed("callback should be a function")))?;

        let connector = self.clone();
        let sql = sql.into();

        Ok(Box::pin(async move {
            let result = connector.execute(&sql, params, &options).await;
            handler(result);
        }))
    }

    /// Runs the health check statement.
    pub async fn ping(&self) -> Result<(), Error> {
        self.execute(PING_SQL, Vec::new(), &ExecuteOptions::default())
            .await
            .map(|_| ())
    }

    /// Closes the pool. Statements executed afterwards fail with [`Error::PoolClosed`].
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Converts a row into the values of `model`'s properties, in declaration order.
    ///
    /// Each property is read from its DB2 column name, or from a column named after the
    /// property. Properties without a matching column are left out.
    pub fn from_row(
        &self,
        model: &ModelDefinition,
        row: &Db2Row,
    ) -> Result<Vec<(String, PropertyValue)>, Error> {
        let mut values = Vec::with_capacity(model.properties.len());

        for (name, prop) in &model.properties {
            let column = prop.column_name().unwrap_or(name);

            let raw = match row.try_get_raw(column) {
                Ok(raw) => raw.clone(),
                Err(Error::ColumnNotFound(_)) => continue,
                Err(e) => return Err(e),
            };

            values.push((name.clone(), types::from_column_value(Some(prop), raw)?));
        }

        Ok(values)
    }
}

impl<D: Driver> SqlConnector for Db2Connector<D> {
    fn name(&self) -> &'static str {
        "db2"
    }

    fn execute_sql<'a>(
        &'a self,
        sql: &'a str,
        params: Vec<Db2Value>,
        options: &'a ExecuteOptions,
    ) -> BoxFuture<'a, Result<Db2QueryResult, Error>> {
        Box::pin(self.execute(sql, params, options))
    }

    /// DB2 identifiers are used as given.
    fn escape_name<'n>(&self, name: &'n str) -> Cow<'n, str> {
        Cow::Borrowed(name)
    }

    fn from_column_value(
        &self,
        prop: Option<&PropertyDescriptor>,
        value: Db2Value,
    ) -> Result<PropertyValue, Error> {
        types::from_column_value(prop, value)
    }

    fn to_column_value(
        &self,
        prop: Option<&PropertyDescriptor>,
        value: &PropertyValue,
    ) -> Result<ColumnValue, Error> {
        types::to_column_value(prop, value)
    }

    fn apply_pagination(&self, stmt: ParameterizedSql, filter: &Filter) -> ParameterizedSql {
        pagination::apply_pagination(stmt, filter)
    }

    fn ping(&self) -> BoxFuture<'_, Result<(), Error>> {
        Box::pin(Db2Connector::ping(self))
    }
}

impl<D: Driver> Clone for Db2Connector<D> {
    fn clone(&self) -> Self {
        Self {
            options: Arc::clone(&self.options),
            pool: self.pool.clone(),
        }
    }
}

impl<D: Driver> Debug for Db2Connector<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db2Connector")
            .field("options", &self.options)
            .field("pool", &self.pool)
            .finish()
    }
}
