#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub use db2_core::connector::{ExecuteOptions, SqlConnector};
pub use db2_core::driver::{Driver, DriverConnection};
pub use db2_core::error::{self, Error, ErrorKind, Result};
pub use db2_core::model::{
    CustomConverter, Db2PropertySettings, ModelDefinition, PropertyDescriptor, PropertyType,
    PropertyValue,
};
pub use db2_core::pool::{self, Pool, PoolConnection, PoolOptions};
pub use db2_core::sql::ParameterizedSql;

pub use db2_core::db2::{
    self, apply_pagination, from_column_value, to_column_value, ColumnValue, DataSourceSettings,
    Db2ConnectOptions, Db2Connector, Db2QueryResult, Db2Row, Db2Value, Filter,
};

#[cfg(feature = "odbc")]
#[cfg_attr(docsrs, doc(cfg(feature = "odbc")))]
pub use db2_core::db2::odbc::{OdbcConnection, OdbcDriver};

/// Creates a connector for `settings` backed by the native ODBC driver.
#[cfg(feature = "odbc")]
#[cfg_attr(docsrs, doc(cfg(feature = "odbc")))]
pub fn initialize(settings: &DataSourceSettings) -> Db2Connector<OdbcDriver> {
    Db2Connector::initialize(OdbcDriver::new(), settings)
}
