//! IBM DB2 connector.

mod column;
mod connector;
mod error;
mod options;
mod pagination;
mod query_result;
mod row;
mod type_info;
pub mod types;
mod value;

#[cfg(feature = "odbc")]
pub mod odbc;

pub use column::Db2Column;
pub use connector::{Db2Connector, PING_SQL};
pub use error::Db2DatabaseError;
pub use options::{DataSourceSettings, Db2ConnectOptions};
pub use pagination::{apply_pagination, Filter};
pub use query_result::Db2QueryResult;
pub use row::Db2Row;
pub use type_info::Db2TypeInfo;
pub use types::{from_column_value, to_column_value, ColumnValue};
pub use value::Db2Value;

pub use crate::connector::ExecuteOptions;
