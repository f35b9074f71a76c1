use std::sync::Arc;
use std::thread;

use flume::TrySendError;
use futures_channel::oneshot;
use odbc_api::handles::{AsStatementRef, Statement};
use odbc_api::{Cursor, CursorRow, DataType, IntoParameter, ResultSetMetadata};

use crate::db2::{Db2Column, Db2QueryResult, Db2Row, Db2TypeInfo, Db2Value, PING_SQL};
use crate::error::Error;

type OdbcConnection = odbc_api::Connection<'static>;
type QueryResult = Result<Db2QueryResult, Error>;

#[derive(Debug)]
pub(crate) struct ConnectionWorker {
    command_tx: flume::Sender<Command>,
    join_handle: Option<thread::JoinHandle<()>>,
}

enum Command {
    Query {
        sql: Box<str>,
        params: Option<Vec<Db2Value>>,
        tx: oneshot::Sender<QueryResult>,
    },
    Ping {
        tx: oneshot::Sender<Result<(), Error>>,
    },
    Shutdown {
        tx: oneshot::Sender<()>,
    },
}

impl Drop for ConnectionWorker {
    fn drop(&mut self) {
        self.shutdown_sync();
    }
}

impl ConnectionWorker {
    pub(crate) async fn establish(connection_string: String) -> Result<Self, Error> {
        let (command_tx, command_rx) = flume::bounded(64);
        let (conn_tx, conn_rx) = oneshot::channel();
        let thread = thread::Builder::new()
            .name("db2-odbc-conn".into())
            .spawn(move || worker_thread_main(&connection_string, command_rx, conn_tx))?;

        conn_rx.await.map_err(|_| Error::WorkerCrashed)??;
        Ok(ConnectionWorker {
            command_tx,
            join_handle: Some(thread),
        })
    }

    pub(crate) fn is_alive(&self) -> bool {
        !self.command_tx.is_disconnected()
    }

    pub(crate) async fn query(
        &mut self,
        sql: &str,
        params: Option<Vec<Db2Value>>,
    ) -> Result<Db2QueryResult, Error> {
        let (tx, rx) = oneshot::channel();
        let cmd = Command::Query {
            sql: sql.into(),
            params,
            tx,
        };
        send_command_and_await(&self.command_tx, cmd, rx).await?
    }

    pub(crate) async fn ping(&mut self) -> Result<(), Error> {
        let (tx, rx) = oneshot::channel();
        send_command_and_await(&self.command_tx, Command::Ping { tx }, rx).await?
    }

    pub(crate) async fn shutdown(&mut self) -> Result<(), Error> {
        let (tx, rx) = oneshot::channel();
        send_command_and_await(&self.command_tx, Command::Shutdown { tx }, rx).await
    }

    pub(crate) fn shutdown_sync(&mut self) {
        // try_send keeps Drop from blocking on a full queue
        if let Some(join_handle) = self.join_handle.take() {
            let (mut tx, _rx) = oneshot::channel();
            while let Err(TrySendError::Full(Command::Shutdown { tx: t })) =
                self.command_tx.try_send(Command::Shutdown { tx })
            {
                tx = t;
                log::warn!("db2 worker thread queue is full, retrying...");
                thread::sleep(std::time::Duration::from_millis(10));
            }
            if join_handle.join().is_err() {
                log::error!("db2 worker thread panicked while shutting down");
            }
        }
    }
}

fn worker_thread_main(
    connection_string: &str,
    command_rx: flume::Receiver<Command>,
    conn_tx: oneshot::Sender<Result<(), Error>>,
) {
    let conn = match establish_connection(connection_string) {
        Ok(conn) => {
            let _ = conn_tx.send(Ok(()));
            conn
        }
        Err(e) => {
            let _ = conn_tx.send(Err(e));
            return;
        }
    };

    while let Ok(cmd) = command_rx.recv() {
        match cmd {
            Command::Query { sql, params, tx } => {
                let _ = tx.send(execute_sql(&conn, &sql, params));
            }
            Command::Ping { tx } => {
                let _ = tx.send(execute_sql(&conn, PING_SQL, None).map(|_| ()));
            }
            Command::Shutdown { tx } => {
                drop(conn);
                let _ = tx.send(());
                return;
            }
        }
    }
    // every sender is gone; the connection closes with this thread
}

fn establish_connection(connection_string: &str) -> Result<OdbcConnection, Error> {
    let env = odbc_api::environment().map_err(|e| Error::Configuration(e.to_string().into()))?;

    let conn = env.connect_with_connection_string(connection_string, Default::default())?;
    Ok(conn)
}

async fn send_command_and_await<T>(
    command_tx: &flume::Sender<Command>,
    cmd: Command,
    rx: oneshot::Receiver<T>,
) -> Result<T, Error> {
    command_tx
        .send_async(cmd)
        .await
        .map_err(|_| Error::WorkerCrashed)?;
    rx.await.map_err(|_| Error::WorkerCrashed)
}

fn execute_sql(conn: &OdbcConnection, sql: &str, params: Option<Vec<Db2Value>>) -> QueryResult {
    let mut preallocated = conn.preallocate()?;

    let rows = match params {
        Some(params) => {
            let params: Vec<_> = params.into_iter().map(to_param).collect();
            match preallocated.execute(sql, &params[..])? {
                Some(cursor) => collect_rows(cursor)?,
                None => Vec::new(),
            }
        }
        None => match preallocated.execute(sql, ())? {
            Some(cursor) => collect_rows(cursor)?,
            None => Vec::new(),
        },
    };

    let rows_affected = extract_rows_affected(&mut preallocated);
    Ok(Db2QueryResult::new(rows, rows_affected))
}

fn extract_rows_affected<S: AsStatementRef>(stmt: &mut S) -> u64 {
    let mut stmt_ref = stmt.as_stmt_ref();
    let count = match stmt_ref.row_count().into_result(&stmt_ref) {
        Ok(count) => count,
        Err(e) => {
            log::warn!("failed to get row count: {}", e);
            return 0;
        }
    };

    // -1 when the driver cannot tell, e.g. after a SELECT
    u64::try_from(count).unwrap_or(0)
}

fn to_param(value: Db2Value) -> Box<dyn odbc_api::parameter::InputParameter + 'static> {
    match value {
        Db2Value::Int(i) => Box::new(i.into_parameter()),
        Db2Value::Double(f) => Box::new(f.into_parameter()),
        Db2Value::Text(s) => Box::new(s.into_parameter()),
        Db2Value::Bytes(b) => Box::new(b.into_parameter()),
        Db2Value::Null => Box::new(Option::<String>::None.into_parameter()),
    }
}

/// How a column's cells are read and converted.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum CellKind {
    Int,
    Double,
    Binary,
    Text,
}

fn cell_kind(data_type: &DataType) -> CellKind {
    match data_type {
        DataType::Bit
        | DataType::TinyInt
        | DataType::SmallInt
        | DataType::Integer
        | DataType::BigInt => CellKind::Int,
        DataType::Real | DataType::Float { .. } | DataType::Double => CellKind::Double,
        DataType::Binary { .. } | DataType::Varbinary { .. } | DataType::LongVarbinary { .. } => {
            CellKind::Binary
        }
        // DECIMAL keeps its exact text
        _ => CellKind::Text,
    }
}

fn type_name(data_type: &DataType) -> &'static str {
    match data_type {
        DataType::Bit => "BOOLEAN",
        DataType::TinyInt | DataType::SmallInt => "SMALLINT",
        DataType::Integer => "INTEGER",
        DataType::BigInt => "BIGINT",
        DataType::Real => "REAL",
        DataType::Float { .. } | DataType::Double => "DOUBLE",
        DataType::Decimal { .. } => "DECIMAL",
        DataType::Numeric { .. } => "NUMERIC",
        DataType::Char { .. } | DataType::WChar { .. } => "CHAR",
        DataType::Varchar { .. } | DataType::WVarchar { .. } => "VARCHAR",
        DataType::LongVarchar { .. } => "CLOB",
        DataType::Binary { .. } => "BINARY",
        DataType::Varbinary { .. } => "VARBINARY",
        DataType::LongVarbinary { .. } => "BLOB",
        DataType::Date => "DATE",
        DataType::Time { .. } => "TIME",
        DataType::Timestamp { .. } => "TIMESTAMP",
        _ => "UNKNOWN",
    }
}

fn collect_rows<C>(mut cursor: C) -> Result<Vec<Db2Row>, Error>
where
    C: Cursor + ResultSetMetadata,
{
    let (columns, kinds) = collect_columns(&mut cursor);
    let columns: Arc<[Db2Column]> = columns.into();

    let mut rows = Vec::new();
    while let Some(mut row) = cursor.next_row()? {
        let values = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| collect_column_value(&mut row, (i + 1) as u16, *kind))
            .collect::<Result<Vec<_>, Error>>()?;

        rows.push(Db2Row::new(Arc::clone(&columns), values)?);
    }

    Ok(rows)
}

fn collect_columns<C>(cursor: &mut C) -> (Vec<Db2Column>, Vec<CellKind>)
where
    C: ResultSetMetadata,
{
    let count = cursor.num_result_cols().unwrap_or(0);

    (1..=count)
        .map(|i| {
            let index = i as u16;
            let mut cd = odbc_api::ColumnDescription::default();
            let _ = cursor.describe_col(index, &mut cd);

            let name = String::from_utf8(cd.name).unwrap_or_else(|_| format!("col{}", index - 1));
            let column = Db2Column::new(
                name,
                Db2TypeInfo::new(type_name(&cd.data_type)),
                usize::from(index - 1),
            );
            (column, cell_kind(&cd.data_type))
        })
        .unzip()
}

fn collect_column_value(
    row: &mut CursorRow<'_>,
    col_idx: u16,
    kind: CellKind,
) -> Result<Db2Value, Error> {
    let mut buf = Vec::new();

    if kind == CellKind::Binary {
        return Ok(match row.get_binary(col_idx, &mut buf)? {
            true => Db2Value::Bytes(buf),
            false => Db2Value::Null,
        });
    }

    if !row.get_text(col_idx, &mut buf)? {
        return Ok(Db2Value::Null);
    }

    let text = match String::from_utf8(buf) {
        Ok(text) => text,
        Err(e) => return Ok(Db2Value::Bytes(e.into_bytes())),
    };

    Ok(parse_cell(text, kind))
}

fn parse_cell(text: String, kind: CellKind) -> Db2Value {
    match kind {
        CellKind::Int => match text.trim().parse() {
            Ok(i) => Db2Value::Int(i),
            Err(_) => Db2Value::Text(text),
        },
        CellKind::Double => match text.trim().parse() {
            Ok(f) => Db2Value::Double(f),
            Err(_) => Db2Value::Text(text),
        },
        CellKind::Binary | CellKind::Text => Db2Value::Text(text),
    }
}
