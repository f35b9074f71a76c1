use db2_connector::db2::{Db2Column, Db2DatabaseError, Db2TypeInfo, PING_SQL};
use db2_connector::{
    ColumnValue, DataSourceSettings, Db2ConnectOptions, Db2Connector, Db2QueryResult, Db2Row,
    Db2Value, Driver, DriverConnection, Error, ExecuteOptions, Filter, ModelDefinition,
    ParameterizedSql, PropertyDescriptor, PropertyType, PropertyValue, SqlConnector,
};
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Plain(String),
    Bound(String, Vec<Db2Value>),
}

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<Call>>,
    opened: AtomicUsize,
    resets: AtomicUsize,
    closed: AtomicUsize,
    fail_open: AtomicBool,
    fail_query: AtomicBool,
    fail_reset: AtomicBool,
}

impl Recorder {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[derive(Default, Clone)]
struct MockDriver(Arc<Recorder>);

struct MockConnection(Arc<Recorder>);

impl Driver for MockDriver {
    type Connection = MockConnection;

    fn open<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<MockConnection, Error>> {
        Box::pin(async move {
            if self.0.fail_open.load(Ordering::SeqCst) {
                return Err(Error::Protocol("SQL30081N A communication error".into()));
            }
            self.0.opened.fetch_add(1, Ordering::SeqCst);
            Ok(MockConnection(Arc::clone(&self.0)))
        })
    }
}

impl MockConnection {
    fn run(&self, call: Call) -> Result<Db2QueryResult, Error> {
        self.0.calls.lock().unwrap().push(call);

        if self.0.fail_query.load(Ordering::SeqCst) {
            return Err(Db2DatabaseError::new(
                "[IBM][CLI Driver][DB2/LINUXX8664] SQL0204N  \"DB2ADMIN.NOPE\" is an undefined name.",
                Some("42704".into()),
                Some(-204),
            )
            .into());
        }

        let columns: Arc<[Db2Column]> = Arc::from(vec![
            Db2Column::new("ID", Db2TypeInfo::new("INTEGER"), 0),
            Db2Column::new("NAME", Db2TypeInfo::new("VARCHAR"), 1),
        ]);
        let row = Db2Row::new(columns, vec![Db2Value::Int(1), Db2Value::from("Ada")])?;
        Ok(Db2QueryResult::new(vec![row], 0))
    }
}

impl DriverConnection for MockConnection {
    fn query<'c>(&'c mut self, sql: &'c str) -> BoxFuture<'c, Result<Db2QueryResult, Error>> {
        let result = self.run(Call::Plain(sql.to_owned()));
        Box::pin(async move { result })
    }

    fn query_with<'c>(
        &'c mut self,
        sql: &'c str,
        params: Vec<Db2Value>,
    ) -> BoxFuture<'c, Result<Db2QueryResult, Error>> {
        let result = self.run(Call::Bound(sql.to_owned(), params));
        Box::pin(async move { result })
    }

    fn ping(&mut self) -> BoxFuture<'_, Result<(), Error>> {
        Box::pin(async { Ok(()) })
    }

    fn reset(&mut self) -> BoxFuture<'_, Result<(), Error>> {
        self.0.resets.fetch_add(1, Ordering::SeqCst);
        let fail = self.0.fail_reset.load(Ordering::SeqCst);
        Box::pin(async move {
            if fail {
                Err(Error::WorkerCrashed)
            } else {
                Ok(())
            }
        })
    }

    fn close(self) -> BoxFuture<'static, Result<(), Error>> {
        self.0.closed.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }
}

fn setup() -> (Db2Connector<MockDriver>, Arc<Recorder>) {
    let _ = env_logger::builder().is_test(true).try_init();

    let driver = MockDriver::default();
    let recorder = Arc::clone(&driver.0);
    (Db2Connector::new(driver, Db2ConnectOptions::new()), recorder)
}

#[tokio::test]
async fn it_uses_the_plain_path_without_params() -> anyhow::Result<()> {
    let (connector, recorder) = setup();

    let result = connector
        .execute("SELECT ID, NAME FROM CUSTOMER", Vec::new(), &ExecuteOptions::new())
        .await?;

    assert_eq!(result.rows().len(), 1);
    assert_eq!(
        recorder.calls(),
        vec![Call::Plain("SELECT ID, NAME FROM CUSTOMER".into())]
    );
    Ok(())
}

#[tokio::test]
async fn it_binds_params_in_order() -> anyhow::Result<()> {
    let (connector, recorder) = setup();

    connector
        .execute(
            "INSERT INTO CUSTOMER (ID, NAME) VALUES (?, ?)",
            vec![Db2Value::Int(1), Db2Value::from("x")],
            &ExecuteOptions::new(),
        )
        .await?;

    assert_eq!(
        recorder.calls(),
        vec![Call::Bound(
            "INSERT INTO CUSTOMER (ID, NAME) VALUES (?, ?)".into(),
            vec![Db2Value::Int(1), Db2Value::from("x")],
        )]
    );
    Ok(())
}

#[tokio::test]
async fn it_releases_exactly_once_on_success() -> anyhow::Result<()> {
    let (connector, recorder) = setup();

    connector.execute("SELECT 1 FROM sysibm.sysdummy1", Vec::new(), &ExecuteOptions::new()).await?;
    connector.execute("SELECT 1 FROM sysibm.sysdummy1", Vec::new(), &ExecuteOptions::new()).await?;

    assert_eq!(recorder.resets.load(Ordering::SeqCst), 2);
    assert_eq!(recorder.opened.load(Ordering::SeqCst), 1);
    assert_eq!(connector.pool().num_idle(), 1);
    assert_eq!(connector.pool().size(), 1);
    Ok(())
}

#[tokio::test]
async fn it_releases_exactly_once_on_failure() -> anyhow::Result<()> {
    let (connector, recorder) = setup();
    recorder.fail_query.store(true, Ordering::SeqCst);

    let error = connector
        .execute("SELECT * FROM NOPE", Vec::new(), &ExecuteOptions::new())
        .await
        .unwrap_err();

    let db_error = error.as_database_error().expect("a database error");
    assert_eq!(db_error.code(), Some("42704"));
    assert_eq!(db_error.native_code(), Some(-204));
    assert!(db_error.message().contains("SQL0204N"));

    assert_eq!(recorder.resets.load(Ordering::SeqCst), 1);
    assert_eq!(connector.pool().num_idle(), 1);
    Ok(())
}

#[tokio::test]
async fn query_errors_take_precedence_over_release_errors() -> anyhow::Result<()> {
    let (connector, recorder) = setup();
    recorder.fail_query.store(true, Ordering::SeqCst);
    recorder.fail_reset.store(true, Ordering::SeqCst);

    let error = connector
        .execute("SELECT * FROM NOPE", Vec::new(), &ExecuteOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(error, Error::Database(_)), "{:?}", error);
    assert_eq!(recorder.closed.load(Ordering::SeqCst), 1);
    assert_eq!(connector.pool().size(), 0);
    Ok(())
}

#[tokio::test]
async fn release_errors_are_reported() -> anyhow::Result<()> {
    let (connector, recorder) = setup();
    recorder.fail_reset.store(true, Ordering::SeqCst);

    let error = connector.ping().await.unwrap_err();
    assert!(matches!(error, Error::Release(_)), "{:?}", error);
    Ok(())
}

#[tokio::test]
async fn acquire_errors_are_connect_errors() -> anyhow::Result<()> {
    let (connector, recorder) = setup();
    recorder.fail_open.store(true, Ordering::SeqCst);

    let error = connector
        .execute("SELECT 1 FROM sysibm.sysdummy1", Vec::new(), &ExecuteOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(error, Error::Connect(_)), "{:?}", error);
    assert!(recorder.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn a_missing_handler_is_a_usage_error() -> anyhow::Result<()> {
    let (connector, recorder) = setup();

    let result = connector.execute_with_handler(
        "SELECT 1 FROM sysibm.sysdummy1",
        Vec::new(),
        ExecuteOptions::new(),
        None::<fn(Result<Db2QueryResult, Error>)>,
    );

    match result {
        Err(Error::Usage(message)) => assert_eq!(message, "callback should be a function"),
        Err(other) => panic!("unexpected error {:?}", other),
        Ok(_) => panic!("expected a usage error"),
    }
    assert_eq!(recorder.opened.load(Ordering::SeqCst), 0);
    assert!(recorder.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn the_handler_receives_the_outcome_once() -> anyhow::Result<()> {
    let (connector, _recorder) = setup();
    let (tx, rx) = futures::channel::oneshot::channel();

    let run = connector.execute_with_handler(
        "SELECT ID, NAME FROM CUSTOMER WHERE ID = ?",
        vec![Db2Value::Int(1)],
        ExecuteOptions::new(),
        Some(move |result: Result<Db2QueryResult, Error>| {
            let _ = tx.send(result.map(|done| done.rows().len()));
        }),
    )?;

    tokio::spawn(run).await?;
    assert_eq!(rx.await?.map_err(anyhow::Error::from)?, 1);
    Ok(())
}

#[tokio::test]
async fn ping_runs_the_dummy_query() -> anyhow::Result<()> {
    let (connector, recorder) = setup();

    connector.ping().await?;
    SqlConnector::ping(&connector).await?;

    assert_eq!(
        recorder.calls(),
        vec![Call::Plain(PING_SQL.into()), Call::Plain(PING_SQL.into())]
    );
    assert_eq!(PING_SQL, "SELECT 1 FROM sysibm.sysdummy1");
    Ok(())
}

#[tokio::test]
async fn concurrent_statements_complete_independently() -> anyhow::Result<()> {
    let (connector, recorder) = setup();
    let options = ExecuteOptions::new();

    let (a, b) = futures::join!(
        connector.execute("SELECT * FROM A", Vec::new(), &options),
        connector.execute("SELECT * FROM B WHERE X = ?", vec![Db2Value::Int(2)], &options),
    );
    a?;
    b?;

    assert_eq!(recorder.calls().len(), 2);
    assert_eq!(recorder.resets.load(Ordering::SeqCst), 2);
    assert_eq!(connector.pool().size() as usize, connector.pool().num_idle());
    Ok(())
}

#[tokio::test]
async fn closed_connectors_fail_with_pool_closed() -> anyhow::Result<()> {
    let (connector, recorder) = setup();
    connector.ping().await?;
    connector.close().await;

    assert!(matches!(connector.ping().await, Err(Error::PoolClosed)));
    assert_eq!(recorder.closed.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn it_serves_the_orm_through_the_connector_trait() -> anyhow::Result<()> {
    let settings: DataSourceSettings = serde_json::from_value(serde_json::json!({
        "hostname": "db2.example.com",
        "port": "50001",
        "username": "db2inst1",
        "password": "secret",
    }))?;
    let driver = MockDriver::default();
    let recorder = Arc::clone(&driver.0);
    let connector = Db2Connector::initialize(driver, &settings);
    let orm: &dyn SqlConnector = &connector;

    assert_eq!(orm.name(), "db2");
    assert_eq!(orm.escape_name("CUSTOMER"), "CUSTOMER");
    assert!(connector.connection_string().contains("HOSTNAME=db2.example.com;"));
    assert!(connector.connection_string().contains("PORT=50001;"));

    let created = "2024-01-02T03:04:05.006Z".parse::<chrono::DateTime<chrono::Utc>>()?;
    let since = orm.to_column_value(
        Some(&PropertyDescriptor::new(PropertyType::Timestamp)),
        &PropertyValue::DateTime(created),
    )?;
    let ColumnValue::Expression(since) = since else {
        panic!("timestamps are written through to_timestamp");
    };

    let stmt = ParameterizedSql::from("SELECT ID, NAME FROM CUSTOMER WHERE CREATED >")
        .merge(since);
    let stmt = orm.apply_pagination(stmt, &Filter::new().offset(10).limit(5));
    assert!(stmt.sql().ends_with("WHERE rownum > 10 AND rownum <= 15"));

    let (sql, params) = stmt.into_parts();
    let result = orm.execute_sql(&sql, params, &ExecuteOptions::new()).await?;
    assert_eq!(
        recorder.calls(),
        vec![Call::Bound(
            sql.clone(),
            vec![Db2Value::from("2024-01-02 03:04:05.006")],
        )]
    );

    let model = ModelDefinition::new("Customer")
        .property("id", PropertyType::Number)
        .property("name", PropertyType::String);
    let values = connector.from_row(&model, &result.rows()[0])?;
    assert_eq!(
        values,
        vec![
            ("id".to_owned(), PropertyValue::Number(1.0)),
            ("name".to_owned(), PropertyValue::from("Ada")),
        ]
    );
    Ok(())
}
