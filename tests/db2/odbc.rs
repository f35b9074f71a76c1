use db2_connector::{
    apply_pagination, from_column_value, Db2ConnectOptions, Db2Connector, Db2Value,
    ExecuteOptions, Filter, OdbcDriver, ParameterizedSql, PropertyDescriptor, PropertyType,
    PropertyValue,
};

fn read(ty: PropertyType, value: &Db2Value) -> db2_connector::Result<PropertyValue> {
    from_column_value(Some(&PropertyDescriptor::new(ty)), value.clone())
}

fn connect() -> anyhow::Result<Db2Connector<OdbcDriver>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let options = Db2ConnectOptions::from_env()?;
    Ok(Db2Connector::new(OdbcDriver::new(), options))
}

#[tokio::test]
async fn it_connects_and_pings() -> anyhow::Result<()> {
    let connector = connect()?;
    connector.ping().await?;
    connector.close().await;
    Ok(())
}

#[tokio::test]
async fn it_binds_parameters() -> anyhow::Result<()> {
    let connector = connect()?;

    let result = connector
        .execute(
            "SELECT CAST(? AS INTEGER) AS N, CAST(? AS VARCHAR(10)) AS S FROM sysibm.sysdummy1",
            vec![Db2Value::Int(42), Db2Value::from("x")],
            &ExecuteOptions::new(),
        )
        .await?;

    let row = &result.rows()[0];
    assert_eq!(row.try_get_raw("n")?, &Db2Value::Int(42));
    assert_eq!(row.try_get_raw("S")?, &Db2Value::from("x"));
    Ok(())
}

#[tokio::test]
async fn it_pages_with_row_numbers() -> anyhow::Result<()> {
    let connector = connect()?;

    let base = ParameterizedSql::from(
        "SELECT TABNAME FROM SYSCAT.TABLES WHERE TABSCHEMA = 'SYSCAT' ORDER BY TABNAME",
    );
    let paged = apply_pagination(base, &Filter::new().offset(2).limit(3));
    let result = connector.execute_stmt(paged, &ExecuteOptions::new()).await?;

    assert_eq!(result.rows().len(), 3);
    Ok(())
}

#[tokio::test]
async fn it_reads_timestamps_and_booleans() -> anyhow::Result<()> {
    let connector = connect()?;

    let stmt = ParameterizedSql::new(
        "SELECT to_timestamp(?,'yyyy-mm-dd hh24:mi:ss.ff3') AS TS, 'Y' AS FLAG FROM sysibm.sysdummy1",
        vec![Db2Value::from("2024-01-02 03:04:05.006")],
    );
    let result = connector.execute_stmt(stmt, &ExecuteOptions::new()).await?;
    let row = &result.rows()[0];

    let ts = read(PropertyType::Timestamp, row.try_get_raw("TS")?)?;
    let expected = "2024-01-02T03:04:05.006Z".parse::<chrono::DateTime<chrono::Utc>>()?;
    assert_eq!(ts, PropertyValue::DateTime(expected));

    let flag = read(PropertyType::Boolean, row.try_get_raw("FLAG")?)?;
    assert_eq!(flag, PropertyValue::Boolean(true));
    Ok(())
}

#[tokio::test]
async fn it_reports_database_errors() -> anyhow::Result<()> {
    let connector = connect()?;

    let error = connector
        .execute("SELECT * FROM NO_SUCH_TABLE_X", Vec::new(), &ExecuteOptions::new())
        .await
        .unwrap_err();

    let db_error = error.as_database_error().expect("a database error");
    assert!(db_error.message().contains("SQL0204N"), "{}", db_error);
    assert!(db_error.code().is_some());

    // the connection went back to the pool
    assert_eq!(connector.pool().num_idle(), 1);
    Ok(())
}
