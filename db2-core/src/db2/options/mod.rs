use crate::error::Error;
use crate::logger::LogSettings;
use log::LevelFilter;
use serde::{Deserialize, Deserializer};
use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

mod parse;

pub(crate) const DEFAULT_HOST: &str = "localhost";
pub(crate) const DEFAULT_PORT: u16 = 50000;
pub(crate) const DEFAULT_DATABASE: &str = "SAMPLE";
pub(crate) const DEFAULT_SCHEMA: &str = "DB2ADMIN";

/// Options and flags which can be used to configure a DB2 connection.
///
/// A value of `Db2ConnectOptions` can be built from [`DataSourceSettings`], parsed from a
/// connection URL of the form
///
/// ```text
/// db2://[user[:password]@]host[:port][/database][?schema=<schema>]
/// ```
///
/// or assembled field by field:
///
/// ```rust
/// # use db2_connector_core::db2::Db2ConnectOptions;
/// let mut options = Db2ConnectOptions::new();
/// options.host("db2.internal").port(50001).username("db2inst1").password("secret");
///
/// assert!(options.connection_string().contains("HOSTNAME=db2.internal;"));
/// ```
#[derive(Clone)]
pub struct Db2ConnectOptions {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) database: String,
    pub(crate) schema: String,
    pub(crate) username: Option<String>,
    pub(crate) password: Option<String>,
    pub(crate) log_settings: LogSettings,
}

impl Default for Db2ConnectOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl Db2ConnectOptions {
    /// Creates options with the DB2 defaults: `localhost:50000`, database `SAMPLE` and
    /// schema `DB2ADMIN`, with no credentials.
    pub fn new() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            database: DEFAULT_DATABASE.to_owned(),
            schema: DEFAULT_SCHEMA.to_owned(),
            username: None,
            password: None,
            log_settings: LogSettings::default(),
        }
    }

    /// Builds options from the data source settings, filling every unset field with its
    /// default. Empty strings and a zero port count as unset.
    pub fn from_settings(settings: &DataSourceSettings) -> Self {
        let mut options = Self::new();

        if let Some(host) = non_empty(&settings.host).or(non_empty(&settings.hostname)) {
            options.host(host);
        }
        if let Some(port) = settings.port.filter(|port| *port != 0) {
            options.port(port);
        }
        if let Some(database) = non_empty(&settings.database) {
            options.database(database);
        }
        if let Some(schema) = non_empty(&settings.schema) {
            options.schema(schema);
        }

        options.username = non_empty(&settings.username)
            .or(non_empty(&settings.user))
            .map(str::to_owned);
        options.password = settings.password.clone();
        options
    }

    /// Reads the options from the `DATABASE_URL` environment variable, loading a `.env` file
    /// first if one is present.
    pub fn from_env() -> Result<Self, Error> {
        // a missing .env file is not an error
        let _ = dotenvy::dotenv();

        let url = std::env::var("DATABASE_URL").map_err(Error::config)?;
        url.parse()
    }

    pub fn host(&mut self, host: &str) -> &mut Self {
        host.clone_into(&mut self.host);
        self
    }

    pub fn port(&mut self, port: u16) -> &mut Self {
        self.port = port;
        self
    }

    pub fn database(&mut self, database: &str) -> &mut Self {
        database.clone_into(&mut self.database);
        self
    }

    /// Sets the schema unqualified names resolve against (`CurrentSchema`).
    pub fn schema(&mut self, schema: &str) -> &mut Self {
        schema.clone_into(&mut self.schema);
        self
    }

    pub fn username(&mut self, username: &str) -> &mut Self {
        self.username = Some(username.to_owned());
        self
    }

    pub fn password(&mut self, password: &str) -> &mut Self {
        self.password = Some(password.to_owned());
        self
    }

    /// Log every executed statement at `level`.
    pub fn log_statements(&mut self, level: LevelFilter) -> &mut Self {
        self.log_settings.log_statements(level);
        self
    }

    /// Log statements running longer than `duration` at `level` instead.
    pub fn log_slow_statements(&mut self, level: LevelFilter, duration: Duration) -> &mut Self {
        self.log_settings.log_slow_statements(level, duration);
        self
    }

    pub fn get_host(&self) -> &str {
        &self.host
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_database(&self) -> &str {
        &self.database
    }

    pub fn get_schema(&self) -> &str {
        &self.schema
    }

    pub fn get_username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Builds the CLI connection string handed to the driver.
    ///
    /// Missing credentials render as empty `UID=` / `PWD=` values.
    pub fn connection_string(&self) -> String {
        format!(
            "DRIVER={{DB2}};DATABASE={};CurrentSchema={};HOSTNAME={};UID={};PWD={};PORT={};PROTOCOL=TCPIP",
            self.database,
            self.schema,
            self.host,
            self.username.as_deref().unwrap_or_default(),
            self.password.as_deref().unwrap_or_default(),
            self.port,
        )
    }
}

impl Debug for Db2ConnectOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db2ConnectOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// The raw connection settings of a data source, as the ORM hands them over.
///
/// `hostname` is accepted in place of `host`, and `user` in place of `username`. The port may
/// be given as a number or as a numeric string.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct DataSourceSettings {
    pub host: Option<String>,
    pub hostname: Option<String>,
    #[serde(deserialize_with = "deserialize_port")]
    pub port: Option<u16>,
    pub database: Option<String>,
    pub schema: Option<String>,
    pub username: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Debug for DataSourceSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSourceSettings")
            .field("host", &self.host)
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("username", &self.username)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn deserialize_port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Option::<Port>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Port::Number(port)) => Ok(Some(port)),
        Some(Port::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Port::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid port {:?}", text))),
    }
}
