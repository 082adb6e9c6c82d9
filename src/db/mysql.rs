//! MySQL database client implementation.
//!
//! Provides the `MySqlClient` struct that implements the `DatabaseClient`
//! trait using sqlx. Every query opens a fresh connection from the stored
//! descriptor and closes it before returning, so the client itself never
//! holds a live connection between calls.

use crate::config::DatabaseConfig;
use crate::db::{ColumnInfo, DatabaseClient, QueryResult, Row, Value};
use crate::error::{HarvestError, Result};
use async_trait::async_trait;
use sqlx::mysql::{MySqlColumn, MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{
    Column as SqlxColumn, ConnectOptions, Connection, Executor, Row as SqlxRow, Statement, TypeInfo,
};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Query timeout in seconds.
const QUERY_TIMEOUT_SECS: u64 = 30;

/// MySQL database client.
#[derive(Debug, Clone)]
pub struct MySqlClient {
    config: DatabaseConfig,
}

impl MySqlClient {
    /// Creates a new client from a connection descriptor.
    ///
    /// The user and database name must be present in the descriptor; there
    /// are no fallback credentials.
    pub fn new(config: DatabaseConfig) -> Result<Self> {
        if config.user.is_none() {
            return Err(HarvestError::config(
                "Database user is required (set [database].user or HARVEST_DB_USER)",
            ));
        }
        if config.database.is_none() {
            return Err(HarvestError::config(
                "Database name is required (set [database].database or HARVEST_DB_NAME)",
            ));
        }

        Ok(Self { config })
    }

    fn connect_options(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(self.config.host.as_deref().unwrap_or("localhost"))
            .port(self.config.port);

        if let Some(user) = &self.config.user {
            options = options.username(user);
        }
        if let Some(password) = &self.config.password {
            options = options.password(password);
        }
        if let Some(database) = &self.config.database {
            options = options.database(database);
        }

        options
    }

    async fn connect(&self) -> Result<MySqlConnection> {
        debug!("Connecting to {}", self.config.display_string());

        self.connect_options()
            .connect()
            .await
            .map_err(|e| map_connection_error(e, &self.config))
    }

    async fn run_query(
        &self,
        conn: &mut MySqlConnection,
        sql: &str,
        params: &[Value],
    ) -> Result<QueryResult> {
        let start = Instant::now();

        // Prepare first so column metadata survives an empty result set.
        let statement = conn
            .prepare(sql)
            .await
            .map_err(|e| HarvestError::query(format_query_error(e)))?;

        let columns: Vec<ColumnInfo> = statement
            .columns()
            .iter()
            .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
            .collect();

        let mut query = statement.query();
        for param in params {
            query = match param {
                Value::Null => query.bind(Option::<String>::None),
                Value::Bool(b) => query.bind(*b),
                Value::Int(i) => query.bind(*i),
                Value::UInt(u) => query.bind(*u),
                Value::Float(f) => query.bind(*f),
                Value::String(s) => query.bind(s.clone()),
                Value::Bytes(b) => query.bind(b.clone()),
                Value::Json(j) => query.bind(j.clone()),
            };
        }

        let result = tokio::time::timeout(
            Duration::from_secs(QUERY_TIMEOUT_SECS),
            query.fetch_all(&mut *conn),
        )
        .await
        .map_err(|_| {
            HarvestError::query(format!(
                "Query timed out after {QUERY_TIMEOUT_SECS} seconds"
            ))
        })?
        .map_err(|e| HarvestError::query(format_query_error(e)))?;

        let execution_time = start.elapsed();

        let rows: Vec<Row> = result.iter().map(convert_row).collect();
        let row_count = rows.len();

        debug!("Query returned {} rows in {:?}", row_count, execution_time);

        Ok(QueryResult {
            columns,
            rows,
            execution_time,
            row_count,
        })
    }
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    async fn execute_query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let mut conn = self.connect().await?;

        let result = self.run_query(&mut conn, sql, params).await;

        // The connection is closed whether the query succeeded or not.
        if let Err(e) = conn.close().await {
            warn!("Error closing connection: {e}");
        }

        result
    }
}

/// Converts a sqlx MySqlRow to our Row type.
fn convert_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .map(|col| convert_value(row, col))
        .collect()
}

/// Converts a single column value from a MySqlRow to our Value type.
fn convert_value(row: &MySqlRow, col: &MySqlColumn) -> Value {
    let index = col.ordinal();

    match col.type_info().name() {
        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" | "BIT" => row
            .try_get::<Option<u64>, _>(index)
            .ok()
            .flatten()
            .map(Value::UInt)
            .unwrap_or(Value::Null),

        "FLOAT" => row
            .try_get::<Option<f32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Float(v as f64))
            .unwrap_or(Value::Null),

        "DOUBLE" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "JSON" => row
            .try_get::<Option<serde_json::Value>, _>(index)
            .ok()
            .flatten()
            .map(Value::Json)
            .unwrap_or(Value::Null),

        "DATE" => row
            .try_get::<Option<chrono::NaiveDate>, _>(index)
            .ok()
            .flatten()
            .map(|d| Value::String(d.to_string()))
            .unwrap_or(Value::Null),

        "TIME" => row
            .try_get::<Option<chrono::NaiveTime>, _>(index)
            .ok()
            .flatten()
            .map(|t| Value::String(t.to_string()))
            .unwrap_or(Value::Null),

        "DATETIME" => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(index)
            .ok()
            .flatten()
            .map(|dt| Value::String(dt.to_string()))
            .unwrap_or(Value::Null),

        "TIMESTAMP" => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index)
            .ok()
            .flatten()
            .map(|dt| Value::String(dt.to_string()))
            .unwrap_or(Value::Null),

        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        // For all other types, try string first, then raw bytes.
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .or_else(|| {
                row.try_get::<Option<Vec<u8>>, _>(index)
                    .ok()
                    .flatten()
                    .map(Value::Bytes)
            })
            .unwrap_or(Value::Null),
    }
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &DatabaseConfig) -> HarvestError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port;
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        HarvestError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("access denied") || error_str.contains("authentication") {
        HarvestError::connection(format!(
            "Access denied for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("unknown database") {
        HarvestError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("tls") || error_str.contains("ssl") {
        HarvestError::connection("TLS negotiation with the server failed.".to_string())
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        HarvestError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        HarvestError::connection(error.to_string())
    }
}

/// Formats a query error with server detail if available.
fn format_query_error(error: sqlx::Error) -> String {
    if let Some(db_error) = error.as_database_error() {
        let mut result = String::from("ERROR: ");
        result.push_str(db_error.message());

        if let Some(code) = db_error.code() {
            result.push_str(&format!(" (code {code})"));
        }

        result
    } else {
        error.to_string()
    }
}
