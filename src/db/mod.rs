//! Database abstraction layer for study-harvest.
//!
//! Provides a trait-based interface for query execution, allowing the
//! study queries to run against a real MySQL server or a mock in tests.

mod mock;
mod mysql;
mod queries;
mod types;

pub use mock::{FailingDatabaseClient, MockDatabaseClient};
pub use mysql::MySqlClient;
pub use queries::StudentQueries;
pub use types::{ColumnInfo, QueryResult, Record, Row, Value};

use crate::error::Result;
use async_trait::async_trait;

/// Trait defining the interface for database clients.
///
/// All operations are async and return Results with HarvestError. Parameters
/// are always bound server-side; implementations never splice values into
/// the SQL text.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Executes a parameterized SQL query and returns the results.
    ///
    /// Each `?` placeholder in `sql` consumes one value from `params`, in
    /// order.
    async fn execute_query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;
}
