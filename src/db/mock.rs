//! Mock database client for testing.
//!
//! Provides an in-memory implementation that records every query it is
//! asked to run and returns a canned result.

use super::{DatabaseClient, QueryResult, Value};
use crate::error::{HarvestError, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// A mock database client that returns a predefined result.
///
/// Every call to `execute_query` is recorded, so tests can assert both the
/// SQL text and the bound parameters.
pub struct MockDatabaseClient {
    result: QueryResult,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MockDatabaseClient {
    /// Creates a new mock that returns an empty result.
    pub fn new() -> Self {
        Self::with_result(QueryResult::new())
    }

    /// Creates a new mock that returns the given result for every query.
    pub fn with_result(result: QueryResult) -> Self {
        Self {
            result,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns the recorded (sql, params) pairs, in call order.
    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Returns how many queries have been executed.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Default for MockDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute_query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((sql.to_string(), params.to_vec()));

        let mut result = self.result.clone();
        result.execution_time = Duration::from_millis(1);
        Ok(result)
    }
}

/// A mock database client where every query fails.
pub struct FailingDatabaseClient {
    message: String,
}

impl FailingDatabaseClient {
    /// Creates a failing client with the given error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute_query(&self, _sql: &str, _params: &[Value]) -> Result<QueryResult> {
        Err(HarvestError::query(self.message.clone()))
    }
}
