//! Integration tests for study-harvest.
//!
//! These tests talk to real backing services and are skipped unless the
//! matching environment variables are set.

pub mod export_test;
pub mod query_test;
