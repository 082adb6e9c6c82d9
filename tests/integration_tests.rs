//! Integration tests for study-harvest.
//!
//! The query tests require a running MySQL database (set DATABASE_URL);
//! the export tests require live survey API credentials (set
//! QUALTRICS_API_TOKEN, QUALTRICS_DATA_CENTER, and QUALTRICS_SURVEY_ID).
//! Tests without their environment are skipped.
//!
//! Run with: `cargo test --test integration_tests`

mod integration;
