//! study-harvest - assembles analysis datasets from a study database and a
//! survey platform's response-export API.
//!
//! This library exposes the core modules for use in integration tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod logging;
