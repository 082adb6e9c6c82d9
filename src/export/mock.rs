//! Mock export API for testing.
//!
//! Lets tests script each phase of an export run and observe how many times
//! every phase was hit.

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::export::{ExportApi, ExportOptions, ExportStarted};

/// A mock export API with scripted outcomes.
///
/// By default the start phase succeeds, every poll reports "still running"
/// (`None`), and the download returns a small csv body. Tests script poll
/// outcomes with [`with_checks`](Self::with_checks); once the script runs
/// out, further polls return `None`.
pub struct MockExportApi {
    start: Option<ExportStarted>,
    checks: Mutex<VecDeque<Option<String>>>,
    download: Option<String>,
    start_calls: AtomicUsize,
    check_calls: AtomicUsize,
    download_calls: AtomicUsize,
}

impl MockExportApi {
    /// Creates a mock where start succeeds and polls never complete.
    pub fn new() -> Self {
        Self {
            start: Some(ExportStarted {
                progress_id: "EP_TEST".to_string(),
                raw: json!({"result": {"progressId": "EP_TEST", "status": "inProgress"}}),
            }),
            checks: Mutex::new(VecDeque::new()),
            download: Some("ResponseId,Q1\nR_1,Yes\n".to_string()),
            start_calls: AtomicUsize::new(0),
            check_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
        }
    }

    /// Makes the start phase fail.
    pub fn with_start_failure(mut self) -> Self {
        self.start = None;
        self
    }

    /// Scripts the poll outcomes, consumed in order.
    pub fn with_checks(self, outcomes: Vec<Option<&str>>) -> Self {
        {
            let mut checks = self.checks.lock().unwrap_or_else(|e| e.into_inner());
            *checks = outcomes
                .into_iter()
                .map(|o| o.map(String::from))
                .collect();
        }
        self
    }

    /// Sets the body returned by the download phase.
    pub fn with_download(mut self, body: &str) -> Self {
        self.download = Some(body.to_string());
        self
    }

    /// Makes the download phase fail.
    pub fn with_download_failure(mut self) -> Self {
        self.download = None;
        self
    }

    /// Number of times the start phase was called.
    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    /// Number of times the poll phase was called.
    pub fn check_calls(&self) -> usize {
        self.check_calls.load(Ordering::SeqCst)
    }

    /// Number of times the download phase was called.
    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockExportApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExportApi for MockExportApi {
    async fn start_export(
        &self,
        _survey_id: &str,
        _options: &ExportOptions,
    ) -> Option<ExportStarted> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.start.clone()
    }

    async fn check_export(&self, _survey_id: &str, _progress_id: &str) -> Option<String> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        self.checks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .flatten()
    }

    async fn download_export(&self, _survey_id: &str, _file_id: &str) -> Option<String> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.download.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_scripted_checks_run_in_order() {
        let api = MockExportApi::new().with_checks(vec![None, Some("F_1")]);

        assert_eq!(api.check_export("SV_x", "EP_TEST").await, None);
        assert_eq!(
            api.check_export("SV_x", "EP_TEST").await,
            Some("F_1".to_string())
        );
        // Script exhausted: back to "still running".
        assert_eq!(api.check_export("SV_x", "EP_TEST").await, None);
        assert_eq!(api.check_calls(), 3);
    }

    #[tokio::test]
    async fn test_mock_start_failure() {
        let api = MockExportApi::new().with_start_failure();

        let started = api.start_export("SV_x", &ExportOptions::default()).await;
        assert!(started.is_none());
        assert_eq!(api.start_calls(), 1);
    }
}
