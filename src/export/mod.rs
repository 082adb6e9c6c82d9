//! Survey export retrieval for study-harvest.
//!
//! Drives the remote asynchronous export job through its three phases:
//! start the job, poll it until it reports complete, then download the
//! exported file. Each phase signals failure with `None` (logged at the
//! failure site); only exhausting the poll retries is a typed error.

mod backoff;
mod mock;
mod qualtrics;
mod types;

pub use backoff::retry_with_backoff;
pub use mock::MockExportApi;
pub use qualtrics::QualtricsClient;
pub use types::{ExportFormat, ExportOptions, ExportStarted};

use crate::error::Result;
use async_trait::async_trait;
use tracing::{info, warn};

/// Rounds of backoff polling before giving up on an export job.
const MAX_POLL_ROUNDS: u32 = 3;

/// Trait defining the interface to the remote export API.
///
/// Each phase returns `None` on remote failure: a non-200 response, an
/// unusable body, or (for `check_export`) a job that is still running.
/// Implementations log the reason before returning the sentinel.
#[async_trait]
pub trait ExportApi: Send + Sync {
    /// Creates an export job. `None` means the job was not created.
    async fn start_export(&self, survey_id: &str, options: &ExportOptions)
        -> Option<ExportStarted>;

    /// Polls a job once. Returns the file id when the job is complete.
    async fn check_export(&self, survey_id: &str, progress_id: &str) -> Option<String>;

    /// Downloads a finished export and decodes it as UTF-8 text.
    async fn download_export(&self, survey_id: &str, file_id: &str) -> Option<String>;
}

/// Runs one full export: start, poll to completion, download.
///
/// Returns `Ok(None)` when the job could not be started or the finished
/// file could not be downloaded. A job that never completes surfaces as a
/// `RetriesExceeded` error from the poll loop.
pub async fn fetch_survey(
    api: &dyn ExportApi,
    survey_id: &str,
    options: &ExportOptions,
) -> Result<Option<String>> {
    let Some(started) = api.start_export(survey_id, options).await else {
        warn!("Failed to start response export");
        return Ok(None);
    };

    let mut file_id = api.check_export(survey_id, &started.progress_id).await;

    let mut tries_left = MAX_POLL_ROUNDS;
    while file_id.is_none() && tries_left > 0 {
        info!("Waiting for response export to complete...");
        file_id =
            Some(retry_with_backoff(|| api.check_export(survey_id, &started.progress_id)).await?);
        tries_left -= 1;
    }

    let Some(file_id) = file_id else {
        warn!("Failed to get response export");
        return Ok(None);
    };

    Ok(api.download_export(survey_id, &file_id).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarvestError;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fetch_survey_completes_on_first_check() {
        let api = MockExportApi::new()
            .with_checks(vec![Some("F_1")])
            .with_download("ResponseId,Q1\nR_1,Yes\n");

        let body = fetch_survey(&api, "SV_x", &ExportOptions::default())
            .await
            .unwrap();

        assert_eq!(body, Some("ResponseId,Q1\nR_1,Yes\n".to_string()));
        assert_eq!(api.start_calls(), 1);
        assert_eq!(api.check_calls(), 1);
        assert_eq!(api.download_calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_survey_start_failure_is_none() {
        let api = MockExportApi::new().with_start_failure();

        let body = fetch_survey(&api, "SV_x", &ExportOptions::default())
            .await
            .unwrap();

        assert_eq!(body, None);
        assert_eq!(api.check_calls(), 0);
        assert_eq!(api.download_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_survey_polls_until_complete() {
        let started = tokio::time::Instant::now();
        let api = MockExportApi::new()
            .with_checks(vec![None, None, Some("F_1")])
            .with_download("body");

        let body = fetch_survey(&api, "SV_x", &ExportOptions::default())
            .await
            .unwrap();

        assert_eq!(body, Some("body".to_string()));
        // One immediate check, then one failed and one successful backoff
        // attempt: a single one-second sleep.
        assert_eq!(api.check_calls(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_survey_gives_up_after_retries() {
        let api = MockExportApi::new();

        let result = fetch_survey(&api, "SV_x", &ExportOptions::default()).await;

        assert!(matches!(result, Err(HarvestError::RetriesExceeded(5))));
        // One immediate check plus five backoff attempts.
        assert_eq!(api.check_calls(), 6);
        assert_eq!(api.download_calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_survey_download_failure_is_none() {
        let api = MockExportApi::new()
            .with_checks(vec![Some("F_1")])
            .with_download_failure();

        let body = fetch_survey(&api, "SV_x", &ExportOptions::default())
            .await
            .unwrap();

        assert_eq!(body, None);
        assert_eq!(api.download_calls(), 1);
    }
}
