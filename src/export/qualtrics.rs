//! Qualtrics export API client implementation.
//!
//! Implements the ExportApi trait against the v3 response-export endpoints.
//! Remote failures follow the sentinel contract: every phase logs what went
//! wrong and returns `None` instead of an error.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::SurveyConfig;
use crate::error::{HarvestError, Result};
use crate::export::{ExportApi, ExportFormat, ExportOptions, ExportStarted};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Survey metadata columns requested with every export.
const SURVEY_METADATA_IDS: [&str; 3] = ["duration", "finished", "progress"];

/// Qualtrics export API client.
#[derive(Debug, Clone)]
pub struct QualtricsClient {
    api_token: String,
    data_center: String,
    client: Client,
}

impl QualtricsClient {
    /// Creates a new client from the survey configuration.
    ///
    /// The API token and data center must be present; there is no anonymous
    /// access to the export endpoints.
    pub fn new(config: &SurveyConfig) -> Result<Self> {
        let api_token = config.api_token.clone().ok_or_else(|| {
            HarvestError::config(
                "Survey API token is required (set [survey].api_token or QUALTRICS_API_TOKEN)",
            )
        })?;

        let data_center = config.data_center.clone().ok_or_else(|| {
            HarvestError::config(
                "Survey data center is required (set [survey].data_center or QUALTRICS_DATA_CENTER)",
            )
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| HarvestError::export(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            api_token,
            data_center,
            client,
        })
    }

    /// Returns the export-responses URL for a survey.
    fn export_url(&self, survey_id: &str) -> String {
        format!(
            "https://{}.qualtrics.com/API/v3/surveys/{}/export-responses",
            self.data_center, survey_id
        )
    }
}

#[async_trait]
impl ExportApi for QualtricsClient {
    async fn start_export(
        &self,
        survey_id: &str,
        options: &ExportOptions,
    ) -> Option<ExportStarted> {
        let request = StartExportRequest::new(options);

        let response = match self
            .client
            .post(self.export_url(survey_id))
            .header("X-API-TOKEN", &self.api_token)
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to send export start request: {e}");
                return None;
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to read export start response: {e}");
                return None;
            }
        };

        if status != StatusCode::OK {
            error!("Export start request failed with status {status}: {body}");
            return None;
        }

        parse_start_response(&body)
    }

    async fn check_export(&self, survey_id: &str, progress_id: &str) -> Option<String> {
        let url = format!("{}/{}", self.export_url(survey_id), progress_id);

        let response = match self
            .client
            .get(&url)
            .header("X-API-TOKEN", &self.api_token)
            .header("Accept", "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to send export status request: {e}");
                return None;
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to read export status response: {e}");
                return None;
            }
        };

        if status != StatusCode::OK {
            error!("Export status request failed with status {status}: {body}");
            return None;
        }

        parse_check_response(&body)
    }

    async fn download_export(&self, survey_id: &str, file_id: &str) -> Option<String> {
        let url = format!("{}/{}/file", self.export_url(survey_id), file_id);

        let response = match self
            .client
            .get(&url)
            .header("X-API-TOKEN", &self.api_token)
            .header("Accept", "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to send export download request: {e}");
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            error!("Error in download: {}", response.status());
            return None;
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to read export download: {e}");
                return None;
            }
        };

        match String::from_utf8(bytes.to_vec()) {
            Ok(text) => Some(text),
            Err(e) => {
                error!("Export download is not valid UTF-8: {e}");
                None
            }
        }
    }
}

/// Parses the start response, keeping the raw body alongside the progress id.
fn parse_start_response(body: &str) -> Option<ExportStarted> {
    let raw: serde_json::Value = match serde_json::from_str(body) {
        Ok(raw) => raw,
        Err(e) => {
            error!("Failed to parse export start response: {e}");
            return None;
        }
    };

    match serde_json::from_value::<StartExportResponse>(raw.clone()) {
        Ok(parsed) => {
            info!("Export progress ID: {}", parsed.result.progress_id);
            Some(ExportStarted {
                progress_id: parsed.result.progress_id,
                raw,
            })
        }
        Err(e) => {
            error!("Export start response is missing a progress id: {e}");
            None
        }
    }
}

/// Parses one poll response. Returns the file id once the job is complete,
/// `None` while it is still running or when the body is unusable.
fn parse_check_response(body: &str) -> Option<String> {
    let parsed: CheckExportResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Failed to parse export status response: {e}");
            return None;
        }
    };

    let result = parsed.result;

    if result.status == "complete" {
        return match result.file_id {
            Some(file_id) => {
                info!("fileId: {}", file_id);
                Some(file_id)
            }
            None => {
                warn!("Export job is complete but no file id was returned");
                None
            }
        };
    }

    if let Some(percent) = result.percent_complete {
        info!("Percent complete: {}", percent);
    } else {
        warn!("Export job reported status '{}'", result.status);
    }

    None
}

// Export API wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartExportRequest {
    format: &'static str,
    compress: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    use_labels: Option<bool>,
    survey_metadata_ids: Vec<&'static str>,
}

impl StartExportRequest {
    fn new(options: &ExportOptions) -> Self {
        // Label-vs-numeric encoding only applies to csv exports.
        let use_labels = match options.format {
            ExportFormat::Csv => Some(!options.numeric),
            ExportFormat::Json => None,
        };

        Self {
            format: options.format.as_str(),
            compress: false,
            use_labels,
            survey_metadata_ids: SURVEY_METADATA_IDS.to_vec(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StartExportResponse {
    result: StartExportResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartExportResult {
    progress_id: String,
}

#[derive(Debug, Deserialize)]
struct CheckExportResponse {
    result: CheckExportResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckExportResult {
    status: String,
    #[serde(default)]
    file_id: Option<String>,
    #[serde(default)]
    percent_complete: Option<f64>,
}
