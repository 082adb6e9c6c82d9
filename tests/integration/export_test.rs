//! Survey export integration tests.
//!
//! These tests hit the live export API. Set QUALTRICS_API_TOKEN,
//! QUALTRICS_DATA_CENTER, and QUALTRICS_SURVEY_ID to run them.

use study_harvest::config::SurveyConfig;
use study_harvest::export::{fetch_survey, ExportApi, ExportOptions, QualtricsClient};

/// Helper to build a survey config from the environment.
fn get_test_config() -> Option<(SurveyConfig, String)> {
    let mut config = SurveyConfig::default();
    config.apply_env_defaults();

    config.api_token.as_ref()?;
    config.data_center.as_ref()?;
    let survey_id = config.survey_id.clone()?;

    Some((config, survey_id))
}

#[tokio::test]
async fn test_fetch_survey_live() {
    let Some((config, survey_id)) = get_test_config() else {
        eprintln!("Skipping test: QUALTRICS_* environment not set");
        return;
    };

    let client = QualtricsClient::new(&config).unwrap();
    let body = fetch_survey(&client, &survey_id, &ExportOptions::default())
        .await
        .unwrap();

    let body = body.expect("export should produce a file");
    assert!(!body.is_empty());
    // A csv export starts with a header row.
    assert!(body.contains('\n'));
}

#[tokio::test]
async fn test_start_export_live() {
    let Some((config, survey_id)) = get_test_config() else {
        eprintln!("Skipping test: QUALTRICS_* environment not set");
        return;
    };

    let client = QualtricsClient::new(&config).unwrap();
    let started = client
        .start_export(&survey_id, &ExportOptions::default())
        .await;

    let started = started.expect("start phase should create a job");
    assert!(!started.progress_id.is_empty());
}

#[tokio::test]
async fn test_bad_token_start_is_none() {
    let Some((mut config, survey_id)) = get_test_config() else {
        eprintln!("Skipping test: QUALTRICS_* environment not set");
        return;
    };
    config.api_token = Some("invalid-token".to_string());

    let client = QualtricsClient::new(&config).unwrap();
    let started = client
        .start_export(&survey_id, &ExportOptions::default())
        .await;

    assert!(started.is_none());
}
