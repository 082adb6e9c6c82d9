//! study-harvest - command-line harvester for study class rosters, progress
//! state, and survey response exports.

use anyhow::Context;
use std::path::Path;
use study_harvest::cli::{Cli, Command};
use study_harvest::config::Config;
use study_harvest::db::{MySqlClient, QueryResult, StudentQueries};
use study_harvest::error::HarvestError;
use study_harvest::export::{fetch_survey, ExportFormat, ExportOptions, QualtricsClient};
use study_harvest::logging;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init();

    if let Err(e) = run().await {
        match e.downcast_ref::<HarvestError>() {
            Some(err) => error!("{}: {}", err.category(), err),
            None => error!("{e:#}"),
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    config.apply_env_defaults();

    match &cli.command {
        Command::Classes {
            student_ids,
            records,
        } => {
            let db = database_client(&cli, &config)?;
            let queries = StudentQueries::new(&db);

            let result = if let [student_id] = student_ids.as_slice() {
                queries.classes_for_student(*student_id).await?
            } else {
                queries.classes_for_students(student_ids).await?
            };

            print_query_result(result, *records);
        }

        Command::Progress {
            student_ids,
            records,
        } => {
            let db = database_client(&cli, &config)?;
            let queries = StudentQueries::new(&db);

            let result = queries.progress_states(student_ids).await?;

            print_query_result(result, *records);
        }

        Command::Survey {
            survey_id,
            format,
            numeric,
            output,
        } => {
            run_survey(
                &config,
                survey_id.as_deref(),
                *format,
                *numeric,
                output.as_deref(),
            )
            .await?;
        }
    }

    Ok(())
}

/// Builds the database client, preferring --database-url over the config file.
fn database_client(cli: &Cli, config: &Config) -> anyhow::Result<MySqlClient> {
    let mut db_config = match cli.database_override()? {
        Some(override_config) => override_config,
        None => config.database.clone(),
    };
    db_config.apply_env_defaults();

    Ok(MySqlClient::new(db_config)?)
}

async fn run_survey(
    config: &Config,
    survey_id: Option<&str>,
    format: ExportFormat,
    numeric: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let client = QualtricsClient::new(&config.survey)?;

    let survey_id = survey_id
        .map(String::from)
        .or_else(|| config.survey.survey_id.clone())
        .ok_or_else(|| {
            HarvestError::config("Survey id is required (pass SURVEY_ID or set [survey].survey_id)")
        })?;

    info!("Exporting survey {} as {}", survey_id, format);

    let options = ExportOptions { format, numeric };
    let Some(body) = fetch_survey(&client, &survey_id, &options).await? else {
        anyhow::bail!("Response export for survey {survey_id} did not produce a file");
    };

    match output {
        Some(path) => {
            std::fs::write(path, &body)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} bytes to {}", body.len(), path.display());
        }
        None => print!("{body}"),
    }

    Ok(())
}

fn print_query_result(result: QueryResult, records: bool) {
    info!(
        "Fetched {} rows in {:?}",
        result.row_count, result.execution_time
    );

    if records {
        print!("{}", render_records(result));
    } else {
        print!("{}", render_table(&result));
    }
}

/// Renders a result as a tab-separated table with a header row.
fn render_table(result: &QueryResult) -> String {
    let mut out = String::new();

    out.push_str(&result.column_names().join("\t"));
    out.push('\n');

    for row in &result.rows {
        let line: Vec<String> = row.iter().map(|v| v.to_display_string()).collect();
        out.push_str(&line.join("\t"));
        out.push('\n');
    }

    out
}

/// Renders a result as one JSON object per row.
fn render_records(result: QueryResult) -> String {
    let mut out = String::new();

    for record in result.into_records() {
        let map: serde_json::Map<String, serde_json::Value> = record
            .into_iter()
            .map(|(name, value)| (name, value.to_json()))
            .collect();

        out.push_str(&serde_json::Value::Object(map).to_string());
        out.push('\n');
    }

    out
}
