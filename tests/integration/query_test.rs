//! Study query integration tests.
//!
//! These tests require a MySQL database containing the study schema
//! (Classes, StudentsClasses, Educators, Stages, StageStates, StoryStates).
//! Set DATABASE_URL to run them.

use study_harvest::config::DatabaseConfig;
use study_harvest::db::{DatabaseClient, MySqlClient, StudentQueries, Value};

/// Helper to create a test client from the environment.
fn get_test_client() -> Option<MySqlClient> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let config = DatabaseConfig::from_connection_string(&url).ok()?;
    MySqlClient::new(config).ok()
}

/// Helper to find a student id that has at least one class membership row.
async fn find_enrolled_student(client: &MySqlClient) -> Option<i64> {
    let result = client
        .execute_query(
            "SELECT DISTINCT student_id FROM StudentsClasses LIMIT 1",
            &[],
        )
        .await
        .ok()?;

    match result.rows.first()?.first()? {
        Value::Int(id) => Some(*id),
        Value::UInt(id) => Some(*id as i64),
        _ => None,
    }
}

/// A student id that is never present in test data.
const ABSENT_STUDENT_ID: i64 = -1;

#[tokio::test]
async fn test_execute_parameterized_select() {
    let Some(client) = get_test_client() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = client
        .execute_query(
            "SELECT ? AS num, ? AS greeting",
            &[Value::Int(1), Value::String("hello".to_string())],
        )
        .await
        .unwrap();

    assert_eq!(result.columns.len(), 2);
    assert_eq!(result.columns[0].name, "num");
    assert_eq!(result.columns[1].name, "greeting");
    assert_eq!(result.row_count, 1);
}

#[tokio::test]
async fn test_classes_for_student_columns() {
    let Some(client) = get_test_client() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let queries = StudentQueries::new(&client);
    let result = queries
        .classes_for_student(ABSENT_STUDENT_ID)
        .await
        .unwrap();

    // Column names survive even with no matching rows.
    assert_eq!(
        result.column_names(),
        vec!["first_name", "last_name", "id", "name"]
    );
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_classes_for_students_adds_student_id_column() {
    let Some(client) = get_test_client() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let queries = StudentQueries::new(&client);
    let result = queries
        .classes_for_students(&[ABSENT_STUDENT_ID, ABSENT_STUDENT_ID - 1])
        .await
        .unwrap();

    assert_eq!(
        result.column_names(),
        vec!["first_name", "last_name", "id", "name", "student_id"]
    );
}

#[tokio::test]
async fn test_classes_rows_have_expected_types() {
    let Some(client) = get_test_client() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let Some(student_id) = find_enrolled_student(&client).await else {
        eprintln!("Skipping test: no class membership rows in database");
        return;
    };

    let queries = StudentQueries::new(&client);
    let result = queries.classes_for_students(&[student_id]).await.unwrap();

    assert!(!result.is_empty());

    let first_row = &result.rows[0];
    assert_eq!(first_row.len(), 5);

    match &first_row[0] {
        Value::String(_) | Value::Null => {}
        other => panic!("Expected String for first_name, got {:?}", other),
    }

    // Every row carries the requested student's id.
    for row in &result.rows {
        match &row[4] {
            Value::Int(id) => assert_eq!(*id, student_id),
            Value::UInt(id) => assert_eq!(*id as i64, student_id),
            other => panic!("Expected integer for student_id, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_progress_states_absent_students_yield_no_rows() {
    let Some(client) = get_test_client() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let queries = StudentQueries::new(&client);
    let result = queries
        .progress_states(&[ABSENT_STUDENT_ID])
        .await
        .unwrap();

    // No stage-state rows means no output row, not a null row.
    assert!(result.is_empty());
    assert_eq!(
        result.column_names(),
        vec![
            "student_id",
            "max_stage_index",
            "max_step",
            "total_steps",
            "progress",
            "free_responses",
            "mc_scoring"
        ]
    );
}

#[tokio::test]
async fn test_query_error_on_missing_table() {
    let Some(client) = get_test_client() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = client
        .execute_query("SELECT * FROM nonexistent_table_xyz", &[])
        .await;

    assert!(result.is_err());
}
