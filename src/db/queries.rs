//! Study query templates.
//!
//! Builds and executes the fixed set of parameterized queries used to pull
//! class membership and progress state out of the study database. All three
//! operations are read-only and idempotent; retrying is left to callers.

use crate::db::{DatabaseClient, QueryResult, Value};
use crate::error::{HarvestError, Result};
use tracing::debug;

const CLASSES_FOR_STUDENT_SQL: &str = r#"
SELECT
    Educators.first_name,
    Educators.last_name,
    Classes.id,
    Classes.name
FROM Classes
JOIN StudentsClasses ON StudentsClasses.class_id = Classes.id
JOIN Educators ON Educators.id = Classes.educator_id
WHERE StudentsClasses.student_id = ?
"#;

const CLASSES_FOR_STUDENTS_SQL: &str = r#"
SELECT
    Educators.first_name,
    Educators.last_name,
    Classes.id,
    Classes.name,
    StudentsClasses.student_id
FROM Classes
JOIN StudentsClasses ON StudentsClasses.class_id = Classes.id
JOIN Educators ON Educators.id = Classes.educator_id
WHERE StudentsClasses.student_id IN ({ids})
"#;

const PROGRESS_STATES_SQL: &str = r#"
SELECT
    StageStates.student_id,
    MAX(Stages.stage_index) AS max_stage_index,
    MAX(JSON_EXTRACT(StageStates.state, '$.max_step')) AS max_step,
    MAX(JSON_EXTRACT(StageStates.state, '$.total_steps')) AS total_steps,
    MAX(JSON_EXTRACT(StageStates.state, '$.progress')) AS progress,
    MAX(JSON_EXTRACT(StoryStates.state, '$.free_responses')) AS free_responses,
    MAX(JSON_EXTRACT(StoryStates.state, '$.mc_scoring')) AS mc_scoring
FROM StageStates
JOIN Stages ON Stages.id = StageStates.stage_id
JOIN StoryStates ON StoryStates.student_id = StageStates.student_id
WHERE StageStates.student_id IN ({ids})
GROUP BY StageStates.student_id
"#;

/// High-level study queries over a [`DatabaseClient`].
pub struct StudentQueries<'a> {
    db: &'a dyn DatabaseClient,
}

impl<'a> StudentQueries<'a> {
    /// Creates a query helper over the given client.
    pub fn new(db: &'a dyn DatabaseClient) -> Self {
        Self { db }
    }

    /// Returns the educator and class rows for one student.
    ///
    /// Columns: educator first/last name, class id, class name. An enrolled
    /// student with no classes yields an empty result, not an error.
    pub async fn classes_for_student(&self, student_id: i64) -> Result<QueryResult> {
        debug!("Fetching classes for student {}", student_id);

        self.db
            .execute_query(CLASSES_FOR_STUDENT_SQL, &[Value::Int(student_id)])
            .await
    }

    /// Returns the educator and class rows for a set of students.
    ///
    /// Same join as [`classes_for_student`](Self::classes_for_student), with
    /// the student id added to the projection so rows can be attributed.
    /// Every id is bound as its own placeholder.
    pub async fn classes_for_students(&self, student_ids: &[i64]) -> Result<QueryResult> {
        let (sql, params) = in_list_query(CLASSES_FOR_STUDENTS_SQL, student_ids)?;

        debug!("Fetching classes for {} students", student_ids.len());

        self.db.execute_query(&sql, &params).await
    }

    /// Returns per-student progress: the highest stage index reached plus
    /// step counts, progress, free responses, and multiple-choice scoring
    /// extracted from the JSON state columns.
    ///
    /// Students with no stage-state rows are absent from the result. Absence
    /// means no recorded progress, not an error.
    pub async fn progress_states(&self, student_ids: &[i64]) -> Result<QueryResult> {
        let (sql, params) = in_list_query(PROGRESS_STATES_SQL, student_ids)?;

        debug!("Fetching progress state for {} students", student_ids.len());

        self.db.execute_query(&sql, &params).await
    }
}

/// Expands an `{ids}` marker into one `?` per id and binds the ids in order.
///
/// The id list must be non-empty; `IN ()` is not valid SQL.
fn in_list_query(template: &str, student_ids: &[i64]) -> Result<(String, Vec<Value>)> {
    if student_ids.is_empty() {
        return Err(HarvestError::query("At least one student id is required"));
    }

    let sql = template.replace("{ids}", &sql_placeholders(student_ids.len()));
    let params = student_ids.iter().map(|&id| Value::Int(id)).collect();

    Ok((sql, params))
}

/// Returns `n` comma-separated placeholders, e.g. `?, ?, ?` for n = 3.
fn sql_placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
