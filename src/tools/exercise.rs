//! Exercise Log MCP Tools
//!
//! Tools for recording exercise sessions.

use serde::Serialize;

use crate::db::Database;
use crate::models::{ExerciseLog, ExerciseLogCreate};
use crate::tools::meals::validate_date;
use crate::tools::{validate_calories, ToolError, ToolResult};

/// Response for list_exercise_logs
#[derive(Debug, Serialize)]
pub struct ListExerciseLogsResponse {
    pub exercises: Vec<ExerciseLog>,
    pub total_calories_burned: i64,
    pub count: usize,
}

/// Log an exercise session. Every field except notes is required.
pub fn log_exercise(
    db: &Database,
    user_id: i64,
    date: &str,
    activity_type: &str,
    duration_minutes: i64,
    calories_burned: i64,
    notes: Option<String>,
) -> ToolResult<ExerciseLog> {
    let date = validate_date(date)?;

    let activity_type = activity_type.trim();
    if activity_type.is_empty() {
        return Err(ToolError::invalid("Activity type is required"));
    }
    if duration_minutes <= 0 {
        return Err(ToolError::invalid("Duration must be greater than 0 minutes"));
    }
    let calories_burned = validate_calories("Calories burned", calories_burned)?;

    let conn = db.get_conn().map_err(ToolError::db("Database error"))?;

    let data = ExerciseLogCreate {
        user_id,
        date,
        activity_type: activity_type.to_string(),
        duration_minutes,
        calories_burned,
        notes,
    };

    ExerciseLog::create(&conn, &data).map_err(ToolError::db("Failed to log exercise"))
}

/// List a user's sessions, newest first
pub fn list_exercise_logs(
    db: &Database,
    user_id: i64,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> ToolResult<ListExerciseLogsResponse> {
    let start_date = start_date.map(validate_date).transpose()?;
    let end_date = end_date.map(validate_date).transpose()?;

    let conn = db.get_conn().map_err(ToolError::db("Database error"))?;

    let exercises = ExerciseLog::list(&conn, user_id, start_date.as_deref(), end_date.as_deref())
        .map_err(ToolError::db("Failed to list exercises"))?;

    Ok(ListExerciseLogsResponse {
        total_calories_burned: exercises.iter().map(|e| e.calories_burned).sum(),
        count: exercises.len(),
        exercises,
    })
}

/// Delete one of the user's sessions
pub fn delete_exercise_log(db: &Database, user_id: i64, id: i64) -> ToolResult<bool> {
    let conn = db.get_conn().map_err(ToolError::db("Database error"))?;

    let deleted = ExerciseLog::delete_for_user(&conn, user_id, id)
        .map_err(ToolError::db("Failed to delete exercise"))?;

    if !deleted {
        return Err(ToolError::NotFound(format!("Exercise log not found with id: {}", id)));
    }
    Ok(true)
}
