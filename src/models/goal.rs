//! User goal model
//!
//! A user's nutritional goal and exercise level. The daily calorie limit is
//! derived from the exercise level when the goal is saved.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Limit used when a user has no goal, or an unrecognised exercise level
pub const DEFAULT_DAILY_CALORIE_LIMIT: i64 = 2000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseLevel {
    Low,
    Medium,
    High,
    Unspecified,
}

impl ExerciseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseLevel::Low => "low",
            ExerciseLevel::Medium => "medium",
            ExerciseLevel::High => "high",
            ExerciseLevel::Unspecified => "unspecified",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "low" => ExerciseLevel::Low,
            "medium" => ExerciseLevel::Medium,
            "high" => ExerciseLevel::High,
            _ => ExerciseLevel::Unspecified,
        }
    }

    pub fn daily_calorie_limit(&self) -> i64 {
        match self {
            ExerciseLevel::Low => 1800,
            ExerciseLevel::Medium => 2200,
            ExerciseLevel::High => 2600,
            ExerciseLevel::Unspecified => DEFAULT_DAILY_CALORIE_LIMIT,
        }
    }

    /// Calorie band of recommended meals, `(min, max)` inclusive. `None` is open.
    pub fn recommended_calorie_range(&self) -> (Option<i64>, Option<i64>) {
        match self {
            ExerciseLevel::High => (Some(400), None),
            ExerciseLevel::Medium => (Some(200), Some(400)),
            ExerciseLevel::Low | ExerciseLevel::Unspecified => (None, Some(300)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserGoal {
    pub user_id: i64,
    pub nutritional_goal: String,
    pub exercise_level: ExerciseLevel,
    pub daily_calorie_limit: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl UserGoal {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let level: String = row.get("exercise_level")?;

        Ok(Self {
            user_id: row.get("user_id")?,
            nutritional_goal: row.get("nutritional_goal")?,
            exercise_level: ExerciseLevel::from_str(&level),
            daily_calorie_limit: row.get("daily_calorie_limit")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn get(conn: &Connection, user_id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM user_goals WHERE user_id = ?1")?;

        match stmt.query_row([user_id], Self::from_row) {
            Ok(goal) => Ok(Some(goal)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the user's goal (upsert)
    pub fn set(
        conn: &Connection,
        user_id: i64,
        nutritional_goal: &str,
        exercise_level: ExerciseLevel,
    ) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO user_goals (user_id, nutritional_goal, exercise_level, daily_calorie_limit)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id) DO UPDATE SET
                nutritional_goal = excluded.nutritional_goal,
                exercise_level = excluded.exercise_level,
                daily_calorie_limit = excluded.daily_calorie_limit,
                updated_at = datetime('now')
            "#,
            params![
                user_id,
                nutritional_goal,
                exercise_level.as_str(),
                exercise_level.daily_calorie_limit(),
            ],
        )?;

        Self::get(conn, user_id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }
}
