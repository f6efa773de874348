//! Meal Log MCP Tools
//!
//! Tools for logging meals, with daily limit and goal checks.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::Database;
use crate::models::{Meal, MealLog, MealLogCreate, MealType, UserGoal};
use crate::tools::{validate_calories, ToolError, ToolResult};

/// Warnings raised when a meal is logged
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct MealWarnings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calorie_limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutritional_mismatch: Option<String>,
}

impl MealWarnings {
    pub fn is_empty(&self) -> bool {
        self.calorie_limit.is_none() && self.nutritional_mismatch.is_none()
    }
}

/// Response for log_meal and log_catalog_meal
#[derive(Debug, Serialize)]
pub struct LogMealResponse {
    pub meal: MealLog,
    pub day_total_calories: i64,
    pub daily_limit: i64,
    #[serde(skip_serializing_if = "MealWarnings::is_empty")]
    pub warnings: MealWarnings,
}

/// Response for list_meal_logs
#[derive(Debug, Serialize)]
pub struct ListMealLogsResponse {
    pub date: String,
    pub meals: Vec<MealLog>,
    pub total_calories: i64,
}

/// Response for delete_meal_log
#[derive(Debug, Serialize)]
pub struct DeleteMealLogResponse {
    pub success: bool,
    pub id: i64,
    pub date: String,
    pub day_total_calories: i64,
}

/// Normalise an ISO date argument to `YYYY-MM-DD`
pub(crate) fn validate_date(date: &str) -> ToolResult<String> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| ToolError::invalid(format!("Invalid date '{}': expected YYYY-MM-DD", date)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Log a meal entered by hand
#[allow(clippy::too_many_arguments)]
pub fn log_meal(
    db: &Database,
    user_id: i64,
    date: &str,
    meal_type: &str,
    meal_name: &str,
    calorie_intake: i64,
    category: Option<String>,
    notes: Option<String>,
) -> ToolResult<LogMealResponse> {
    let date = validate_date(date)?;

    let meal_name = meal_name.trim();
    if meal_name.is_empty() {
        return Err(ToolError::invalid("Meal name is required"));
    }
    let calorie_intake = validate_calories("Calorie intake", calorie_intake)?;

    let conn = db.get_conn().map_err(ToolError::db("Database error"))?;

    let data = MealLogCreate {
        user_id,
        date,
        meal_type: MealType::from_str(meal_type),
        meal_name: meal_name.to_string(),
        calorie_intake,
        category: non_empty(category),
        meal_id: None,
        notes,
    };

    record_meal(&conn, &data)
}

/// Log a catalogue meal. Name, calories and category come from the catalogue.
pub fn log_catalog_meal(
    db: &Database,
    user_id: i64,
    date: &str,
    meal_type: &str,
    meal_id: i64,
    notes: Option<String>,
) -> ToolResult<LogMealResponse> {
    let date = validate_date(date)?;

    let conn = db.get_conn().map_err(ToolError::db("Database error"))?;

    let meal = Meal::get_by_id(&conn, meal_id)
        .map_err(ToolError::db("Database error checking meal"))?
        .ok_or_else(|| ToolError::NotFound(format!("Meal not found with id: {}", meal_id)))?;

    let data = MealLogCreate {
        user_id,
        date,
        meal_type: MealType::from_str(meal_type),
        meal_name: meal.meal_name,
        calorie_intake: meal.calories,
        category: Some(meal.category),
        meal_id: Some(meal.id),
        notes,
    };

    record_meal(&conn, &data)
}

fn record_meal(conn: &Connection, data: &MealLogCreate) -> ToolResult<LogMealResponse> {
    let meal = MealLog::create(conn, data).map_err(ToolError::db("Failed to log meal"))?;

    let day_total_calories = MealLog::total_for_date(conn, meal.user_id, &meal.date)
        .map_err(ToolError::db("Failed to total day"))?;

    let goal = UserGoal::get(conn, meal.user_id).map_err(ToolError::db("Failed to get goal"))?;
    let daily_limit = goal
        .as_ref()
        .map(|g| g.daily_calorie_limit)
        .unwrap_or(crate::models::DEFAULT_DAILY_CALORIE_LIMIT);

    let mut warnings = MealWarnings::default();
    if day_total_calories > daily_limit {
        warnings.calorie_limit = Some(format!(
            "You've exceeded your daily calorie limit of {} calories",
            daily_limit
        ));
    }
    if let (Some(goal), Some(category)) = (goal.as_ref(), meal.category.as_deref()) {
        if !goal.nutritional_goal.trim().eq_ignore_ascii_case(category) {
            warnings.nutritional_mismatch = Some(format!(
                "This meal ({}) doesn't match your nutritional goal ({})",
                category, goal.nutritional_goal
            ));
        }
    }

    tracing::debug!(user_id = meal.user_id, meal_id = meal.id, day_total_calories, "meal logged");

    Ok(LogMealResponse {
        meal,
        day_total_calories,
        daily_limit,
        warnings,
    })
}

/// List a user's meals for one date
pub fn list_meal_logs(db: &Database, user_id: i64, date: &str) -> ToolResult<ListMealLogsResponse> {
    let date = validate_date(date)?;
    let conn = db.get_conn().map_err(ToolError::db("Database error"))?;

    let meals = MealLog::list_for_date(&conn, user_id, &date)
        .map_err(ToolError::db("Failed to list meals"))?;
    let total_calories = meals.iter().map(|m| m.calorie_intake).sum();

    Ok(ListMealLogsResponse {
        date,
        meals,
        total_calories,
    })
}

/// Delete one of the user's meal logs
pub fn delete_meal_log(db: &Database, user_id: i64, id: i64) -> ToolResult<DeleteMealLogResponse> {
    let conn = db.get_conn().map_err(ToolError::db("Database error"))?;

    let meal = MealLog::get_by_id(&conn, id)
        .map_err(ToolError::db("Database error"))?
        .filter(|m| m.user_id == user_id)
        .ok_or_else(|| ToolError::NotFound(format!("Meal log not found with id: {}", id)))?;

    let deleted = MealLog::delete_for_user(&conn, user_id, id)
        .map_err(ToolError::db("Failed to delete meal"))?;

    let day_total_calories = MealLog::total_for_date(&conn, user_id, &meal.date)
        .map_err(ToolError::db("Failed to total day"))?;

    Ok(DeleteMealLogResponse {
        success: deleted,
        id,
        date: meal.date,
        day_total_calories,
    })
}
