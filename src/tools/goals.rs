//! Goal MCP Tools

use serde::Serialize;

use crate::db::Database;
use crate::models::{DietPlan, ExerciseLevel, UserGoal};
use crate::tools::{ToolError, ToolResult};

/// Response for get_daily_limit
#[derive(Debug, Serialize)]
pub struct DailyLimitResponse {
    pub user_id: i64,
    pub daily_calorie_limit: i64,
    /// false when the default limit applies
    pub has_goal: bool,
}

/// Replace the user's goal. The daily limit follows the exercise level.
pub fn set_goal(
    db: &Database,
    user_id: i64,
    nutritional_goal: &str,
    exercise_level: &str,
) -> ToolResult<UserGoal> {
    let nutritional_goal = nutritional_goal.trim();
    if nutritional_goal.is_empty() {
        return Err(ToolError::invalid("Nutritional goal is required"));
    }

    let conn = db.get_conn().map_err(ToolError::db("Database error"))?;

    let goal = UserGoal::set(&conn, user_id, nutritional_goal, ExerciseLevel::from_str(exercise_level))
        .map_err(ToolError::db("Failed to save goal"))?;

    tracing::info!(user_id, limit = goal.daily_calorie_limit, "goal saved");
    Ok(goal)
}

pub fn get_goal(db: &Database, user_id: i64) -> ToolResult<Option<UserGoal>> {
    let conn = db.get_conn().map_err(ToolError::db("Database error"))?;

    UserGoal::get(&conn, user_id).map_err(ToolError::db("Failed to get goal"))
}

pub fn get_daily_limit(db: &Database, user_id: i64) -> ToolResult<DailyLimitResponse> {
    let goal = get_goal(db, user_id)?;

    Ok(DailyLimitResponse {
        user_id,
        has_goal: goal.is_some(),
        daily_calorie_limit: goal
            .map(|g| g.daily_calorie_limit)
            .unwrap_or(crate::models::DEFAULT_DAILY_CALORIE_LIMIT),
    })
}

/// Goals users can choose from: one per diet plan
pub fn list_nutritional_goals(db: &Database) -> ToolResult<Vec<String>> {
    let conn = db.get_conn().map_err(ToolError::db("Database error"))?;

    DietPlan::distinct_goals(&conn).map_err(ToolError::db("Failed to list nutritional goals"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::tools::catalog::create_diet_plan;

    fn setup() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(run_migrations).unwrap();
        db
    }

    #[test]
    fn test_set_goal_replaces_previous() {
        let db = setup();
        set_goal(&db, 1, "Weight Loss", "low").unwrap();
        let goal = set_goal(&db, 1, "Muscle Gain", "High").unwrap();

        assert_eq!(goal.nutritional_goal, "Muscle Gain");
        assert_eq!(goal.daily_calorie_limit, 2600);
        assert_eq!(get_goal(&db, 1).unwrap().unwrap().exercise_level, ExerciseLevel::High);
    }

    #[test]
    fn test_set_goal_requires_label() {
        let db = setup();
        assert!(matches!(set_goal(&db, 1, " ", "low"), Err(ToolError::Invalid(_))));
        assert!(get_goal(&db, 1).unwrap().is_none());
    }

    #[test]
    fn test_daily_limit_defaults_without_goal() {
        let db = setup();
        let resp = get_daily_limit(&db, 9).unwrap();
        assert!(!resp.has_goal);
        assert_eq!(resp.daily_calorie_limit, 2000);

        set_goal(&db, 9, "Balanced", "whatever").unwrap();
        let resp = get_daily_limit(&db, 9).unwrap();
        assert!(resp.has_goal);
        assert_eq!(resp.daily_calorie_limit, 2000);
    }

    #[test]
    fn test_nutritional_goals_come_from_diet_plans() {
        let db = setup();
        assert!(list_nutritional_goals(&db).unwrap().is_empty());

        create_diet_plan(&db, "Low Carb", None, &[]).unwrap();
        create_diet_plan(&db, "High Protein", None, &[]).unwrap();
        // A user goal without a plan is not offered
        set_goal(&db, 1, "Vegan", "low").unwrap();

        assert_eq!(list_nutritional_goals(&db).unwrap(), vec!["High Protein", "Low Carb"]);
    }
}
