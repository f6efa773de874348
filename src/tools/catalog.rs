//! Meal Catalogue and Diet Plan MCP Tools
//!
//! The catalogue holds meals with fixed calories and a nutritional category.
//! Diet plans group catalogue meals under a nutritional goal; recommendations
//! narrow a plan's meals to the calorie band of the user's exercise level.

use serde::Serialize;

use crate::db::{Database, DbError};
use crate::models::{DietPlan, DietPlanCreate, ExerciseLevel, Meal, MealCreate};
use crate::tools::{validate_calories, ToolError, ToolResult};

/// Response for list_meals
#[derive(Debug, Serialize)]
pub struct ListMealsResponse {
    pub meals: Vec<Meal>,
    pub count: usize,
}

/// A diet plan with its meals
#[derive(Debug, Serialize)]
pub struct DietPlanDetail {
    pub plan: DietPlan,
    pub meals: Vec<Meal>,
}

/// Response for recommended_meals
#[derive(Debug, Serialize)]
pub struct RecommendedMealsResponse {
    pub nutritional_goal: String,
    pub exercise_level: String,
    pub min_calories: Option<i64>,
    pub max_calories: Option<i64>,
    pub meals: Vec<Meal>,
}

fn is_unique_violation(err: &DbError) -> bool {
    matches!(
        err,
        DbError::Sqlite(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Add a meal to the catalogue
pub fn add_catalog_meal(
    db: &Database,
    meal_name: &str,
    calories: i64,
    nutritional_value: Option<String>,
    category: &str,
) -> ToolResult<Meal> {
    let meal_name = meal_name.trim();
    if meal_name.is_empty() {
        return Err(ToolError::invalid("Meal name is required"));
    }
    let category = category.trim();
    if category.is_empty() {
        return Err(ToolError::invalid("Meal category is required"));
    }
    let calories = validate_calories("Calories", calories)?;

    let conn = db.get_conn().map_err(ToolError::db("Database error"))?;

    let data = MealCreate {
        meal_name: meal_name.to_string(),
        calories,
        nutritional_value,
        category: category.to_string(),
    };

    Meal::create(&conn, &data).map_err(|e| {
        if is_unique_violation(&e) {
            ToolError::invalid(format!("A meal named '{}' already exists", meal_name))
        } else {
            ToolError::db("Failed to add meal")(e)
        }
    })
}

/// The whole meal catalogue, by name
pub fn list_meals(db: &Database) -> ToolResult<ListMealsResponse> {
    let conn = db.get_conn().map_err(ToolError::db("Database error"))?;

    let meals = Meal::list(&conn).map_err(ToolError::db("Failed to list meals"))?;

    Ok(ListMealsResponse {
        count: meals.len(),
        meals,
    })
}

/// Create a diet plan for a nutritional goal with the given catalogue meals.
/// Either the whole plan is stored or nothing is.
pub fn create_diet_plan(
    db: &Database,
    nutritional_goal: &str,
    description: Option<String>,
    meal_ids: &[i64],
) -> ToolResult<DietPlanDetail> {
    let nutritional_goal = nutritional_goal.trim();
    if nutritional_goal.is_empty() {
        return Err(ToolError::invalid("Nutritional goal is required"));
    }

    let mut conn = db.get_conn().map_err(ToolError::db("Database error"))?;

    let existing = DietPlan::get_by_goal(&conn, nutritional_goal)
        .map_err(ToolError::db("Database error checking diet plan"))?;
    if existing.is_some() {
        return Err(ToolError::invalid(format!(
            "A diet plan for '{}' already exists",
            nutritional_goal
        )));
    }

    let tx = conn
        .transaction()
        .map_err(|e| ToolError::db("Failed to start transaction")(e.into()))?;

    let plan = DietPlan::create(&tx, &DietPlanCreate {
        nutritional_goal: nutritional_goal.to_string(),
        description,
    })
    .map_err(ToolError::db("Failed to create diet plan"))?;

    for &meal_id in meal_ids {
        let found = Meal::get_by_id(&tx, meal_id)
            .map_err(ToolError::db("Database error checking meal"))?;
        if found.is_none() {
            return Err(ToolError::NotFound(format!("Meal not found with id: {}", meal_id)));
        }
        DietPlan::add_meal(&tx, plan.id, meal_id)
            .map_err(ToolError::db("Failed to add meal to diet plan"))?;
    }

    let meals = Meal::list_for_plan(&tx, plan.id, None, None)
        .map_err(ToolError::db("Failed to list diet plan meals"))?;

    tx.commit()
        .map_err(|e| ToolError::db("Failed to save diet plan")(e.into()))?;

    tracing::info!(goal = %plan.nutritional_goal, meals = meals.len(), "diet plan created");
    Ok(DietPlanDetail { plan, meals })
}

/// Meals of the goal's diet plan that suit the exercise level:
/// high 400 kcal and up, medium 200 to 400, otherwise 300 and below
pub fn recommended_meals(
    db: &Database,
    nutritional_goal: &str,
    exercise_level: &str,
) -> ToolResult<RecommendedMealsResponse> {
    let level = ExerciseLevel::from_str(exercise_level);
    let (min_calories, max_calories) = level.recommended_calorie_range();

    let conn = db.get_conn().map_err(ToolError::db("Database error"))?;

    let plan = DietPlan::get_by_goal(&conn, nutritional_goal)
        .map_err(ToolError::db("Database error"))?
        .ok_or_else(|| {
            ToolError::NotFound(format!(
                "No diet plan found for nutritional goal '{}'",
                nutritional_goal.trim()
            ))
        })?;

    let meals = Meal::list_for_plan(&conn, plan.id, min_calories, max_calories)
        .map_err(ToolError::db("Failed to list recommended meals"))?;

    Ok(RecommendedMealsResponse {
        nutritional_goal: plan.nutritional_goal,
        exercise_level: level.as_str().to_string(),
        min_calories,
        max_calories,
        meals,
    })
}
