//! Data models
//!
//! Rust structs representing database entities.

mod diet_plan;
mod exercise_log;
mod goal;
mod meal;
mod meal_log;

use chrono::NaiveDate;

pub use diet_plan::{DietPlan, DietPlanCreate};
pub use exercise_log::{ExerciseLog, ExerciseLogCreate};
pub use goal::{ExerciseLevel, UserGoal, DEFAULT_DAILY_CALORIE_LIMIT};
pub use meal::{Meal, MealCreate};
pub use meal_log::{MealLog, MealLogCreate, MealType};

/// Upper bound for the calories of a single meal, catalogue entry or
/// exercise session. Mirrored by CHECK constraints in the schema.
pub const MAX_ENTRY_CALORIES: i64 = 20_000;

/// Parse a stored ISO date column, reporting bad rows as a conversion failure
pub(crate) fn parse_iso_date(value: &str, column: usize) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}
