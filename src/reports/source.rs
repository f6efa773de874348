//! Calorie log sources
//!
//! The aggregator reads intake and burn totals through [`CalorieLog`] so it
//! never depends on a concrete store.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::db::{Database, DbResult};
use crate::models::{ExerciseLog, MealLog};

/// Read access to per-day calorie totals for one user.
///
/// Both methods cover `[start, end]` inclusive and return only the dates that
/// have at least one log entry.
pub trait CalorieLog {
    fn meal_calories_range(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<BTreeMap<NaiveDate, i64>>;

    fn exercise_calories_range(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<BTreeMap<NaiveDate, i64>>;
}

impl CalorieLog for Database {
    fn meal_calories_range(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<BTreeMap<NaiveDate, i64>> {
        self.with_conn(|conn| MealLog::daily_totals(conn, user_id, start, end))
    }

    fn exercise_calories_range(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<BTreeMap<NaiveDate, i64>> {
        self.with_conn(|conn| ExerciseLog::daily_totals(conn, user_id, start, end))
    }
}
