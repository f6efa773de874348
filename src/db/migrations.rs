//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!(version = 1, "applied schema migration");
    }

    tracing::debug!(version = SCHEMA_VERSION, "schema up to date");
    Ok(())
}

/// Migration v1: meal catalogue, diet plans, meal logs, exercise logs and goals
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- MEAL CATALOGUE
        -- category is the meal's nutritional type ("High Protein", "Low Carb")
        -- ============================================
        CREATE TABLE meals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            meal_name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            calories INTEGER NOT NULL CHECK(calories >= 0 AND calories <= 20000),
            nutritional_value TEXT,              -- free-form, e.g. "30g protein"
            category TEXT NOT NULL,

            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- DIET PLANS
        -- One plan per nutritional goal, with its recommended meals
        -- ============================================
        CREATE TABLE diet_plans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nutritional_goal TEXT NOT NULL UNIQUE COLLATE NOCASE,
            description TEXT,

            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE diet_plan_meals (
            diet_plan_id INTEGER NOT NULL REFERENCES diet_plans(id) ON DELETE CASCADE,
            meal_id INTEGER NOT NULL REFERENCES meals(id) ON DELETE CASCADE,
            PRIMARY KEY (diet_plan_id, meal_id)
        );

        -- ============================================
        -- MEAL LOGS
        -- One row per meal eaten; summed per user and date for reports
        -- ============================================
        CREATE TABLE meal_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,            -- issued by the auth service
            date TEXT NOT NULL,                  -- ISO date: "2025-01-09"
            meal_type TEXT NOT NULL CHECK(meal_type IN ('breakfast', 'lunch', 'dinner', 'snack', 'unspecified')),
            meal_name TEXT NOT NULL,
            calorie_intake INTEGER NOT NULL CHECK(calorie_intake >= 0 AND calorie_intake <= 20000),
            category TEXT,                       -- e.g. "High Protein", compared with the user's goal
            meal_id INTEGER REFERENCES meals(id) ON DELETE SET NULL,

            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_meal_logs_user_date ON meal_logs(user_id, date);

        -- ============================================
        -- EXERCISE LOGS
        -- ============================================
        CREATE TABLE exercise_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            activity_type TEXT NOT NULL,
            duration_minutes INTEGER NOT NULL CHECK(duration_minutes > 0),
            calories_burned INTEGER NOT NULL CHECK(calories_burned >= 0 AND calories_burned <= 20000),

            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_exercise_logs_user_date ON exercise_logs(user_id, date);

        -- ============================================
        -- USER GOALS
        -- At most one active goal per user
        -- ============================================
        CREATE TABLE user_goals (
            user_id INTEGER PRIMARY KEY,
            nutritional_goal TEXT NOT NULL,
            exercise_level TEXT NOT NULL CHECK(exercise_level IN ('low', 'medium', 'high', 'unspecified')),
            daily_calorie_limit INTEGER NOT NULL,

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_negative_calories_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO meal_logs (user_id, date, meal_type, meal_name, calorie_intake)
             VALUES (1, '2024-01-01', 'lunch', 'Soup', -5)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_calorie_upper_bounds_enforced() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let meal = conn.execute(
            "INSERT INTO meal_logs (user_id, date, meal_type, meal_name, calorie_intake)
             VALUES (1, '2024-01-01', 'lunch', 'Soup', 20001)",
            [],
        );
        assert!(meal.is_err());

        let exercise = conn.execute(
            "INSERT INTO exercise_logs (user_id, date, activity_type, duration_minutes, calories_burned)
             VALUES (1, '2024-01-01', 'Run', 30, 5000000000000000000)",
            [],
        );
        assert!(exercise.is_err());

        let catalogue = conn.execute(
            "INSERT INTO meals (meal_name, calories, category) VALUES ('Feast', 20001, 'Balanced')",
            [],
        );
        assert!(catalogue.is_err());
    }
}
