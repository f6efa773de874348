//! Diet plan model
//!
//! A diet plan names a nutritional goal and groups the catalogue meals
//! recommended for it.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietPlan {
    pub id: i64,
    pub nutritional_goal: String,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DietPlanCreate {
    pub nutritional_goal: String,
    pub description: Option<String>,
}

impl DietPlan {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            nutritional_goal: row.get("nutritional_goal")?,
            description: row.get("description")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &DietPlanCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO diet_plans (nutritional_goal, description) VALUES (?1, ?2)",
            params![data.nutritional_goal, data.description],
        )?;

        let id = conn.last_insert_rowid();
        let mut stmt = conn.prepare("SELECT * FROM diet_plans WHERE id = ?1")?;
        Ok(stmt.query_row([id], Self::from_row)?)
    }

    /// Look up the plan for a goal, ignoring case
    pub fn get_by_goal(conn: &Connection, nutritional_goal: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM diet_plans WHERE nutritional_goal = ?1")?;

        match stmt.query_row([nutritional_goal.trim()], Self::from_row) {
            Ok(plan) => Ok(Some(plan)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Attach a catalogue meal. Adding the same meal twice is a no-op.
    pub fn add_meal(conn: &Connection, diet_plan_id: i64, meal_id: i64) -> DbResult<()> {
        conn.execute(
            "INSERT OR IGNORE INTO diet_plan_meals (diet_plan_id, meal_id) VALUES (?1, ?2)",
            params![diet_plan_id, meal_id],
        )?;
        Ok(())
    }

    /// Goals that have a diet plan
    pub fn distinct_goals(conn: &Connection) -> DbResult<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT DISTINCT nutritional_goal FROM diet_plans ORDER BY nutritional_goal",
        )?;
        let goals = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(goals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{Meal, MealCreate};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn plan(goal: &str) -> DietPlanCreate {
        DietPlanCreate {
            nutritional_goal: goal.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_get_by_goal_ignores_case() {
        let conn = setup();
        let created = DietPlan::create(&conn, &plan("High Protein")).unwrap();

        let found = DietPlan::get_by_goal(&conn, " high protein ").unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(DietPlan::get_by_goal(&conn, "Keto").unwrap().is_none());
        assert!(DietPlan::create(&conn, &plan("HIGH PROTEIN")).is_err());
    }

    #[test]
    fn test_add_meal_is_idempotent() {
        let conn = setup();
        let p = DietPlan::create(&conn, &plan("Low Carb")).unwrap();
        let meal = Meal::create(&conn, &MealCreate {
            meal_name: "Omelette".to_string(),
            calories: 320,
            nutritional_value: None,
            category: "Low Carb".to_string(),
        })
        .unwrap();

        DietPlan::add_meal(&conn, p.id, meal.id).unwrap();
        DietPlan::add_meal(&conn, p.id, meal.id).unwrap();
        assert_eq!(Meal::list_for_plan(&conn, p.id, None, None).unwrap().len(), 1);

        assert!(DietPlan::add_meal(&conn, p.id, 999).is_err());
    }

    #[test]
    fn test_distinct_goals() {
        let conn = setup();
        DietPlan::create(&conn, &plan("Low Carb")).unwrap();
        DietPlan::create(&conn, &plan("Balanced")).unwrap();

        assert_eq!(
            DietPlan::distinct_goals(&conn).unwrap(),
            vec!["Balanced".to_string(), "Low Carb".to_string()]
        );
    }
}
