//! Meal catalogue model
//!
//! Meals users can pick from when logging, each with fixed calories and a
//! nutritional category.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub meal_name: String,
    pub calories: i64,
    pub nutritional_value: Option<String>,
    pub category: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MealCreate {
    pub meal_name: String,
    pub calories: i64,
    pub nutritional_value: Option<String>,
    pub category: String,
}

impl Meal {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            meal_name: row.get("meal_name")?,
            calories: row.get("calories")?,
            nutritional_value: row.get("nutritional_value")?,
            category: row.get("category")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &MealCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO meals (meal_name, calories, nutritional_value, category) VALUES (?1, ?2, ?3, ?4)",
            params![data.meal_name, data.calories, data.nutritional_value, data.category],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meals WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(meal) => Ok(Some(meal)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The whole catalogue, by name
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meals ORDER BY meal_name")?;
        let meals = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(meals)
    }

    /// Meals of a diet plan whose calories fall within `[min, max]`.
    /// A `None` bound is open.
    pub fn list_for_plan(
        conn: &Connection,
        diet_plan_id: i64,
        min_calories: Option<i64>,
        max_calories: Option<i64>,
    ) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT m.* FROM diet_plan_meals dpm
            JOIN meals m ON dpm.meal_id = m.id
            WHERE dpm.diet_plan_id = ?1
              AND (?2 IS NULL OR m.calories >= ?2)
              AND (?3 IS NULL OR m.calories <= ?3)
            ORDER BY m.meal_name
            "#,
        )?;
        let meals = stmt
            .query_map(params![diet_plan_id, min_calories, max_calories], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(meals)
    }
}
