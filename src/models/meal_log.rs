//! Meal log model
//!
//! One row per meal a user ate on a given date.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::parse_iso_date;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Unspecified,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
            MealType::Unspecified => "unspecified",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => MealType::Breakfast,
            "lunch" => MealType::Lunch,
            "dinner" => MealType::Dinner,
            "snack" => MealType::Snack,
            _ => MealType::Unspecified,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealLog {
    pub id: i64,
    pub user_id: i64,
    pub date: String,
    pub meal_type: MealType,
    pub meal_name: String,
    pub calorie_intake: i64,
    pub category: Option<String>,
    /// Catalogue meal this log was made from, if any
    pub meal_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Data for logging a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealLogCreate {
    pub user_id: i64,
    pub date: String,
    pub meal_type: MealType,
    pub meal_name: String,
    pub calorie_intake: i64,
    pub category: Option<String>,
    pub meal_id: Option<i64>,
    pub notes: Option<String>,
}

impl MealLog {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let meal_type: String = row.get("meal_type")?;

        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date: row.get("date")?,
            meal_type: MealType::from_str(&meal_type),
            meal_name: row.get("meal_name")?,
            calorie_intake: row.get("calorie_intake")?,
            category: row.get("category")?,
            meal_id: row.get("meal_id")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &MealLogCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO meal_logs (user_id, date, meal_type, meal_name, calorie_intake, category, meal_id, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                data.user_id,
                data.date,
                data.meal_type.as_str(),
                data.meal_name,
                data.calorie_intake,
                data.category,
                data.meal_id,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meal_logs WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(log) => Ok(Some(log)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Meals a user logged on one date, breakfast first
    pub fn list_for_date(conn: &Connection, user_id: i64, date: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM meal_logs
            WHERE user_id = ?1 AND date = ?2
            ORDER BY CASE meal_type
                WHEN 'breakfast' THEN 0
                WHEN 'lunch' THEN 1
                WHEN 'dinner' THEN 2
                WHEN 'snack' THEN 3
                ELSE 4
            END, id
            "#,
        )?;
        let logs = stmt
            .query_map(params![user_id, date], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(logs)
    }

    /// Total intake for one user and date (0 when nothing is logged)
    pub fn total_for_date(conn: &Connection, user_id: i64, date: &str) -> DbResult<i64> {
        let total: i64 = conn.query_row(
            "SELECT COALESCE(SUM(calorie_intake), 0) FROM meal_logs WHERE user_id = ?1 AND date = ?2",
            params![user_id, date],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Summed intake per date over an inclusive range. Dates with no meals are absent.
    pub fn daily_totals(
        conn: &Connection,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<BTreeMap<NaiveDate, i64>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT date, SUM(calorie_intake) FROM meal_logs
            WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
            GROUP BY date
            "#,
        )?;

        let rows = stmt.query_map(
            params![user_id, start.to_string(), end.to_string()],
            |row| {
                let date: String = row.get(0)?;
                let total: i64 = row.get(1)?;
                Ok((parse_iso_date(&date, 0)?, total))
            },
        )?;

        let mut totals = BTreeMap::new();
        for row in rows {
            let (date, total) = row?;
            totals.insert(date, total);
        }
        Ok(totals)
    }

    /// Delete a log, only if it belongs to `user_id`
    pub fn delete_for_user(conn: &Connection, user_id: i64, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM meal_logs WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn meal(user_id: i64, date: &str, meal_type: MealType, calories: i64) -> MealLogCreate {
        MealLogCreate {
            user_id,
            date: date.to_string(),
            meal_type,
            meal_name: "Oatmeal".to_string(),
            calorie_intake: calories,
            category: None,
            meal_id: None,
            notes: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_meal_type_parsing() {
        assert_eq!(MealType::from_str("Breakfast"), MealType::Breakfast);
        assert_eq!(MealType::from_str(" dinner "), MealType::Dinner);
        assert_eq!(MealType::from_str("brunch"), MealType::Unspecified);
    }

    #[test]
    fn test_create_and_list_orders_by_meal_type() {
        let conn = setup();
        MealLog::create(&conn, &meal(1, "2024-01-01", MealType::Dinner, 700)).unwrap();
        MealLog::create(&conn, &meal(1, "2024-01-01", MealType::Breakfast, 300)).unwrap();
        MealLog::create(&conn, &meal(1, "2024-01-02", MealType::Lunch, 500)).unwrap();

        let logs = MealLog::list_for_date(&conn, 1, "2024-01-01").unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].meal_type, MealType::Breakfast);
        assert_eq!(logs[1].meal_type, MealType::Dinner);
        assert_eq!(MealLog::total_for_date(&conn, 1, "2024-01-01").unwrap(), 1000);
        assert_eq!(MealLog::total_for_date(&conn, 1, "2024-01-05").unwrap(), 0);
    }

    #[test]
    fn test_daily_totals_sums_and_scopes_by_user() {
        let conn = setup();
        MealLog::create(&conn, &meal(1, "2024-01-01", MealType::Breakfast, 800)).unwrap();
        MealLog::create(&conn, &meal(1, "2024-01-01", MealType::Lunch, 1000)).unwrap();
        MealLog::create(&conn, &meal(1, "2024-01-03", MealType::Lunch, 400)).unwrap();
        MealLog::create(&conn, &meal(2, "2024-01-01", MealType::Lunch, 9999)).unwrap();
        MealLog::create(&conn, &meal(1, "2024-01-04", MealType::Lunch, 123)).unwrap();

        let totals = MealLog::daily_totals(&conn, 1, date("2024-01-01"), date("2024-01-03")).unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&date("2024-01-01")], 1800);
        assert_eq!(totals[&date("2024-01-03")], 400);
    }

    #[test]
    fn test_delete_requires_owner() {
        let conn = setup();
        let log = MealLog::create(&conn, &meal(1, "2024-01-01", MealType::Lunch, 500)).unwrap();

        assert!(!MealLog::delete_for_user(&conn, 2, log.id).unwrap());
        assert!(MealLog::get_by_id(&conn, log.id).unwrap().is_some());

        assert!(MealLog::delete_for_user(&conn, 1, log.id).unwrap());
        assert!(MealLog::get_by_id(&conn, log.id).unwrap().is_none());
    }
}
