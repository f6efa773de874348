//! Exercise log model
//!
//! One row per exercise session with the calories it burned.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::parse_iso_date;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseLog {
    pub id: i64,
    pub user_id: i64,
    pub date: String,
    pub activity_type: String,
    pub duration_minutes: i64,
    pub calories_burned: i64,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseLogCreate {
    pub user_id: i64,
    pub date: String,
    pub activity_type: String,
    pub duration_minutes: i64,
    pub calories_burned: i64,
    pub notes: Option<String>,
}

impl ExerciseLog {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date: row.get("date")?,
            activity_type: row.get("activity_type")?,
            duration_minutes: row.get("duration_minutes")?,
            calories_burned: row.get("calories_burned")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &ExerciseLogCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO exercise_logs (user_id, date, activity_type, duration_minutes, calories_burned, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.user_id,
                data.date,
                data.activity_type,
                data.duration_minutes,
                data.calories_burned,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM exercise_logs WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(log) => Ok(Some(log)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// A user's sessions, newest first, optionally bounded by date
    pub fn list(
        conn: &Connection,
        user_id: i64,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> DbResult<Vec<Self>> {
        let mut sql = String::from("SELECT * FROM exercise_logs WHERE user_id = ?1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

        if let Some(start) = start_date {
            params_vec.push(Box::new(start.to_string()));
            sql.push_str(&format!(" AND date >= ?{}", params_vec.len()));
        }

        if let Some(end) = end_date {
            params_vec.push(Box::new(end.to_string()));
            sql.push_str(&format!(" AND date <= ?{}", params_vec.len()));
        }

        sql.push_str(" ORDER BY date DESC, id DESC");

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let logs = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(logs)
    }

    /// Summed calories burned per date over an inclusive range. Dates with no sessions are absent.
    pub fn daily_totals(
        conn: &Connection,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<BTreeMap<NaiveDate, i64>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT date, SUM(calories_burned) FROM exercise_logs
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

    /// Delete a session, only if it belongs to `user_id`
    pub fn delete_for_user(conn: &Connection, user_id: i64, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM exercise_logs WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }
}
