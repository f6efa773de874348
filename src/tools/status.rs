//! Dietlog Status Tool
//!
//! Runtime status of the service, plus usage instructions for assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Report and logging instructions for AI assistants
pub const REPORT_INSTRUCTIONS: &str = r#"
# Diet Log Instructions

## Logging

- `log_meal` records a meal for a user on a date (YYYY-MM-DD). The response
  carries the day's total intake, the user's daily limit and any warnings:
  - `calorie_limit`: the day's total is above the daily limit
  - `nutritional_mismatch`: the meal's category differs from the user's goal
- `log_catalog_meal` logs a catalogue meal by `meal_id`. Name, calories and
  category come from the catalogue.
- `log_exercise` records a session. Activity type, duration (minutes, > 0) and
  calories burned (>= 0) are all required.
- Calories of a single meal or session may not exceed 20000.
- `delete_meal_log` and `delete_exercise_log` only remove entries owned by the
  given user.

## Goals

- `set_goal` replaces the user's goal. The daily limit follows the exercise
  level: low 1800, medium 2200, high 2600, anything else 2000.
- `get_daily_limit` returns 2000 when the user has no goal.
- `list_nutritional_goals` lists the goals that have a diet plan.

## Catalogue

- `list_meals` shows every catalogue meal. `add_catalog_meal` adds one.
- `create_diet_plan` groups catalogue meals under a nutritional goal.
- `recommended_meals` picks meals from the goal's plan by exercise level:
  high 400 kcal and up, medium 200 to 400, otherwise 300 and below.

## Reports

Call `generate_report` with:
- `user_id`
- `report_type`: a label such as "Weekly Summary", "Monthly Summary" or
  "Yearly Summary" (any non-empty label is accepted and echoed back)
- `start_date`, `end_date`: inclusive, YYYY-MM-DD, start not after end

The report has one entry per calendar day in the range, ascending. Days
without logs appear with 0 intake and 0 burned. A day is "Positive" when
intake is at or below calories burned. Averages are taken over every day in
the range and rounded to the nearest whole calorie.

The label does not choose the dates. For a weekly report ending today, pass
today as `end_date` and the date 7 days earlier as `start_date` (30 days for
monthly, 365 for yearly).

`export_report_pdf` takes the same fields plus `output_path` and writes a PDF
with a summary, a daily table and an intake vs burned chart.
"#;

/// Runtime status of the dietlog service
#[derive(Debug, Clone, Serialize)]
pub struct DietlogStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    pub fn get_status(&self) -> DietlogStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = Pid::from_u32(std::process::id());
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[pid]));
        let memory_usage_bytes = sys.process(pid).map(|p| p.memory()).unwrap_or(0);

        DietlogStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: std::process::id(),
            memory_usage_bytes,
        }
    }
}
