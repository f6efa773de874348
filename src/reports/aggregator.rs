//! Report aggregation
//!
//! Merges meal intake and exercise burn totals over a date range, fills the
//! days neither log mentions with zeros, and derives the summary.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::{CalorieLog, ReportError, ReportRange, ReportResult};

/// Direction of a day (or range) relative to the goal of burning at least
/// what was eaten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Progress {
    Positive,
    Negative,
}

impl Progress {
    /// Positive when intake does not exceed calories burned
    pub fn from_totals<T: PartialOrd>(intake: T, burned: T) -> Self {
        if intake <= burned {
            Progress::Positive
        } else {
            Progress::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Progress::Positive => "Positive",
            Progress::Negative => "Negative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub calorie_intake: i64,
    pub calorie_burned: i64,
    pub progress: Progress,
}

impl DailyRecord {
    pub fn new(date: NaiveDate, calorie_intake: i64, calorie_burned: i64) -> Self {
        Self {
            date,
            calorie_intake,
            calorie_burned,
            progress: Progress::from_totals(calorie_intake, calorie_burned),
        }
    }

    pub fn net_calories(&self) -> i64 {
        self.calorie_intake.saturating_sub(self.calorie_burned)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub avg_intake: i64,
    pub avg_burned: i64,
    pub net_progress: Progress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub report_type: String,
    pub date_range: DateRange,
    pub daily_data: Vec<DailyRecord>,
    pub summary: ReportSummary,
}

/// A report request as received from a caller. Fields are optional because
/// callers may omit them; [`generate_report`] rejects incomplete requests.
#[derive(Debug, Clone, Default)]
pub struct ReportRequest {
    pub user_id: i64,
    pub report_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ReportRequest {
    pub fn new(
        user_id: i64,
        report_type: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            report_type: Some(report_type.into()),
            start_date: Some(start_date.into()),
            end_date: Some(end_date.into()),
        }
    }

    /// Check presence and shape of every field and resolve the date range
    pub fn validate(&self) -> ReportResult<(String, ReportRange)> {
        let present = |field: &Option<String>| {
            field
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        match (
            present(&self.report_type),
            present(&self.start_date),
            present(&self.end_date),
        ) {
            (Some(report_type), Some(start), Some(end)) => {
                let range = ReportRange::parse(&start, &end)?;
                Ok((report_type, range))
            }
            _ => Err(ReportError::InvalidRange(
                "Report type and date range are required".to_string(),
            )),
        }
    }
}

/// Generate a calorie progress report.
///
/// Performs one range read against each log. A failed read fails the whole
/// report; no partial series is returned.
pub fn generate_report<S>(source: &S, request: &ReportRequest) -> ReportResult<Report>
where
    S: CalorieLog + ?Sized,
{
    let (report_type, range) = request.validate()?;
    let user_id = request.user_id;

    tracing::debug!(
        user_id,
        report_type = %report_type,
        start = %range.start(),
        end = %range.end(),
        "generating report"
    );

    let intake = source
        .meal_calories_range(user_id, range.start(), range.end())
        .map_err(|e| {
            tracing::error!(
                user_id,
                start = %range.start(),
                end = %range.end(),
                error = %e,
                "failed to read meal log totals"
            );
            ReportError::UpstreamUnavailable(e)
        })?;

    let burned = source
        .exercise_calories_range(user_id, range.start(), range.end())
        .map_err(|e| {
            tracing::error!(
                user_id,
                start = %range.start(),
                end = %range.end(),
                error = %e,
                "failed to read exercise log totals"
            );
            ReportError::UpstreamUnavailable(e)
        })?;

    let daily_data = merge_daily(&range, &intake, &burned);
    let summary = summarize(&daily_data);

    tracing::info!(
        user_id,
        days = daily_data.len(),
        net_progress = summary.net_progress.as_str(),
        "report generated"
    );

    Ok(Report {
        report_type,
        date_range: DateRange {
            start_date: range.start(),
            end_date: range.end(),
        },
        daily_data,
        summary,
    })
}

/// One record per date in `range`, ascending. Dates missing from a log count as 0.
pub fn merge_daily(
    range: &ReportRange,
    intake: &BTreeMap<NaiveDate, i64>,
    burned: &BTreeMap<NaiveDate, i64>,
) -> Vec<DailyRecord> {
    range
        .days()
        .map(|date| {
            DailyRecord::new(
                date,
                intake.get(&date).copied().unwrap_or(0),
                burned.get(&date).copied().unwrap_or(0),
            )
        })
        .collect()
}

/// Averages over every day in the series (empty days included); net
/// progress from the total intake against the total burned.
///
/// Totals are accumulated in `i128`, so no combination of `i64` daily
/// values can overflow.
pub fn summarize(daily: &[DailyRecord]) -> ReportSummary {
    let total_intake: i128 = daily.iter().map(|d| i128::from(d.calorie_intake)).sum();
    let total_burned: i128 = daily.iter().map(|d| i128::from(d.calorie_burned)).sum();

    ReportSummary {
        avg_intake: rounded_average(total_intake, daily.len()),
        avg_burned: rounded_average(total_burned, daily.len()),
        net_progress: Progress::from_totals(total_intake, total_burned),
    }
}

/// `round(total / days)` with halves rounded up, in integer arithmetic
pub fn rounded_average(total: i128, days: usize) -> i64 {
    if days == 0 {
        return 0;
    }
    let days = days as i128;
    let average = (2 * total + days).div_euclid(2 * days);
    i64::try_from(average).unwrap_or(if average < 0 { i64::MIN } else { i64::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DbError, DbResult};
    use std::cell::Cell;

    /// In-memory stand-in for the meal and exercise logs
    #[derive(Default)]
    struct FakeLogs {
        meals: BTreeMap<(i64, NaiveDate), i64>,
        exercise: BTreeMap<(i64, NaiveDate), i64>,
        fail_meals: bool,
        fail_exercise: bool,
        reads: Cell<usize>,
    }

    impl FakeLogs {
        fn meal(mut self, user_id: i64, day: &str, calories: i64) -> Self {
            *self.meals.entry((user_id, date(day))).or_insert(0) += calories;
            self
        }

        fn exercise(mut self, user_id: i64, day: &str, calories: i64) -> Self {
            *self.exercise.entry((user_id, date(day))).or_insert(0) += calories;
            self
        }

        fn select(
            logs: &BTreeMap<(i64, NaiveDate), i64>,
            user_id: i64,
            start: NaiveDate,
            end: NaiveDate,
        ) -> BTreeMap<NaiveDate, i64> {
            logs.iter()
                .filter(|((uid, d), _)| *uid == user_id && *d >= start && *d <= end)
                .map(|((_, d), total)| (*d, *total))
                .collect()
        }
    }

    impl CalorieLog for FakeLogs {
        fn meal_calories_range(
            &self,
            user_id: i64,
            start: NaiveDate,
            end: NaiveDate,
        ) -> DbResult<BTreeMap<NaiveDate, i64>> {
            self.reads.set(self.reads.get() + 1);
            if self.fail_meals {
                return Err(DbError::NotInitialized);
            }
            Ok(Self::select(&self.meals, user_id, start, end))
        }

        fn exercise_calories_range(
            &self,
            user_id: i64,
            start: NaiveDate,
            end: NaiveDate,
        ) -> DbResult<BTreeMap<NaiveDate, i64>> {
            self.reads.set(self.reads.get() + 1);
            if self.fail_exercise {
                return Err(DbError::NotInitialized);
            }
            Ok(Self::select(&self.exercise, user_id, start, end))
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn request(start: &str, end: &str) -> ReportRequest {
        ReportRequest::new(1, "Weekly Summary", start, end)
    }

    #[test]
    fn test_three_day_scenario() {
        let logs = FakeLogs::default()
            .meal(1, "2024-01-01", 1800)
            .meal(1, "2024-01-02", 2200)
            .exercise(1, "2024-01-01", 2000)
            .exercise(1, "2024-01-03", 500);

        let report = generate_report(&logs, &request("2024-01-01", "2024-01-03")).unwrap();

        assert_eq!(
            report.daily_data,
            vec![
                DailyRecord {
                    date: date("2024-01-01"),
                    calorie_intake: 1800,
                    calorie_burned: 2000,
                    progress: Progress::Positive,
                },
                DailyRecord {
                    date: date("2024-01-02"),
                    calorie_intake: 2200,
                    calorie_burned: 0,
                    progress: Progress::Negative,
                },
                DailyRecord {
                    date: date("2024-01-03"),
                    calorie_intake: 0,
                    calorie_burned: 500,
                    progress: Progress::Positive,
                },
            ]
        );
        assert_eq!(report.summary.avg_intake, 1333);
        assert_eq!(report.summary.avg_burned, 833);
        // 4000 eaten against 2500 burned
        assert_eq!(report.summary.net_progress, Progress::Negative);
        assert_eq!(report.report_type, "Weekly Summary");
        assert_eq!(report.date_range.start_date, date("2024-01-01"));
        assert_eq!(report.date_range.end_date, date("2024-01-03"));
    }

    #[test]
    fn test_series_covers_every_day_in_order() {
        let logs = FakeLogs::default().meal(1, "2024-02-10", 500);
        let report = generate_report(&logs, &request("2024-01-25", "2024-03-05")).unwrap();

        let expected: Vec<_> = date("2024-01-25")
            .iter_days()
            .take_while(|d| *d <= date("2024-03-05"))
            .collect();
        let dates: Vec<_> = report.daily_data.iter().map(|d| d.date).collect();

        assert_eq!(report.daily_data.len(), 41);
        assert_eq!(dates, expected);
    }

    #[test]
    fn test_forty_five_day_range_not_truncated() {
        let logs = FakeLogs::default()
            .meal(1, "2024-01-01", 100)
            .exercise(1, "2024-02-14", 300);

        let report = generate_report(&logs, &request("2024-01-01", "2024-02-14")).unwrap();

        assert_eq!(report.daily_data.len(), 45);
        let last = report.daily_data.last().unwrap();
        assert_eq!(last.date, date("2024-02-14"));
        assert_eq!(last.calorie_burned, 300);
    }

    #[test]
    fn test_empty_days_are_zero_and_positive() {
        let logs = FakeLogs::default();
        let report = generate_report(&logs, &request("2024-05-01", "2024-05-07")).unwrap();

        assert_eq!(report.daily_data.len(), 7);
        for day in &report.daily_data {
            assert_eq!(day.calorie_intake, 0);
            assert_eq!(day.calorie_burned, 0);
            assert_eq!(day.progress, Progress::Positive);
        }
        assert_eq!(report.summary.avg_intake, 0);
        assert_eq!(report.summary.avg_burned, 0);
        assert_eq!(report.summary.net_progress, Progress::Positive);
    }

    #[test]
    fn test_averages_match_rounded_means() {
        let logs = FakeLogs::default()
            .meal(1, "2024-01-01", 1001)
            .meal(1, "2024-01-02", 1000)
            .meal(1, "2024-01-04", 2500)
            .exercise(1, "2024-01-03", 7);

        let report = generate_report(&logs, &request("2024-01-01", "2024-01-04")).unwrap();
        let n = report.daily_data.len() as f64;
        let sum_intake: i64 = report.daily_data.iter().map(|d| d.calorie_intake).sum();
        let sum_burned: i64 = report.daily_data.iter().map(|d| d.calorie_burned).sum();

        assert_eq!(report.summary.avg_intake, (sum_intake as f64 / n).round() as i64);
        assert_eq!(report.summary.avg_burned, (sum_burned as f64 / n).round() as i64);
    }

    #[test]
    fn test_net_progress_uses_totals() {
        // One heavy training day outweighs several small surpluses
        let logs = FakeLogs::default()
            .meal(1, "2024-01-01", 2100)
            .meal(1, "2024-01-02", 2100)
            .meal(1, "2024-01-03", 2100)
            .exercise(1, "2024-01-01", 2000)
            .exercise(1, "2024-01-02", 2000)
            .exercise(1, "2024-01-03", 2500);

        let report = generate_report(&logs, &request("2024-01-01", "2024-01-03")).unwrap();
        assert_eq!(report.daily_data[0].progress, Progress::Negative);
        assert_eq!(report.summary.net_progress, Progress::Positive);
    }

    #[test]
    fn test_other_users_data_ignored() {
        let logs = FakeLogs::default()
            .meal(2, "2024-01-01", 3000)
            .exercise(2, "2024-01-01", 100);

        let report = generate_report(&logs, &request("2024-01-01", "2024-01-01")).unwrap();
        assert_eq!(report.daily_data[0].calorie_intake, 0);
        assert_eq!(report.daily_data[0].calorie_burned, 0);
    }

    #[test]
    fn test_idempotent() {
        let logs = FakeLogs::default()
            .meal(1, "2024-01-01", 1800)
            .exercise(1, "2024-01-02", 400);

        let first = generate_report(&logs, &request("2024-01-01", "2024-01-10")).unwrap();
        let second = generate_report(&logs, &request("2024-01-01", "2024-01-10")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reads_each_log_once() {
        let logs = FakeLogs::default();
        generate_report(&logs, &request("2024-01-01", "2024-03-31")).unwrap();
        assert_eq!(logs.reads.get(), 2);
    }

    #[test]
    fn test_reversed_range_is_validation_error() {
        let logs = FakeLogs::default();
        let err = generate_report(&logs, &request("2024-01-03", "2024-01-01")).unwrap_err();

        assert!(matches!(err, ReportError::InvalidRange(_)));
        assert_eq!(logs.reads.get(), 0);
    }

    #[test]
    fn test_missing_fields_are_validation_errors() {
        let logs = FakeLogs::default();
        let complete = request("2024-01-01", "2024-01-02");

        let cases = [
            ReportRequest { report_type: None, ..complete.clone() },
            ReportRequest { start_date: None, ..complete.clone() },
            ReportRequest { end_date: Some("  ".to_string()), ..complete.clone() },
        ];

        for case in cases {
            let err = generate_report(&logs, &case).unwrap_err();
            assert_eq!(err.to_string(), "Report type and date range are required");
        }
    }

    #[test]
    fn test_malformed_date_is_validation_error() {
        let logs = FakeLogs::default();
        let err = generate_report(&logs, &request("2024-13-01", "2024-12-31")).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_upstream_failure_fails_whole_report() {
        let meals_down = FakeLogs { fail_meals: true, ..FakeLogs::default() };
        let err = generate_report(&meals_down, &request("2024-01-01", "2024-01-02")).unwrap_err();
        assert!(matches!(err, ReportError::UpstreamUnavailable(_)));

        let exercise_down = FakeLogs { fail_exercise: true, ..FakeLogs::default() };
        let err = generate_report(&exercise_down, &request("2024-01-01", "2024-01-02")).unwrap_err();
        assert!(matches!(err, ReportError::UpstreamUnavailable(_)));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_response_shape() {
        let logs = FakeLogs::default().meal(1, "2024-01-01", 1800);
        let report = generate_report(&logs, &request("2024-01-01", "2024-01-01")).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["reportType"], "Weekly Summary");
        assert_eq!(json["dateRange"]["startDate"], "2024-01-01");
        assert_eq!(json["dateRange"]["endDate"], "2024-01-01");
        assert_eq!(json["dailyData"][0]["date"], "2024-01-01");
        assert_eq!(json["dailyData"][0]["calorieIntake"], 1800);
        assert_eq!(json["dailyData"][0]["calorieBurned"], 0);
        assert_eq!(json["dailyData"][0]["progress"], "Negative");
        assert_eq!(json["summary"]["avgIntake"], 1800);
        assert_eq!(json["summary"]["avgBurned"], 0);
        assert_eq!(json["summary"]["netProgress"], "Negative");
    }

    #[test]
    fn test_rounded_average_halves_round_up() {
        assert_eq!(rounded_average(0, 0), 0);
        assert_eq!(rounded_average(5, 2), 3);
        assert_eq!(rounded_average(4000, 3), 1333);
        assert_eq!(rounded_average(2500, 3), 833);
        assert_eq!(rounded_average(3, 2), 2);
        assert_eq!(rounded_average(1, 3), 0);
        assert_eq!(rounded_average(2, 3), 1);
    }

    #[test]
    fn test_extreme_daily_totals_do_not_overflow() {
        let logs = FakeLogs::default()
            .meal(1, "2024-01-01", i64::MAX)
            .meal(1, "2024-01-02", i64::MAX)
            .meal(1, "2024-01-03", i64::MAX)
            .exercise(1, "2024-01-02", i64::MAX);

        let report = generate_report(&logs, &request("2024-01-01", "2024-01-03")).unwrap();

        assert_eq!(report.summary.avg_intake, i64::MAX);
        assert_eq!(report.summary.avg_burned, rounded_average(i128::from(i64::MAX), 3));
        assert_eq!(report.summary.net_progress, Progress::Negative);
        assert_eq!(report.daily_data[1].progress, Progress::Positive);
        assert_eq!(report.daily_data[0].net_calories(), i64::MAX);
    }

    #[test]
    fn test_single_huge_day_averages_without_panic() {
        let logs = FakeLogs::default().meal(1, "2024-01-01", 5_000_000_000_000_000_000);

        let report = generate_report(&logs, &request("2024-01-01", "2024-01-01")).unwrap();
        assert_eq!(report.summary.avg_intake, 5_000_000_000_000_000_000);
    }
}
