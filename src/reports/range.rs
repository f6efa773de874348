//! Report date ranges
//!
//! Ranges are enumerated with calendar arithmetic, so any span works:
//! month ends, leap days and multi-year ranges alike.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use super::{ReportError, ReportResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// An inclusive, validated `[start, end]` span of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl ReportRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> ReportResult<Self> {
        if start > end {
            return Err(ReportError::InvalidRange(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse two ISO dates (`YYYY-MM-DD`)
    pub fn parse(start: &str, end: &str) -> ReportResult<Self> {
        let start = parse_date("start", start)?;
        let end = parse_date("end", end)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, both ends included
    pub fn num_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Every date in the range, ascending
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

fn parse_date(which: &str, value: &str) -> ReportResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        ReportError::InvalidRange(format!(
            "Invalid {} date '{}': expected YYYY-MM-DD",
            which, value
        ))
    })
}

/// Report labels offered to users. The label is display-only; the range a
/// report covers is always supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportType {
    Weekly,
    Monthly,
    Yearly,
    Custom(String),
}

impl ReportType {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "weekly" | "weekly summary" => ReportType::Weekly,
            "monthly" | "monthly summary" => ReportType::Monthly,
            "yearly" | "yearly summary" => ReportType::Yearly,
            _ => ReportType::Custom(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ReportType::Weekly => "Weekly Summary",
            ReportType::Monthly => "Monthly Summary",
            ReportType::Yearly => "Yearly Summary",
            ReportType::Custom(label) => label,
        }
    }

    /// How far back a preset reaches from its end date
    pub fn lookback_days(&self) -> u64 {
        match self {
            ReportType::Weekly | ReportType::Custom(_) => 7,
            ReportType::Monthly => 30,
            ReportType::Yearly => 365,
        }
    }

    /// Suggested range for a preset, ending at `end`
    pub fn trailing_range(&self, end: NaiveDate) -> ReportRange {
        let start = end
            .checked_sub_days(Days::new(self.lookback_days()))
            .unwrap_or(NaiveDate::MIN);
        ReportRange { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_single_day_range() {
        let range = ReportRange::parse("2024-03-10", "2024-03-10").unwrap();
        assert_eq!(range.num_days(), 1);
        assert_eq!(range.days().collect::<Vec<_>>(), vec![date("2024-03-10")]);
    }

    #[test]
    fn test_range_crosses_leap_day_and_month_end() {
        let range = ReportRange::parse("2024-02-27", "2024-03-02").unwrap();
        let days: Vec<_> = range.days().collect();
        assert_eq!(
            days,
            vec![
                date("2024-02-27"),
                date("2024-02-28"),
                date("2024-02-29"),
                date("2024-03-01"),
                date("2024-03-02"),
            ]
        );
        assert_eq!(range.num_days(), 5);
    }

    #[test]
    fn test_long_range_is_not_capped() {
        let range = ReportRange::parse("2023-01-01", "2024-12-31").unwrap();
        assert_eq!(range.num_days(), 731);
        assert_eq!(range.days().count(), 731);
        assert_eq!(range.days().last(), Some(date("2024-12-31")));
    }

    #[test]
    fn test_reversed_range_rejected() {
        let err = ReportRange::parse("2024-01-03", "2024-01-01").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_malformed_date_rejected() {
        assert!(ReportRange::parse("01/03/2024", "2024-01-05").unwrap_err().is_validation());
        assert!(ReportRange::parse("2024-01-01", "2024-02-30").unwrap_err().is_validation());
    }

    #[test]
    fn test_report_type_labels() {
        assert_eq!(ReportType::from_label("Weekly Summary"), ReportType::Weekly);
        assert_eq!(ReportType::from_label("monthly"), ReportType::Monthly);
        assert_eq!(ReportType::from_label("Yearly Summary").label(), "Yearly Summary");
        assert_eq!(
            ReportType::from_label("Holiday check"),
            ReportType::Custom("Holiday check".to_string())
        );
    }

    #[test]
    fn test_trailing_range() {
        let end = date("2024-03-01");
        let weekly = ReportType::Weekly.trailing_range(end);
        assert_eq!(weekly.start(), date("2024-02-23"));
        assert_eq!(weekly.end(), end);

        let monthly = ReportType::Monthly.trailing_range(end);
        assert_eq!(monthly.start(), date("2024-01-31"));

        let yearly = ReportType::Yearly.trailing_range(end);
        assert_eq!(yearly.num_days(), 366);
    }
}
