//! Calorie progress reports
//!
//! Builds a gap-free, day-by-day series of calorie intake against calories
//! burned for one user, plus summary statistics over the whole range.
//! Storage is reached only through the [`CalorieLog`] trait.

mod aggregator;
pub mod pdf;
mod range;
mod source;

use thiserror::Error;

use crate::db::DbError;

pub use aggregator::{
    generate_report, rounded_average, DailyRecord, DateRange, Progress, Report, ReportRequest,
    ReportSummary,
};
pub use range::{ReportRange, ReportType};
pub use source::CalorieLog;

#[derive(Debug, Error)]
pub enum ReportError {
    /// Missing or malformed input, or a reversed range. Safe to show to the caller.
    #[error("{0}")]
    InvalidRange(String),

    /// A request field other than the date range is missing or unusable,
    /// such as an export path.
    #[error("{0}")]
    InvalidInput(String),

    /// A calorie log could not be read. The source error is for logs only.
    #[error("calorie log unavailable: {0}")]
    UpstreamUnavailable(#[source] DbError),

    #[error("report export failed: {0}")]
    Export(String),
}

impl ReportError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ReportError::InvalidRange(_) | ReportError::InvalidInput(_))
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
