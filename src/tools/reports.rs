//! Report MCP Tools
//!
//! Report generation and PDF export. Errors stay typed so the server can
//! tell bad input apart from an unavailable store.

use std::path::Path;

use serde::Serialize;

use crate::db::Database;
use crate::reports::{self, pdf, Report, ReportError, ReportRequest, ReportResult};

/// Response for export_report_pdf
#[derive(Debug, Serialize)]
pub struct ExportReportResponse {
    pub success: bool,
    pub file_path: String,
    pub days_covered: usize,
    pub date_range: String,
    pub message: String,
}

pub fn generate_report(db: &Database, request: &ReportRequest) -> ReportResult<Report> {
    reports::generate_report(db, request)
}

/// Generate a report and write it to `output_path` as a PDF
pub fn export_report_pdf(
    db: &Database,
    request: &ReportRequest,
    output_path: &str,
) -> ReportResult<ExportReportResponse> {
    let output_path = output_path.trim();
    if output_path.is_empty() {
        return Err(ReportError::InvalidInput("Output path is required".to_string()));
    }

    let report = reports::generate_report(db, request)?;
    let path = Path::new(output_path);

    pdf::write_report_pdf(&report, path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "PDF export failed");
        ReportError::Export(e)
    })?;

    let date_range = format!(
        "{} to {}",
        report.date_range.start_date, report.date_range.end_date
    );
    tracing::info!(path = %path.display(), days = report.daily_data.len(), "report exported");

    Ok(ExportReportResponse {
        success: true,
        file_path: path.display().to_string(),
        days_covered: report.daily_data.len(),
        message: format!(
            "{} exported to {} ({})",
            report.report_type,
            path.display(),
            date_range
        ),
        date_range,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::tools::exercise::log_exercise;
    use crate::tools::meals::log_meal;

    fn setup() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(run_migrations).unwrap();
        db
    }

    #[test]
    fn test_generate_report_from_logged_data() {
        let db = setup();
        log_meal(&db, 1, "2024-01-01", "breakfast", "Eggs", 1800, None, None).unwrap();
        log_meal(&db, 1, "2024-01-02", "lunch", "Burger", 2200, None, None).unwrap();
        log_exercise(&db, 1, "2024-01-01", "Run", 60, 2000, None).unwrap();
        log_exercise(&db, 1, "2024-01-03", "Bike", 30, 500, None).unwrap();

        let request = ReportRequest::new(1, "Weekly Summary", "2024-01-01", "2024-01-03");
        let report = generate_report(&db, &request).unwrap();

        assert_eq!(report.daily_data.len(), 3);
        assert_eq!(report.summary.avg_intake, 1333);
        assert_eq!(report.summary.avg_burned, 833);
    }

    #[test]
    fn test_export_rejects_invalid_request_before_writing() {
        let db = setup();
        let request = ReportRequest::new(1, "Weekly Summary", "2024-01-05", "2024-01-01");

        let err = export_report_pdf(&db, &request, "/nonexistent/report.pdf").unwrap_err();
        assert!(err.is_validation());

        let request = ReportRequest::new(1, "Weekly Summary", "2024-01-01", "2024-01-05");
        let err = export_report_pdf(&db, &request, "  ").unwrap_err();
        assert!(matches!(err, ReportError::InvalidInput(_)));
        assert!(err.is_validation());
    }

    #[test]
    fn test_export_multi_page_report() {
        let db = setup();
        for day in 1..=28 {
            let date = format!("2024-02-{:02}", day);
            log_meal(&db, 4, &date, "dinner", "Stew", 1500 + day * 10, None, None).unwrap();
            if day % 3 == 0 {
                log_exercise(&db, 4, &date, "Row", 40, 1900, None).unwrap();
            }
        }

        let dir = std::env::temp_dir().join(format!("dietlog-export-{}", std::process::id()));
        let path = dir.join("nested").join("report.pdf");
        let request = ReportRequest::new(4, "Quarterly Summary", "2024-01-01", "2024-03-31");

        let resp = export_report_pdf(&db, &request, path.to_str().unwrap()).unwrap();

        assert!(resp.success);
        assert_eq!(resp.days_covered, 91);
        assert_eq!(resp.date_range, "2024-01-01 to 2024-03-31");
        assert_eq!(resp.file_path, path.display().to_string());
        let size = std::fs::metadata(&path).unwrap().len();
        assert!(size > 0);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
