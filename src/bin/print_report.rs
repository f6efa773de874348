//! Print a calorie progress report as JSON
//! Usage: cargo run --bin print_report -- <user_id> [weekly|monthly|yearly] [end_date]

use chrono::NaiveDate;

use dietlog::config;
use dietlog::db::{migrations, Database};
use dietlog::reports::{generate_report, ReportRequest, ReportType};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    let user_id: i64 = match args.get(1) {
        Some(id) => id.parse()?,
        None => {
            eprintln!("Usage: print_report <user_id> [weekly|monthly|yearly] [end_date]");
            std::process::exit(2);
        }
    };
    let report_type = ReportType::from_label(args.get(2).map(|s| s.as_str()).unwrap_or("weekly"));
    let end = match args.get(3) {
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")?,
        None => chrono::Local::now().date_naive(),
    };

    let db_path = config::database_path();
    eprintln!("Database: {}", db_path.display());

    let database = Database::new(&db_path)?;
    database.with_conn(migrations::run_migrations)?;

    let range = report_type.trailing_range(end);
    let request = ReportRequest::new(
        user_id,
        report_type.label(),
        range.start().to_string(),
        range.end().to_string(),
    );

    let report = generate_report(&database, &request)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
