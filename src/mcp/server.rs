//! Dietlog MCP Server Implementation
//!
//! Implements the MCP server with all dietlog tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::reports::{ReportError, ReportRequest};
use crate::tools::catalog;
use crate::tools::exercise;
use crate::tools::goals;
use crate::tools::meals;
use crate::tools::reports;
use crate::tools::status::StatusTracker;
use crate::tools::ToolError;

/// Dietlog MCP Service
#[derive(Clone)]
pub struct DietlogService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<DietlogService>,
}

impl DietlogService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Bad input is reported back to the caller. Store failures are already
/// logged with context, so the caller only gets an opaque message.
fn report_error(err: ReportError) -> McpError {
    match err {
        ReportError::InvalidRange(msg) | ReportError::InvalidInput(msg) => {
            McpError::invalid_params(msg, None)
        }
        ReportError::UpstreamUnavailable(_) => {
            McpError::internal_error("Failed to generate report", None)
        }
        ReportError::Export(msg) => McpError::internal_error(msg, None),
    }
}

fn tool_error(err: ToolError) -> McpError {
    if err.is_client_error() {
        McpError::invalid_params(err.to_string(), None)
    } else {
        McpError::internal_error(err.to_string(), None)
    }
}

// ============================================================================
// Report Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateReportParams {
    /// User the report is for
    pub user_id: i64,
    /// Report label, e.g. "Weekly Summary"
    pub report_type: Option<String>,
    /// First day, YYYY-MM-DD
    pub start_date: Option<String>,
    /// Last day (inclusive), YYYY-MM-DD
    pub end_date: Option<String>,
}

impl From<GenerateReportParams> for ReportRequest {
    fn from(p: GenerateReportParams) -> Self {
        ReportRequest {
            user_id: p.user_id,
            report_type: p.report_type,
            start_date: p.start_date,
            end_date: p.end_date,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExportReportPdfParams {
    pub user_id: i64,
    pub report_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Where to write the PDF
    pub output_path: String,
}

// ============================================================================
// Meal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogMealParams {
    pub user_id: i64,
    /// Date (YYYY-MM-DD)
    pub date: String,
    /// breakfast, lunch, dinner, snack (default unspecified)
    #[serde(default = "default_meal_type")]
    pub meal_type: String,
    pub meal_name: String,
    pub calorie_intake: i64,
    /// Nutritional category of the meal, compared against the user's goal
    pub category: Option<String>,
    pub notes: Option<String>,
}

fn default_meal_type() -> String { "unspecified".to_string() }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListMealLogsParams {
    pub user_id: i64,
    /// Date (YYYY-MM-DD)
    pub date: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteLogParams {
    /// Owner of the log
    pub user_id: i64,
    /// Log ID to delete
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogCatalogMealParams {
    pub user_id: i64,
    /// Date (YYYY-MM-DD)
    pub date: String,
    /// breakfast, lunch, dinner, snack (default unspecified)
    #[serde(default = "default_meal_type")]
    pub meal_type: String,
    /// Catalogue meal ID; name, calories and category come from the catalogue
    pub meal_id: i64,
    pub notes: Option<String>,
}

// ============================================================================
// Catalogue Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddCatalogMealParams {
    pub meal_name: String,
    pub calories: i64,
    /// Free-form nutrition notes, e.g. "30g protein"
    pub nutritional_value: Option<String>,
    /// Nutritional category, e.g. "High Protein"
    pub category: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateDietPlanParams {
    /// Goal label the plan serves, e.g. "High Protein"
    pub nutritional_goal: String,
    pub description: Option<String>,
    /// Catalogue meal IDs in the plan
    #[serde(default)]
    pub meal_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecommendedMealsParams {
    pub nutritional_goal: String,
    /// low, medium or high
    pub exercise_level: String,
}

// ============================================================================
// Exercise Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogExerciseParams {
    pub user_id: i64,
    /// Date (YYYY-MM-DD)
    pub date: String,
    pub activity_type: String,
    pub duration_minutes: i64,
    pub calories_burned: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListExerciseLogsParams {
    pub user_id: i64,
    /// Earliest date (YYYY-MM-DD, optional)
    pub start_date: Option<String>,
    /// Latest date (YYYY-MM-DD, optional)
    pub end_date: Option<String>,
}

// ============================================================================
// Goal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetGoalParams {
    pub user_id: i64,
    /// Goal label, e.g. "High Protein"
    pub nutritional_goal: String,
    /// low, medium or high
    pub exercise_level: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserParams {
    pub user_id: i64,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl DietlogService {
    // --- Status ---

    #[tool(description = "Get the current status of the dietlog service including build info, database status, and process information")]
    async fn dietlog_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        to_json(&tracker.get_status())
    }

    #[tool(description = "Get instructions for logging meals and exercise, setting goals and generating reports. Call this when unsure how to use the dietlog tools.")]
    fn report_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::REPORT_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(REPORT_INSTRUCTIONS)]))
    }

    // --- Reports ---

    #[tool(description = "Generate a calorie progress report for a user: one entry per day in [start_date, end_date] with intake, burned and progress, plus averages and overall progress")]
    fn generate_report(&self, Parameters(p): Parameters<GenerateReportParams>) -> Result<CallToolResult, McpError> {
        let request = ReportRequest::from(p);
        let report = reports::generate_report(&self.database, &request).map_err(report_error)?;
        to_json(&report)
    }

    #[tool(description = "Generate a calorie progress report and export it as a PDF with a daily table and trend chart")]
    fn export_report_pdf(&self, Parameters(p): Parameters<ExportReportPdfParams>) -> Result<CallToolResult, McpError> {
        let request = ReportRequest {
            user_id: p.user_id,
            report_type: p.report_type,
            start_date: p.start_date,
            end_date: p.end_date,
        };
        let result = reports::export_report_pdf(&self.database, &request, &p.output_path)
            .map_err(report_error)?;
        to_json(&result)
    }

    // --- Meals ---

    #[tool(description = "Log a meal with its calories. Returns the day's total, the daily limit and any warnings (calorie limit exceeded, category not matching the user's goal).")]
    fn log_meal(&self, Parameters(p): Parameters<LogMealParams>) -> Result<CallToolResult, McpError> {
        let result = meals::log_meal(
            &self.database, p.user_id, &p.date, &p.meal_type, &p.meal_name, p.calorie_intake, p.category, p.notes,
        )
        .map_err(tool_error)?;
        to_json(&result)
    }

    #[tool(description = "Log a meal from the catalogue by its ID. Calories and category are taken from the catalogue. Returns the same totals and warnings as log_meal.")]
    fn log_catalog_meal(&self, Parameters(p): Parameters<LogCatalogMealParams>) -> Result<CallToolResult, McpError> {
        let result = meals::log_catalog_meal(&self.database, p.user_id, &p.date, &p.meal_type, p.meal_id, p.notes)
            .map_err(tool_error)?;
        to_json(&result)
    }

    #[tool(description = "List a user's meals for a date with the day's total calories")]
    fn list_meal_logs(&self, Parameters(p): Parameters<ListMealLogsParams>) -> Result<CallToolResult, McpError> {
        let result = meals::list_meal_logs(&self.database, p.user_id, &p.date)
            .map_err(tool_error)?;
        to_json(&result)
    }

    #[tool(description = "Delete one of the user's meal logs. Returns the new day total.")]
    fn delete_meal_log(&self, Parameters(p): Parameters<DeleteLogParams>) -> Result<CallToolResult, McpError> {
        let result = meals::delete_meal_log(&self.database, p.user_id, p.id)
            .map_err(tool_error)?;
        to_json(&result)
    }

    // --- Catalogue ---

    #[tool(description = "List every meal in the catalogue with its calories and nutritional category")]
    fn list_meals(&self) -> Result<CallToolResult, McpError> {
        let result = catalog::list_meals(&self.database).map_err(tool_error)?;
        to_json(&result)
    }

    #[tool(description = "Add a meal to the catalogue. Names are unique regardless of case.")]
    fn add_catalog_meal(&self, Parameters(p): Parameters<AddCatalogMealParams>) -> Result<CallToolResult, McpError> {
        let result = catalog::add_catalog_meal(&self.database, &p.meal_name, p.calories, p.nutritional_value, &p.category)
            .map_err(tool_error)?;
        to_json(&result)
    }

    #[tool(description = "Create the diet plan for a nutritional goal from catalogue meal IDs. Each goal has at most one plan.")]
    fn create_diet_plan(&self, Parameters(p): Parameters<CreateDietPlanParams>) -> Result<CallToolResult, McpError> {
        let result = catalog::create_diet_plan(&self.database, &p.nutritional_goal, p.description, &p.meal_ids)
            .map_err(tool_error)?;
        to_json(&result)
    }

    #[tool(description = "Recommend meals from the goal's diet plan for an exercise level: high 400+ kcal, medium 200-400 kcal, otherwise 300 kcal or less")]
    fn recommended_meals(&self, Parameters(p): Parameters<RecommendedMealsParams>) -> Result<CallToolResult, McpError> {
        let result = catalog::recommended_meals(&self.database, &p.nutritional_goal, &p.exercise_level)
            .map_err(tool_error)?;
        to_json(&result)
    }

    // --- Exercise ---

    #[tool(description = "Log an exercise session. Activity type, duration (minutes) and calories burned are required.")]
    fn log_exercise(&self, Parameters(p): Parameters<LogExerciseParams>) -> Result<CallToolResult, McpError> {
        let result = exercise::log_exercise(
            &self.database, p.user_id, &p.date, &p.activity_type, p.duration_minutes, p.calories_burned, p.notes,
        )
        .map_err(tool_error)?;
        to_json(&result)
    }

    #[tool(description = "List a user's exercise sessions (newest first) with total calories burned, optionally bounded by date")]
    fn list_exercise_logs(&self, Parameters(p): Parameters<ListExerciseLogsParams>) -> Result<CallToolResult, McpError> {
        let result = exercise::list_exercise_logs(&self.database, p.user_id, p.start_date.as_deref(), p.end_date.as_deref())
            .map_err(tool_error)?;
        to_json(&result)
    }

    #[tool(description = "Delete one of the user's exercise logs")]
    fn delete_exercise_log(&self, Parameters(p): Parameters<DeleteLogParams>) -> Result<CallToolResult, McpError> {
        let deleted = exercise::delete_exercise_log(&self.database, p.user_id, p.id)
            .map_err(tool_error)?;
        let json = serde_json::json!({"success": deleted, "id": p.id}).to_string();
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Goals ---

    #[tool(description = "Set a user's nutritional goal and exercise level, replacing any previous goal. The daily calorie limit is derived from the exercise level.")]
    fn set_goal(&self, Parameters(p): Parameters<SetGoalParams>) -> Result<CallToolResult, McpError> {
        let result = goals::set_goal(&self.database, p.user_id, &p.nutritional_goal, &p.exercise_level)
            .map_err(tool_error)?;
        to_json(&result)
    }

    #[tool(description = "Get a user's current goal")]
    fn get_goal(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let result = goals::get_goal(&self.database, p.user_id).map_err(tool_error)?;
        let json = match result {
            Some(goal) => serde_json::to_string_pretty(&goal),
            None => Ok(format!(r#"{{"error": "No goal set", "user_id": {}}}"#, p.user_id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get a user's daily calorie limit (2000 when no goal is set)")]
    fn get_daily_limit(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let result = goals::get_daily_limit(&self.database, p.user_id)
            .map_err(tool_error)?;
        to_json(&result)
    }

    #[tool(description = "List the nutritional goals that have a diet plan")]
    fn list_nutritional_goals(&self) -> Result<CallToolResult, McpError> {
        let result = goals::list_nutritional_goals(&self.database)
            .map_err(tool_error)?;
        to_json(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for DietlogService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "dietlog".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Diet Log".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Diet Log - meal, exercise and goal tracking with calorie progress reports. \
                 Call report_instructions first if unsure. \
                 Reports: generate_report, export_report_pdf. \
                 Meals: log_meal/log_catalog_meal/list_meal_logs/delete_meal_log. \
                 Catalogue: list_meals/add_catalog_meal/create_diet_plan/recommended_meals. \
                 Exercise: log_exercise/list_exercise_logs/delete_exercise_log. \
                 Goals: set_goal/get_goal/get_daily_limit/list_nutritional_goals. \
                 Status: dietlog_status."
                    .into(),
            ),
        }
    }
}
