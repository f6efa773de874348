//! Dietlog Tools module
//!
//! MCP tool implementations for meal, exercise and goal tracking, the meal
//! catalogue, and reports.

use thiserror::Error;

use crate::db::DbError;

pub mod catalog;
pub mod exercise;
pub mod goals;
pub mod meals;
pub mod reports;
pub mod status;

/// Failure of a tool call. The message is always safe to show the caller.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The arguments were rejected before touching the database
    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ToolError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ToolError::Invalid(msg.into())
    }

    /// Caller-side problem (bad argument or unknown id) rather than a server fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, ToolError::Invalid(_) | ToolError::NotFound(_))
    }

    /// Wrap a database error with what was being attempted
    pub(crate) fn db(context: &'static str) -> impl Fn(DbError) -> ToolError {
        move |e| ToolError::Internal(format!("{}: {}", context, e))
    }
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Calories for one entry: not negative and not above the per-entry cap
pub(crate) fn validate_calories(field: &str, calories: i64) -> ToolResult<i64> {
    if calories < 0 {
        return Err(ToolError::invalid(format!("{} cannot be negative", field)));
    }
    if calories > crate::models::MAX_ENTRY_CALORIES {
        return Err(ToolError::invalid(format!(
            "{} cannot exceed {} per entry",
            field,
            crate::models::MAX_ENTRY_CALORIES
        )));
    }
    Ok(calories)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_calories_bounds() {
        assert_eq!(validate_calories("Calorie intake", 0).unwrap(), 0);
        assert_eq!(validate_calories("Calorie intake", 20_000).unwrap(), 20_000);
        assert!(validate_calories("Calorie intake", -1).unwrap_err().is_client_error());
        assert!(validate_calories("Calorie intake", 20_001).unwrap_err().is_client_error());
        assert!(validate_calories("Calorie intake", i64::MAX).is_err());
    }

    #[test]
    fn test_db_errors_are_internal() {
        let err = ToolError::db("Failed to log meal")(DbError::NotInitialized);
        assert!(!err.is_client_error());
        assert!(err.to_string().starts_with("Failed to log meal: "));
    }
}
