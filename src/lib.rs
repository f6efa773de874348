//! Diet Log (dietlog) Library
//!
//! Meal and exercise logging, calorie goals, and day-by-day calorie
//! progress reports.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod reports;
pub mod tools;
