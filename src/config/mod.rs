//! Configuration loading and management for the Attendance Engine.
//!
//! This module provides functionality to load payroll and attendance
//! settings from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use attendance_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/ghana").unwrap();
//! println!("PAYE brackets: {}", config.payroll().paye.brackets.len());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AttendanceConfig, AutoCloseConfig, BackfillConfig, EngineConfig, PayeConfig, PayrollConfig,
    ScheduleConfig, SsnitConfig, TaxBracket,
};
