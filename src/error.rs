//! Error types for the Attendance Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during attendance reconciliation,
//! adjustment handling and payroll computation.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::AdjustmentStatus;
use crate::store::StoreError;

/// The main error type for the Attendance Engine.
///
/// # Example
///
/// ```
/// use attendance_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/payroll.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/payroll.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but holds values the engine cannot use.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        message: String,
    },

    /// Input data failed validation before reaching the core.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// No adjustment request exists with the given id.
    #[error("Adjustment request not found: {id}")]
    AdjustmentNotFound {
        /// The id that was looked up.
        id: Uuid,
    },

    /// An adjustment request was asked to move out of a terminal state.
    #[error("Adjustment request {id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// The adjustment request id.
        id: Uuid,
        /// The current status.
        from: AdjustmentStatus,
        /// The requested status.
        to: AdjustmentStatus,
    },

    /// Another approved adjustment already covers the same employee and date.
    #[error("Employee {employee_id} already has approved adjustment {existing_id} for {date}")]
    AdjustmentConflict {
        /// The employee the adjustment belongs to.
        employee_id: Uuid,
        /// The date both requests cover.
        date: NaiveDate,
        /// The adjustment that was approved first.
        existing_id: Uuid,
    },

    /// The actor is not allowed to perform the requested decision.
    #[error("Actor {actor} is not allowed to {action}")]
    Unauthorized {
        /// The actor who attempted the action.
        actor: Uuid,
        /// The action that was refused.
        action: String,
    },

    /// A store call failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
