//! Core data models for the Attendance Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod adjustment;
mod employee;
mod payslip;
mod punch;
mod shift;

pub use adjustment::{AdjustmentRequest, AdjustmentStatus};
pub use employee::Employee;
pub use payslip::{
    OtherDeduction, PayeBandLine, PayeBreakdown, PayrollProfile, Payslip, SsnitContribution,
};
pub use punch::{DailyLog, Punch, PunchType};
pub use shift::{Shift, worked_minutes_between};
