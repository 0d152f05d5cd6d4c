//! Attendance and Payroll Engine
//!
//! This crate turns raw clock punches and adjustment requests into
//! authoritative daily and monthly work records, keeps daily logs consistent
//! with scheduled auto-close and backfill jobs, and computes Ghanaian
//! payslips (SSNIT and PAYE) from a basic salary.

#![warn(missing_docs)]

pub mod adjustment;
pub mod calculation;
pub mod config;
pub mod error;
pub mod jobs;
pub mod models;
pub mod store;
pub mod validation;
