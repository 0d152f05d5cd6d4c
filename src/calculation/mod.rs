//! Calculation logic for the Attendance Engine.
//!
//! This module contains the pure functions of the engine: shift
//! reconciliation from raw punches, adjustment overrides, monthly
//! aggregation, and the payroll pipeline of SSNIT, PAYE and net pay.

mod adjustment_override;
mod monthly_totals;
mod paye;
mod payslip;
mod sanitize;
mod shift_reconciliation;
mod ssnit;

pub use adjustment_override::{Override, OverrideTimes, resolve_override};
pub use monthly_totals::{MonthKey, MonthlySummary, month_to_date, monthly_totals};
pub use paye::calculate_paye;
pub use payslip::{ENGINE_VERSION, compute_payslip, compute_profile_payslip};
pub use sanitize::{coerce_amount, lenient_amount, non_negative, parse_amount};
pub use shift_reconciliation::{reconcile, reconcile_logs};
pub use ssnit::calculate_ssnit;
