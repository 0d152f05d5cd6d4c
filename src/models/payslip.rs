//! Payslip models.
//!
//! This module contains the [`Payslip`] snapshot and the intermediate figures
//! it carries, so that reporting never needs to recompute anything.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::lenient_amount;

/// Minimal input to the tax computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollProfile {
    /// The employee being paid.
    pub employee_id: Uuid,
    /// Monthly basic salary. Invalid or missing values read as zero.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub basic_salary: Decimal,
}

/// A deduction other than SSNIT and PAYE (loan repayment, union dues, ...).
///
/// # Example
///
/// ```
/// use attendance_engine::models::OtherDeduction;
/// use rust_decimal::Decimal;
///
/// let deduction: OtherDeduction =
///     serde_json::from_str(r#"{"name": "Welfare", "amount": "NaN"}"#).unwrap();
/// assert_eq!(deduction.amount, Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherDeduction {
    /// Label shown on the payslip.
    pub name: String,
    /// Amount deducted. Invalid or missing values read as zero.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Decimal,
}

impl OtherDeduction {
    /// Creates a deduction line.
    pub fn new(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

/// Social security contributions for one salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsnitContribution {
    /// Salary after applying the contribution ceiling.
    pub applicable_salary: Decimal,
    /// Employee share, deducted from pay.
    pub employee_contribution: Decimal,
    /// Employer share, paid on top of salary.
    pub employer_contribution: Decimal,
    /// First-tier allocation.
    pub tier1: Decimal,
    /// Second-tier allocation.
    pub tier2: Decimal,
    /// True when the salary exceeded the ceiling.
    pub capped: bool,
}

/// Tax owed within one PAYE bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayeBandLine {
    /// Width of the bracket; `None` for the open-ended top bracket.
    pub width: Option<Decimal>,
    /// Marginal rate applied within the bracket.
    pub rate: Decimal,
    /// Income that fell into this bracket.
    pub taxable_amount: Decimal,
    /// Tax owed on that income.
    pub tax: Decimal,
}

/// Progressive income tax for one taxable income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayeBreakdown {
    /// Income the brackets were applied to.
    pub taxable_income: Decimal,
    /// Bracket lines in table order, stopping at the last bracket touched.
    pub bands: Vec<PayeBandLine>,
    /// Total tax owed.
    pub total: Decimal,
}

/// Immutable snapshot of one pay computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    /// Unique identifier for this payslip.
    pub payslip_id: Uuid,
    /// When the payslip was computed.
    pub generated_at: DateTime<Utc>,
    /// The version of the engine that computed it.
    pub engine_version: String,
    /// The employee being paid.
    pub employee_id: Uuid,
    /// Basic salary after numeric coercion.
    pub basic_salary: Decimal,
    /// Gross pay (equal to the basic salary).
    pub gross_pay: Decimal,
    /// SSNIT contributions, both shares and tiers.
    pub ssnit: SsnitContribution,
    /// Gross pay less the employee SSNIT share, floored at zero.
    pub taxable_income: Decimal,
    /// PAYE with its per-bracket breakdown.
    pub paye: PayeBreakdown,
    /// Other deductions after numeric coercion.
    pub other_deductions: Vec<OtherDeduction>,
    /// Sum of the other deductions.
    pub other_deductions_total: Decimal,
    /// Employee SSNIT + PAYE + other deductions.
    pub total_deductions: Decimal,
    /// Gross pay less total deductions, floored at zero.
    pub net_pay: Decimal,
}
