//! Payslip assembly.
//!
//! Combines SSNIT, PAYE and other deductions into a [`Payslip`] snapshot.
//! All arithmetic is exact; nothing is rounded before the final figures.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::warn;
use uuid::Uuid;

use crate::config::PayrollConfig;
use crate::models::{OtherDeduction, PayrollProfile, Payslip};

use super::paye::calculate_paye;
use super::sanitize::non_negative;
use super::ssnit::calculate_ssnit;

/// Version stamped on every payslip.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Computes a payslip for one employee.
///
/// # Arguments
///
/// * `employee_id` - The employee being paid
/// * `basic_salary` - Monthly basic salary; negative values are treated as zero
/// * `other_deductions` - Deductions other than SSNIT and PAYE
/// * `config` - SSNIT rates and the PAYE bracket table
///
/// # Returns
///
/// A payslip where taxable income is the basic salary less the employee SSNIT
/// contribution, and net pay is gross less all deductions. Net pay never goes
/// below zero; when deductions exceed gross a warning is logged.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::compute_payslip;
/// use attendance_engine::config::PayrollConfig;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
/// use uuid::Uuid;
///
/// let payslip = compute_payslip(
///     Uuid::new_v4(),
///     Decimal::new(1000, 0),
///     Vec::new(),
///     &PayrollConfig::default(),
/// );
/// assert_eq!(payslip.taxable_income, Decimal::new(945, 0));
/// assert_eq!(payslip.net_pay, Decimal::from_str("888.875").unwrap());
/// ```
pub fn compute_payslip(
    employee_id: Uuid,
    basic_salary: Decimal,
    other_deductions: Vec<OtherDeduction>,
    config: &PayrollConfig,
) -> Payslip {
    let basic_salary = non_negative(basic_salary);
    let other_deductions: Vec<OtherDeduction> = other_deductions
        .into_iter()
        .map(|deduction| OtherDeduction {
            amount: non_negative(deduction.amount),
            ..deduction
        })
        .collect();

    let ssnit = calculate_ssnit(basic_salary, &config.ssnit);
    let taxable_income = non_negative(basic_salary - ssnit.employee_contribution);
    let paye = calculate_paye(taxable_income, &config.paye.brackets);

    let other_deductions_total: Decimal = other_deductions.iter().map(|d| d.amount).sum();
    let total_deductions = ssnit.employee_contribution + paye.total + other_deductions_total;
    let gross_pay = basic_salary;

    let net_pay = if total_deductions > gross_pay {
        warn!(
            employee_id = %employee_id,
            gross_pay = %gross_pay,
            total_deductions = %total_deductions,
            "deductions exceed gross pay; net pay floored at zero"
        );
        Decimal::ZERO
    } else {
        gross_pay - total_deductions
    };

    Payslip {
        payslip_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        engine_version: ENGINE_VERSION.to_string(),
        employee_id,
        basic_salary,
        gross_pay,
        ssnit,
        taxable_income,
        paye,
        other_deductions,
        other_deductions_total,
        total_deductions,
        net_pay,
    }
}

/// Computes a payslip from a stored payroll profile.
pub fn compute_profile_payslip(
    profile: &PayrollProfile,
    other_deductions: Vec<OtherDeduction>,
    config: &PayrollConfig,
) -> Payslip {
    compute_payslip(
        profile.employee_id,
        profile.basic_salary,
        other_deductions,
        config,
    )
}
