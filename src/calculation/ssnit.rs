//! SSNIT social security contributions.
//!
//! Contributions are a flat percentage of the basic salary up to the
//! configured ceiling. The employer's share is split into a first-tier and a
//! second-tier allocation, both computed on the same applicable salary.

use rust_decimal::Decimal;

use crate::config::SsnitConfig;
use crate::models::SsnitContribution;

use super::sanitize::non_negative;

/// Calculates SSNIT contributions for a monthly basic salary.
///
/// # Arguments
///
/// * `basic_salary` - Monthly basic salary; negative values are treated as zero
/// * `config` - Rates and salary ceiling
///
/// # Returns
///
/// The employee and employer contributions, the tier allocations and whether
/// the ceiling was applied.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::calculate_ssnit;
/// use attendance_engine::config::SsnitConfig;
/// use rust_decimal::Decimal;
///
/// let ssnit = calculate_ssnit(Decimal::new(1000, 0), &SsnitConfig::default());
/// assert_eq!(ssnit.employee_contribution, Decimal::new(55, 0));
/// assert_eq!(ssnit.employer_contribution, Decimal::new(130, 0));
/// ```
pub fn calculate_ssnit(basic_salary: Decimal, config: &SsnitConfig) -> SsnitContribution {
    let basic_salary = non_negative(basic_salary);
    let applicable_salary = basic_salary.min(config.cap);

    SsnitContribution {
        applicable_salary,
        employee_contribution: applicable_salary * config.employee_rate,
        employer_contribution: applicable_salary * config.employer_rate,
        tier1: applicable_salary * config.tier1_rate,
        tier2: applicable_salary * config.tier2_rate,
        capped: basic_salary > config.cap,
    }
}
