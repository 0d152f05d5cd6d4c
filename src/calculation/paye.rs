//! PAYE income tax.
//!
//! The bracket table lists widths, not cumulative ceilings. Taxable income is
//! consumed bracket by bracket in order, each slice taxed at the bracket's
//! marginal rate, until nothing is left. The final bracket is open-ended.

use rust_decimal::Decimal;

use crate::config::TaxBracket;
use crate::models::{PayeBandLine, PayeBreakdown};

use super::sanitize::non_negative;

/// Calculates PAYE for a monthly taxable income.
///
/// # Arguments
///
/// * `taxable_income` - Income after the employee SSNIT contribution
/// * `brackets` - Ordered bracket table
///
/// # Returns
///
/// A breakdown with one line per bracket that received income and the total
/// tax. Income beyond a table without an open bracket is untaxed.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::calculate_paye;
/// use attendance_engine::config::PayeConfig;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let paye = calculate_paye(Decimal::new(945, 0), &PayeConfig::default().brackets);
/// assert_eq!(paye.total, Decimal::from_str("56.125").unwrap());
/// assert_eq!(paye.bands.len(), 4);
/// ```
pub fn calculate_paye(taxable_income: Decimal, brackets: &[TaxBracket]) -> PayeBreakdown {
    let taxable_income = non_negative(taxable_income);
    let mut remaining = taxable_income;
    let mut bands = Vec::new();
    let mut total = Decimal::ZERO;

    for bracket in brackets {
        if remaining <= Decimal::ZERO {
            break;
        }
        let taxable_amount = match bracket.width {
            Some(width) => remaining.min(width),
            None => remaining,
        };
        let tax = taxable_amount * bracket.rate;

        bands.push(PayeBandLine {
            width: bracket.width,
            rate: bracket.rate,
            taxable_amount,
            tax,
        });
        total += tax;
        remaining -= taxable_amount;
    }

    PayeBreakdown {
        taxable_income,
        bands,
        total,
    }
}
