//! Adjustment request lifecycle.
//!
//! Employees submit corrections to their clock times; a manager approves or
//! rejects each one exactly once. Approved requests override the punches of
//! the day they cover during reconciliation.

mod authority;

pub use authority::{AdjustmentAuthority, AdjustmentSubmission};
