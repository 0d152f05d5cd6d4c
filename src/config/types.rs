//! Configuration types for attendance and payroll.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every type has a
//! `Default` carrying the statutory values, so the engine is usable without
//! any files on disk.

use std::time::Duration;

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};

/// SSNIT contribution rates and ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SsnitConfig {
    /// Salary ceiling contributions are computed on.
    pub cap: Decimal,
    /// Employee share of the applicable salary.
    pub employee_rate: Decimal,
    /// Employer share of the applicable salary.
    pub employer_rate: Decimal,
    /// First-tier allocation rate.
    pub tier1_rate: Decimal,
    /// Second-tier allocation rate.
    pub tier2_rate: Decimal,
}

impl Default for SsnitConfig {
    fn default() -> Self {
        Self {
            cap: Decimal::new(61000, 0),
            employee_rate: Decimal::new(55, 3),
            employer_rate: Decimal::new(13, 2),
            tier1_rate: Decimal::new(135, 3),
            tier2_rate: Decimal::new(5, 2),
        }
    }
}

/// One PAYE bracket, defined by its width rather than a cumulative ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaxBracket {
    /// Width of the bracket; `None` marks the open-ended top bracket.
    #[serde(default)]
    pub width: Option<Decimal>,
    /// Marginal rate within the bracket.
    pub rate: Decimal,
}

impl TaxBracket {
    /// A bracket of the given width.
    pub fn bounded(width: Decimal, rate: Decimal) -> Self {
        Self {
            width: Some(width),
            rate,
        }
    }

    /// The open-ended top bracket.
    pub fn open(rate: Decimal) -> Self {
        Self { width: None, rate }
    }
}

/// The ordered PAYE bracket table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PayeConfig {
    /// Brackets in the order they are consumed.
    pub brackets: Vec<TaxBracket>,
}

impl Default for PayeConfig {
    fn default() -> Self {
        Self {
            brackets: vec![
                TaxBracket::bounded(Decimal::new(490, 0), Decimal::ZERO),
                TaxBracket::bounded(Decimal::new(110, 0), Decimal::new(5, 2)),
                TaxBracket::bounded(Decimal::new(130, 0), Decimal::new(10, 2)),
                TaxBracket::bounded(Decimal::new(316667, 2), Decimal::new(175, 3)),
                TaxBracket::bounded(Decimal::new(16000, 0), Decimal::new(25, 2)),
                TaxBracket::bounded(Decimal::new(30520, 0), Decimal::new(30, 2)),
                TaxBracket::open(Decimal::new(35, 2)),
            ],
        }
    }
}

/// Payroll configuration from payroll.yaml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PayrollConfig {
    /// SSNIT rates and ceiling.
    pub ssnit: SsnitConfig,
    /// PAYE bracket table.
    pub paye: PayeConfig,
}

impl PayrollConfig {
    /// Rejects negative rates, non-positive widths and an open bracket that is
    /// not the last one.
    pub fn validate(&self) -> EngineResult<()> {
        let ssnit = &self.ssnit;
        let rates = [
            ("ssnit.cap", ssnit.cap),
            ("ssnit.employee_rate", ssnit.employee_rate),
            ("ssnit.employer_rate", ssnit.employer_rate),
            ("ssnit.tier1_rate", ssnit.tier1_rate),
            ("ssnit.tier2_rate", ssnit.tier2_rate),
        ];
        if let Some((name, _)) = rates.iter().find(|(_, value)| value.is_sign_negative()) {
            return invalid(format!("{name} must not be negative"));
        }

        let brackets = &self.paye.brackets;
        if brackets.is_empty() {
            return invalid("paye.brackets must not be empty".to_string());
        }
        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate.is_sign_negative() {
                return invalid(format!("paye.brackets[{index}].rate must not be negative"));
            }
            match bracket.width {
                Some(width) if width <= Decimal::ZERO => {
                    return invalid(format!("paye.brackets[{index}].width must be positive"));
                }
                None if index + 1 != brackets.len() => {
                    return invalid(format!(
                        "paye.brackets[{index}] is open-ended but is not the last bracket"
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Auto-close settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AutoCloseConfig {
    /// Local time after which open shifts are closed.
    pub cutoff: NaiveTime,
    /// Location written on the synthetic clock-out.
    pub marker_location: String,
}

impl Default for AutoCloseConfig {
    fn default() -> Self {
        Self {
            cutoff: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default(),
            marker_location: "Auto-closed by system".to_string(),
        }
    }
}

/// Missing-day backfill settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackfillConfig {
    /// Local time of the placeholder clock-in.
    pub placeholder_clock_in: NaiveTime,
    /// Seconds between the placeholder clock-in and clock-out.
    pub placeholder_gap_seconds: u32,
    /// Location written on both placeholder punches.
    pub placeholder_location: String,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            placeholder_clock_in: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            placeholder_gap_seconds: 1,
            placeholder_location: "No attendance recorded".to_string(),
        }
    }
}

/// Ticker and store call settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between auto-close ticks.
    pub auto_close_interval_secs: u64,
    /// Local time of the daily backfill tick.
    pub backfill_at: NaiveTime,
    /// Upper bound on each store call made by a job.
    pub store_timeout_ms: u64,
    /// Offset of local time from UTC, in minutes.
    pub utc_offset_minutes: i32,
}

impl ScheduleConfig {
    /// Auto-close tick period.
    pub fn auto_close_interval(&self) -> Duration {
        Duration::from_secs(self.auto_close_interval_secs)
    }

    /// Store call timeout.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            auto_close_interval_secs: 3600,
            backfill_at: NaiveTime::default(),
            store_timeout_ms: 5000,
            utc_offset_minutes: 0,
        }
    }
}

/// Attendance configuration from attendance.yaml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AttendanceConfig {
    /// Auto-close settings.
    pub auto_close: AutoCloseConfig,
    /// Backfill settings.
    pub backfill: BackfillConfig,
    /// Scheduling settings.
    pub schedule: ScheduleConfig,
}

impl AttendanceConfig {
    /// Rejects zero intervals and offsets outside ±24h.
    pub fn validate(&self) -> EngineResult<()> {
        let schedule = &self.schedule;
        if schedule.auto_close_interval_secs == 0 {
            return invalid("schedule.auto_close_interval_secs must be positive".to_string());
        }
        if schedule.store_timeout_ms == 0 {
            return invalid("schedule.store_timeout_ms must be positive".to_string());
        }
        if schedule.utc_offset_minutes.abs() >= 24 * 60 {
            return invalid("schedule.utc_offset_minutes must be within ±1439".to_string());
        }
        Ok(())
    }
}

/// The complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Payroll settings.
    pub payroll: PayrollConfig,
    /// Attendance settings.
    pub attendance: AttendanceConfig,
}

fn invalid(message: String) -> EngineResult<()> {
    Err(EngineError::InvalidConfig { message })
}
