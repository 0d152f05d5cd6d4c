//! Scheduled maintenance of the punch store.
//!
//! Two jobs keep daily logs consistent: [`AutoCloseJob`] closes shifts left
//! open past the cutoff, and [`MissingDayBackfill`] inserts placeholder logs
//! for weekdays nobody clocked in. The [`Scheduler`] ticks both.
//!
//! Every run returns a [`JobRun`]: either a report of what it did, or the
//! reason it did nothing.

mod auto_close;
mod backfill;
mod guard;
mod scheduler;

use std::fmt;

use chrono::{NaiveTime, Weekday};

pub use auto_close::{AutoCloseJob, AutoCloseReport};
pub use backfill::{BackfillReport, MissingDayBackfill};
pub use guard::{RunGuard, RunPermit};
pub use scheduler::{
    Cadence, Clock, ManualClock, ScheduledJob, Scheduler, SchedulerHandle, SystemClock,
};

/// The outcome of one job invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRun<T> {
    /// The job ran; per-record failures are counted in the report.
    Completed(T),
    /// The job did not run.
    Skipped(SkipReason),
}

impl<T> JobRun<T> {
    /// The report of a completed run.
    pub fn report(&self) -> Option<&T> {
        match self {
            JobRun::Completed(report) => Some(report),
            JobRun::Skipped(_) => None,
        }
    }

    /// The reason a run was skipped.
    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            JobRun::Completed(_) => None,
            JobRun::Skipped(reason) => Some(reason),
        }
    }
}

/// Why a job invocation did nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Auto-close was triggered before the day's cutoff.
    BeforeCutoff {
        /// Local time of the trigger.
        now: NaiveTime,
        /// The configured cutoff.
        cutoff: NaiveTime,
    },
    /// Backfill targets weekdays only.
    NonWorkday(Weekday),
    /// A previous run of the same job has not finished.
    InFlight,
    /// The store is missing or unreachable.
    StoreUnavailable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::BeforeCutoff { now, cutoff } => {
                write!(f, "{now} is before the {cutoff} cutoff")
            }
            SkipReason::NonWorkday(day) => write!(f, "{day} is not a workday"),
            SkipReason::InFlight => write!(f, "previous run still in flight"),
            SkipReason::StoreUnavailable(reason) => write!(f, "store unavailable: {reason}"),
        }
    }
}
