//! In-process ticker for the scheduled jobs.
//!
//! Each job runs once at startup and then on its cadence. A tick that lands
//! while the previous run is still going is dropped, not queued: interval
//! cadences skip missed ticks, and the jobs themselves refuse a second
//! concurrent run.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDateTime, NaiveTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::AttendanceConfig;
use crate::error::{EngineError, EngineResult};
use crate::store::{EmployeeDirectory, JobKind, JobMarkerStore, PunchStore};

use super::auto_close::AutoCloseJob;
use super::backfill::MissingDayBackfill;
use super::JobRun;

/// Source of the local wall-clock time.
pub trait Clock: Send + Sync {
    /// The current local time.
    fn now(&self) -> NaiveDateTime;
}

/// Reads the system clock at a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// A clock `offset_minutes` east of UTC.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] when the offset is a day or more.
    pub fn new(offset_minutes: i32) -> EngineResult<Self> {
        let offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| EngineError::InvalidConfig {
                message: format!("UTC offset of {offset_minutes} minutes is out of range"),
            })?;
        Ok(Self { offset })
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    /// A clock stopped at `now`.
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: NaiveDateTime) {
        match self.now.lock() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// A job the scheduler can tick.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// Which job this is, for logging.
    fn kind(&self) -> JobKind;

    /// Runs the job for the local time `now`.
    async fn tick(&self, now: NaiveDateTime);
}

#[async_trait]
impl ScheduledJob for AutoCloseJob {
    fn kind(&self) -> JobKind {
        JobKind::AutoClose
    }

    async fn tick(&self, now: NaiveDateTime) {
        if let JobRun::Skipped(reason) = self.run_once(now).await {
            debug!(job = %self.kind(), reason = %reason, "tick skipped");
        }
    }
}

/// Ticks backfill the calendar day before `now`.
#[async_trait]
impl ScheduledJob for MissingDayBackfill {
    fn kind(&self) -> JobKind {
        JobKind::Backfill
    }

    async fn tick(&self, now: NaiveDateTime) {
        let Some(target) = now.date().pred_opt() else {
            warn!(now = %now, "no previous day to backfill");
            return;
        };
        if let JobRun::Skipped(reason) = self.run_once(target).await {
            debug!(job = %self.kind(), reason = %reason, "tick skipped");
        }
    }
}

/// When a job runs after its startup tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// At a fixed period.
    Every(Duration),
    /// Once a day at a local time.
    DailyAt(NaiveTime),
}

impl Cadence {
    /// How long to wait, from `now`, for the next tick.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_engine::jobs::Cadence;
    /// use chrono::{NaiveDate, NaiveTime};
    /// use std::time::Duration;
    ///
    /// let now = NaiveDate::from_ymd_opt(2026, 1, 13).unwrap().and_hms_opt(23, 0, 0).unwrap();
    /// let midnight = Cadence::DailyAt(NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    /// assert_eq!(midnight.delay_from(now), Duration::from_secs(3600));
    /// ```
    pub fn delay_from(&self, now: NaiveDateTime) -> Duration {
        match *self {
            Cadence::Every(period) => period,
            Cadence::DailyAt(at) => {
                let today = now.date().and_time(at);
                let next = if today > now {
                    today
                } else {
                    today + chrono::Duration::days(1)
                };
                (next - now).to_std().unwrap_or(Duration::ZERO)
            }
        }
    }
}

/// Runs scheduled jobs on tokio tasks.
///
/// # Example
///
/// ```no_run
/// use attendance_engine::config::ConfigLoader;
/// use attendance_engine::jobs::Scheduler;
/// use attendance_engine::store::InMemoryStore;
/// use std::sync::Arc;
///
/// # async fn run() -> attendance_engine::error::EngineResult<()> {
/// let config = ConfigLoader::load("./config/ghana")?;
/// let store = Arc::new(InMemoryStore::new());
/// let handle = Scheduler::from_config(config.attendance(), store.clone(), store.clone(), store)?
///     .start();
/// // ...
/// handle.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct Scheduler {
    clock: Arc<dyn Clock>,
    jobs: Vec<(Arc<dyn ScheduledJob>, Cadence)>,
}

impl Scheduler {
    /// A scheduler with no jobs.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            jobs: Vec::new(),
        }
    }

    /// Adds a job.
    pub fn schedule(mut self, job: Arc<dyn ScheduledJob>, cadence: Cadence) -> Self {
        self.jobs.push((job, cadence));
        self
    }

    /// Number of scheduled jobs.
    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Builds the standard schedule: auto-close at the configured interval and
    /// backfill daily at the configured time, both against the system clock.
    pub fn from_config(
        config: &AttendanceConfig,
        punches: Arc<dyn PunchStore>,
        employees: Arc<dyn EmployeeDirectory>,
        markers: Arc<dyn JobMarkerStore>,
    ) -> EngineResult<Self> {
        config.validate()?;
        let schedule = &config.schedule;
        let clock = SystemClock::new(schedule.utc_offset_minutes)?;
        let timeout = schedule.store_timeout();

        let auto_close = AutoCloseJob::new(
            punches.clone(),
            markers.clone(),
            config.auto_close.clone(),
            timeout,
        );
        let backfill = MissingDayBackfill::new(
            punches,
            employees,
            markers,
            config.backfill.clone(),
            timeout,
        );

        Ok(Self::new(Arc::new(clock))
            .schedule(
                Arc::new(auto_close),
                Cadence::Every(schedule.auto_close_interval()),
            )
            .schedule(Arc::new(backfill), Cadence::DailyAt(schedule.backfill_at)))
    }

    /// Spawns one task per job. Must be called inside a tokio runtime.
    ///
    /// Dropping the returned handle also stops the tasks.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown, receiver) = watch::channel(false);
        let tasks = self
            .jobs
            .into_iter()
            .map(|(job, cadence)| {
                tokio::spawn(run_job(job, cadence, self.clock.clone(), receiver.clone()))
            })
            .collect();
        SchedulerHandle { shutdown, tasks }
    }
}

/// Controls a started [`Scheduler`].
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Stops every job task and waits for them to finish. A run in progress
    /// completes first.
    pub async fn shutdown(self) {
        // Receivers also stop when the sender is dropped, so a send error is harmless.
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(error) = task.await {
                warn!(error = %error, "scheduled job task ended abnormally");
            }
        }
    }
}

async fn run_job(
    job: Arc<dyn ScheduledJob>,
    cadence: Cadence,
    clock: Arc<dyn Clock>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(job = %job.kind(), cadence = ?cadence, "scheduled job started");
    job.tick(clock.now()).await;

    match cadence {
        Cadence::Every(period) => {
            let period = period.max(Duration::from_millis(1));
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = interval.tick() => job.tick(clock.now()).await,
                    _ = shutdown.changed() => break,
                }
            }
        }
        Cadence::DailyAt(_) => loop {
            let delay = cadence.delay_from(clock.now());
            tokio::select! {
                _ = tokio::time::sleep(delay) => job.tick(clock.now()).await,
                _ = shutdown.changed() => break,
            }
        },
    }

    info!(job = %job.kind(), "scheduled job stopped");
}
