//! Storage ports used by the engine.
//!
//! The engine never talks to a database directly. Punches, employees,
//! adjustment requests and job markers are reached through the async traits
//! below, injected as `Arc<dyn Trait>`. [`InMemoryStore`] implements all of
//! them for tests and local development.

mod in_memory;

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AdjustmentRequest, AdjustmentStatus, DailyLog, Employee, Punch};

pub use in_memory::{Availability, InMemoryStore};

/// Errors reported by store implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No backing store has been configured.
    #[error("Store is not configured")]
    Unconfigured,

    /// The daily log addressed by a write does not exist.
    #[error("Daily log not found: {0}")]
    LogNotFound(Uuid),

    /// A daily log already exists for the employee and date.
    #[error("Employee {employee_id} already has a daily log for {date}")]
    DuplicateLog {
        /// The employee the log belongs to.
        employee_id: Uuid,
        /// The date already covered.
        date: NaiveDate,
    },

    /// The call did not complete within the allowed time.
    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),

    /// Any other backend failure.
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// A type alias for Results that return StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable storage of daily punch logs.
#[async_trait]
pub trait PunchStore: Send + Sync {
    /// The log of `employee_id` for `date`, if one exists.
    async fn get_daily_log(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Option<DailyLog>>;

    /// All logs of a tenant for `date`.
    async fn list_logs_for_date(
        &self,
        tenant_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<DailyLog>>;

    /// Tenants holding at least one log for `date`, whether or not the
    /// log's employee is still active.
    async fn tenants_with_logs(&self, date: NaiveDate) -> StoreResult<Vec<Uuid>>;

    /// Appends a punch to an existing log.
    async fn append_punch(&self, log_id: Uuid, punch: Punch) -> StoreResult<()>;

    /// Inserts a new log. Fails with [`StoreError::DuplicateLog`] when the
    /// employee already has a log for the date.
    async fn insert_log(&self, log: DailyLog) -> StoreResult<()>;
}

/// Source of the employees the scheduled jobs iterate over.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Every active employee, across all tenants.
    async fn list_active_employees(&self) -> StoreResult<Vec<Employee>>;
}

/// Narrows an adjustment listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentFilter {
    /// Only requests of this employee.
    #[serde(default)]
    pub user_id: Option<Uuid>,
    /// Only requests in this status.
    #[serde(default)]
    pub status: Option<AdjustmentStatus>,
}

impl AdjustmentFilter {
    /// Filter for the approved requests of one employee.
    pub fn approved_for(employee_id: Uuid) -> Self {
        Self {
            user_id: Some(employee_id),
            status: Some(AdjustmentStatus::Approved),
        }
    }

    /// Returns true when `request` passes the filter.
    pub fn matches(&self, request: &AdjustmentRequest) -> bool {
        self.user_id.is_none_or(|id| id == request.employee_id)
            && self.status.is_none_or(|status| status == request.status)
    }
}

/// Persistence of adjustment requests.
#[async_trait]
pub trait AdjustmentStore: Send + Sync {
    /// Requests of a tenant passing `filter`, oldest submission first.
    async fn list_adjustments(
        &self,
        tenant_id: Uuid,
        filter: &AdjustmentFilter,
    ) -> StoreResult<Vec<AdjustmentRequest>>;

    /// A single request of a tenant.
    async fn get_adjustment(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<AdjustmentRequest>>;

    /// Inserts or replaces a request. Decisions go through
    /// [`AdjustmentStore::decide_adjustment`] instead.
    async fn save_adjustment(&self, request: AdjustmentRequest) -> StoreResult<()>;

    /// Atomically records the decision carried by `decided`.
    ///
    /// The stored request must still be pending. An approval must also be the
    /// only approved request of the employee for its target date. Both checks
    /// and the write happen as one step, so concurrent deciders cannot both
    /// succeed.
    async fn decide_adjustment(&self, decided: &AdjustmentRequest) -> StoreResult<Decision>;
}

/// Outcome of [`AdjustmentStore::decide_adjustment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The decision was recorded.
    Applied,
    /// The tenant has no request with that id.
    NotFound,
    /// Someone else decided the request first.
    AlreadyDecided(AdjustmentStatus),
    /// Another approved request already covers the employee's day.
    Conflict {
        /// The approved request holding the day.
        existing_id: Uuid,
    },
}

/// The scheduled jobs that claim markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Closing shifts left open past the cutoff.
    AutoClose,
    /// Inserting placeholders for days without a log.
    Backfill,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::AutoClose => write!(f, "auto_close"),
            JobKind::Backfill => write!(f, "backfill"),
        }
    }
}

/// Records that a job has processed a tenant's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobMarker {
    /// The tenant processed.
    pub tenant_id: Uuid,
    /// The date processed.
    pub date: NaiveDate,
    /// The job that processed it.
    pub job: JobKind,
}

/// Durable idempotency markers for the scheduled jobs.
#[async_trait]
pub trait JobMarkerStore: Send + Sync {
    /// Atomically records `marker`. Returns false when it was already held.
    async fn try_claim(&self, marker: &JobMarker) -> StoreResult<bool>;

    /// Removes `marker` so a later run processes the date again.
    async fn release(&self, marker: &JobMarker) -> StoreResult<()>;
}

/// Runs a store call with an upper bound on its duration.
///
/// # Examples
///
/// ```
/// use attendance_engine::store::{StoreError, with_timeout};
/// use std::time::Duration;
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// let value = runtime.block_on(with_timeout(Duration::from_secs(1), async {
///     Ok::<_, StoreError>(7)
/// }));
/// assert_eq!(value, Ok(7));
/// ```
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| StoreError::Timeout(limit))?
}
