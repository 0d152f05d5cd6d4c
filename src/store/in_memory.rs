//! In-memory implementation of every store port.
//!
//! Backs tests and local development. Availability, latency and targeted
//! failures can be switched on to exercise the error paths of the jobs.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{AdjustmentRequest, AdjustmentStatus, DailyLog, Employee, Punch};

use super::{
    AdjustmentFilter, AdjustmentStore, Decision, EmployeeDirectory, JobMarker, JobMarkerStore,
    PunchStore, StoreError, StoreResult,
};

/// Simulated reachability of the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Availability {
    /// Calls succeed.
    #[default]
    Online,
    /// Calls fail with [`StoreError::Backend`].
    Offline,
    /// Calls fail with [`StoreError::Unconfigured`].
    Unconfigured,
}

#[derive(Debug, Default)]
struct State {
    logs: HashMap<Uuid, DailyLog>,
    log_index: HashMap<(Uuid, NaiveDate), Uuid>,
    employees: Vec<Employee>,
    adjustments: Vec<AdjustmentRequest>,
    markers: HashSet<JobMarker>,
    failing_logs: HashSet<Uuid>,
    failing_employees: HashSet<Uuid>,
    latency: Option<Duration>,
    availability: Availability,
}

/// A store holding everything in process memory.
///
/// # Example
///
/// ```
/// use attendance_engine::models::DailyLog;
/// use attendance_engine::store::{InMemoryStore, PunchStore};
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// runtime.block_on(async {
///     let store = InMemoryStore::new();
///     let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
///     let log = DailyLog::new(Uuid::new_v4(), Uuid::new_v4(), date);
///     store.insert_log(log.clone()).await.unwrap();
///
///     let found = store.get_daily_log(log.employee_id, date).await.unwrap();
///     assert_eq!(found, Some(log));
/// });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    /// Creates an empty, online store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches the simulated availability.
    pub async fn set_availability(&self, availability: Availability) {
        self.state.write().await.availability = availability;
    }

    /// Delays every call by `latency`.
    pub async fn set_latency(&self, latency: Option<Duration>) {
        self.state.write().await.latency = latency;
    }

    /// Makes appends to `log_id` fail.
    pub async fn fail_writes_for_log(&self, log_id: Uuid) {
        self.state.write().await.failing_logs.insert(log_id);
    }

    /// Makes log lookups and inserts for `employee_id` fail.
    pub async fn fail_lookups_for_employee(&self, employee_id: Uuid) {
        self.state.write().await.failing_employees.insert(employee_id);
    }

    /// Validates and registers an employee.
    pub async fn add_employee(&self, employee: Employee) -> EngineResult<()> {
        employee.validate()?;
        let mut state = self.state.write().await;
        state.employees.retain(|existing| existing.id != employee.id);
        state.employees.push(employee);
        Ok(())
    }

    /// Inserts a log directly, replacing any log of the same employee and date.
    pub async fn seed_log(&self, log: DailyLog) {
        let mut state = self.state.write().await;
        if let Some(previous) = state.log_index.insert((log.employee_id, log.date), log.id) {
            state.logs.remove(&previous);
        }
        state.logs.insert(log.id, log);
    }

    /// Returns a copy of a stored log.
    pub async fn log(&self, log_id: Uuid) -> Option<DailyLog> {
        self.state.read().await.logs.get(&log_id).cloned()
    }

    /// Returns every stored log, ordered by date then employee.
    pub async fn all_logs(&self) -> Vec<DailyLog> {
        let mut logs: Vec<DailyLog> = self.state.read().await.logs.values().cloned().collect();
        logs.sort_by_key(|log| (log.date, log.employee_id));
        logs
    }

    /// Returns true when `marker` is currently held.
    pub async fn holds_marker(&self, marker: &JobMarker) -> bool {
        self.state.read().await.markers.contains(marker)
    }

    async fn ready(&self) -> StoreResult<()> {
        let (availability, latency) = {
            let state = self.state.read().await;
            (state.availability, state.latency)
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        match availability {
            Availability::Online => Ok(()),
            Availability::Offline => Err(StoreError::Backend("store offline".to_string())),
            Availability::Unconfigured => Err(StoreError::Unconfigured),
        }
    }
}

#[async_trait]
impl PunchStore for InMemoryStore {
    async fn get_daily_log(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Option<DailyLog>> {
        self.ready().await?;
        let state = self.state.read().await;
        if state.failing_employees.contains(&employee_id) {
            return Err(StoreError::Backend(format!(
                "lookup failed for employee {employee_id}"
            )));
        }
        Ok(state
            .log_index
            .get(&(employee_id, date))
            .and_then(|id| state.logs.get(id))
            .cloned())
    }

    async fn list_logs_for_date(
        &self,
        tenant_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<DailyLog>> {
        self.ready().await?;
        let state = self.state.read().await;
        let mut logs: Vec<DailyLog> = state
            .logs
            .values()
            .filter(|log| log.tenant_id == tenant_id && log.date == date)
            .cloned()
            .collect();
        logs.sort_by_key(|log| log.employee_id);
        Ok(logs)
    }

    async fn tenants_with_logs(&self, date: NaiveDate) -> StoreResult<Vec<Uuid>> {
        self.ready().await?;
        let state = self.state.read().await;
        let tenants: BTreeSet<Uuid> = state
            .logs
            .values()
            .filter(|log| log.date == date)
            .map(|log| log.tenant_id)
            .collect();
        Ok(tenants.into_iter().collect())
    }

    async fn append_punch(&self, log_id: Uuid, punch: Punch) -> StoreResult<()> {
        self.ready().await?;
        let mut state = self.state.write().await;
        if state.failing_logs.contains(&log_id) {
            return Err(StoreError::Backend(format!("write failed for log {log_id}")));
        }
        let log = state
            .logs
            .get_mut(&log_id)
            .ok_or(StoreError::LogNotFound(log_id))?;
        log.punches.push(punch);
        Ok(())
    }

    async fn insert_log(&self, log: DailyLog) -> StoreResult<()> {
        self.ready().await?;
        let mut state = self.state.write().await;
        if state.failing_employees.contains(&log.employee_id) {
            return Err(StoreError::Backend(format!(
                "insert failed for employee {}",
                log.employee_id
            )));
        }
        let key = (log.employee_id, log.date);
        if state.log_index.contains_key(&key) {
            return Err(StoreError::DuplicateLog {
                employee_id: log.employee_id,
                date: log.date,
            });
        }
        state.log_index.insert(key, log.id);
        state.logs.insert(log.id, log);
        Ok(())
    }
}

#[async_trait]
impl EmployeeDirectory for InMemoryStore {
    async fn list_active_employees(&self) -> StoreResult<Vec<Employee>> {
        self.ready().await?;
        let state = self.state.read().await;
        Ok(state
            .employees
            .iter()
            .filter(|employee| employee.active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AdjustmentStore for InMemoryStore {
    async fn list_adjustments(
        &self,
        tenant_id: Uuid,
        filter: &AdjustmentFilter,
    ) -> StoreResult<Vec<AdjustmentRequest>> {
        self.ready().await?;
        let state = self.state.read().await;
        let mut requests: Vec<AdjustmentRequest> = state
            .adjustments
            .iter()
            .filter(|request| request.tenant_id == tenant_id && filter.matches(request))
            .cloned()
            .collect();
        requests.sort_by_key(|request| request.submitted_at);
        Ok(requests)
    }

    async fn get_adjustment(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<AdjustmentRequest>> {
        self.ready().await?;
        let state = self.state.read().await;
        Ok(state
            .adjustments
            .iter()
            .find(|request| request.id == id && request.tenant_id == tenant_id)
            .cloned())
    }

    async fn save_adjustment(&self, request: AdjustmentRequest) -> StoreResult<()> {
        self.ready().await?;
        let mut state = self.state.write().await;
        match state.adjustments.iter_mut().find(|r| r.id == request.id) {
            Some(existing) => *existing = request,
            None => state.adjustments.push(request),
        }
        Ok(())
    }

    async fn decide_adjustment(&self, decided: &AdjustmentRequest) -> StoreResult<Decision> {
        self.ready().await?;
        let mut state = self.state.write().await;

        let Some(index) = state
            .adjustments
            .iter()
            .position(|r| r.id == decided.id && r.tenant_id == decided.tenant_id)
        else {
            return Ok(Decision::NotFound);
        };
        let current = state.adjustments[index].status;
        if current != AdjustmentStatus::Pending {
            return Ok(Decision::AlreadyDecided(current));
        }
        if decided.is_approved() {
            let target = decided.target_date();
            if let Some(existing) = state.adjustments.iter().find(|other| {
                other.id != decided.id
                    && other.tenant_id == decided.tenant_id
                    && other.employee_id == decided.employee_id
                    && other.is_approved()
                    && other.applies_to(target)
            }) {
                return Ok(Decision::Conflict {
                    existing_id: existing.id,
                });
            }
        }

        state.adjustments[index] = decided.clone();
        Ok(Decision::Applied)
    }
}

#[async_trait]
impl JobMarkerStore for InMemoryStore {
    async fn try_claim(&self, marker: &JobMarker) -> StoreResult<bool> {
        self.ready().await?;
        Ok(self.state.write().await.markers.insert(*marker))
    }

    async fn release(&self, marker: &JobMarker) -> StoreResult<()> {
        self.ready().await?;
        self.state.write().await.markers.remove(marker);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::store::JobKind;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    fn employee(tenant_id: Option<Uuid>, active: bool) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            tenant_id,
            full_name: "Ama Mensah".to_string(),
            email: "ama@example.com".to_string(),
            phone: None,
            active,
        }
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = InMemoryStore::new();
        let log = DailyLog::new(Uuid::new_v4(), Uuid::new_v4(), date());
        store.insert_log(log.clone()).await.unwrap();

        let again = DailyLog::new(log.employee_id, log.tenant_id, date());
        match store.insert_log(again).await {
            Err(StoreError::DuplicateLog { employee_id, .. }) => {
                assert_eq!(employee_id, log.employee_id)
            }
            _ => panic!("Expected DuplicateLog error"),
        }
    }

    #[tokio::test]
    async fn test_append_to_missing_log() {
        let store = InMemoryStore::new();
        let id = Uuid::new_v4();
        let punch = Punch::clock_in(date().and_hms_opt(9, 0, 0).unwrap());

        assert_eq!(
            store.append_punch(id, punch).await,
            Err(StoreError::LogNotFound(id))
        );
    }

    #[tokio::test]
    async fn test_list_logs_scoped_to_tenant_and_date() {
        let store = InMemoryStore::new();
        let tenant = Uuid::new_v4();
        store
            .seed_log(DailyLog::new(Uuid::new_v4(), tenant, date()))
            .await;
        store
            .seed_log(DailyLog::new(Uuid::new_v4(), Uuid::new_v4(), date()))
            .await;
        store
            .seed_log(DailyLog::new(Uuid::new_v4(), tenant, date().succ_opt().unwrap()))
            .await;

        let logs = store.list_logs_for_date(tenant, date()).await.unwrap();
        assert_eq!(logs.len(), 1);
    }

    #[tokio::test]
    async fn test_tenants_with_logs_for_date() {
        let store = InMemoryStore::new();
        let tenant = Uuid::new_v4();
        store
            .seed_log(DailyLog::new(Uuid::new_v4(), tenant, date()))
            .await;
        store
            .seed_log(DailyLog::new(Uuid::new_v4(), tenant, date()))
            .await;
        store
            .seed_log(DailyLog::new(Uuid::new_v4(), Uuid::new_v4(), date().succ_opt().unwrap()))
            .await;

        assert_eq!(store.tenants_with_logs(date()).await.unwrap(), vec![tenant]);
    }

    #[tokio::test]
    async fn test_only_active_employees_listed() {
        let store = InMemoryStore::new();
        store.add_employee(employee(None, true)).await.unwrap();
        store.add_employee(employee(None, false)).await.unwrap();

        assert_eq!(store.list_active_employees().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_employee_rejected() {
        let store = InMemoryStore::new();
        let mut invalid = employee(None, true);
        invalid.email = "not-an-email".to_string();

        assert!(matches!(
            store.add_employee(invalid).await,
            Err(EngineError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_markers_claim_once_until_released() {
        let store = InMemoryStore::new();
        let marker = JobMarker {
            tenant_id: Uuid::new_v4(),
            date: date(),
            job: JobKind::AutoClose,
        };

        assert!(store.try_claim(&marker).await.unwrap());
        assert!(!store.try_claim(&marker).await.unwrap());
        store.release(&marker).await.unwrap();
        assert!(store.try_claim(&marker).await.unwrap());
    }

    #[tokio::test]
    async fn test_availability_toggles() {
        let store = InMemoryStore::new();

        store.set_availability(Availability::Unconfigured).await;
        assert_eq!(
            store.list_active_employees().await,
            Err(StoreError::Unconfigured)
        );

        store.set_availability(Availability::Offline).await;
        assert!(matches!(
            store.list_active_employees().await,
            Err(StoreError::Backend(_))
        ));

        store.set_availability(Availability::Online).await;
        assert!(store.list_active_employees().await.is_ok());
    }

    #[tokio::test]
    async fn test_targeted_failures() {
        let store = InMemoryStore::new();
        let log = DailyLog::new(Uuid::new_v4(), Uuid::new_v4(), date());
        store.seed_log(log.clone()).await;
        store.fail_writes_for_log(log.id).await;
        store.fail_lookups_for_employee(log.employee_id).await;

        let punch = Punch::clock_out(date().and_hms_opt(17, 0, 0).unwrap());
        assert!(store.append_punch(log.id, punch).await.is_err());
        assert!(store.get_daily_log(log.employee_id, date()).await.is_err());
    }

    fn pending_request(tenant_id: Uuid, employee_id: Uuid) -> AdjustmentRequest {
        let at = date().and_hms_opt(9, 0, 0).unwrap();
        AdjustmentRequest {
            id: Uuid::new_v4(),
            employee_id,
            tenant_id,
            date: date(),
            original_clock_in: None,
            original_clock_out: None,
            requested_clock_in: at,
            requested_clock_out: None,
            reason: "Late badge".to_string(),
            status: AdjustmentStatus::Pending,
            submitted_at: at,
            decided_at: None,
            decided_by: None,
        }
    }

    fn decided(mut request: AdjustmentRequest, status: AdjustmentStatus) -> AdjustmentRequest {
        request.status = status;
        request.decided_at = date().and_hms_opt(12, 0, 0);
        request.decided_by = Some(Uuid::new_v4());
        request
    }

    #[tokio::test]
    async fn test_save_adjustment_replaces_by_id() {
        let store = InMemoryStore::new();
        let tenant = Uuid::new_v4();
        let mut request = pending_request(tenant, Uuid::new_v4());
        store.save_adjustment(request.clone()).await.unwrap();
        request.reason = "Late badge, corrected".to_string();
        store.save_adjustment(request.clone()).await.unwrap();

        let all = store
            .list_adjustments(tenant, &AdjustmentFilter::default())
            .await
            .unwrap();
        assert_eq!(all, vec![request.clone()]);
        assert!(
            store
                .get_adjustment(Uuid::new_v4(), request.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_decide_adjustment_only_once() {
        let store = InMemoryStore::new();
        let request = pending_request(Uuid::new_v4(), Uuid::new_v4());
        store.save_adjustment(request.clone()).await.unwrap();

        let approve = decided(request.clone(), AdjustmentStatus::Approved);
        let reject = decided(request.clone(), AdjustmentStatus::Rejected);
        assert_eq!(store.decide_adjustment(&approve).await, Ok(Decision::Applied));
        assert_eq!(
            store.decide_adjustment(&reject).await,
            Ok(Decision::AlreadyDecided(AdjustmentStatus::Approved))
        );

        let stored = store
            .get_adjustment(request.tenant_id, request.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, AdjustmentStatus::Approved);
    }

    #[tokio::test]
    async fn test_decide_adjustment_refuses_second_approval_for_day() {
        let store = InMemoryStore::new();
        let tenant = Uuid::new_v4();
        let employee = Uuid::new_v4();
        let first = pending_request(tenant, employee);
        let mut second = pending_request(tenant, employee);
        second.date = date().succ_opt().unwrap();
        second.original_clock_in = date().and_hms_opt(9, 0, 0);
        store.save_adjustment(first.clone()).await.unwrap();
        store.save_adjustment(second.clone()).await.unwrap();

        store
            .decide_adjustment(&decided(first.clone(), AdjustmentStatus::Approved))
            .await
            .unwrap();

        assert_eq!(
            store
                .decide_adjustment(&decided(second.clone(), AdjustmentStatus::Approved))
                .await,
            Ok(Decision::Conflict {
                existing_id: first.id
            })
        );
        assert_eq!(
            store
                .decide_adjustment(&decided(second, AdjustmentStatus::Rejected))
                .await,
            Ok(Decision::Applied)
        );
    }

    #[tokio::test]
    async fn test_decide_unknown_adjustment() {
        let store = InMemoryStore::new();
        let request = pending_request(Uuid::new_v4(), Uuid::new_v4());

        assert_eq!(
            store
                .decide_adjustment(&decided(request, AdjustmentStatus::Rejected))
                .await,
            Ok(Decision::NotFound)
        );
    }
}
