//! Closing shifts left open past the daily cutoff.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AutoCloseConfig;
use crate::models::{Punch, PunchType};
use crate::store::{JobKind, JobMarker, JobMarkerStore, PunchStore, with_timeout};

use super::guard::RunGuard;
use super::{JobRun, SkipReason};

/// What one auto-close run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoCloseReport {
    /// The date whose logs were scanned.
    pub date: NaiveDate,
    /// Logs that received a synthetic clock-out.
    pub closed_count: usize,
    /// Logs that were already closed or empty.
    pub already_closed: usize,
    /// Logs whose clock-out could not be written.
    pub failed_count: usize,
    /// Tenants already processed for the date by an earlier run.
    pub tenants_skipped: usize,
    /// Tenants whose marker or log listing failed.
    pub tenants_failed: usize,
}

impl AutoCloseReport {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            closed_count: 0,
            already_closed: 0,
            failed_count: 0,
            tenants_skipped: 0,
            tenants_failed: 0,
        }
    }
}

/// Appends a system clock-out, at the cutoff, to every log of the day that
/// still ends with a clock-in.
///
/// Tenants are found through the day's logs, so a log whose employee was
/// deactivated during the day is still closed.
///
/// Runs are idempotent. A closed log is never touched again, and a durable
/// marker per tenant and date stops repeated scans. The marker is released
/// when any write for the tenant failed, so the next tick retries.
pub struct AutoCloseJob {
    punches: Arc<dyn PunchStore>,
    markers: Arc<dyn JobMarkerStore>,
    config: AutoCloseConfig,
    timeout: Duration,
    guard: RunGuard,
}

impl AutoCloseJob {
    /// Creates the job. `timeout` bounds every store call.
    pub fn new(
        punches: Arc<dyn PunchStore>,
        markers: Arc<dyn JobMarkerStore>,
        config: AutoCloseConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            punches,
            markers,
            config,
            timeout,
            guard: RunGuard::new(),
        }
    }

    /// Runs one pass for the date of `now`.
    ///
    /// # Returns
    ///
    /// - `Skipped(InFlight)` while another pass is running
    /// - `Skipped(BeforeCutoff)` when `now` is earlier than the cutoff
    /// - `Skipped(StoreUnavailable)` when the day's tenants cannot be listed
    /// - `Completed` with per-log counts otherwise
    pub async fn run_once(&self, now: NaiveDateTime) -> JobRun<AutoCloseReport> {
        let Some(_permit) = self.guard.try_acquire() else {
            debug!("auto-close already running; skipping");
            return JobRun::Skipped(SkipReason::InFlight);
        };

        let cutoff = self.config.cutoff;
        if now.time() < cutoff {
            debug!(now = %now, cutoff = %cutoff, "auto-close before cutoff; skipping");
            return JobRun::Skipped(SkipReason::BeforeCutoff {
                now: now.time(),
                cutoff,
            });
        }

        let date = now.date();
        let tenants = match with_timeout(self.timeout, self.punches.tenants_with_logs(date)).await
        {
            Ok(tenants) => tenants,
            Err(error) => {
                warn!(error = %error, "auto-close cannot list tenants; skipping");
                return JobRun::Skipped(SkipReason::StoreUnavailable(error.to_string()));
            }
        };

        let close_at = date.and_time(cutoff);
        let mut report = AutoCloseReport::new(date);
        for tenant_id in tenants {
            self.close_tenant(tenant_id, close_at, &mut report).await;
        }

        info!(
            date = %date,
            closed = report.closed_count,
            already_closed = report.already_closed,
            failed = report.failed_count,
            tenants_skipped = report.tenants_skipped,
            tenants_failed = report.tenants_failed,
            "auto-close run finished"
        );
        JobRun::Completed(report)
    }

    async fn close_tenant(
        &self,
        tenant_id: Uuid,
        close_at: NaiveDateTime,
        report: &mut AutoCloseReport,
    ) {
        let marker = JobMarker {
            tenant_id,
            date: report.date,
            job: JobKind::AutoClose,
        };
        match with_timeout(self.timeout, self.markers.try_claim(&marker)).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(tenant_id = %tenant_id, date = %report.date, "auto-close already done");
                report.tenants_skipped += 1;
                return;
            }
            Err(error) => {
                warn!(tenant_id = %tenant_id, error = %error, "auto-close marker claim failed");
                report.tenants_failed += 1;
                return;
            }
        }

        let logs = match with_timeout(
            self.timeout,
            self.punches.list_logs_for_date(tenant_id, report.date),
        )
        .await
        {
            Ok(logs) => logs,
            Err(error) => {
                warn!(tenant_id = %tenant_id, error = %error, "auto-close cannot list logs");
                report.tenants_failed += 1;
                self.release(&marker).await;
                return;
            }
        };

        let mut failures = 0;
        for log in logs {
            if !log.is_open() {
                report.already_closed += 1;
                continue;
            }
            let punch = Punch::system(PunchType::Out, close_at, &self.config.marker_location);
            match with_timeout(self.timeout, self.punches.append_punch(log.id, punch)).await {
                Ok(()) => {
                    debug!(log_id = %log.id, employee_id = %log.employee_id, "shift auto-closed");
                    report.closed_count += 1;
                }
                Err(error) => {
                    warn!(
                        tenant_id = %tenant_id,
                        log_id = %log.id,
                        employee_id = %log.employee_id,
                        error = %error,
                        "auto-close write failed"
                    );
                    failures += 1;
                }
            }
        }

        report.failed_count += failures;
        if failures > 0 {
            self.release(&marker).await;
        }
    }

    async fn release(&self, marker: &JobMarker) {
        if let Err(error) = with_timeout(self.timeout, self.markers.release(marker)).await {
            warn!(
                tenant_id = %marker.tenant_id,
                job = %marker.job,
                error = %error,
                "marker release failed"
            );
        }
    }
}
