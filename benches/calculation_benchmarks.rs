//! Performance benchmarks for the Attendance Engine.
//!
//! Covers the pure calculation paths:
//! - Single payslip computation
//! - Batch of 1000 payslips
//! - Reconciliation of a month of punches for one employee
//! - Reconciliation of a day of logs for 500 employees
//! - An auto-close pass over 200 open logs in the in-memory store
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::hint::black_box;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rust_decimal::Decimal;
use uuid::Uuid;

use attendance_engine::calculation::{compute_payslip, monthly_totals, reconcile, reconcile_logs};
use attendance_engine::config::{AutoCloseConfig, PayrollConfig};
use attendance_engine::jobs::AutoCloseJob;
use attendance_engine::models::{DailyLog, Employee, OtherDeduction, Punch};
use attendance_engine::store::InMemoryStore;

/// Punches for every day of January 2026, with a duplicate clock-in each day.
fn month_of_punches() -> Vec<Punch> {
    let first = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    (0..31)
        .flat_map(|offset| {
            let day = first + Duration::days(offset);
            let start = day.and_hms_opt(8, 0, 0).unwrap();
            vec![
                Punch::clock_in(start),
                Punch::clock_in(start + Duration::minutes(3)),
                Punch::clock_out(start + Duration::hours(9)),
            ]
        })
        .collect()
}

fn day_of_logs(employees: usize) -> Vec<DailyLog> {
    let day = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    let tenant = Uuid::new_v4();
    (0..employees)
        .map(|i| {
            let start = day.and_hms_opt(7, 0, 0).unwrap() + Duration::minutes(i as i64 % 90);
            DailyLog::new(Uuid::new_v4(), tenant, day)
                .with_punch(Punch::clock_in(start))
                .with_punch(Punch::clock_out(start + Duration::hours(8)))
        })
        .collect()
}

fn bench_single_payslip(c: &mut Criterion) {
    let config = PayrollConfig::default();
    let employee = Uuid::new_v4();

    c.bench_function("single_payslip", |b| {
        b.iter(|| {
            black_box(compute_payslip(
                employee,
                black_box(Decimal::new(485_000, 2)),
                vec![OtherDeduction::new("Loan", Decimal::new(250, 0))],
                &config,
            ))
        })
    });
}

fn bench_payslip_batch(c: &mut Criterion) {
    let config = PayrollConfig::default();
    let salaries: Vec<Decimal> = (0..1000).map(|i| Decimal::new(50_000 + i * 7_919, 2)).collect();

    let mut group = c.benchmark_group("payslip_batch");
    group.throughput(Throughput::Elements(salaries.len() as u64));
    group.bench_function("batch_1000", |b| {
        b.iter(|| {
            for salary in &salaries {
                black_box(compute_payslip(Uuid::nil(), *salary, Vec::new(), &config));
            }
        })
    });
    group.finish();
}

fn bench_reconcile_month(c: &mut Criterion) {
    let punches = month_of_punches();
    let employee = Uuid::new_v4();

    c.bench_function("reconcile_month", |b| {
        b.iter(|| {
            let shifts = reconcile(employee, black_box(&punches), &[]);
            black_box(monthly_totals(&shifts))
        })
    });
}

fn bench_reconcile_logs(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_logs");
    for employees in [50usize, 500] {
        let logs = day_of_logs(employees);
        group.throughput(Throughput::Elements(employees as u64));
        group.bench_with_input(BenchmarkId::from_parameter(employees), &logs, |b, logs| {
            b.iter(|| black_box(reconcile_logs(logs, &[])))
        });
    }
    group.finish();
}

/// Each iteration builds a fresh store so every pass has logs to close.
fn bench_auto_close(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let day = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    let now = day.and_hms_opt(22, 5, 0).unwrap();

    c.bench_function("auto_close_200_open_logs", |b| {
        b.to_async(&rt).iter(move || async move {
            let store = Arc::new(InMemoryStore::new());
            let tenant = Uuid::new_v4();
            for i in 0..200 {
                let employee = Employee {
                    id: Uuid::new_v4(),
                    tenant_id: Some(tenant),
                    full_name: format!("Employee {i}"),
                    email: format!("employee{i}@example.com"),
                    phone: None,
                    active: true,
                };
                store.add_employee(employee.clone()).await.unwrap();
                store
                    .seed_log(
                        DailyLog::new(employee.id, tenant, day)
                            .with_punch(Punch::clock_in(day.and_hms_opt(9, 0, 0).unwrap())),
                    )
                    .await;
            }
            let job = AutoCloseJob::new(
                store.clone(),
                store,
                AutoCloseConfig::default(),
                std::time::Duration::from_secs(5),
            );
            black_box(job.run_once(now).await)
        })
    });
}

criterion_group!(
    benches,
    bench_single_payslip,
    bench_payslip_batch,
    bench_reconcile_month,
    bench_reconcile_logs,
    bench_auto_close
);
criterion_main!(benches);
