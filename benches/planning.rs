use std::sync::Arc;

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use paycheck_planner::{
    core::services::{AccountService, DebtService, IncomeService, MonthlyPlanningService},
    domain::{Debt, IncomeSource, PayFrequency, PaycheckId},
    planning::project_paychecks,
    storage::MemoryStore,
    AllocationRequest, FixedClock, PaycheckAllocator, PlannerStore,
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn build_sample_month(debt_count: u32) -> (PaycheckAllocator, Uuid) {
    let store = Arc::new(MemoryStore::new());
    let owner = Uuid::new_v4();
    let account = AccountService::create(store.as_ref(), "Benchmark", owner)
        .expect("account")
        .id;
    let salary = IncomeService::add(
        store.as_ref(),
        IncomeSource::new(
            account,
            owner,
            "Salary",
            Decimal::from(5_000),
            PayFrequency::Weekly,
            date(2024, 1, 5),
        ),
    )
    .expect("income");

    let mut debts = Vec::new();
    for idx in 0..debt_count {
        let debt = Debt::new(
            account,
            format!("Bill {idx}"),
            Decimal::from(10 + idx % 90),
            date(2024, 1, 1 + idx % 28),
        );
        debts.push(DebtService::add(store.as_ref(), debt).expect("debt"));
    }
    MonthlyPlanningService::populate_month(store.as_ref(), account, 2024, 3).expect("populate");

    let planner_store: Arc<dyn PlannerStore> = store;
    let allocator = PaycheckAllocator::new(planner_store, Arc::new(FixedClock::on(date(2024, 3, 14))));
    let fridays = [1, 8, 15, 22, 29];
    for (idx, debt) in debts.iter().enumerate() {
        let paycheck = PaycheckId::new(salary, date(2024, 3, fridays[idx % fridays.len()]));
        allocator
            .update_debt_allocation(&AllocationRequest::allocate(account, *debt, paycheck))
            .expect("allocate");
    }
    (allocator, account)
}

fn bench_projection(c: &mut Criterion) {
    let sources: Vec<IncomeSource> = (0..200)
        .map(|idx| {
            IncomeSource::new(
                Uuid::new_v4(),
                Uuid::new_v4(),
                format!("Source {idx}"),
                Decimal::from(1_000),
                PayFrequency::BiWeekly,
                date(2020, 1, 1 + idx % 28),
            )
        })
        .collect();
    let period = "2024-03".parse().expect("month");

    c.bench_function("project_200_sources", |b| {
        b.iter(|| black_box(project_paychecks(black_box(&sources), period)))
    });
}

fn bench_summaries(c: &mut Criterion) {
    let (allocator, account) = build_sample_month(500);

    c.bench_function("allocations_500_debts", |b| {
        b.iter(|| black_box(allocator.allocations(account, 2024, 3).expect("summaries")))
    });

    c.bench_function("planning_data_500_debts", |b| {
        b.iter(|| black_box(allocator.planning_data(account, 2024, 3).expect("planning data")))
    });
}

criterion_group!(benches, bench_projection, bench_summaries);
criterion_main!(benches);
