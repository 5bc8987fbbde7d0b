//! Cached front door to the allocator.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};
use uuid::Uuid;

use super::{CacheKey, CacheLookup, PlanningCache};
use crate::config::PlannerConfig;
use crate::core::services::MonthlyPlanningService;
use crate::domain::{DebtAllocation, MonthKey, MonthlyDebtPlanning};
use crate::errors::Result;
use crate::planning::{
    AllocationRequest, PaycheckAllocationSummary, PaycheckAllocator, PlanningData,
};

/// Serves planning reads from month-keyed caches and refreshes them after writes.
///
/// Stale entries are returned as-is and revalidated before the call returns, so the
/// next read of the same month sees fresh data.
pub struct PlanningClient {
    allocator: PaycheckAllocator,
    planning: Mutex<PlanningCache<PlanningData>>,
    summaries: Mutex<PlanningCache<Vec<PaycheckAllocationSummary>>>,
}

impl PlanningClient {
    pub fn new(allocator: PaycheckAllocator, config: &PlannerConfig) -> Self {
        let clock = allocator.clock_handle();
        let stale_after = config.cache_stale_after();
        Self {
            planning: Mutex::new(PlanningCache::new(stale_after, clock.clone())),
            summaries: Mutex::new(PlanningCache::new(stale_after, clock)),
            allocator,
        }
    }

    pub fn allocator(&self) -> &PaycheckAllocator {
        &self.allocator
    }

    pub fn planning_data(
        &self,
        budget_account_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<PlanningData> {
        let key = CacheKey::new(budget_account_id, MonthKey::new(year, month)?);
        cached(&self.planning, key, || {
            self.allocator.planning_data(budget_account_id, year, month)
        })
    }

    pub fn allocations(
        &self,
        budget_account_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Vec<PaycheckAllocationSummary>> {
        let key = CacheKey::new(budget_account_id, MonthKey::new(year, month)?);
        cached(&self.summaries, key, || {
            self.allocator.allocations(budget_account_id, year, month)
        })
    }

    pub fn update_debt_allocation(
        &self,
        request: &AllocationRequest,
    ) -> Result<Option<DebtAllocation>> {
        let stored = self.allocator.update_debt_allocation(request)?;
        if let Some(period) = request.paycheck_id.date().map(MonthKey::of) {
            self.refresh(request.budget_account_id, period);
        }
        Ok(stored)
    }

    pub fn mark_payment_as_paid(
        &self,
        budget_account_id: Uuid,
        allocation_id: Uuid,
        payment_id: Option<Uuid>,
    ) -> Result<DebtAllocation> {
        let paid =
            self.allocator
                .mark_payment_as_paid(budget_account_id, allocation_id, payment_id)?;
        self.refresh(budget_account_id, paid.period);
        Ok(paid)
    }

    pub fn populate_month(&self, budget_account_id: Uuid, year: i32, month: u32) -> Result<usize> {
        let created = MonthlyPlanningService::populate_month(
            self.allocator.store(),
            budget_account_id,
            year,
            month,
        )?;
        self.refresh(budget_account_id, MonthKey::new(year, month)?);
        Ok(created)
    }

    pub fn set_debt_active(
        &self,
        budget_account_id: Uuid,
        debt_id: Uuid,
        year: i32,
        month: u32,
        is_active: bool,
    ) -> Result<MonthlyDebtPlanning> {
        let row = MonthlyPlanningService::set_debt_active(
            self.allocator.store(),
            budget_account_id,
            debt_id,
            year,
            month,
            is_active,
        )?;
        self.refresh(budget_account_id, row.period);
        Ok(row)
    }

    /// Drops every cached month, e.g. after debts or income sources change.
    pub fn invalidate_all(&self) {
        lock(&self.planning).clear();
        lock(&self.summaries).clear();
    }

    /// Invalidates and refetches both views of one month.
    ///
    /// A refetch failure leaves the month uncached; the next read retries.
    fn refresh(&self, budget_account_id: Uuid, period: MonthKey) {
        let key = CacheKey::new(budget_account_id, period);
        lock(&self.planning).invalidate(&key);
        lock(&self.summaries).invalidate(&key);

        match self
            .allocator
            .planning_data(budget_account_id, period.year, period.month)
        {
            Ok(data) => lock(&self.planning).insert(key, data),
            Err(err) => warn!(%budget_account_id, %period, error = %err, "planning refetch failed"),
        }
        match self
            .allocator
            .allocations(budget_account_id, period.year, period.month)
        {
            Ok(summaries) => lock(&self.summaries).insert(key, summaries),
            Err(err) => {
                warn!(%budget_account_id, %period, error = %err, "allocation refetch failed")
            }
        }
    }
}

fn lock<V>(cache: &Mutex<PlanningCache<V>>) -> MutexGuard<'_, PlanningCache<V>> {
    cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn cached<V, F>(cache: &Mutex<PlanningCache<V>>, key: CacheKey, fetch: F) -> Result<V>
where
    V: Clone,
    F: Fn() -> Result<V>,
{
    let lookup = lock(cache).lookup(&key);
    match lookup {
        CacheLookup::Fresh(value) => {
            debug!(period = %key.period, "cache hit");
            Ok(value)
        }
        CacheLookup::Stale(value) => {
            match fetch() {
                Ok(fresh) => lock(cache).insert(key, fresh),
                Err(err) => warn!(period = %key.period, error = %err, "revalidation failed"),
            }
            Ok(value)
        }
        CacheLookup::Miss => {
            let value = fetch()?;
            lock(cache).insert(key, value.clone());
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::ManualClock;
    use crate::core::services::{AccountService, DebtService, IncomeService};
    use crate::domain::{Debt, IncomeSource, PayFrequency, PaycheckId};
    use crate::errors::PlannerError;
    use crate::storage::{DebtStore, MemoryStore, PlannerSnapshot, PlannerStore, SnapshotBackend};
    use chrono::{Duration, NaiveDate};
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Memory store whose reads can be switched to fail.
    #[derive(Default)]
    struct SwitchableStore {
        inner: MemoryStore,
        failing: AtomicBool,
    }

    impl SwitchableStore {
        fn fail_reads(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    impl SnapshotBackend for SwitchableStore {
        fn read<R>(&self, f: impl FnOnce(&PlannerSnapshot) -> R) -> Result<R> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(PlannerError::PersistenceFailure("store offline".into()));
            }
            self.inner.read(f)
        }

        fn write<R>(&self, f: impl FnOnce(&mut PlannerSnapshot) -> Result<R>) -> Result<R> {
            self.inner.write(f)
        }
    }

    struct Fixture {
        client: PlanningClient,
        clock: Arc<ManualClock>,
        store: Arc<SwitchableStore>,
        account: Uuid,
        debt: Uuid,
        paycheck: PaycheckId,
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixture() -> Fixture {
        let store = Arc::new(SwitchableStore::default());
        let clock = Arc::new(ManualClock::starting(date(2024, 3, 1)));
        let owner = Uuid::new_v4();
        let account = AccountService::create(store.as_ref(), "Home", owner).unwrap().id;
        let source = IncomeSource::new(
            account,
            owner,
            "Salary",
            Decimal::from(2000),
            PayFrequency::Monthly,
            date(2024, 1, 15),
        );
        let source_id = IncomeService::add(store.as_ref(), source).unwrap();
        let debt = DebtService::add(
            store.as_ref(),
            Debt::new(account, "Rent", Decimal::from(900), date(2024, 1, 20)),
        )
        .unwrap();

        let planner_store: Arc<dyn PlannerStore> = store.clone();
        let allocator = PaycheckAllocator::new(planner_store, clock.clone());
        let client = PlanningClient::new(allocator, &PlannerConfig::default());
        client.populate_month(account, 2024, 3).unwrap();
        Fixture {
            client,
            clock,
            store,
            account,
            debt,
            paycheck: PaycheckId::new(source_id, date(2024, 3, 15)),
        }
    }

    fn allocate_rent(fx: &Fixture) -> DebtAllocation {
        fx.client
            .update_debt_allocation(&AllocationRequest::allocate(
                fx.account,
                fx.debt,
                fx.paycheck.clone(),
            ))
            .unwrap()
            .expect("allocation stored")
    }

    fn add_phone_behind_the_client(fx: &Fixture) {
        fx.store
            .save_debt(Debt::new(fx.account, "Phone", Decimal::from(50), date(2024, 3, 2)))
            .unwrap();
        MonthlyPlanningService::populate_month(fx.store.as_ref(), fx.account, 2024, 3).unwrap();
    }

    #[test]
    fn writes_refresh_the_affected_month() {
        let fx = fixture();
        let before = fx.client.allocations(fx.account, 2024, 3).unwrap();
        assert!(before[0].allocated_debts.is_empty());

        allocate_rent(&fx);

        let after = fx.client.allocations(fx.account, 2024, 3).unwrap();
        assert_eq!(after[0].allocated_debts.len(), 1);
        assert_eq!(after[0].remaining_amount, Decimal::from(1100));
    }

    #[test]
    fn marking_paid_refreshes_cached_summaries() {
        let fx = fixture();
        let allocation = allocate_rent(&fx);
        let before = fx.client.allocations(fx.account, 2024, 3).unwrap();
        assert!(!before[0].allocated_debts[0].is_paid);

        let payment = Uuid::new_v4();
        fx.client
            .mark_payment_as_paid(fx.account, allocation.id, Some(payment))
            .unwrap();

        let after = fx.client.allocations(fx.account, 2024, 3).unwrap();
        assert!(after[0].allocated_debts[0].is_paid);
        assert_eq!(after[0].allocated_debts[0].payment_id, Some(payment));
    }

    #[test]
    fn hiding_a_debt_refreshes_cached_planning_data() {
        let fx = fixture();
        let before = fx.client.planning_data(fx.account, 2024, 3).unwrap();
        assert_eq!(before.debts.len(), 1);

        fx.client
            .set_debt_active(fx.account, fx.debt, 2024, 3, false)
            .unwrap();
        assert!(fx.client.planning_data(fx.account, 2024, 3).unwrap().debts.is_empty());

        fx.client
            .set_debt_active(fx.account, fx.debt, 2024, 3, true)
            .unwrap();
        assert_eq!(fx.client.planning_data(fx.account, 2024, 3).unwrap().debts.len(), 1);
    }

    #[test]
    fn stale_entries_are_served_then_revalidated() {
        let fx = fixture();
        let first = fx.client.planning_data(fx.account, 2024, 3).unwrap();
        assert_eq!(first.debts.len(), 1);

        add_phone_behind_the_client(&fx);

        let cached = fx.client.planning_data(fx.account, 2024, 3).unwrap();
        assert_eq!(cached.debts.len(), 1);

        fx.clock.advance(Duration::seconds(31));
        let stale = fx.client.planning_data(fx.account, 2024, 3).unwrap();
        assert_eq!(stale.debts.len(), 1);

        let revalidated = fx.client.planning_data(fx.account, 2024, 3).unwrap();
        assert_eq!(revalidated.debts.len(), 2);
    }

    #[test]
    fn failed_revalidation_keeps_the_stale_entry() {
        let fx = fixture();
        fx.client.planning_data(fx.account, 2024, 3).unwrap();
        add_phone_behind_the_client(&fx);
        fx.clock.advance(Duration::seconds(31));

        fx.store.fail_reads(true);
        let served = fx.client.planning_data(fx.account, 2024, 3).unwrap();
        assert_eq!(served.debts.len(), 1);

        let key = CacheKey::new(fx.account, MonthKey::new(2024, 3).unwrap());
        assert!(matches!(
            lock(&fx.client.planning).lookup(&key),
            CacheLookup::Stale(_)
        ));

        fx.store.fail_reads(false);
        let retried = fx.client.planning_data(fx.account, 2024, 3).unwrap();
        assert_eq!(retried.debts.len(), 1);
        let fresh = fx.client.planning_data(fx.account, 2024, 3).unwrap();
        assert_eq!(fresh.debts.len(), 2);
    }

    #[test]
    fn failed_writes_leave_the_cache_untouched() {
        let fx = fixture();
        let before = fx.client.allocations(fx.account, 2024, 3).unwrap();

        let err = fx
            .client
            .update_debt_allocation(
                &AllocationRequest::allocate(fx.account, fx.debt, fx.paycheck.clone())
                    .with_amount(Decimal::ZERO),
            )
            .expect_err("zero amount");
        assert!(matches!(err, PlannerError::InvalidAllocation(_)));
        assert_eq!(fx.client.allocations(fx.account, 2024, 3).unwrap(), before);
    }
}
