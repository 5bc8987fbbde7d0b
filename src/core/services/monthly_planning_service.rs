//! Materializes which debts are in scope for a month.

use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{MonthKey, MonthlyDebtPlanning};
use crate::errors::{PlannerError, Result};
use crate::storage::PlannerStore;

use super::ensure_account_exists;

pub struct MonthlyPlanningService;

impl MonthlyPlanningService {
    /// Creates the missing month rows for every debt due in `year`/`month`.
    ///
    /// Existing rows are left untouched, hidden ones included. Returns how many rows
    /// were created.
    pub fn populate_month(
        store: &dyn PlannerStore,
        budget_account_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<usize> {
        let period = MonthKey::new(year, month)?;
        ensure_account_exists(store, budget_account_id)?;

        let mut created = 0;
        for debt in store.list_debts(budget_account_id)? {
            let Some(due_date) = debt.due_date_in(period) else {
                continue;
            };
            if store.find_monthly_planning(debt.id, period)?.is_some() {
                continue;
            }
            store.insert_monthly_planning(MonthlyDebtPlanning::new(&debt, period, due_date))?;
            created += 1;
        }
        if created > 0 {
            info!(%budget_account_id, %period, created, "month populated");
        } else {
            debug!(%budget_account_id, %period, "month already populated");
        }
        Ok(created)
    }

    /// Shows or hides a debt for one month.
    pub fn set_debt_active(
        store: &dyn PlannerStore,
        budget_account_id: Uuid,
        debt_id: Uuid,
        year: i32,
        month: u32,
        is_active: bool,
    ) -> Result<MonthlyDebtPlanning> {
        let period = MonthKey::new(year, month)?;
        let owned = store
            .find_debt(debt_id)?
            .is_some_and(|debt| debt.budget_account_id == budget_account_id);
        if !owned {
            return Err(PlannerError::not_found("debt", debt_id));
        }
        let mut row = store.find_monthly_planning(debt_id, period)?.ok_or_else(|| {
            PlannerError::NotFound(format!("debt {debt_id} is not planned for {period}"))
        })?;
        store.set_monthly_planning_active(row.id, is_active)?;
        row.is_active = is_active;
        info!(%debt_id, %period, is_active, "monthly debt visibility changed");
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::{AccountService, DebtService};
    use crate::domain::{Debt, DebtRecurrence};
    use crate::storage::{DebtStore, MemoryStore};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (MemoryStore, Uuid) {
        let store = MemoryStore::new();
        let account = AccountService::create(&store, "Home", Uuid::new_v4()).unwrap();
        (store, account.id)
    }

    #[test]
    fn populate_is_idempotent() {
        let (store, account) = setup();
        DebtService::add(&store, Debt::new(account, "Rent", Decimal::from(900), date(2024, 1, 1)))
            .unwrap();
        DebtService::add(
            &store,
            Debt::new(account, "Phone", Decimal::from(45), date(2024, 1, 20)),
        )
        .unwrap();

        assert_eq!(MonthlyPlanningService::populate_month(&store, account, 2024, 3).unwrap(), 2);
        assert_eq!(MonthlyPlanningService::populate_month(&store, account, 2024, 3).unwrap(), 0);

        let period = MonthKey::new(2024, 3).unwrap();
        let debts = store.list_active_monthly_debts(account, period).unwrap();
        assert_eq!(debts.len(), 2);
        assert_eq!(debts[0].due_date, date(2024, 3, 1));
        assert_eq!(debts[1].due_date, date(2024, 3, 20));
    }

    #[test]
    fn populate_clamps_month_end_due_dates() {
        let (store, account) = setup();
        DebtService::add(
            &store,
            Debt::new(account, "Card", Decimal::from(120), date(2024, 1, 31)),
        )
        .unwrap();

        MonthlyPlanningService::populate_month(&store, account, 2024, 2).unwrap();
        let period = MonthKey::new(2024, 2).unwrap();
        let debts = store.list_active_monthly_debts(account, period).unwrap();
        assert_eq!(debts[0].due_date, date(2024, 2, 29));
    }

    #[test]
    fn populate_skips_debts_off_their_cycle() {
        let (store, account) = setup();
        DebtService::add(
            &store,
            Debt::new(account, "Insurance", Decimal::from(300), date(2024, 1, 15))
                .with_recurrence(DebtRecurrence::Quarterly),
        )
        .unwrap();
        DebtService::add(
            &store,
            Debt::new(account, "Repair", Decimal::from(80), date(2024, 1, 10))
                .with_recurrence(DebtRecurrence::Once),
        )
        .unwrap();

        assert_eq!(MonthlyPlanningService::populate_month(&store, account, 2024, 2).unwrap(), 0);
        assert_eq!(MonthlyPlanningService::populate_month(&store, account, 2024, 4).unwrap(), 1);
        assert_eq!(MonthlyPlanningService::populate_month(&store, account, 2024, 1).unwrap(), 2);
    }

    #[test]
    fn hidden_rows_stay_hidden_after_repopulating() {
        let (store, account) = setup();
        let debt_id = DebtService::add(
            &store,
            Debt::new(account, "Gym", Decimal::from(30), date(2024, 1, 3)),
        )
        .unwrap();
        MonthlyPlanningService::populate_month(&store, account, 2024, 5).unwrap();

        let row =
            MonthlyPlanningService::set_debt_active(&store, account, debt_id, 2024, 5, false)
                .unwrap();
        assert!(!row.is_active);
        MonthlyPlanningService::populate_month(&store, account, 2024, 5).unwrap();

        let period = MonthKey::new(2024, 5).unwrap();
        assert!(store.list_active_monthly_debts(account, period).unwrap().is_empty());
    }

    #[test]
    fn toggling_an_unplanned_month_is_not_found() {
        let (store, account) = setup();
        let debt_id = DebtService::add(
            &store,
            Debt::new(account, "Gym", Decimal::from(30), date(2024, 1, 3)),
        )
        .unwrap();
        let err = MonthlyPlanningService::set_debt_active(&store, account, debt_id, 2024, 7, true)
            .expect_err("month not populated");
        assert!(matches!(err, PlannerError::NotFound(_)));

        let err =
            MonthlyPlanningService::set_debt_active(&store, account, Uuid::new_v4(), 2024, 7, true)
                .expect_err("unknown debt");
        assert!(matches!(err, PlannerError::NotFound(_)));
    }
}
