use std::sync::RwLock;

use super::{PlannerSnapshot, SnapshotBackend};
use crate::errors::{PlannerError, Result};

/// In-process store; nothing outlives the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<PlannerSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current data set.
    pub fn snapshot(&self) -> Result<PlannerSnapshot> {
        self.read(|data| data.clone())
    }
}

impl SnapshotBackend for MemoryStore {
    fn read<R>(&self, f: impl FnOnce(&PlannerSnapshot) -> R) -> Result<R> {
        let guard = self.data.read().map_err(|_| poisoned())?;
        Ok(f(&guard))
    }

    fn write<R>(&self, f: impl FnOnce(&mut PlannerSnapshot) -> Result<R>) -> Result<R> {
        let mut guard = self.data.write().map_err(|_| poisoned())?;
        let mut staged = guard.clone();
        let result = f(&mut staged)?;
        *guard = staged;
        Ok(result)
    }
}

fn poisoned() -> PlannerError {
    PlannerError::PersistenceFailure("store lock poisoned".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BudgetAccountRecord, Debt, DebtAllocation, MonthKey, PaycheckId};
    use crate::storage::{AccountStore, AllocationStore, DebtStore};
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    #[test]
    fn failed_write_keeps_previous_state() {
        let store = MemoryStore::new();
        let record = BudgetAccountRecord::new("Home", Uuid::new_v4());
        store.insert_budget_account(record.clone()).unwrap();

        let err = store
            .insert_budget_account(record)
            .expect_err("duplicate account must fail");
        assert!(matches!(err, PlannerError::Validation(_)));
        assert_eq!(store.snapshot().unwrap().accounts.len(), 1);
    }

    #[test]
    fn deleting_a_debt_reports_whether_it_existed() {
        let store = MemoryStore::new();
        let due = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let debt = Debt::new(Uuid::new_v4(), "Phone", Decimal::from(40), due);
        let id = debt.id;
        store.save_debt(debt).unwrap();

        assert!(store.delete_debt(id).unwrap());
        assert!(!store.delete_debt(id).unwrap());
    }

    #[test]
    fn paid_rows_cannot_be_overwritten_or_cleared() {
        let store = MemoryStore::new();
        let due = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let allocation = DebtAllocation {
            id: Uuid::new_v4(),
            debt_id: Uuid::new_v4(),
            paycheck_id: Some(PaycheckId::new(Uuid::new_v4(), due)),
            budget_account_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            period: MonthKey::of(due),
            payment_amount: Decimal::from(100),
            payment_date: due,
            is_paid: false,
            paid_at: None,
            payment_id: None,
            note: None,
        };
        let stored = store.upsert_allocation(allocation.clone()).unwrap();
        let payment = Uuid::new_v4();
        store.mark_allocation_paid(stored.id, payment, Utc::now()).unwrap();

        let err = store
            .upsert_allocation(DebtAllocation {
                payment_amount: Decimal::from(5),
                ..allocation
            })
            .expect_err("paid row is final");
        assert!(matches!(err, PlannerError::InvalidAllocation(_)));
        let err = store
            .clear_allocation_paycheck(stored.id)
            .expect_err("paid row is final");
        assert!(matches!(err, PlannerError::InvalidAllocation(_)));

        let kept = store.find_allocation_by_id(stored.id).unwrap().unwrap();
        assert!(kept.is_paid);
        assert_eq!(kept.payment_id, Some(payment));
        assert_eq!(kept.payment_amount, Decimal::from(100));
    }
}
