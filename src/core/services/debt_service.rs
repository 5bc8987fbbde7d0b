//! Validated CRUD helpers for debts.

use tracing::info;
use uuid::Uuid;

use crate::domain::Debt;
use crate::errors::{PlannerError, Result};
use crate::storage::PlannerStore;

use super::{ensure_account_exists, validate_name, validate_positive};

pub struct DebtService;

impl DebtService {
    /// Adds a new debt and returns its identifier.
    pub fn add(store: &dyn PlannerStore, debt: Debt) -> Result<Uuid> {
        Self::validate(&debt)?;
        ensure_account_exists(store, debt.budget_account_id)?;
        if store.find_debt(debt.id)?.is_some() {
            return Err(PlannerError::Validation(format!(
                "debt {} already exists",
                debt.id
            )));
        }
        let id = debt.id;
        store.save_debt(debt)?;
        info!(debt_id = %id, "debt added");
        Ok(id)
    }

    /// Replaces the editable fields of debt `id` with those of `changes`.
    ///
    /// Monthly rows already materialized keep their due date.
    pub fn edit(
        store: &dyn PlannerStore,
        budget_account_id: Uuid,
        id: Uuid,
        changes: Debt,
    ) -> Result<Debt> {
        Self::validate(&changes)?;
        let mut debt = store
            .find_debt(id)?
            .filter(|debt| debt.budget_account_id == budget_account_id)
            .ok_or_else(|| PlannerError::not_found("debt", id))?;
        debt.name = changes.name;
        debt.payment_amount = changes.payment_amount;
        debt.due_date = changes.due_date;
        debt.has_balance = changes.has_balance;
        debt.category_id = changes.category_id;
        debt.recurrence = changes.recurrence;
        store.save_debt(debt.clone())?;
        info!(debt_id = %id, "debt updated");
        Ok(debt)
    }

    /// Removes debt `id` of `budget_account_id` with its monthly rows and allocations.
    pub fn remove(store: &dyn PlannerStore, budget_account_id: Uuid, id: Uuid) -> Result<()> {
        let owned = store
            .find_debt(id)?
            .is_some_and(|debt| debt.budget_account_id == budget_account_id);
        if !owned || !store.delete_debt(id)? {
            return Err(PlannerError::not_found("debt", id));
        }
        info!(debt_id = %id, "debt removed");
        Ok(())
    }

    pub fn list(store: &dyn PlannerStore, budget_account_id: Uuid) -> Result<Vec<Debt>> {
        let mut debts = store.list_debts(budget_account_id)?;
        debts.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.name.cmp(&b.name)));
        Ok(debts)
    }

    fn validate(debt: &Debt) -> Result<()> {
        validate_name("Debt", &debt.name)?;
        validate_positive("Payment amount", debt.payment_amount)
    }
}
