//! Validated CRUD helpers for income sources.

use tracing::info;
use uuid::Uuid;

use crate::domain::IncomeSource;
use crate::errors::{PlannerError, Result};
use crate::storage::PlannerStore;

use super::{ensure_account_exists, validate_name, validate_positive};

pub struct IncomeService;

impl IncomeService {
    pub fn add(store: &dyn PlannerStore, source: IncomeSource) -> Result<Uuid> {
        Self::validate(&source)?;
        ensure_account_exists(store, source.budget_account_id)?;
        if store.find_income_source(source.id)?.is_some() {
            return Err(PlannerError::Validation(format!(
                "income source {} already exists",
                source.id
            )));
        }
        let id = source.id;
        store.save_income_source(source)?;
        info!(income_source_id = %id, "income source added");
        Ok(id)
    }

    /// Updates source `id` of `budget_account_id` via the provided mutator.
    pub fn edit<F>(
        store: &dyn PlannerStore,
        budget_account_id: Uuid,
        id: Uuid,
        mutator: F,
    ) -> Result<IncomeSource>
    where
        F: FnOnce(&mut IncomeSource),
    {
        let mut source = store
            .find_income_source(id)?
            .filter(|source| source.budget_account_id == budget_account_id)
            .ok_or_else(|| PlannerError::not_found("income source", id))?;
        mutator(&mut source);
        source.id = id;
        source.budget_account_id = budget_account_id;
        Self::validate(&source)?;
        store.save_income_source(source.clone())?;
        info!(income_source_id = %id, "income source updated");
        Ok(source)
    }

    /// Stops projecting paychecks from the source; history is kept.
    pub fn deactivate(
        store: &dyn PlannerStore,
        budget_account_id: Uuid,
        id: Uuid,
    ) -> Result<IncomeSource> {
        Self::edit(store, budget_account_id, id, |source| source.is_active = false)
    }

    pub fn list(store: &dyn PlannerStore, budget_account_id: Uuid) -> Result<Vec<IncomeSource>> {
        store.list_income_sources(budget_account_id)
    }

    fn validate(source: &IncomeSource) -> Result<()> {
        validate_name("Income source", &source.name)?;
        validate_positive("Income amount", source.amount)?;
        if let Some(end) = source.end_date {
            if end < source.start_date {
                return Err(PlannerError::Validation(
                    "income end date must not precede its start date".into(),
                ));
            }
        }
        Ok(())
    }
}
