pub mod account_service;
pub mod debt_service;
pub mod income_service;
pub mod monthly_planning_service;

pub use account_service::AccountService;
pub use debt_service::DebtService;
pub use income_service::IncomeService;
pub use monthly_planning_service::MonthlyPlanningService;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::{PlannerError, Result};
use crate::storage::PlannerStore;

fn validate_name(kind: &str, candidate: &str) -> Result<()> {
    if candidate.trim().is_empty() {
        Err(PlannerError::Validation(format!("{kind} name must not be empty")))
    } else {
        Ok(())
    }
}

fn validate_positive(field: &str, amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        Err(PlannerError::Validation(format!(
            "{field} must be positive, got {amount}"
        )))
    } else {
        Ok(())
    }
}

fn ensure_account_exists(store: &dyn PlannerStore, budget_account_id: Uuid) -> Result<()> {
    match store.find_budget_account(budget_account_id)? {
        Some(_) => Ok(()),
        None => Err(PlannerError::not_found("budget account", budget_account_id)),
    }
}
