use tracing::info;
use uuid::Uuid;

use crate::domain::{AccountMemberRecord, BudgetAccount, BudgetAccountRecord, MemberRole};
use crate::errors::{PlannerError, Result};
use crate::storage::PlannerStore;

use super::validate_name;

pub struct AccountService;

impl AccountService {
    pub fn create(store: &dyn PlannerStore, name: &str, owner_id: Uuid) -> Result<BudgetAccount> {
        validate_name("Budget account", name)?;
        let record = BudgetAccountRecord::new(name.trim(), owner_id);
        let id = record.id;
        store.insert_budget_account(record)?;
        info!(budget_account_id = %id, "budget account created");
        Self::get(store, id)
    }

    pub fn add_member(
        store: &dyn PlannerStore,
        budget_account_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<BudgetAccount> {
        let account = Self::get(store, budget_account_id)?;
        if account.owner_id == user_id {
            return Err(PlannerError::Validation(
                "the owner is already a member".into(),
            ));
        }
        store.add_account_member(AccountMemberRecord {
            budget_account_id,
            user_id,
            role: role.to_string(),
        })?;
        Self::get(store, budget_account_id)
    }

    pub fn get(store: &dyn PlannerStore, budget_account_id: Uuid) -> Result<BudgetAccount> {
        store
            .find_budget_account(budget_account_id)?
            .ok_or_else(|| PlannerError::not_found("budget account", budget_account_id))
    }
}
