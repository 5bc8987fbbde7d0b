//! Persistence boundary of the planner.
//!
//! The store traits describe exactly what the services read and write. Backends that
//! keep the whole data set as one [`PlannerSnapshot`] implement [`SnapshotBackend`]
//! and receive every store trait through the blanket implementations below.

pub mod json_backend;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    AccountMemberRecord, BudgetAccount, BudgetAccountRecord, Debt, DebtAllocation, IncomeSource,
    MonthKey, MonthlyDebt, MonthlyDebtPlanning,
};
use crate::errors::{PlannerError, Result};

pub use json_backend::JsonStore;
pub use memory::MemoryStore;

const CURRENT_SCHEMA_VERSION: u8 = 1;

pub trait AccountStore: Send + Sync {
    fn find_budget_account(&self, id: Uuid) -> Result<Option<BudgetAccount>>;
    fn insert_budget_account(&self, record: BudgetAccountRecord) -> Result<()>;
    fn add_account_member(&self, member: AccountMemberRecord) -> Result<()>;
}

pub trait IncomeSourceStore: Send + Sync {
    fn list_active_income_sources(&self, budget_account_id: Uuid) -> Result<Vec<IncomeSource>>;
    fn list_income_sources(&self, budget_account_id: Uuid) -> Result<Vec<IncomeSource>>;
    fn find_income_source(&self, id: Uuid) -> Result<Option<IncomeSource>>;
    /// Inserts or replaces the source with the same id.
    fn save_income_source(&self, source: IncomeSource) -> Result<()>;
}

pub trait DebtStore: Send + Sync {
    fn find_debt(&self, id: Uuid) -> Result<Option<Debt>>;
    fn list_debts(&self, budget_account_id: Uuid) -> Result<Vec<Debt>>;
    /// Inserts or replaces the debt with the same id.
    fn save_debt(&self, debt: Debt) -> Result<()>;
    /// Removes the debt with its monthly rows and allocations. Returns whether it existed.
    fn delete_debt(&self, id: Uuid) -> Result<bool>;
    /// Debts with an active monthly row for `period`, ordered by due date then name.
    fn list_active_monthly_debts(
        &self,
        budget_account_id: Uuid,
        period: MonthKey,
    ) -> Result<Vec<MonthlyDebt>>;
    fn find_monthly_planning(
        &self,
        debt_id: Uuid,
        period: MonthKey,
    ) -> Result<Option<MonthlyDebtPlanning>>;
    fn insert_monthly_planning(&self, planning: MonthlyDebtPlanning) -> Result<()>;
    fn set_monthly_planning_active(&self, planning_id: Uuid, is_active: bool) -> Result<()>;
}

pub trait AllocationStore: Send + Sync {
    fn find_allocation(&self, debt_id: Uuid, period: MonthKey) -> Result<Option<DebtAllocation>>;
    fn find_allocation_by_id(&self, id: Uuid) -> Result<Option<DebtAllocation>>;
    fn list_allocations(
        &self,
        budget_account_id: Uuid,
        period: MonthKey,
    ) -> Result<Vec<DebtAllocation>>;
    /// Writes the allocation keyed by `(debt_id, period)`, keeping the stored id when a
    /// row already exists. Returns the stored record.
    ///
    /// Fails with `InvalidAllocation` when the stored row is already paid.
    fn upsert_allocation(&self, allocation: DebtAllocation) -> Result<DebtAllocation>;
    /// Fails with `InvalidAllocation` when the row is already paid.
    fn clear_allocation_paycheck(&self, allocation_id: Uuid) -> Result<DebtAllocation>;
    fn mark_allocation_paid(
        &self,
        allocation_id: Uuid,
        payment_id: Uuid,
        paid_at: DateTime<Utc>,
    ) -> Result<DebtAllocation>;
}

/// Everything the planner needs from persistence.
pub trait PlannerStore: AccountStore + IncomeSourceStore + DebtStore + AllocationStore {}

impl<T> PlannerStore for T where T: AccountStore + IncomeSourceStore + DebtStore + AllocationStore {}

/// Whole-data-set image kept by the snapshot backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerSnapshot {
    #[serde(default = "PlannerSnapshot::schema_version_default")]
    pub schema_version: u8,
    #[serde(default)]
    pub accounts: Vec<BudgetAccountRecord>,
    #[serde(default)]
    pub members: Vec<AccountMemberRecord>,
    #[serde(default)]
    pub income_sources: Vec<IncomeSource>,
    #[serde(default)]
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub monthly_plannings: Vec<MonthlyDebtPlanning>,
    #[serde(default)]
    pub allocations: Vec<DebtAllocation>,
}

impl Default for PlannerSnapshot {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            accounts: Vec::new(),
            members: Vec::new(),
            income_sources: Vec::new(),
            debts: Vec::new(),
            monthly_plannings: Vec::new(),
            allocations: Vec::new(),
        }
    }
}

impl PlannerSnapshot {
    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    fn allocation_mut(&mut self, id: Uuid) -> Result<&mut DebtAllocation> {
        self.allocations
            .iter_mut()
            .find(|allocation| allocation.id == id)
            .ok_or_else(|| PlannerError::not_found("allocation", id))
    }
}

/// A backend that serves reads and writes against a [`PlannerSnapshot`].
pub trait SnapshotBackend: Send + Sync {
    fn read<R>(&self, f: impl FnOnce(&PlannerSnapshot) -> R) -> Result<R>;

    /// Applies `f` to the data set. When `f` fails, no change is kept.
    fn write<R>(&self, f: impl FnOnce(&mut PlannerSnapshot) -> Result<R>) -> Result<R>;
}

impl<B: SnapshotBackend> AccountStore for B {
    fn find_budget_account(&self, id: Uuid) -> Result<Option<BudgetAccount>> {
        self.read(|data| {
            data.accounts
                .iter()
                .find(|record| record.id == id)
                .map(|record| BudgetAccount::from_records(record, &data.members))
        })
    }

    fn insert_budget_account(&self, record: BudgetAccountRecord) -> Result<()> {
        self.write(|data| {
            if data.accounts.iter().any(|existing| existing.id == record.id) {
                return Err(PlannerError::Validation(format!(
                    "budget account {} already exists",
                    record.id
                )));
            }
            data.accounts.push(record);
            Ok(())
        })
    }

    fn add_account_member(&self, member: AccountMemberRecord) -> Result<()> {
        self.write(|data| {
            data.members.retain(|existing| {
                !(existing.budget_account_id == member.budget_account_id
                    && existing.user_id == member.user_id)
            });
            data.members.push(member);
            Ok(())
        })
    }
}

impl<B: SnapshotBackend> IncomeSourceStore for B {
    fn list_active_income_sources(&self, budget_account_id: Uuid) -> Result<Vec<IncomeSource>> {
        self.read(|data| {
            data.income_sources
                .iter()
                .filter(|source| source.budget_account_id == budget_account_id && source.is_active)
                .cloned()
                .collect()
        })
    }

    fn list_income_sources(&self, budget_account_id: Uuid) -> Result<Vec<IncomeSource>> {
        self.read(|data| {
            data.income_sources
                .iter()
                .filter(|source| source.budget_account_id == budget_account_id)
                .cloned()
                .collect()
        })
    }

    fn find_income_source(&self, id: Uuid) -> Result<Option<IncomeSource>> {
        self.read(|data| data.income_sources.iter().find(|s| s.id == id).cloned())
    }

    fn save_income_source(&self, source: IncomeSource) -> Result<()> {
        self.write(|data| {
            match data.income_sources.iter_mut().find(|s| s.id == source.id) {
                Some(existing) => *existing = source,
                None => data.income_sources.push(source),
            }
            Ok(())
        })
    }
}

impl<B: SnapshotBackend> DebtStore for B {
    fn find_debt(&self, id: Uuid) -> Result<Option<Debt>> {
        self.read(|data| data.debts.iter().find(|debt| debt.id == id).cloned())
    }

    fn list_debts(&self, budget_account_id: Uuid) -> Result<Vec<Debt>> {
        self.read(|data| {
            data.debts
                .iter()
                .filter(|debt| debt.budget_account_id == budget_account_id)
                .cloned()
                .collect()
        })
    }

    fn save_debt(&self, debt: Debt) -> Result<()> {
        self.write(|data| {
            match data.debts.iter_mut().find(|existing| existing.id == debt.id) {
                Some(existing) => *existing = debt,
                None => data.debts.push(debt),
            }
            Ok(())
        })
    }

    fn delete_debt(&self, id: Uuid) -> Result<bool> {
        self.write(|data| {
            let before = data.debts.len();
            data.debts.retain(|debt| debt.id != id);
            let existed = data.debts.len() != before;
            if existed {
                data.monthly_plannings.retain(|row| row.debt_id != id);
                data.allocations.retain(|allocation| allocation.debt_id != id);
            }
            Ok(existed)
        })
    }

    fn list_active_monthly_debts(
        &self,
        budget_account_id: Uuid,
        period: MonthKey,
    ) -> Result<Vec<MonthlyDebt>> {
        self.read(|data| {
            let mut debts: Vec<MonthlyDebt> = data
                .monthly_plannings
                .iter()
                .filter(|row| {
                    row.budget_account_id == budget_account_id
                        && row.period == period
                        && row.is_active
                })
                .filter_map(|row| {
                    data.debts
                        .iter()
                        .find(|debt| debt.id == row.debt_id)
                        .map(|debt| MonthlyDebt::from_planning(debt, row))
                })
                .collect();
            debts.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.name.cmp(&b.name)));
            debts
        })
    }

    fn find_monthly_planning(
        &self,
        debt_id: Uuid,
        period: MonthKey,
    ) -> Result<Option<MonthlyDebtPlanning>> {
        self.read(|data| {
            data.monthly_plannings
                .iter()
                .find(|row| row.debt_id == debt_id && row.period == period)
                .cloned()
        })
    }

    fn insert_monthly_planning(&self, planning: MonthlyDebtPlanning) -> Result<()> {
        self.write(|data| {
            let duplicate = data
                .monthly_plannings
                .iter()
                .any(|row| row.debt_id == planning.debt_id && row.period == planning.period);
            if duplicate {
                return Err(PlannerError::Validation(format!(
                    "debt {} is already planned for {}",
                    planning.debt_id, planning.period
                )));
            }
            data.monthly_plannings.push(planning);
            Ok(())
        })
    }

    fn set_monthly_planning_active(&self, planning_id: Uuid, is_active: bool) -> Result<()> {
        self.write(|data| {
            let row = data
                .monthly_plannings
                .iter_mut()
                .find(|row| row.id == planning_id)
                .ok_or_else(|| PlannerError::not_found("monthly planning", planning_id))?;
            row.is_active = is_active;
            Ok(())
        })
    }
}

impl<B: SnapshotBackend> AllocationStore for B {
    fn find_allocation(&self, debt_id: Uuid, period: MonthKey) -> Result<Option<DebtAllocation>> {
        self.read(|data| {
            data.allocations
                .iter()
                .find(|allocation| allocation.debt_id == debt_id && allocation.period == period)
                .cloned()
        })
    }

    fn find_allocation_by_id(&self, id: Uuid) -> Result<Option<DebtAllocation>> {
        self.read(|data| data.allocations.iter().find(|a| a.id == id).cloned())
    }

    fn list_allocations(
        &self,
        budget_account_id: Uuid,
        period: MonthKey,
    ) -> Result<Vec<DebtAllocation>> {
        self.read(|data| {
            data.allocations
                .iter()
                .filter(|allocation| {
                    allocation.budget_account_id == budget_account_id
                        && allocation.period == period
                })
                .cloned()
                .collect()
        })
    }

    fn upsert_allocation(&self, allocation: DebtAllocation) -> Result<DebtAllocation> {
        self.write(|data| {
            let existing = data.allocations.iter_mut().find(|row| {
                row.debt_id == allocation.debt_id && row.period == allocation.period
            });
            match existing {
                Some(row) if row.is_paid => Err(already_paid(row.id)),
                Some(row) => {
                    let id = row.id;
                    *row = DebtAllocation { id, ..allocation };
                    Ok(row.clone())
                }
                None => {
                    data.allocations.push(allocation.clone());
                    Ok(allocation)
                }
            }
        })
    }

    fn clear_allocation_paycheck(&self, allocation_id: Uuid) -> Result<DebtAllocation> {
        self.write(|data| {
            let row = data.allocation_mut(allocation_id)?;
            if row.is_paid {
                return Err(already_paid(allocation_id));
            }
            row.paycheck_id = None;
            Ok(row.clone())
        })
    }

    fn mark_allocation_paid(
        &self,
        allocation_id: Uuid,
        payment_id: Uuid,
        paid_at: DateTime<Utc>,
    ) -> Result<DebtAllocation> {
        self.write(|data| {
            let row = data.allocation_mut(allocation_id)?;
            row.is_paid = true;
            row.paid_at = Some(paid_at);
            row.payment_id = Some(payment_id);
            Ok(row.clone())
        })
    }
}

fn already_paid(allocation_id: Uuid) -> PlannerError {
    PlannerError::InvalidAllocation(format!("allocation {allocation_id} is already paid"))
}
