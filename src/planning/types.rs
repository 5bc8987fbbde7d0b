use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{MonthKey, MonthlyDebt, Paycheck, PaycheckId, Warning};

/// Everything needed to render one planning month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningData {
    pub period: MonthKey,
    pub paychecks: Vec<Paycheck>,
    pub debts: Vec<MonthlyDebt>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocatedDebt {
    pub allocation_id: Uuid,
    pub debt_id: Uuid,
    pub debt_name: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub payment_date: NaiveDate,
    pub is_paid: bool,
    pub payment_id: Option<Uuid>,
}

/// Debts assigned to one paycheck and what is left of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaycheckAllocationSummary {
    pub paycheck_id: PaycheckId,
    pub paycheck_date: NaiveDate,
    pub paycheck_amount: Decimal,
    pub allocated_debts: Vec<AllocatedDebt>,
    /// Negative when the paycheck is over-allocated.
    pub remaining_amount: Decimal,
}

impl PaycheckAllocationSummary {
    pub fn allocated_total(&self) -> Decimal {
        self.allocated_debts.iter().map(|debt| debt.amount).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationAction {
    Allocate,
    Unallocate,
}

/// Input of [`PaycheckAllocator::update_debt_allocation`](super::PaycheckAllocator::update_debt_allocation).
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationRequest {
    pub budget_account_id: Uuid,
    pub debt_id: Uuid,
    pub paycheck_id: PaycheckId,
    pub action: AllocationAction,
    /// Defaults to the debt's payment amount.
    pub payment_amount: Option<Decimal>,
    /// Defaults to the paycheck date.
    pub payment_date: Option<NaiveDate>,
    pub note: Option<String>,
}

impl AllocationRequest {
    pub fn allocate(budget_account_id: Uuid, debt_id: Uuid, paycheck_id: PaycheckId) -> Self {
        Self {
            budget_account_id,
            debt_id,
            paycheck_id,
            action: AllocationAction::Allocate,
            payment_amount: None,
            payment_date: None,
            note: None,
        }
    }

    pub fn unallocate(budget_account_id: Uuid, debt_id: Uuid, paycheck_id: PaycheckId) -> Self {
        Self {
            action: AllocationAction::Unallocate,
            ..Self::allocate(budget_account_id, debt_id, paycheck_id)
        }
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.payment_amount = Some(amount);
        self
    }

    pub fn with_payment_date(mut self, date: NaiveDate) -> Self {
        self.payment_date = Some(date);
        self
    }
}
