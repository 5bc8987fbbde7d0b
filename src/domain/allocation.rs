use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::MonthKey;
use super::paycheck::PaycheckId;

/// Where a debt's allocation stands for its month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationState {
    Unallocated,
    Allocated,
    Paid,
}

/// Assignment of a debt payment to a paycheck occurrence within one month.
///
/// At most one row exists per `(debt_id, period)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebtAllocation {
    pub id: Uuid,
    pub debt_id: Uuid,
    #[serde(default)]
    pub paycheck_id: Option<PaycheckId>,
    pub budget_account_id: Uuid,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub period: MonthKey,
    pub payment_amount: Decimal,
    pub payment_date: NaiveDate,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl DebtAllocation {
    pub fn state(&self) -> AllocationState {
        if self.is_paid {
            AllocationState::Paid
        } else if self.paycheck_id.is_some() {
            AllocationState::Allocated
        } else {
            AllocationState::Unallocated
        }
    }

    pub fn is_allocated(&self) -> bool {
        self.paycheck_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_follows_paycheck_and_paid_flags() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let mut allocation = DebtAllocation {
            id: Uuid::new_v4(),
            debt_id: Uuid::new_v4(),
            paycheck_id: None,
            budget_account_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            period: MonthKey::of(date),
            payment_amount: Decimal::from(50),
            payment_date: date,
            is_paid: false,
            paid_at: None,
            payment_id: None,
            note: None,
        };
        assert_eq!(allocation.state(), AllocationState::Unallocated);
        allocation.paycheck_id = Some(PaycheckId::new(Uuid::new_v4(), date));
        assert_eq!(allocation.state(), AllocationState::Allocated);
        allocation.is_paid = true;
        assert_eq!(allocation.state(), AllocationState::Paid);
    }
}
