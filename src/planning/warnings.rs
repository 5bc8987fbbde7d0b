use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::types::PaycheckAllocationSummary;
use crate::domain::{DebtAllocation, MonthlyDebt, Severity, Warning, WarningKind};

/// Inputs that decide which dates count as overdue or due soon.
#[derive(Debug, Clone, Copy)]
pub struct WarningPolicy {
    pub today: NaiveDate,
    /// Window length in days, today included. Zero disables due-soon warnings.
    pub due_soon_days: u32,
}

impl WarningPolicy {
    fn is_due_soon(&self, due: NaiveDate) -> bool {
        due >= self.today && (due - self.today).num_days() < i64::from(self.due_soon_days)
    }
}

/// Scans every summary and every active debt once and collects all warnings.
///
/// Paycheck warnings come first in paycheck order, then debt warnings in the order of
/// `debts` (due date ascending as returned by the store).
pub fn derive_warnings(
    summaries: &[PaycheckAllocationSummary],
    debts: &[MonthlyDebt],
    allocations: &[DebtAllocation],
    policy: WarningPolicy,
) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for summary in summaries {
        if summary.remaining_amount < Decimal::ZERO {
            warnings.push(Warning {
                kind: WarningKind::InsufficientFunds,
                message: format!(
                    "Paycheck on {} is over-allocated by {}",
                    summary.paycheck_date,
                    -summary.remaining_amount
                ),
                severity: Severity::High,
                paycheck_id: Some(summary.paycheck_id.clone()),
                debt_id: None,
            });
        }
    }

    let by_debt: HashMap<Uuid, &DebtAllocation> = allocations
        .iter()
        .map(|allocation| (allocation.debt_id, allocation))
        .collect();

    for debt in debts {
        let allocation = by_debt.get(&debt.id).copied();
        let allocated = allocation.is_some_and(DebtAllocation::is_allocated);

        if !allocated {
            if debt.due_date < policy.today {
                warnings.push(Warning {
                    kind: WarningKind::UnallocatedPastDue,
                    message: format!(
                        "{} was due on {} and is not assigned to a paycheck",
                        debt.name, debt.due_date
                    ),
                    severity: Severity::High,
                    paycheck_id: None,
                    debt_id: Some(debt.id),
                });
            } else if policy.is_due_soon(debt.due_date) {
                warnings.push(Warning {
                    kind: WarningKind::DueSoonUnallocated,
                    message: format!(
                        "{} is due on {} and is not assigned to a paycheck",
                        debt.name, debt.due_date
                    ),
                    severity: Severity::Medium,
                    paycheck_id: None,
                    debt_id: Some(debt.id),
                });
            }
            continue;
        }

        if let Some(allocation) = allocation {
            if !allocation.is_paid && allocation.payment_date > debt.due_date {
                warnings.push(Warning {
                    kind: WarningKind::PaymentAfterDueDate,
                    message: format!(
                        "{} is scheduled for {}, after its due date {}",
                        debt.name, allocation.payment_date, debt.due_date
                    ),
                    severity: Severity::Low,
                    paycheck_id: allocation.paycheck_id.clone(),
                    debt_id: Some(debt.id),
                });
            }
        }
    }

    warnings
}
