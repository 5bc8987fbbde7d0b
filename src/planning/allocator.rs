//! Assigns debts to projected paychecks and summarizes what each paycheck has left.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use super::projection::project_paychecks;
use super::types::{
    AllocatedDebt, AllocationAction, AllocationRequest, PaycheckAllocationSummary, PlanningData,
};
use super::warnings::{derive_warnings, WarningPolicy};
use crate::config::PlannerConfig;
use crate::core::time::Clock;
use crate::domain::{
    Debt, DebtAllocation, MonthKey, MonthlyDebt, Paycheck, PaycheckId,
};
use crate::errors::{PlannerError, Result};
use crate::storage::PlannerStore;

/// Everything loaded for one account and month before summarizing.
struct MonthState {
    paychecks: Vec<Paycheck>,
    debts: Vec<MonthlyDebt>,
    allocations: Vec<DebtAllocation>,
}

/// Request-scoped planner over a [`PlannerStore`].
///
/// The allocator writes only allocation rows and keeps no state between calls.
#[derive(Clone)]
pub struct PaycheckAllocator {
    store: Arc<dyn PlannerStore>,
    clock: Arc<dyn Clock>,
    due_soon_days: u32,
}

impl PaycheckAllocator {
    pub fn new(store: Arc<dyn PlannerStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            due_soon_days: PlannerConfig::default_due_soon_days(),
        }
    }

    pub fn with_config(mut self, config: &PlannerConfig) -> Self {
        self.due_soon_days = config.due_soon_days;
        self
    }

    pub fn store(&self) -> &dyn PlannerStore {
        self.store.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn clock_handle(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Paychecks, active debts, and warnings for `year`/`month`.
    pub fn planning_data(
        &self,
        budget_account_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<PlanningData> {
        let period = MonthKey::new(year, month)?;
        let state = self.load_month(budget_account_id, period)?;
        let summaries = summarize(&state);
        let warnings = derive_warnings(
            &summaries,
            &state.debts,
            &state.allocations,
            WarningPolicy {
                today: self.clock.today(),
                due_soon_days: self.due_soon_days,
            },
        );
        Ok(PlanningData {
            period,
            paychecks: state.paychecks,
            debts: state.debts,
            warnings,
        })
    }

    /// One summary per projected paycheck, in paycheck order.
    pub fn allocations(
        &self,
        budget_account_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Vec<PaycheckAllocationSummary>> {
        let period = MonthKey::new(year, month)?;
        let state = self.load_month(budget_account_id, period)?;
        Ok(summarize(&state))
    }

    /// Allocates or unallocates a debt for the month of the referenced paycheck.
    ///
    /// Returns the stored allocation, or `None` when unallocating a debt that has no
    /// allocation that month.
    pub fn update_debt_allocation(
        &self,
        request: &AllocationRequest,
    ) -> Result<Option<DebtAllocation>> {
        let debt = self.owned_debt(request.budget_account_id, request.debt_id)?;
        let period = request
            .paycheck_id
            .date()
            .map(MonthKey::of)
            .ok_or_else(|| {
                PlannerError::InvalidAllocation(format!(
                    "paycheck id `{}` is malformed",
                    request.paycheck_id
                ))
            })?;
        let existing = self.store.find_allocation(debt.id, period)?;

        match request.action {
            AllocationAction::Allocate => self.allocate(request, &debt, period, existing).map(Some),
            AllocationAction::Unallocate => self.unallocate(&debt, period, existing),
        }
    }

    /// Marks an allocated payment as paid. Paid is terminal; marking twice is a no-op.
    pub fn mark_payment_as_paid(
        &self,
        budget_account_id: Uuid,
        allocation_id: Uuid,
        payment_id: Option<Uuid>,
    ) -> Result<DebtAllocation> {
        let allocation = self
            .store
            .find_allocation_by_id(allocation_id)?
            .filter(|allocation| allocation.budget_account_id == budget_account_id)
            .ok_or_else(|| PlannerError::not_found("allocation", allocation_id))?;
        if allocation.is_paid {
            debug!(%allocation_id, "allocation already paid");
            return Ok(allocation);
        }
        if !allocation.is_allocated() {
            return Err(PlannerError::InvalidAllocation(format!(
                "allocation {allocation_id} is not assigned to a paycheck"
            )));
        }
        let payment_id = payment_id.unwrap_or_else(Uuid::new_v4);
        let paid = self
            .store
            .mark_allocation_paid(allocation_id, payment_id, self.clock.now())?;
        info!(%allocation_id, debt_id = %paid.debt_id, "payment marked as paid");
        Ok(paid)
    }

    fn allocate(
        &self,
        request: &AllocationRequest,
        debt: &Debt,
        period: MonthKey,
        existing: Option<DebtAllocation>,
    ) -> Result<DebtAllocation> {
        let amount = request.payment_amount.unwrap_or(debt.payment_amount);
        if amount <= Decimal::ZERO {
            return Err(PlannerError::InvalidAllocation(format!(
                "payment amount must be positive, got {amount}"
            )));
        }
        let sources = self
            .store
            .list_active_income_sources(request.budget_account_id)?;
        let paycheck = project_paychecks(&sources, period)
            .into_iter()
            .find(|paycheck| paycheck.id == request.paycheck_id)
            .ok_or_else(|| {
                PlannerError::InvalidAllocation(format!(
                    "paycheck {} does not exist in {period}",
                    request.paycheck_id
                ))
            })?;
        if existing.as_ref().is_some_and(|row| row.is_paid) {
            return Err(PlannerError::InvalidAllocation(format!(
                "{} is already paid for {period}",
                debt.name
            )));
        }

        let allocation = DebtAllocation {
            id: existing.as_ref().map_or_else(Uuid::new_v4, |row| row.id),
            debt_id: debt.id,
            paycheck_id: Some(paycheck.id.clone()),
            budget_account_id: request.budget_account_id,
            user_id: paycheck.user_id,
            period,
            payment_amount: amount,
            payment_date: request.payment_date.unwrap_or(paycheck.date),
            is_paid: false,
            paid_at: None,
            payment_id: None,
            note: request
                .note
                .clone()
                .or_else(|| existing.and_then(|row| row.note)),
        };
        let stored = self.store.upsert_allocation(allocation)?;
        info!(debt_id = %debt.id, paycheck_id = %paycheck.id, %period, "debt allocated");
        Ok(stored)
    }

    fn unallocate(
        &self,
        debt: &Debt,
        period: MonthKey,
        existing: Option<DebtAllocation>,
    ) -> Result<Option<DebtAllocation>> {
        let Some(existing) = existing else {
            debug!(debt_id = %debt.id, %period, "nothing to unallocate");
            return Ok(None);
        };
        if existing.is_paid {
            return Err(PlannerError::InvalidAllocation(format!(
                "{} is already paid for {period} and cannot be unallocated",
                debt.name
            )));
        }
        if !existing.is_allocated() {
            return Ok(Some(existing));
        }
        let cleared = self.store.clear_allocation_paycheck(existing.id)?;
        info!(debt_id = %debt.id, %period, "debt unallocated");
        Ok(Some(cleared))
    }

    fn owned_debt(&self, budget_account_id: Uuid, debt_id: Uuid) -> Result<Debt> {
        self.store
            .find_debt(debt_id)?
            .filter(|debt| debt.budget_account_id == budget_account_id)
            .ok_or_else(|| PlannerError::not_found("debt", debt_id))
    }

    fn load_month(&self, budget_account_id: Uuid, period: MonthKey) -> Result<MonthState> {
        if self.store.find_budget_account(budget_account_id)?.is_none() {
            return Err(PlannerError::not_found("budget account", budget_account_id));
        }
        let sources = self.store.list_active_income_sources(budget_account_id)?;
        let paychecks = project_paychecks(&sources, period);
        let debts = self
            .store
            .list_active_monthly_debts(budget_account_id, period)?;
        let allocations = self.store.list_allocations(budget_account_id, period)?;
        Ok(MonthState {
            paychecks,
            debts,
            allocations,
        })
    }
}

fn summarize(state: &MonthState) -> Vec<PaycheckAllocationSummary> {
    let debts: HashMap<Uuid, &MonthlyDebt> =
        state.debts.iter().map(|debt| (debt.id, debt)).collect();
    let mut assigned: HashMap<&PaycheckId, Vec<AllocatedDebt>> = HashMap::new();

    for allocation in &state.allocations {
        let Some(debt) = debts.get(&allocation.debt_id) else {
            continue;
        };
        let Some(paycheck) = resolve_paycheck(&state.paychecks, allocation) else {
            continue;
        };
        assigned.entry(&paycheck.id).or_default().push(AllocatedDebt {
            allocation_id: allocation.id,
            debt_id: debt.id,
            debt_name: debt.name.clone(),
            amount: allocation.payment_amount,
            due_date: debt.due_date,
            payment_date: allocation.payment_date,
            is_paid: allocation.is_paid,
            payment_id: allocation.payment_id,
        });
    }

    state
        .paychecks
        .iter()
        .map(|paycheck| {
            let mut allocated_debts = assigned.remove(&paycheck.id).unwrap_or_default();
            allocated_debts.sort_by(|a, b| {
                a.due_date
                    .cmp(&b.due_date)
                    .then_with(|| a.debt_name.cmp(&b.debt_name))
            });
            let allocated: Decimal = allocated_debts.iter().map(|debt| debt.amount).sum();
            PaycheckAllocationSummary {
                paycheck_id: paycheck.id.clone(),
                paycheck_date: paycheck.date,
                paycheck_amount: paycheck.amount,
                allocated_debts,
                remaining_amount: paycheck.amount - allocated,
            }
        })
        .collect()
}

/// Finds the projected paycheck an allocation points at.
///
/// Falls back to the first paycheck on the date encoded in the stored id, for rows
/// whose income source was replaced. A fallback that cannot resolve is "no match".
fn resolve_paycheck<'a>(
    paychecks: &'a [Paycheck],
    allocation: &DebtAllocation,
) -> Option<&'a Paycheck> {
    let paycheck_id = allocation.paycheck_id.as_ref()?;
    if let Some(exact) = paychecks.iter().find(|paycheck| &paycheck.id == paycheck_id) {
        return Some(exact);
    }
    let date = paycheck_id.date()?;
    paychecks.iter().find(|paycheck| paycheck.date == date)
}
