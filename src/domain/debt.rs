use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::MonthKey;
use super::time_interval::{TimeInterval, TimeUnit};
use crate::errors::PlannerError;

/// Cadence of a bill, stored as data rather than folded into its display name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DebtRecurrence {
    Once,
    Weekly,
    BiWeekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl DebtRecurrence {
    pub fn interval(self) -> Option<TimeInterval> {
        match self {
            DebtRecurrence::Once => None,
            DebtRecurrence::Weekly => Some(TimeInterval::new(1, TimeUnit::Week)),
            DebtRecurrence::BiWeekly => Some(TimeInterval::new(2, TimeUnit::Week)),
            DebtRecurrence::Monthly => Some(TimeInterval::new(1, TimeUnit::Month)),
            DebtRecurrence::Quarterly => Some(TimeInterval::new(3, TimeUnit::Month)),
            DebtRecurrence::Yearly => Some(TimeInterval::new(1, TimeUnit::Year)),
        }
    }
}

impl fmt::Display for DebtRecurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.interval() {
            Some(interval) => f.write_str(&interval.label()),
            None => f.write_str("Once"),
        }
    }
}

impl FromStr for DebtRecurrence {
    type Err = PlannerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "once" => Ok(DebtRecurrence::Once),
            "weekly" => Ok(DebtRecurrence::Weekly),
            "bi-weekly" | "biweekly" => Ok(DebtRecurrence::BiWeekly),
            "monthly" => Ok(DebtRecurrence::Monthly),
            "quarterly" => Ok(DebtRecurrence::Quarterly),
            "yearly" | "annual" => Ok(DebtRecurrence::Yearly),
            other => Err(PlannerError::Validation(format!(
                "unknown debt recurrence `{other}`"
            ))),
        }
    }
}

/// A bill or debt obligation owned by a budget account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Debt {
    pub id: Uuid,
    pub budget_account_id: Uuid,
    pub name: String,
    pub payment_amount: Decimal,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub has_balance: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub recurrence: DebtRecurrence,
}

impl Debt {
    pub fn new(
        budget_account_id: Uuid,
        name: impl Into<String>,
        payment_amount: Decimal,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            budget_account_id,
            name: name.into(),
            payment_amount,
            due_date,
            has_balance: false,
            category_id: None,
            recurrence: DebtRecurrence::default(),
        }
    }

    pub fn with_recurrence(mut self, recurrence: DebtRecurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    /// First due date of this debt inside `month`, if it is due that month at all.
    pub fn due_date_in(&self, month: MonthKey) -> Option<NaiveDate> {
        match self.recurrence.interval() {
            None => month.contains(self.due_date).then_some(self.due_date),
            Some(interval) => interval
                .occurrences_in(self.due_date, month.window(), None)
                .into_iter()
                .next(),
        }
    }
}

/// Materializes whether a debt is in scope for a given month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthlyDebtPlanning {
    pub id: Uuid,
    pub budget_account_id: Uuid,
    pub debt_id: Uuid,
    #[serde(flatten)]
    pub period: MonthKey,
    pub due_date: NaiveDate,
    pub is_active: bool,
}

impl MonthlyDebtPlanning {
    pub fn new(debt: &Debt, period: MonthKey, due_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            budget_account_id: debt.budget_account_id,
            debt_id: debt.id,
            period,
            due_date,
            is_active: true,
        }
    }
}

/// A debt as it applies to one planning month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyDebt {
    pub id: Uuid,
    pub name: String,
    pub payment_amount: Decimal,
    pub due_date: NaiveDate,
    pub has_balance: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
}

impl MonthlyDebt {
    pub fn from_planning(debt: &Debt, planning: &MonthlyDebtPlanning) -> Self {
        Self {
            id: debt.id,
            name: debt.name.clone(),
            payment_amount: debt.payment_amount,
            due_date: planning.due_date,
            has_balance: debt.has_balance,
            category_id: debt.category_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn debt(recurrence: DebtRecurrence, due: NaiveDate) -> Debt {
        Debt::new(Uuid::new_v4(), "Rent", Decimal::from(900), due).with_recurrence(recurrence)
    }

    #[test]
    fn monthly_debt_due_date_clamps_to_short_month() {
        let rent = debt(DebtRecurrence::Monthly, date(2024, 1, 31));
        let feb = MonthKey::new(2024, 2).unwrap();
        assert_eq!(rent.due_date_in(feb), Some(date(2024, 2, 29)));
    }

    #[test]
    fn debts_are_not_due_before_their_first_due_date() {
        let rent = debt(DebtRecurrence::Monthly, date(2024, 5, 1));
        assert_eq!(rent.due_date_in(MonthKey::new(2024, 4).unwrap()), None);
    }

    #[test]
    fn quarterly_debt_skips_off_cycle_months() {
        let insurance = debt(DebtRecurrence::Quarterly, date(2024, 1, 10));
        assert_eq!(insurance.due_date_in(MonthKey::new(2024, 2).unwrap()), None);
        assert_eq!(
            insurance.due_date_in(MonthKey::new(2024, 4).unwrap()),
            Some(date(2024, 4, 10))
        );
    }

    #[test]
    fn one_off_debt_only_in_its_month() {
        let repair = debt(DebtRecurrence::Once, date(2024, 6, 3));
        assert_eq!(repair.due_date_in(MonthKey::new(2024, 6).unwrap()), Some(date(2024, 6, 3)));
        assert_eq!(repair.due_date_in(MonthKey::new(2024, 7).unwrap()), None);
    }

    #[test]
    fn recurrence_parses_common_spellings() {
        assert_eq!("BiWeekly".parse::<DebtRecurrence>().unwrap(), DebtRecurrence::BiWeekly);
        assert!("fortnightly".parse::<DebtRecurrence>().is_err());
    }
}
