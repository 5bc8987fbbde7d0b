use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::MonthKey;
use super::time_interval::{TimeInterval, TimeUnit};
use crate::errors::PlannerError;

/// How often an income source pays out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PayFrequency {
    Weekly,
    BiWeekly,
    Monthly,
}

impl PayFrequency {
    pub fn interval(self) -> TimeInterval {
        match self {
            PayFrequency::Weekly => TimeInterval::new(1, TimeUnit::Week),
            PayFrequency::BiWeekly => TimeInterval::new(2, TimeUnit::Week),
            PayFrequency::Monthly => TimeInterval::new(1, TimeUnit::Month),
        }
    }
}

impl fmt::Display for PayFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PayFrequency::Weekly => "weekly",
            PayFrequency::BiWeekly => "bi-weekly",
            PayFrequency::Monthly => "monthly",
        };
        f.write_str(label)
    }
}

impl FromStr for PayFrequency {
    type Err = PlannerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(PayFrequency::Weekly),
            "bi-weekly" | "biweekly" => Ok(PayFrequency::BiWeekly),
            "monthly" => Ok(PayFrequency::Monthly),
            other => Err(PlannerError::Validation(format!(
                "unknown pay frequency `{other}`"
            ))),
        }
    }
}

/// A recurring income definition paychecks are projected from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomeSource {
    pub id: Uuid,
    pub budget_account_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub frequency: PayFrequency,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "IncomeSource::default_active")]
    pub is_active: bool,
}

impl IncomeSource {
    pub fn new(
        budget_account_id: Uuid,
        user_id: Uuid,
        name: impl Into<String>,
        amount: Decimal,
        frequency: PayFrequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            budget_account_id,
            user_id,
            name: name.into(),
            amount,
            frequency,
            start_date,
            end_date: None,
            is_active: true,
        }
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Pay dates of this source that fall inside `month`.
    pub fn pay_dates_in(&self, month: MonthKey) -> Vec<NaiveDate> {
        self.frequency
            .interval()
            .occurrences_in(self.start_date, month.window(), self.end_date)
    }

    pub fn default_active() -> bool {
        true
    }
}
