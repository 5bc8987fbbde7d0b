use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::income::{IncomeSource, PayFrequency};

const PAYCHECK_DATE_FORMAT: &str = "%Y-%m-%d";

/// Logical identifier of a projected paycheck occurrence.
///
/// Encodes the income source and the pay date, so projecting the same month twice
/// yields the same identifiers. It is never a foreign key to a stored row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaycheckId(String);

impl PaycheckId {
    pub fn new(income_source_id: Uuid, date: NaiveDate) -> Self {
        Self(format!(
            "{}:{}",
            income_source_id,
            date.format(PAYCHECK_DATE_FORMAT)
        ))
    }

    /// Wraps a raw identifier coming from a caller or a stored record.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn income_source_id(&self) -> Option<Uuid> {
        let (source, _) = self.0.split_once(':')?;
        Uuid::parse_str(source).ok()
    }

    /// Pay date encoded in the identifier; `None` when the id is malformed.
    pub fn date(&self) -> Option<NaiveDate> {
        let (_, date) = self.0.split_once(':')?;
        NaiveDate::parse_from_str(date, PAYCHECK_DATE_FORMAT).ok()
    }
}

impl fmt::Display for PaycheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A computed paycheck occurrence; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paycheck {
    pub id: PaycheckId,
    pub income_source_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub frequency: PayFrequency,
}

impl Paycheck {
    pub fn from_source(source: &IncomeSource, date: NaiveDate) -> Self {
        Self {
            id: PaycheckId::new(source.id, date),
            income_source_id: source.id,
            user_id: source.user_id,
            name: source.name.clone(),
            amount: source.amount,
            date,
            frequency: source.frequency,
        }
    }
}
