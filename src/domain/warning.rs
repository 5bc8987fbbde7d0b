use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::paycheck::PaycheckId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    InsufficientFunds,
    UnallocatedPastDue,
    DueSoonUnallocated,
    PaymentAfterDueDate,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WarningKind::InsufficientFunds => "insufficient_funds",
            WarningKind::UnallocatedPastDue => "unallocated_past_due",
            WarningKind::DueSoonUnallocated => "due_soon_unallocated",
            WarningKind::PaymentAfterDueDate => "payment_after_due_date",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A derived planning problem; computed on every read and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub message: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paycheck_id: Option<PaycheckId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_id: Option<Uuid>,
}
