//! Planning domain records and value types. No I/O.

pub mod account;
pub mod allocation;
pub mod common;
pub mod debt;
pub mod income;
pub mod paycheck;
pub mod time_interval;
pub mod warning;

pub use account::{AccountMember, AccountMemberRecord, BudgetAccount, BudgetAccountRecord, MemberRole};
pub use allocation::{AllocationState, DebtAllocation};
pub use common::{DateWindow, MonthKey};
pub use debt::{Debt, DebtRecurrence, MonthlyDebt, MonthlyDebtPlanning};
pub use income::{IncomeSource, PayFrequency};
pub use paycheck::{Paycheck, PaycheckId};
pub use time_interval::{TimeInterval, TimeUnit};
pub use warning::{Severity, Warning, WarningKind};
