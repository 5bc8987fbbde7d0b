//! Paycheck projection, debt allocation, and warning derivation.

pub mod allocator;
pub mod projection;
pub mod types;
pub mod warnings;

pub use allocator::PaycheckAllocator;
pub use projection::project_paychecks;
pub use types::{
    AllocatedDebt, AllocationAction, AllocationRequest, PaycheckAllocationSummary, PlanningData,
};
pub use warnings::{derive_warnings, WarningPolicy};
