#![doc(test(attr(deny(warnings))))]

//! Paycheck planner: projects the paychecks of a month, assigns debts to them, and
//! reports what each paycheck has left along with planning warnings.

pub mod cache;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod planning;
pub mod storage;
pub mod utils;

use std::sync::Once;

pub use cache::PlanningClient;
pub use config::{ConfigManager, PlannerConfig};
pub use crate::core::time::{Clock, FixedClock, SystemClock};
pub use errors::{PlannerError, Result};
pub use planning::{
    AllocationRequest, PaycheckAllocationSummary, PaycheckAllocator, PlanningData,
};
pub use storage::{JsonStore, MemoryStore, PlannerStore};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Paycheck planner tracing initialized.");
    });
}
