//! One-shot command line front end over [`PlanningClient`](crate::cache::PlanningClient).

pub mod commands;
pub mod core;
pub mod output;
mod shell;

pub use self::core::{CliContext, CliError, CommandError};
pub use shell::run_cli;
