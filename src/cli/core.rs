//! Command dispatch and the state shared by every command.

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use thiserror::Error;

use crate::cache::PlanningClient;
use crate::config::{ConfigError, ConfigManager, PlannerConfig};
use crate::core::time::SystemClock;
use crate::errors::PlannerError;
use crate::planning::PaycheckAllocator;
use crate::storage::{JsonStore, PlannerStore};

use super::commands::{self, CommandRegistry};
use super::output;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Planner(#[from] PlannerError),
    #[error("{0}")]
    Command(String),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("Unknown command `{0}`. Run `help` to list commands.")]
    UnknownCommand(String),
    #[error(transparent)]
    Planner(#[from] PlannerError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("exit requested")]
    ExitRequested,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

/// Everything a command handler can reach.
pub struct CliContext {
    pub(crate) client: PlanningClient,
    pub(crate) store: Arc<dyn PlannerStore>,
    pub(crate) config: PlannerConfig,
    pub(crate) registry: CommandRegistry,
    base_dir: PathBuf,
}

impl CliContext {
    /// Opens the planner data under `base_dir`, creating it on first use.
    pub fn open(base_dir: &Path) -> Result<Self, CliError> {
        let config = ConfigManager::with_base_dir(base_dir)?.load()?;
        let store: Arc<dyn PlannerStore> =
            Arc::new(JsonStore::open(config.resolve_data_file(base_dir))?);
        let allocator =
            PaycheckAllocator::new(store.clone(), Arc::new(SystemClock)).with_config(&config);
        Ok(Self {
            client: PlanningClient::new(allocator, &config),
            store,
            config,
            registry: CommandRegistry::new(commands::all_definitions()),
            base_dir: base_dir.to_path_buf(),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub(crate) fn store(&self) -> &dyn PlannerStore {
        self.store.as_ref()
    }

    /// Runs one tokenized command line.
    pub(crate) fn dispatch(&mut self, tokens: &[String]) -> Result<LoopControl, CommandError> {
        let Some((name, rest)) = tokens.split_first() else {
            return Ok(LoopControl::Continue);
        };
        let key = name.to_lowercase();
        let handler = self
            .registry
            .get(&key)
            .map(|definition| definition.handler)
            .ok_or_else(|| CommandError::UnknownCommand(name.clone()))?;
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        match handler(self, &args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn report_error(&self, err: &CommandError) {
        match err {
            CommandError::Planner(inner) => output::error(format!("{} ({})", inner, inner.kind())),
            other => output::error(other),
        }
    }
}
