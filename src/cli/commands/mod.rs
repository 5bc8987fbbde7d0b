use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

pub mod account;
pub mod debt;
pub mod income;
pub mod planning;
pub mod system;

use crate::cli::core::{CliContext, CommandError, CommandResult};
use crate::domain::MonthKey;

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(account::definitions());
    commands.extend(income::definitions());
    commands.extend(debt::definitions());
    commands.extend(planning::definitions());
    commands
}

pub type CommandHandler = fn(&mut CliContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }
}

/// Positional arguments plus `--flag [value]` options.
pub(crate) struct ParsedArgs<'a> {
    positional: Vec<&'a str>,
    options: HashMap<&'a str, Option<&'a str>>,
}

impl<'a> ParsedArgs<'a> {
    /// Splits `args`; names in `switches` never consume a value.
    pub(crate) fn parse(args: &[&'a str], switches: &[&str]) -> Self {
        let mut positional = Vec::new();
        let mut options = HashMap::new();
        let mut iter = args.iter().copied().peekable();
        while let Some(arg) = iter.next() {
            match arg.strip_prefix("--") {
                Some(name) if switches.contains(&name) => {
                    options.insert(name, None);
                }
                Some(name) => {
                    let value = iter.next_if(|next| !next.starts_with("--"));
                    options.insert(name, value);
                }
                None => positional.push(arg),
            }
        }
        Self {
            positional,
            options,
        }
    }

    pub(crate) fn positional(&self, index: usize, what: &str) -> Result<&'a str, CommandError> {
        self.positional
            .get(index)
            .copied()
            .ok_or_else(|| CommandError::InvalidArguments(format!("missing {what}")))
    }

    pub(crate) fn flag(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    pub(crate) fn option(&self, name: &str) -> Result<Option<&'a str>, CommandError> {
        match self.options.get(name) {
            None => Ok(None),
            Some(Some(value)) => Ok(Some(value)),
            Some(None) => Err(CommandError::InvalidArguments(format!(
                "--{name} expects a value"
            ))),
        }
    }
}

pub(crate) fn parse_uuid(value: &str, what: &str) -> Result<Uuid, CommandError> {
    Uuid::parse_str(value)
        .map_err(|_| CommandError::InvalidArguments(format!("{what} `{value}` is not a valid id")))
}

pub(crate) fn parse_amount(value: &str) -> Result<Decimal, CommandError> {
    Decimal::from_str(value)
        .map_err(|_| CommandError::InvalidArguments(format!("`{value}` is not a valid amount")))
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("`{value}` is not a YYYY-MM-DD date"))
    })
}

pub(crate) fn parse_month(value: &str) -> Result<MonthKey, CommandError> {
    value
        .parse::<MonthKey>()
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))
}
