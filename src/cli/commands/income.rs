use crate::cli::core::{CliContext, CommandError, CommandResult};
use crate::cli::output;
use crate::core::services::{AccountService, IncomeService};
use crate::domain::{IncomeSource, PayFrequency};

use super::{parse_amount, parse_date, parse_uuid, CommandDefinition, ParsedArgs};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "income",
        "Manage income sources",
        "income add <account> <name> <amount> <weekly|bi-weekly|monthly> <start> [--end <date>] [--user <user-id>] | income list <account> | income stop <account> <source>",
        cmd_income,
    )]
}

fn cmd_income(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[]);
    match parsed.positional(0, "subcommand")? {
        "add" => add(context, &parsed),
        "list" => {
            let account = parse_uuid(parsed.positional(1, "account id")?, "account")?;
            let sources = IncomeService::list(context.store(), account)?;
            if sources.is_empty() {
                output::info("No income sources.");
            }
            for source in sources {
                let state = if source.is_active { "" } else { " (inactive)" };
                output::info(format!(
                    "{}  {}  {} {} from {}{}",
                    source.id, source.name, source.amount, source.frequency, source.start_date, state
                ));
            }
            Ok(())
        }
        "stop" => {
            let account = parse_uuid(parsed.positional(1, "account id")?, "account")?;
            let id = parse_uuid(parsed.positional(2, "income source id")?, "income source")?;
            let source = IncomeService::deactivate(context.store(), account, id)?;
            context.client.invalidate_all();
            output::success(format!("Stopped projecting `{}`", source.name));
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown income subcommand `{other}`"
        ))),
    }
}

fn add(context: &mut CliContext, parsed: &ParsedArgs<'_>) -> CommandResult {
    let account_id = parse_uuid(parsed.positional(1, "account id")?, "account")?;
    let name = parsed.positional(2, "income name")?;
    let amount = parse_amount(parsed.positional(3, "amount")?)?;
    let frequency: PayFrequency = parsed
        .positional(4, "frequency")?
        .parse()
        .map_err(|err: crate::errors::PlannerError| {
            CommandError::InvalidArguments(err.to_string())
        })?;
    let start = parse_date(parsed.positional(5, "start date")?)?;
    let user = match parsed.option("user")? {
        Some(raw) => parse_uuid(raw, "user")?,
        None => AccountService::get(context.store(), account_id)?.owner_id,
    };

    let mut source = IncomeSource::new(account_id, user, name, amount, frequency, start);
    if let Some(end) = parsed.option("end")? {
        source = source.with_end_date(parse_date(end)?);
    }
    let id = IncomeService::add(context.store(), source)?;
    context.client.invalidate_all();
    output::success(format!("Added income source `{name}`"));
    output::info(format!("income source id: {id}"));
    Ok(())
}
