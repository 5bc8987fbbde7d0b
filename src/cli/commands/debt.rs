use crate::cli::core::{CliContext, CommandError, CommandResult};
use crate::cli::output;
use crate::core::services::DebtService;
use crate::domain::{Debt, DebtRecurrence};
use crate::errors::PlannerError;

use super::{parse_amount, parse_date, parse_uuid, CommandDefinition, ParsedArgs};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "debt",
        "Manage debts and bills",
        "debt add <account> <name> <amount> <due-date> [--recurrence <once|weekly|bi-weekly|monthly|quarterly|yearly>] [--balance] | debt list <account> | debt remove <account> <debt>",
        cmd_debt,
    )]
}

fn cmd_debt(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["balance"]);
    match parsed.positional(0, "subcommand")? {
        "add" => {
            let account_id = parse_uuid(parsed.positional(1, "account id")?, "account")?;
            let name = parsed.positional(2, "debt name")?;
            let amount = parse_amount(parsed.positional(3, "amount")?)?;
            let due = parse_date(parsed.positional(4, "due date")?)?;
            let recurrence = match parsed.option("recurrence")? {
                Some(raw) => raw
                    .parse::<DebtRecurrence>()
                    .map_err(|err: PlannerError| CommandError::InvalidArguments(err.to_string()))?,
                None => DebtRecurrence::default(),
            };
            let mut debt = Debt::new(account_id, name, amount, due).with_recurrence(recurrence);
            debt.has_balance = parsed.flag("balance");

            let id = DebtService::add(context.store(), debt)?;
            output::success(format!("Added debt `{name}` ({recurrence})"));
            output::info(format!("debt id: {id}"));
            Ok(())
        }
        "list" => {
            let account_id = parse_uuid(parsed.positional(1, "account id")?, "account")?;
            let debts = DebtService::list(context.store(), account_id)?;
            if debts.is_empty() {
                output::info("No debts.");
            }
            for debt in debts {
                output::info(format!(
                    "{}  {}  {}  due {} ({})",
                    debt.id, debt.name, debt.payment_amount, debt.due_date, debt.recurrence
                ));
            }
            Ok(())
        }
        "remove" => {
            let account_id = parse_uuid(parsed.positional(1, "account id")?, "account")?;
            let debt_id = parse_uuid(parsed.positional(2, "debt id")?, "debt")?;
            DebtService::remove(context.store(), account_id, debt_id)?;
            context.client.invalidate_all();
            output::success("Debt removed.");
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown debt subcommand `{other}`"
        ))),
    }
}
