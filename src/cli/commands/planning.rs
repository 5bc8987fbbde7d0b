use std::collections::HashSet;

use uuid::Uuid;

use crate::cli::core::{CliContext, CommandError, CommandResult};
use crate::cli::output;
use crate::domain::PaycheckId;
use crate::planning::AllocationRequest;

use super::{parse_amount, parse_date, parse_month, parse_uuid, CommandDefinition, ParsedArgs};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "populate",
            "Plan the debts due in a month",
            "populate <account> <YYYY-MM>",
            cmd_populate,
        ),
        CommandDefinition::new(
            "plan",
            "Show paychecks, allocations, and warnings for a month",
            "plan <account> <YYYY-MM>",
            cmd_plan,
        ),
        CommandDefinition::new(
            "allocate",
            "Pay a debt from a paycheck",
            "allocate <account> <debt> <paycheck-id> [--amount <amount>] [--date <YYYY-MM-DD>] [--note <text>]",
            cmd_allocate,
        ),
        CommandDefinition::new(
            "unallocate",
            "Detach a debt from its paycheck",
            "unallocate <account> <debt> <paycheck-id>",
            cmd_unallocate,
        ),
        CommandDefinition::new(
            "pay",
            "Mark an allocated payment as paid",
            "pay <account> <allocation> [--payment <payment-id>]",
            cmd_pay,
        ),
        CommandDefinition::new(
            "hide",
            "Hide a debt for one month",
            "hide <account> <debt> <YYYY-MM>",
            cmd_hide,
        ),
        CommandDefinition::new(
            "show",
            "Show a hidden debt again for one month",
            "show <account> <debt> <YYYY-MM>",
            cmd_show,
        ),
    ]
}

fn cmd_populate(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[]);
    let account = parse_uuid(parsed.positional(0, "account id")?, "account")?;
    let period = parse_month(parsed.positional(1, "month")?)?;
    let created = context
        .client
        .populate_month(account, period.year, period.month)?;
    output::success(format!("Planned {created} new debt(s) for {period}"));
    Ok(())
}

fn cmd_plan(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[]);
    let account = parse_uuid(parsed.positional(0, "account id")?, "account")?;
    let period = parse_month(parsed.positional(1, "month")?)?;
    let data = context
        .client
        .planning_data(account, period.year, period.month)?;
    let summaries = context
        .client
        .allocations(account, period.year, period.month)?;
    let currency = &context.config.currency;

    output::section(format!("Plan {period}"));
    if summaries.is_empty() {
        output::info("No paychecks this month.");
    }
    let mut allocated = HashSet::new();
    for summary in &summaries {
        let name = data
            .paychecks
            .iter()
            .find(|paycheck| paycheck.id == summary.paycheck_id)
            .map_or("", |paycheck| paycheck.name.as_str());
        output::info(format!(
            "{}  {}  {} {}  remaining {} {}",
            summary.paycheck_date,
            name,
            summary.paycheck_amount,
            currency,
            summary.remaining_amount,
            currency
        ));
        output::info(format!("    paycheck id: {}", summary.paycheck_id));
        for debt in &summary.allocated_debts {
            allocated.insert(debt.debt_id);
            let paid = if debt.is_paid { " [paid]" } else { "" };
            output::info(format!(
                "    - {}  {} {}  due {}  allocation {}{}",
                debt.debt_name, debt.amount, currency, debt.due_date, debt.allocation_id, paid
            ));
        }
    }

    let unallocated: Vec<_> = data
        .debts
        .iter()
        .filter(|debt| !allocated.contains(&debt.id))
        .collect();
    if !unallocated.is_empty() {
        output::section("Unallocated");
        for debt in unallocated {
            output::info(format!(
                "{}  {} {}  due {}  debt id {}",
                debt.name, debt.payment_amount, currency, debt.due_date, debt.id
            ));
        }
    }

    if !data.warnings.is_empty() {
        output::section("Warnings");
        for warning in &data.warnings {
            output::planning_warning(warning.severity, &warning.message);
        }
    }
    Ok(())
}

fn allocation_target(parsed: &ParsedArgs<'_>) -> Result<(Uuid, Uuid, PaycheckId), CommandError> {
    let account = parse_uuid(parsed.positional(0, "account id")?, "account")?;
    let debt = parse_uuid(parsed.positional(1, "debt id")?, "debt")?;
    let paycheck = PaycheckId::from_raw(parsed.positional(2, "paycheck id")?);
    Ok((account, debt, paycheck))
}

fn cmd_allocate(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[]);
    let (account, debt, paycheck) = allocation_target(&parsed)?;
    let mut request = AllocationRequest::allocate(account, debt, paycheck);
    if let Some(raw) = parsed.option("amount")? {
        request = request.with_amount(parse_amount(raw)?);
    }
    if let Some(raw) = parsed.option("date")? {
        request = request.with_payment_date(parse_date(raw)?);
    }
    request.note = parsed.option("note")?.map(str::to_string);

    if let Some(allocation) = context.client.update_debt_allocation(&request)? {
        output::success(format!(
            "Allocated {} on {}",
            allocation.payment_amount, allocation.payment_date
        ));
        output::info(format!("allocation id: {}", allocation.id));
    }
    Ok(())
}

fn cmd_unallocate(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[]);
    let (account, debt, paycheck) = allocation_target(&parsed)?;
    let request = AllocationRequest::unallocate(account, debt, paycheck);
    match context.client.update_debt_allocation(&request)? {
        Some(_) => output::success("Debt unallocated."),
        None => output::info("Debt was not allocated this month."),
    }
    Ok(())
}

fn cmd_pay(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[]);
    let account = parse_uuid(parsed.positional(0, "account id")?, "account")?;
    let allocation = parse_uuid(parsed.positional(1, "allocation id")?, "allocation")?;
    let payment = parsed
        .option("payment")?
        .map(|raw| parse_uuid(raw, "payment"))
        .transpose()?;
    let paid = context
        .client
        .mark_payment_as_paid(account, allocation, payment)?;
    output::success(format!("Marked {} as paid", paid.payment_amount));
    if let Some(payment_id) = paid.payment_id {
        output::info(format!("payment id: {payment_id}"));
    }
    Ok(())
}

fn cmd_hide(context: &mut CliContext, args: &[&str]) -> CommandResult {
    set_active(context, args, false)
}

fn cmd_show(context: &mut CliContext, args: &[&str]) -> CommandResult {
    set_active(context, args, true)
}

fn set_active(context: &mut CliContext, args: &[&str], is_active: bool) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[]);
    let account = parse_uuid(parsed.positional(0, "account id")?, "account")?;
    let debt = parse_uuid(parsed.positional(1, "debt id")?, "debt")?;
    let period = parse_month(parsed.positional(2, "month")?)?;
    context
        .client
        .set_debt_active(account, debt, period.year, period.month, is_active)?;
    let verb = if is_active { "shown" } else { "hidden" };
    output::success(format!("Debt {verb} for {period}"));
    Ok(())
}
