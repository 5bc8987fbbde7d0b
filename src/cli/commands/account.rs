use uuid::Uuid;

use crate::cli::core::{CliContext, CommandError, CommandResult};
use crate::cli::output;
use crate::core::services::AccountService;
use crate::domain::MemberRole;

use super::{parse_uuid, CommandDefinition, ParsedArgs};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "account",
        "Create or inspect budget accounts",
        "account create <name> [--owner <user-id>] | account show <account> | account member <account> <user-id> <editor|viewer>",
        cmd_account,
    )]
}

fn cmd_account(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[]);
    match parsed.positional(0, "subcommand")? {
        "create" => {
            let name = parsed.positional(1, "account name")?;
            let owner = match parsed.option("owner")? {
                Some(raw) => parse_uuid(raw, "owner")?,
                None => Uuid::new_v4(),
            };
            let account = AccountService::create(context.store(), name, owner)?;
            output::success(format!("Created budget account `{}`", account.name));
            output::info(format!("account id: {}", account.id));
            output::info(format!("owner id: {}", account.owner_id));
            Ok(())
        }
        "show" => {
            let id = parse_uuid(parsed.positional(1, "account id")?, "account")?;
            let account = AccountService::get(context.store(), id)?;
            output::section(&account.name);
            for member in &account.members {
                output::info(format!("  {}  {}", member.user_id, member.role));
            }
            Ok(())
        }
        "member" => {
            let id = parse_uuid(parsed.positional(1, "account id")?, "account")?;
            let user = parse_uuid(parsed.positional(2, "user id")?, "user")?;
            let role = match parsed.positional(3, "role")? {
                "editor" => MemberRole::Editor,
                "viewer" => MemberRole::Viewer,
                other => {
                    return Err(CommandError::InvalidArguments(format!(
                        "role must be editor or viewer, got `{other}`"
                    )))
                }
            };
            AccountService::add_member(context.store(), id, user, role)?;
            output::success(format!("{user} is now a {role} of the account"));
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown account subcommand `{other}`"
        ))),
    }
}
