use std::fs;

use crate::cli::core::{CliContext, CommandError, CommandResult};
use crate::cli::output;
use crate::cli::shell;
use crate::storage::PlannerSnapshot;
use crate::utils::build_info;

use super::CommandDefinition;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("help", "Show available commands", "help [command]", cmd_help),
        CommandDefinition::new("version", "Show build metadata", "version", cmd_version),
        CommandDefinition::new(
            "script",
            "Run commands from a file, one per line",
            "script <file>",
            cmd_script,
        ),
        CommandDefinition::new("exit", "Stop processing commands", "exit", cmd_exit),
    ]
}

fn cmd_help(context: &mut CliContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        let definition = context
            .registry
            .get(&name.to_lowercase())
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
        output::info(format!("{} - {}", definition.usage, definition.description));
        return Ok(());
    }
    output::section("Commands");
    for definition in context.registry.iter() {
        output::info(format!("  {:<12} {}", definition.name, definition.description));
    }
    Ok(())
}

fn cmd_version(_context: &mut CliContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("Paycheck Planner {}", meta.version));
    output::info(format!("  CLI version  : {}", build_info::CLI_VERSION));
    output::info(format!(
        "  Data schema  : v{}",
        PlannerSnapshot::schema_version_default()
    ));
    output::info(format!(
        "  Build hash   : {} ({})",
        meta.git_hash, meta.git_status
    ));
    output::info(format!("  Built at     : {}", meta.timestamp));
    output::info(format!("  Target       : {}", meta.target));
    output::info(format!("  Profile      : {}", meta.profile));
    output::info(format!("  Rustc        : {}", meta.rustc));
    Ok(())
}

fn cmd_script(context: &mut CliContext, args: &[&str]) -> CommandResult {
    let [path] = args else {
        return Err(CommandError::InvalidArguments("usage: script <file>".into()));
    };
    let source = fs::read_to_string(path)?;
    shell::run_lines(context, source.lines())
}

fn cmd_exit(_context: &mut CliContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
