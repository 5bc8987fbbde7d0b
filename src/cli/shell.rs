use std::io::{self, BufRead, IsTerminal};

use shell_words::split;
use tracing::debug;

use crate::cli::core::{CliContext, CliError, CommandError, CommandResult, LoopControl};
use crate::cli::output::{self, OutputPreferences};
use crate::core::utils::PathResolver;

/// Runs the command given on the process arguments, or reads commands from piped
/// stdin when there is none.
pub fn run_cli() -> Result<(), CliError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    output::set_preferences(OutputPreferences {
        plain_mode: std::env::var_os("NO_COLOR").is_some() || !io::stdout().is_terminal(),
        quiet_mode: false,
    });

    let mut context = CliContext::open(&PathResolver::base_dir())?;
    if args.is_empty() && io::stdin().is_terminal() {
        return context
            .dispatch(&["help".to_string()])
            .map(|_| ())
            .map_err(|err| CliError::Command(err.to_string()));
    }
    if args.is_empty() {
        let stdin = io::stdin();
        let lines = stdin.lock().lines().collect::<Result<Vec<_>, _>>()?;
        return run_lines(&mut context, lines.iter().map(String::as_str))
            .map_err(|err| CliError::Command(err.to_string()));
    }

    match context.dispatch(&args) {
        Ok(_) => Ok(()),
        Err(err) => {
            context.report_error(&err);
            Err(CliError::Command("command failed".into()))
        }
    }
}

/// Runs one command per line. Blank lines and `#` comments are skipped; a failing
/// line is reported and the remaining lines still run.
pub(crate) fn run_lines<'a>(
    context: &mut CliContext,
    lines: impl IntoIterator<Item = &'a str>,
) -> CommandResult {
    let mut failures = 0usize;
    for (number, line) in lines.into_iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        debug!(line = number + 1, command = trimmed, "running script line");
        let tokens = match split(trimmed) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(format!("line {}: {}", number + 1, err));
                failures += 1;
                continue;
            }
        };
        match context.dispatch(&tokens) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => {
                output::warning(format!("line {}: {}", number + 1, trimmed));
                context.report_error(&err);
                failures += 1;
            }
        }
    }
    if failures > 0 {
        return Err(CommandError::InvalidArguments(format!(
            "{failures} script line(s) failed"
        )));
    }
    Ok(())
}
