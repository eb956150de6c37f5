use crate::error::{Result, TgError};
use crate::terragrunt::plan::{ExecutionPlan, TERRAGRUNT_BIN};
use colored::Colorize;
use std::path::Path;
use std::process::Command;
use tracing::info;

/// Runs an external program to completion with inherited stdio.
pub trait ProcessExecutor {
    /// Exit code of the finished process; `None` when it was killed by a signal.
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<Option<i32>>;
}

/// Executes through `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl ProcessExecutor for SystemExecutor {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<Option<i32>> {
        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .status()
            .map_err(|e| TgError::CommandSpawn(format!("{program}: {e}")))?;
        Ok(status.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    DryRun,
    Succeeded,
}

/// Runs an [`ExecutionPlan`] with terragrunt.
pub struct CommandRunner<E: ProcessExecutor> {
    executor: E,
}

impl<E: ProcessExecutor> CommandRunner<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Prints the command, then runs it unless the plan is a dry run.
    ///
    /// A non-zero exit is returned as [`TgError::CommandFailed`] carrying the
    /// child's status so the caller can exit with it.
    pub fn execute(&self, plan: &ExecutionPlan) -> Result<RunOutcome> {
        let command_line = plan.command_line();
        println!(
            "\n{} {} in {}",
            "Running:".cyan().bold(),
            command_line.white().bold(),
            plan.path.display()
        );

        if plan.dry_run {
            println!(
                "{}",
                format!(
                    "Dry run: would execute '{}' in {}",
                    command_line,
                    plan.path.display()
                )
                .yellow()
            );
            return Ok(RunOutcome::DryRun);
        }

        info!(command = %command_line, cwd = %plan.path.display(), "starting terragrunt");
        let code = self
            .executor
            .run(TERRAGRUNT_BIN, &plan.args(), &plan.path)?
            // killed by a signal
            .unwrap_or(1);

        if code != 0 {
            return Err(TgError::CommandFailed { code });
        }

        Ok(RunOutcome::Succeeded)
    }
}
