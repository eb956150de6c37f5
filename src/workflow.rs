use crate::cli::Cli;
use crate::config::Settings;
use crate::error::{Result, TgError};
use crate::prompt::{LinePrompter, Prompter};
use crate::registry::RegistryClient;
use crate::report::UpdateReporter;
use crate::scanner::ModuleScanner;
use crate::stack::{
    DirectoryListing, FsListing, Resolution, StackLayout, StackPath, StackResolver,
    WrapperDetector,
};
use crate::terragrunt::runner::ProcessExecutor;
use crate::terragrunt::tools::{self, REQUIRED_TOOLS};
use crate::terragrunt::{
    CommandRunner, ExecutionPlan, LogLevel, RunOutcome, SystemExecutor, TerraformCommand,
    VersionProbe,
};
use colored::Colorize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Process-level inputs, captured once in `main`.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// `CI=true` was set.
    pub ci: bool,
    /// Value of `PATH`.
    pub path: OsString,
}

impl Environment {
    pub fn capture() -> Self {
        Self {
            ci: std::env::var("CI").is_ok_and(|v| v.eq_ignore_ascii_case("true")),
            path: std::env::var_os("PATH").unwrap_or_default(),
        }
    }
}

/// What the operator asked to run.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub root: PathBuf,
    pub account: Option<String>,
    pub environment: Option<String>,
    pub folder: Option<String>,
    pub command: Option<String>,
    pub run_all: bool,
    pub non_interactive: bool,
    pub parallelism: Option<i64>,
    pub dry_run: bool,
    pub log_level: LogLevel,
    pub extra_args: Vec<String>,
    pub ci: bool,
}

impl RunRequest {
    pub fn from_cli(cli: &Cli, env: &Environment) -> Self {
        Self {
            root: cli.root.clone(),
            account: cli.account.clone(),
            environment: cli.env.clone(),
            folder: cli.folder.clone(),
            command: cli.command.clone(),
            run_all: cli.run_all,
            non_interactive: cli.non_interactive,
            parallelism: cli.parallelism,
            dry_run: cli.dry_run,
            log_level: cli.log_level,
            extra_args: cli.extra_args.clone(),
            ci: env.ci,
        }
    }
}

const INTERACTION_MODES: [&str; 2] = [
    "Interactive (allow prompts like create S3 bucket)",
    "Non-interactive (recommended for CI)",
];

/// Entry point for one invocation.
pub fn execute(cli: &Cli, env: &Environment) -> Result<()> {
    tools::ensure_installed(&REQUIRED_TOOLS, &env.path)?;
    let settings = Settings::load(&cli.root)?;

    if cli.check_updates {
        return execute_check_updates(&cli.root, &settings, !cli.verbose);
    }

    let request = RunRequest::from_cli(cli, env);
    let mut prompter = LinePrompter::stdio();
    execute_run(&request, &settings, &FsListing, &mut prompter, SystemExecutor)?;
    Ok(())
}

/// Resolve the target, build the plan and hand it to terragrunt.
pub fn execute_run<L, E>(
    request: &RunRequest,
    settings: &Settings,
    listing: &L,
    prompter: &mut dyn Prompter,
    executor: E,
) -> Result<RunOutcome>
where
    L: DirectoryListing + ?Sized,
    E: ProcessExecutor,
{
    let resolver = StackResolver::new(
        listing,
        settings.accounts_root(&request.root),
        &settings.stacks,
    );

    let (stack, used_wizard) = match (&request.account, &request.environment) {
        (Some(account), Some(environment)) => (
            resolver.resolve_from_flags(account, environment, request.folder.as_deref()),
            false,
        ),
        _ => {
            println!("{}", "Launching interactive stack selector...".cyan().bold());
            match resolver.resolve_interactive(prompter)? {
                Resolution::Resolved(stack) => (stack, true),
                Resolution::Aborted(reason) => return Err(TgError::ResolutionAborted(reason)),
            }
        }
    };

    let path = stack.to_path(resolver.accounts_root());
    if !listing.exists(&path) {
        return Err(TgError::PathNotFound(path));
    }

    let command = match &request.command {
        Some(command) => command.parse::<TerraformCommand>()?,
        None => select_command(prompter)?,
    };

    let mut plan = ExecutionPlan::new(path, command);
    plan.set_parallelism(request.parallelism)?;
    plan.aggregate = request.run_all;
    plan.dry_run = request.dry_run;
    plan.log_level = request.log_level;
    plan.extra_args = request.extra_args.clone();

    let layout = WrapperDetector::new(listing, &settings.stacks.config_file).detect(&plan.path)?;
    debug!(?layout, path = %plan.path.display(), "stack layout");
    if let StackLayout::Wrapper { children } = &layout {
        if !plan.aggregate {
            println!(
                "{}",
                format!(
                    "ℹ Auto-detected wrapper module ({}). Enabling run-all.",
                    children.join(", ")
                )
                .yellow()
            );
            plan.aggregate = true;
        }
    }

    plan.interactive = !non_interactive(request, used_wizard, prompter)?;

    print_target(&stack, &plan);
    CommandRunner::new(executor).execute(&plan)
}

fn select_command(prompter: &mut dyn Prompter) -> Result<TerraformCommand> {
    let labels: Vec<String> = TerraformCommand::MENU
        .iter()
        .map(|c| c.as_str().to_string())
        .collect();

    prompter
        .select("Choose a Terraform command to run:", &labels)?
        .and_then(|index| TerraformCommand::MENU.get(index).cloned())
        .ok_or(TgError::MissingCommand)
}

/// CI always wins; a wizard run asks unless it is a dry run; otherwise the flag decides.
fn non_interactive(
    request: &RunRequest,
    used_wizard: bool,
    prompter: &mut dyn Prompter,
) -> Result<bool> {
    if request.ci {
        info!("CI detected, forcing non-interactive mode");
        return Ok(true);
    }

    if used_wizard && !request.dry_run {
        let labels: Vec<String> = INTERACTION_MODES.iter().map(|s| s.to_string()).collect();
        return match prompter.select("Terragrunt interaction mode?", &labels)? {
            Some(index) => Ok(index == 1),
            None => Err(TgError::UserCancelled),
        };
    }

    Ok(request.non_interactive)
}

fn print_target(stack: &StackPath, plan: &ExecutionPlan) {
    println!(
        "\n{} {}",
        "Target:".cyan().bold(),
        stack.to_string().white().bold()
    );
    if plan.aggregate {
        println!("   {}", "mode: run-all".dimmed());
    }
    if let Some(parallelism) = plan.parallelism() {
        println!("   {}", format!("parallelism: {parallelism}").dimmed());
    }
    if !plan.interactive {
        println!("   {}", "mode: non-interactive".dimmed());
    }
}

/// Prints installed vs released tool versions and declared vs latest
/// provider and module versions.
pub fn execute_check_updates(root: &Path, settings: &Settings, show_progress: bool) -> Result<()> {
    println!("{}", "Checking for available updates...".cyan().bold());

    let modules_root = settings.modules_root(root);
    println!(
        "\n{}",
        format!("Scanning {}...", modules_root.display()).yellow()
    );
    let scan = ModuleScanner::new(&modules_root)?.scan()?;
    println!(
        "{}",
        format!(
            "✓ Found {} file(s) with providers and {} registry module(s)",
            scan.provider_files.len(),
            scan.modules.len()
        )
        .green()
    );

    let client = RegistryClient::new(&settings.registry)?;
    let report = UpdateReporter::new(&client, &VersionProbe, &settings.tools)
        .with_progress(show_progress)
        .collect(&scan);

    println!();
    print!("{report}");
    Ok(())
}
