use crate::terragrunt::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tgrun",
    about = "Run terragrunt against accounts/<account>/<env>/<stack>, or check tool and provider versions",
    version,
    author
)]
pub struct Cli {
    /// Infrastructure repository root containing accounts/ (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Account (e.g. nonprod, prod)
    #[arg(short, long)]
    pub account: Option<String>,

    /// Environment (e.g. dev, staging)
    #[arg(short, long)]
    pub env: Option<String>,

    /// Stack folder inside the environment
    #[arg(short, long)]
    pub folder: Option<String>,

    /// Terraform command (init, validate, plan, apply, destroy, ...)
    #[arg(short, long)]
    pub command: Option<String>,

    /// Run the command with terragrunt run-all
    #[arg(long)]
    pub run_all: bool,

    /// Pass --terragrunt-non-interactive
    #[arg(long)]
    pub non_interactive: bool,

    /// Maximum number of parallel terragrunt operations
    #[arg(long, allow_negative_numbers = true)]
    pub parallelism: Option<i64>,

    /// Only print the command, don't run it
    #[arg(long)]
    pub dry_run: bool,

    /// Terragrunt log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Additional argument passed to terragrunt after the command (repeatable)
    #[arg(long, num_args = 1, allow_hyphen_values = true)]
    pub extra_args: Vec<String>,

    /// Check terraform/terragrunt, provider and module versions, then exit
    #[arg(long)]
    pub check_updates: bool,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,
}
