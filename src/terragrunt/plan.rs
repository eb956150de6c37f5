use crate::error::{Result, TgError};
use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const TERRAGRUNT_BIN: &str = "terragrunt";

/// Terraform command passed through terragrunt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerraformCommand {
    Init,
    Validate,
    Plan,
    Apply,
    Destroy,
    /// Any other command the operator typed, passed through verbatim.
    Other(String),
}

impl TerraformCommand {
    /// Commands offered when none was given on the command line.
    pub const MENU: [TerraformCommand; 5] = [
        TerraformCommand::Init,
        TerraformCommand::Validate,
        TerraformCommand::Plan,
        TerraformCommand::Apply,
        TerraformCommand::Destroy,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            TerraformCommand::Init => "init",
            TerraformCommand::Validate => "validate",
            TerraformCommand::Plan => "plan",
            TerraformCommand::Apply => "apply",
            TerraformCommand::Destroy => "destroy",
            TerraformCommand::Other(command) => command,
        }
    }
}

impl FromStr for TerraformCommand {
    type Err = TgError;

    fn from_str(s: &str) -> Result<Self> {
        let command = match s.trim() {
            "" => return Err(TgError::MissingCommand),
            "init" => TerraformCommand::Init,
            "validate" => TerraformCommand::Validate,
            "plan" => TerraformCommand::Plan,
            "apply" => TerraformCommand::Apply,
            "destroy" => TerraformCommand::Destroy,
            other => TerraformCommand::Other(other.to_string()),
        };
        Ok(command)
    }
}

impl fmt::Display for TerraformCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terragrunt `--log-level` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to run terragrunt once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub path: PathBuf,
    pub command: TerraformCommand,
    /// Prefix the command with `run-all`.
    pub aggregate: bool,
    /// Let terragrunt prompt; `false` adds `--terragrunt-non-interactive`.
    pub interactive: bool,
    parallelism: Option<u32>,
    pub dry_run: bool,
    pub log_level: LogLevel,
    pub extra_args: Vec<String>,
}

impl ExecutionPlan {
    pub fn new(path: impl Into<PathBuf>, command: TerraformCommand) -> Self {
        Self {
            path: path.into(),
            command,
            aggregate: false,
            interactive: true,
            parallelism: None,
            dry_run: false,
            log_level: LogLevel::default(),
            extra_args: Vec::new(),
        }
    }

    /// Rejects zero and negative values; `None` leaves terragrunt's default.
    pub fn set_parallelism(&mut self, parallelism: Option<i64>) -> Result<()> {
        self.parallelism = match parallelism {
            None => None,
            Some(value) => match u32::try_from(value) {
                Ok(bound) if bound > 0 => Some(bound),
                _ => return Err(TgError::InvalidParallelism(value)),
            },
        };
        Ok(())
    }

    pub fn parallelism(&self) -> Option<u32> {
        self.parallelism
    }

    /// Arguments after the `terragrunt` binary name.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if !self.interactive {
            args.push("--terragrunt-non-interactive".to_string());
        }
        if let Some(parallelism) = self.parallelism {
            args.push(format!("--terragrunt-parallelism={parallelism}"));
        }
        if self.aggregate {
            args.push("run-all".to_string());
        }
        args.push(self.command.to_string());
        args.push(format!("--log-level={}", self.log_level));
        args.extend(
            self.extra_args
                .iter()
                .filter(|arg| !arg.trim().is_empty())
                .cloned(),
        );

        args
    }

    /// The full command line, for display.
    pub fn command_line(&self) -> String {
        let mut parts = vec![TERRAGRUNT_BIN.to_string()];
        parts.extend(self.args());
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_plan_always_sets_log_level() {
        let plan = ExecutionPlan::new("/infra", TerraformCommand::Plan);
        assert_eq!(plan.args(), vec!["plan", "--log-level=info"]);
        assert_eq!(plan.command_line(), "terragrunt plan --log-level=info");
    }

    #[test]
    fn all_options_in_order() {
        let mut plan = ExecutionPlan::new("/infra", TerraformCommand::Apply);
        plan.interactive = false;
        plan.aggregate = true;
        plan.log_level = LogLevel::Debug;
        plan.set_parallelism(Some(4)).unwrap();
        plan.extra_args = vec![
            "-lock-timeout=5m".to_string(),
            "  ".to_string(),
            String::new(),
            "-refresh=false".to_string(),
        ];

        assert_eq!(
            plan.args(),
            vec![
                "--terragrunt-non-interactive",
                "--terragrunt-parallelism=4",
                "run-all",
                "apply",
                "--log-level=debug",
                "-lock-timeout=5m",
                "-refresh=false",
            ]
        );
    }

    #[test]
    fn parallelism_must_be_positive() {
        let mut plan = ExecutionPlan::new("/infra", TerraformCommand::Init);
        assert!(matches!(
            plan.set_parallelism(Some(0)),
            Err(TgError::InvalidParallelism(0))
        ));
        assert!(matches!(
            plan.set_parallelism(Some(-2)),
            Err(TgError::InvalidParallelism(-2))
        ));
        plan.set_parallelism(None).unwrap();
        assert_eq!(plan.parallelism(), None);
        assert!(!plan.args().iter().any(|a| a.contains("parallelism")));
    }

    #[test]
    fn command_parsing() {
        assert_eq!("plan".parse::<TerraformCommand>().unwrap(), TerraformCommand::Plan);
        assert_eq!(
            "state list".parse::<TerraformCommand>().unwrap(),
            TerraformCommand::Other("state list".to_string())
        );
        assert!(matches!(
            "  ".parse::<TerraformCommand>(),
            Err(TgError::MissingCommand)
        ));
    }

    #[test]
    fn menu_labels() {
        let labels: Vec<String> = TerraformCommand::MENU
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();
        assert_eq!(labels, vec!["init", "validate", "plan", "apply", "destroy"]);
    }
}
