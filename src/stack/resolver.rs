use crate::config::StackSettings;
use crate::error::Result;
use crate::prompt::Prompter;
use crate::stack::listing::{DirectoryListing, candidate_dirs, has_any_marker};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `accounts/<account>/<environment>[/<stack>]`, relative to the accounts root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackPath {
    pub account: String,
    pub environment: String,
    pub stack: Option<String>,
}

impl StackPath {
    pub fn new(
        account: impl Into<String>,
        environment: impl Into<String>,
        stack: Option<String>,
    ) -> Self {
        Self {
            account: account.into(),
            environment: environment.into(),
            stack,
        }
    }

    pub fn to_path(&self, accounts_root: &Path) -> PathBuf {
        let mut path = accounts_root.join(&self.account).join(&self.environment);
        if let Some(stack) = &self.stack {
            path.push(stack);
        }
        path
    }
}

impl fmt::Display for StackPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.account, self.environment)?;
        if let Some(stack) = &self.stack {
            write!(f, "/{stack}")?;
        }
        Ok(())
    }
}

/// Why the selection wizard stopped without a stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    Cancelled,
    NoAccounts { root: PathBuf },
    NoEnvironments { account: String },
    NoStacks { account: String, environment: String },
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::Cancelled => f.write_str("Stack selection cancelled"),
            AbortReason::NoAccounts { root } => {
                write!(f, "No accounts found in {}", root.display())
            }
            AbortReason::NoEnvironments { account } => {
                write!(f, "No environments found in {account}")
            }
            AbortReason::NoStacks {
                account,
                environment,
            } => write!(f, "No valid stacks found in {account}/{environment}"),
        }
    }
}

/// Result of the selection wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(StackPath),
    Aborted(AbortReason),
}

/// Picks a stack below `accounts/` either interactively or from flags.
pub struct StackResolver<'a, L: DirectoryListing + ?Sized> {
    listing: &'a L,
    accounts_root: PathBuf,
    settings: &'a StackSettings,
}

impl<'a, L: DirectoryListing + ?Sized> StackResolver<'a, L> {
    pub fn new(listing: &'a L, accounts_root: PathBuf, settings: &'a StackSettings) -> Self {
        Self {
            listing,
            accounts_root,
            settings,
        }
    }

    pub fn accounts_root(&self) -> &Path {
        &self.accounts_root
    }

    /// Account, then environment, then stack. Only directories holding a
    /// stack marker file are offered at the last step.
    pub fn resolve_interactive(&self, prompter: &mut dyn Prompter) -> Result<Resolution> {
        let no_accounts = || {
            Resolution::Aborted(AbortReason::NoAccounts {
                root: self.accounts_root.clone(),
            })
        };
        if !self.listing.exists(&self.accounts_root) {
            return Ok(no_accounts());
        }
        let accounts = self.subdirectories(&self.accounts_root)?;
        if accounts.is_empty() {
            return Ok(no_accounts());
        }
        let Some(account) = Self::choose(prompter, "Select an account:", accounts)? else {
            return Ok(Resolution::Aborted(AbortReason::Cancelled));
        };

        let account_path = self.accounts_root.join(&account);
        let environments = self.subdirectories(&account_path)?;
        if environments.is_empty() {
            return Ok(Resolution::Aborted(AbortReason::NoEnvironments { account }));
        }
        let Some(environment) = Self::choose(prompter, "Select an environment:", environments)?
        else {
            return Ok(Resolution::Aborted(AbortReason::Cancelled));
        };

        let environment_path = account_path.join(&environment);
        let stacks = self.stack_candidates(&environment_path)?;
        if stacks.is_empty() {
            return Ok(Resolution::Aborted(AbortReason::NoStacks {
                account,
                environment,
            }));
        }
        let Some(stack) = Self::choose(prompter, "Select a stack/module:", stacks)? else {
            return Ok(Resolution::Aborted(AbortReason::Cancelled));
        };

        let selected = StackPath::new(account, environment, Some(stack));
        debug!(stack = %selected, "stack selected");
        Ok(Resolution::Resolved(selected))
    }

    /// Flag-driven resolution. The directories are not inspected here; the
    /// caller only checks that the joined path exists.
    pub fn resolve_from_flags(
        &self,
        account: &str,
        environment: &str,
        folder: Option<&str>,
    ) -> StackPath {
        StackPath::new(
            account,
            environment,
            folder.filter(|f| !f.is_empty()).map(str::to_string),
        )
    }

    /// Subdirectories of an environment that carry a stack marker file.
    pub fn stack_candidates(&self, environment_path: &Path) -> Result<Vec<String>> {
        Ok(self
            .subdirectories(environment_path)?
            .into_iter()
            .filter(|name| {
                has_any_marker(
                    self.listing,
                    &environment_path.join(name),
                    &self.settings.markers,
                )
            })
            .collect())
    }

    fn subdirectories(&self, dir: &Path) -> Result<Vec<String>> {
        let entries = self.listing.entries(dir)?;
        Ok(candidate_dirs(&entries, &self.settings.ignored))
    }

    fn choose(
        prompter: &mut dyn Prompter,
        prompt: &str,
        mut choices: Vec<String>,
    ) -> Result<Option<String>> {
        Ok(prompter
            .select(prompt, &choices)?
            .filter(|&index| index < choices.len())
            .map(|index| choices.swap_remove(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::testing::ScriptedPrompter;
    use crate::stack::listing::memory::MemoryListing;

    fn tree() -> MemoryListing {
        MemoryListing::new()
            .with_file("accounts/README.md")
            .with_dir("accounts/templates/dev")
            .with_file("accounts/nonprod/account.hcl")
            .with_file("accounts/nonprod/dev/rds/terragrunt.hcl")
            .with_file("accounts/nonprod/dev/network/common.hcl")
            .with_file("accounts/nonprod/dev/docs/notes.md")
            .with_dir("accounts/nonprod/dev/artifacts")
            .with_dir("accounts/nonprod/staging")
            .with_dir("accounts/prod/eu")
    }

    fn resolve(listing: &MemoryListing, prompter: &mut ScriptedPrompter) -> Resolution {
        let settings = StackSettings::default();
        StackResolver::new(listing, PathBuf::from("accounts"), &settings)
            .resolve_interactive(prompter)
            .unwrap()
    }

    #[test]
    fn wizard_walks_three_levels() {
        let listing = tree();
        let mut prompter = ScriptedPrompter::new([Some("nonprod"), Some("dev"), Some("rds")]);

        let resolution = resolve(&listing, &mut prompter);
        assert_eq!(
            resolution,
            Resolution::Resolved(StackPath::new("nonprod", "dev", Some("rds".into())))
        );

        let offered: Vec<_> = prompter.prompts.iter().map(|(_, c)| c.clone()).collect();
        assert_eq!(
            offered,
            vec![
                vec!["nonprod".to_string(), "prod".to_string()],
                vec!["dev".to_string(), "staging".to_string()],
                vec!["network".to_string(), "rds".to_string()],
            ]
        );
    }

    #[test]
    fn environment_without_stacks_aborts() {
        let listing = tree();
        let mut prompter = ScriptedPrompter::new([Some("nonprod"), Some("staging")]);

        let resolution = resolve(&listing, &mut prompter);
        assert_eq!(
            resolution,
            Resolution::Aborted(AbortReason::NoStacks {
                account: "nonprod".into(),
                environment: "staging".into(),
            })
        );
        // no third prompt is shown
        assert_eq!(prompter.prompts.len(), 2);
        if let Resolution::Aborted(reason) = resolution {
            assert_eq!(reason.to_string(), "No valid stacks found in nonprod/staging");
        }
    }

    #[test]
    fn cancel_at_any_level_aborts() {
        let listing = tree();
        for answers in [
            vec![None],
            vec![Some("nonprod"), None],
            vec![Some("nonprod"), Some("dev"), None],
        ] {
            let mut prompter = ScriptedPrompter::new(answers);
            assert_eq!(
                resolve(&listing, &mut prompter),
                Resolution::Aborted(AbortReason::Cancelled)
            );
        }
    }

    #[test]
    fn first_choice_is_not_a_cancel() {
        let listing = MemoryListing::new().with_file("accounts/a/b/c/terragrunt.hcl");
        let mut prompter = ScriptedPrompter::new([Some("a"), Some("b"), Some("c")]);
        assert!(matches!(
            resolve(&listing, &mut prompter),
            Resolution::Resolved(_)
        ));
    }

    #[test]
    fn empty_levels_abort_without_prompting() {
        let listing = MemoryListing::new().with_dir("accounts");
        let mut prompter = ScriptedPrompter::new(Vec::<Option<&str>>::new());
        assert_eq!(
            resolve(&listing, &mut prompter),
            Resolution::Aborted(AbortReason::NoAccounts {
                root: PathBuf::from("accounts")
            })
        );

        let listing = MemoryListing::new().with_dir("accounts/prod");
        let mut prompter = ScriptedPrompter::new([Some("prod")]);
        assert_eq!(
            resolve(&listing, &mut prompter),
            Resolution::Aborted(AbortReason::NoEnvironments {
                account: "prod".into()
            })
        );
    }

    #[test]
    fn missing_accounts_root_aborts_and_names_it() {
        let listing = MemoryListing::new().with_file("terraform/modules/vpc/main.tf");
        let mut prompter = ScriptedPrompter::new(Vec::<Option<&str>>::new());

        let resolution = resolve(&listing, &mut prompter);
        assert!(prompter.prompts.is_empty());
        match resolution {
            Resolution::Aborted(reason) => {
                assert_eq!(reason.to_string(), "No accounts found in accounts")
            }
            other => panic!("unexpected resolution: {other:?}"),
        }
    }

    #[test]
    fn flags_skip_filesystem_checks() {
        let listing = MemoryListing::new();
        let settings = StackSettings::default();
        let resolver = StackResolver::new(&listing, PathBuf::from("/infra/accounts"), &settings);

        let stack = resolver.resolve_from_flags("prod", "templates", Some("anything"));
        assert_eq!(
            stack.to_path(resolver.accounts_root()),
            PathBuf::from("/infra/accounts/prod/templates/anything")
        );

        let env_only = resolver.resolve_from_flags("prod", "eu", None);
        assert_eq!(env_only.stack, None);
        assert_eq!(env_only.to_string(), "prod/eu");
    }
}
