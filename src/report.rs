use crate::config::ToolSettings;
use crate::registry::{VersionLookup, VersionSource};
use crate::scanner::{ModuleDeclaration, ProviderDeclaration, ScanResult};
use crate::terragrunt::ToolInspector;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Installed vs. released version of one CLI tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolVersionCheck {
    pub tool: String,
    pub local: Option<String>,
    pub latest: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderLatest {
    Lookup(VersionLookup),
    /// The source is not a `namespace/name` pair, so nothing was fetched.
    InvalidSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCheck {
    pub declaration: ProviderDeclaration,
    pub latest: ProviderLatest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFileCheck {
    pub path: PathBuf,
    pub providers: Vec<ProviderCheck>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCheck {
    pub declaration: ModuleDeclaration,
    pub latest: VersionLookup,
}

/// Declared and installed versions next to the latest upstream ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub tools: Vec<ToolVersionCheck>,
    pub provider_files: Vec<ProviderFileCheck>,
    pub modules: Vec<ModuleCheck>,
}

/// Looks up the latest versions for everything a scan found.
pub struct UpdateReporter<'a> {
    source: &'a dyn VersionSource,
    inspector: &'a dyn ToolInspector,
    tools: &'a ToolSettings,
    show_progress: bool,
}

impl<'a> UpdateReporter<'a> {
    pub fn new(
        source: &'a dyn VersionSource,
        inspector: &'a dyn ToolInspector,
        tools: &'a ToolSettings,
    ) -> Self {
        Self {
            source,
            inspector,
            tools,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn collect(&self, scan: &ScanResult) -> UpdateReport {
        let lookups = self.tools.0.len()
            + scan
                .provider_files
                .iter()
                .map(|f| f.providers.len())
                .sum::<usize>()
            + scan.modules.len();
        let pb = self.progress_bar(lookups as u64);

        let mut report = UpdateReport::default();

        for (tool, repository) in &self.tools.0 {
            pb.set_message(format!("Checking {tool}"));
            report.tools.push(ToolVersionCheck {
                tool: tool.clone(),
                local: self.inspector.local_version(tool),
                latest: self
                    .source
                    .latest_tool_release(repository)
                    .latest()
                    .map(str::to_string),
            });
            pb.inc(1);
        }

        // one registry call per provider source, however many files pin it
        let mut provider_cache: HashMap<String, VersionLookup> = HashMap::new();
        for file in &scan.provider_files {
            let mut providers = Vec::with_capacity(file.providers.len());
            for declaration in &file.providers {
                pb.set_message(format!("Checking {}", declaration.source));
                let latest = match declaration.registry_address() {
                    Some((namespace, name)) => ProviderLatest::Lookup(
                        provider_cache
                            .entry(declaration.source.clone())
                            .or_insert_with(|| {
                                self.source.latest_provider_version(namespace, name)
                            })
                            .clone(),
                    ),
                    None => ProviderLatest::InvalidSource,
                };
                providers.push(ProviderCheck {
                    declaration: declaration.clone(),
                    latest,
                });
                pb.inc(1);
            }
            report.provider_files.push(ProviderFileCheck {
                path: file.path.clone(),
                providers,
            });
        }

        for declaration in &scan.modules {
            pb.set_message(format!("Checking {}", declaration.source));
            let latest = match declaration.registry_address() {
                Some((namespace, name, provider)) => {
                    self.source
                        .latest_module_version(namespace, name, provider)
                }
                None => VersionLookup::Unavailable("not a registry module".to_string()),
            };
            report.modules.push(ModuleCheck {
                declaration: declaration.clone(),
                latest,
            });
            pb.inc(1);
        }

        pb.finish_and_clear();
        report
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        let pb = ProgressBar::new(len);
        if !self.show_progress {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        if let Ok(style) = ProgressStyle::default_bar().template("  [{bar:40}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb
    }
}

/// Terminal rendering of the whole report.
impl fmt::Display for UpdateReport {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(out, "{}", "Checking CLI tool versions...".cyan().bold())?;
        for check in &self.tools {
            match (&check.local, &check.latest) {
                (Some(local), Some(latest)) if local != latest => writeln!(
                    out,
                    "  ⬆ {} is outdated: {} → {}",
                    check.tool.white().bold(),
                    local.red(),
                    latest.green().bold()
                )?,
                (Some(local), Some(_)) => writeln!(
                    out,
                    "  {} {} is up-to-date: {}",
                    "✓".green(),
                    check.tool.white().bold(),
                    local
                )?,
                _ => writeln!(
                    out,
                    "  {} Could not determine {} version",
                    "⚠".yellow(),
                    check.tool.white().bold()
                )?,
            }
        }

        writeln!(
            out,
            "\n{}",
            "📦 Terraform providers (declared vs latest):".cyan().bold()
        )?;
        if self.provider_files.is_empty() {
            writeln!(out, "  {}", "No required_providers blocks found".dimmed())?;
        }
        for file in &self.provider_files {
            writeln!(out, "\n  {}", file.path.display().to_string().bright_cyan())?;
            for check in &file.providers {
                let declaration = &check.declaration;
                let latest = match &check.latest {
                    ProviderLatest::Lookup(VersionLookup::Latest(latest))
                        if *latest != declaration.declared_version =>
                    {
                        latest.green().bold().to_string()
                    }
                    ProviderLatest::Lookup(VersionLookup::Latest(latest)) => latest.clone(),
                    ProviderLatest::Lookup(other) => other.to_string().yellow().to_string(),
                    ProviderLatest::InvalidSource => "invalid source".red().to_string(),
                };
                writeln!(out, "    {}:", declaration.local_name.white().bold())?;
                writeln!(out, "      source:  {}", declaration.source)?;
                writeln!(out, "      current: {}", declaration.declared_version)?;
                writeln!(out, "      latest:  {latest}")?;
            }
        }

        writeln!(out, "\n{}", "📦 Terraform modules:".cyan().bold())?;
        if self.modules.is_empty() {
            writeln!(out, "  {}", "No registry modules found".dimmed())?;
        }
        for check in &self.modules {
            let source = &check.declaration.source;
            let current = &check.declaration.declared_version;
            match check.latest.latest() {
                Some(latest) if latest != current.as_str() => writeln!(
                    out,
                    "  ⬆ {}\n      current: {}\n      latest:  {}",
                    source.white().bold(),
                    current.red(),
                    latest.green().bold()
                )?,
                Some(_) => writeln!(
                    out,
                    "  {} {} is up-to-date ({})",
                    "✓".green(),
                    source.white().bold(),
                    current
                )?,
                None => writeln!(
                    out,
                    "  {} Could not fetch latest version for {}: {}",
                    "⚠".yellow(),
                    source.white().bold(),
                    check.latest
                )?,
            }
        }

        Ok(())
    }
}
