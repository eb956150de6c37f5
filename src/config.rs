use crate::error::{Result, TgError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Optional settings file looked up in the repository root.
pub const SETTINGS_FILE: &str = "tgrun.toml";

/// Settings for one invocation, read from `tgrun.toml` when present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathSettings,
    pub stacks: StackSettings,
    pub registry: RegistrySettings,
    /// Tool binary name -> GitHub repository publishing its releases.
    pub tools: ToolSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub accounts_dir: PathBuf,
    pub modules_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            accounts_dir: PathBuf::from("accounts"),
            modules_dir: PathBuf::from("terraform/modules"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StackSettings {
    /// Directory names never offered as account, environment or stack.
    pub ignored: Vec<String>,
    /// A stack directory holds at least one of these files.
    pub markers: Vec<String>,
    /// Terragrunt configuration file used to tell leaf stacks from wrappers.
    pub config_file: String,
}

impl Default for StackSettings {
    fn default() -> Self {
        Self {
            ignored: [
                "templates",
                "__pycache__",
                ".terragrunt-cache",
                ".terraform",
                ".DS_Store",
                "README.md",
                "artifacts",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            markers: vec!["common.hcl".to_string(), "terragrunt.hcl".to_string()],
            config_file: "terragrunt.hcl".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    pub timeout_secs: u64,
    pub github_api: String,
    pub terraform_registry: String,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            github_api: "https://api.github.com".to_string(),
            terraform_registry: "https://registry.terraform.io".to_string(),
        }
    }
}

impl RegistrySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ToolSettings(pub BTreeMap<String, String>);

impl Default for ToolSettings {
    fn default() -> Self {
        let mut tools = BTreeMap::new();
        tools.insert("terraform".to_string(), "hashicorp/terraform".to_string());
        tools.insert(
            "terragrunt".to_string(),
            "gruntwork-io/terragrunt".to_string(),
        );
        Self(tools)
    }
}

impl Settings {
    /// Loads `<root>/tgrun.toml`, falling back to defaults when it is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(SETTINGS_FILE);
        let settings = if path.is_file() {
            debug!(path = %path.display(), "loading settings");
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.registry.timeout_secs == 0 {
            return Err(TgError::Config(
                "registry.timeout_secs must be greater than zero".to_string(),
            ));
        }

        Self::validate_base_url(&self.registry.github_api)?;
        Self::validate_base_url(&self.registry.terraform_registry)?;

        if self.stacks.markers.is_empty() {
            return Err(TgError::Config(
                "stacks.markers must name at least one file".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_base_url(url: &str) -> Result<()> {
        let parsed =
            Url::parse(url).map_err(|_| TgError::Config(format!("Invalid registry URL: {url}")))?;

        match parsed.scheme() {
            "https" | "http" => Ok(()),
            scheme => Err(TgError::Config(format!(
                "Unsupported registry scheme: {scheme}"
            ))),
        }
    }

    pub fn accounts_root(&self, root: &Path) -> PathBuf {
        root.join(&self.paths.accounts_dir)
    }

    pub fn modules_root(&self, root: &Path) -> PathBuf {
        root.join(&self.paths.modules_dir)
    }
}
