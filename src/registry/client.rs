use crate::config::RegistrySettings;
use crate::error::{Result, TgError};
use crate::registry::version::{
    MODULE_PRERELEASE_MARKERS, PROVIDER_PRERELEASE_MARKERS, VersionComparator,
};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::debug;

/// Outcome of a single upstream version lookup.
///
/// Lookups never fail the caller: network and payload problems become
/// [`VersionLookup::Unavailable`], which is reported like any other result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionLookup {
    Latest(String),
    /// The listing was fetched but every version was a pre-release.
    NoStableRelease,
    Unavailable(String),
}

impl VersionLookup {
    pub fn latest(&self) -> Option<&str> {
        match self {
            VersionLookup::Latest(version) => Some(version),
            _ => None,
        }
    }
}

impl fmt::Display for VersionLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionLookup::Latest(version) => f.write_str(version),
            VersionLookup::NoStableRelease => f.write_str("no stable versions found"),
            VersionLookup::Unavailable(reason) => write!(f, "unavailable ({reason})"),
        }
    }
}

/// Upstream sources of "latest version" data.
pub trait VersionSource {
    /// Latest release tag of a GitHub repository such as `hashicorp/terraform`.
    fn latest_tool_release(&self, repository: &str) -> VersionLookup;

    /// Latest stable provider version on the Terraform registry.
    fn latest_provider_version(&self, namespace: &str, name: &str) -> VersionLookup;

    /// Latest stable module version on the Terraform registry.
    fn latest_module_version(&self, namespace: &str, name: &str, provider: &str) -> VersionLookup;
}

/// Blocking HTTP client for GitHub releases and the Terraform registry.
pub struct RegistryClient {
    client: Client,
    github_api: String,
    terraform_registry: String,
}

impl RegistryClient {
    pub fn new(settings: &RegistrySettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .user_agent(concat!("tgrun/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TgError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            github_api: settings.github_api.trim_end_matches('/').to_string(),
            terraform_registry: settings.terraform_registry.trim_end_matches('/').to_string(),
        })
    }

    fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> std::result::Result<T, String> {
        debug!(%url, "fetching");

        let response = self.client.get(url).send().map_err(|e| {
            debug!(%url, error = %e, "request failed");
            if e.is_timeout() {
                "timed out".to_string()
            } else {
                "request failed".to_string()
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            debug!(%url, %status, "unexpected status");
            return Err(format!("HTTP {}", status.as_u16()));
        }

        response.json::<T>().map_err(|e| {
            debug!(%url, error = %e, "malformed payload");
            "malformed response".to_string()
        })
    }
}

impl VersionSource for RegistryClient {
    fn latest_tool_release(&self, repository: &str) -> VersionLookup {
        let url = format!("{}/repos/{}/releases/latest", self.github_api, repository);
        match self.fetch_json::<GithubRelease>(&url) {
            Ok(release) => VersionLookup::Latest(release_version(&release.tag_name)),
            Err(reason) => VersionLookup::Unavailable(reason),
        }
    }

    fn latest_provider_version(&self, namespace: &str, name: &str) -> VersionLookup {
        let url = format!(
            "{}/v1/providers/{}/{}/versions",
            self.terraform_registry, namespace, name
        );
        match self.fetch_json::<ProviderVersions>(&url) {
            Ok(payload) => select_latest_provider(payload),
            Err(reason) => VersionLookup::Unavailable(reason),
        }
    }

    fn latest_module_version(&self, namespace: &str, name: &str, provider: &str) -> VersionLookup {
        let url = format!(
            "{}/v1/modules/{}/{}/{}/versions",
            self.terraform_registry, namespace, name, provider
        );
        match self.fetch_json::<ModuleVersions>(&url) {
            Ok(payload) => select_latest_module(payload),
            Err(reason) => VersionLookup::Unavailable(reason),
        }
    }
}

/// Release tags are published as `v1.2.3`.
pub fn release_version(tag: &str) -> String {
    tag.trim_start_matches('v').to_string()
}

#[derive(Debug, Deserialize)]
struct GithubRelease {
    tag_name: String,
}

#[derive(Debug, Deserialize)]
struct VersionEntry {
    version: String,
}

#[derive(Debug, Deserialize)]
struct ProviderVersions {
    #[serde(default)]
    versions: Vec<VersionEntry>,
}

#[derive(Debug, Deserialize)]
struct ModuleVersions {
    #[serde(default)]
    modules: Vec<ModuleEntry>,
}

#[derive(Debug, Deserialize)]
struct ModuleEntry {
    #[serde(default)]
    versions: Vec<VersionEntry>,
}

fn select_latest_provider(payload: ProviderVersions) -> VersionLookup {
    let versions = payload.versions.into_iter().map(|v| v.version).collect();
    select_stable(versions, PROVIDER_PRERELEASE_MARKERS)
}

fn select_latest_module(payload: ModuleVersions) -> VersionLookup {
    // the registry answers with a single-element `modules` array
    let versions = payload
        .modules
        .into_iter()
        .next()
        .map(|module| module.versions.into_iter().map(|v| v.version).collect())
        .unwrap_or_default();
    select_stable(versions, MODULE_PRERELEASE_MARKERS)
}

fn select_stable(versions: Vec<String>, markers: &[&str]) -> VersionLookup {
    let stable = VersionComparator::stable_only(versions, markers);
    match VersionComparator::get_latest(&stable) {
        Some(latest) => VersionLookup::Latest(latest),
        None => VersionLookup::NoStableRelease,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider_payload(versions: &[&str]) -> ProviderVersions {
        let entries: Vec<_> = versions
            .iter()
            .map(|v| json!({ "version": v, "protocols": ["5.0"] }))
            .collect();
        serde_json::from_value(json!({ "id": "hashicorp/aws", "versions": entries })).unwrap()
    }

    #[test]
    fn provider_latest_skips_prereleases() {
        let payload = provider_payload(&["5.0.0", "5.1.0-beta", "5.2.0"]);
        assert_eq!(
            select_latest_provider(payload),
            VersionLookup::Latest("5.2.0".to_string())
        );
    }

    #[test]
    fn provider_with_only_prereleases_has_no_stable_release() {
        let payload = provider_payload(&["6.0.0-alpha1", "6.0.0-pre", "6.0.0-rc2"]);
        assert_eq!(select_latest_provider(payload), VersionLookup::NoStableRelease);
    }

    #[test]
    fn provider_sorting_is_numeric() {
        let payload = provider_payload(&["3.9.0", "3.10.0", "3.2.1"]);
        assert_eq!(
            select_latest_provider(payload).latest(),
            Some("3.10.0")
        );
    }

    #[test]
    fn module_latest_reads_first_module_entry() {
        let payload: ModuleVersions = serde_json::from_value(json!({
            "modules": [{
                "source": "terraform-aws-modules/vpc/aws",
                "versions": [
                    { "version": "5.1.0" },
                    { "version": "5.10.0-beta" },
                    { "version": "5.8.1" },
                    { "version": "5.9.0-rc1" }
                ]
            }]
        }))
        .unwrap();

        assert_eq!(
            select_latest_module(payload),
            VersionLookup::Latest("5.8.1".to_string())
        );
    }

    #[test]
    fn module_payload_without_modules_has_no_release() {
        let payload: ModuleVersions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(select_latest_module(payload), VersionLookup::NoStableRelease);
    }

    #[test]
    fn release_tag_prefix_is_stripped() {
        assert_eq!(release_version("v1.9.5"), "1.9.5");
        assert_eq!(release_version("0.67.4"), "0.67.4");
    }

    #[test]
    fn lookup_display() {
        assert_eq!(VersionLookup::Latest("1.0.0".into()).to_string(), "1.0.0");
        assert_eq!(
            VersionLookup::Unavailable("HTTP 404".into()).to_string(),
            "unavailable (HTTP 404)"
        );
        assert_eq!(VersionLookup::NoStableRelease.latest(), None);
    }

    #[test]
    fn unreachable_registry_is_unavailable() {
        let settings = RegistrySettings {
            timeout_secs: 1,
            github_api: "http://127.0.0.1:9".to_string(),
            terraform_registry: "http://127.0.0.1:9".to_string(),
        };
        let client = RegistryClient::new(&settings).unwrap();
        assert!(matches!(
            client.latest_provider_version("hashicorp", "aws"),
            VersionLookup::Unavailable(_)
        ));
        assert!(matches!(
            client.latest_tool_release("hashicorp/terraform"),
            VersionLookup::Unavailable(_)
        ));
    }

    #[test]
    #[ignore] // Requires network access
    fn fetches_live_provider_version() {
        let client = RegistryClient::new(&RegistrySettings::default()).unwrap();
        let lookup = client.latest_provider_version("hashicorp", "aws");
        assert!(lookup.latest().is_some());
    }
}
