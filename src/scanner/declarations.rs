use crate::error::{Result, TgError};
use regex::Regex;

/// One entry of a `required_providers` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDeclaration {
    pub local_name: String,
    /// `namespace/name`, as written in the file.
    pub source: String,
    pub declared_version: String,
}

impl ProviderDeclaration {
    /// `(namespace, name)` when the source has exactly two segments.
    pub fn registry_address(&self) -> Option<(&str, &str)> {
        let mut parts = self.source.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(namespace), Some(name), None) => Some((namespace, name)),
            _ => None,
        }
    }
}

/// A registry module call pinned with `source` + `version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDeclaration {
    /// `namespace/name/provider`.
    pub source: String,
    pub declared_version: String,
}

impl ModuleDeclaration {
    /// `(namespace, name, provider)` when the source has exactly three segments.
    pub fn registry_address(&self) -> Option<(&str, &str, &str)> {
        registry_module_address(&self.source)
    }
}

/// Registry module sources have exactly three segments; anything else
/// (two-segment provider sources, git URLs, local paths) is not a module.
pub fn registry_module_address(source: &str) -> Option<(&str, &str, &str)> {
    let mut parts = source.split('/');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(namespace), Some(name), Some(provider), None) => Some((namespace, name, provider)),
        _ => None,
    }
}

/// Regex extraction of version pins from HCL text.
///
/// Each field must sit on one `key = "value"` line with a literal string;
/// interpolated values and `source`/`version` pairs separated by other
/// attributes are not recognised.
pub struct DeclarationPatterns {
    provider: Regex,
    module: Regex,
}

impl DeclarationPatterns {
    pub fn new() -> Result<Self> {
        let provider = Regex::new(
            r#"(?s)(\w+)\s*=\s*\{[^}]*?source\s*=\s*"([^"]+)"[^}]*?version\s*=\s*"([^"]+)""#,
        )
        .map_err(|e| TgError::Scan(format!("Regex error: {e}")))?;

        let module = Regex::new(r#"source\s*=\s*"([^"]+)"\s*version\s*=\s*"([^"]+)""#)
            .map_err(|e| TgError::Scan(format!("Regex error: {e}")))?;

        Ok(Self { provider, module })
    }

    /// Providers declared inside one extracted `required_providers` block.
    pub fn providers_in_block(&self, block: &str) -> Vec<ProviderDeclaration> {
        self.provider
            .captures_iter(block)
            .map(|cap| ProviderDeclaration {
                local_name: cap[1].to_string(),
                source: cap[2].to_string(),
                declared_version: cap[3].to_string(),
            })
            .collect()
    }

    /// Every `source = "..."` directly followed by `version = "..."` in a file.
    ///
    /// Provider entries match too; callers filter them with
    /// [`registry_module_address`].
    pub fn pinned_sources(&self, content: &str) -> Vec<ModuleDeclaration> {
        self.module
            .captures_iter(content)
            .map(|cap| ModuleDeclaration {
                source: cap[1].to_string(),
                declared_version: cap[2].to_string(),
            })
            .collect()
    }
}
