pub mod blocks;
pub mod declarations;

pub use blocks::BlockExtractor;
pub use declarations::{DeclarationPatterns, ModuleDeclaration, ProviderDeclaration};

use crate::error::Result;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const REQUIRED_PROVIDERS: &str = "required_providers";

/// Providers declared in one `.tf` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFile {
    /// Path relative to the scanned root.
    pub path: PathBuf,
    pub providers: Vec<ProviderDeclaration>,
}

/// Version pins found under a modules directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Files with at least one `required_providers` block, in walk order.
    pub provider_files: Vec<ProviderFile>,
    /// Registry modules, one entry per source; the first pin seen wins.
    pub modules: Vec<ModuleDeclaration>,
}

/// Walks a directory of Terraform modules and collects version pins.
pub struct ModuleScanner {
    root: PathBuf,
    patterns: DeclarationPatterns,
}

impl ModuleScanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            patterns: DeclarationPatterns::new()?,
        })
    }

    /// Scans every `.tf` file below the root in file-name order.
    ///
    /// A missing root yields an empty result; unreadable files are skipped.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut result = ScanResult::default();
        let mut seen_sources = HashSet::new();

        if !self.root.is_dir() {
            warn!(root = %self.root.display(), "modules directory not found");
            return Ok(result);
        }

        let extractor = BlockExtractor::new(REQUIRED_PROVIDERS);

        for entry in WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tf"))
        {
            let path = entry.path();
            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable file");
                    continue;
                }
            };

            let blocks = extractor.extract(&content);
            if !blocks.is_empty() {
                let providers = blocks
                    .iter()
                    .flat_map(|block| self.patterns.providers_in_block(block))
                    .collect();
                let relative = path.strip_prefix(&self.root).unwrap_or(path);
                result.provider_files.push(ProviderFile {
                    path: relative.to_path_buf(),
                    providers,
                });
            }

            for module in self.patterns.pinned_sources(&content) {
                if !seen_sources.insert(module.source.clone()) {
                    debug!(source = %module.source, "duplicate pin ignored");
                    continue;
                }
                if module.registry_address().is_some() {
                    result.modules.push(module);
                }
            }
        }

        Ok(result)
    }
}
