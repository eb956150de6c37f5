use crate::error::Result;
use crate::stack::listing::DirectoryListing;
use std::path::Path;

/// How a resolved directory should be run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackLayout {
    /// The directory has its own terragrunt configuration.
    Leaf,
    /// No configuration of its own, but these children have one.
    Wrapper { children: Vec<String> },
    /// Neither; terragrunt is run as-is and reports the problem itself.
    Unconfigured,
}

/// Classifies a directory by looking one level down for the config file.
pub struct WrapperDetector<'a, L: DirectoryListing + ?Sized> {
    listing: &'a L,
    config_file: &'a str,
}

impl<'a, L: DirectoryListing + ?Sized> WrapperDetector<'a, L> {
    pub fn new(listing: &'a L, config_file: &'a str) -> Self {
        Self {
            listing,
            config_file,
        }
    }

    /// Grandchildren are never inspected.
    pub fn detect(&self, path: &Path) -> Result<StackLayout> {
        if self.listing.is_file(&path.join(self.config_file)) {
            return Ok(StackLayout::Leaf);
        }

        let mut children: Vec<String> = self
            .listing
            .entries(path)?
            .into_iter()
            .filter(|e| e.is_dir)
            .filter(|e| self.listing.is_file(&path.join(&e.name).join(self.config_file)))
            .map(|e| e.name)
            .collect();
        children.sort();

        if children.is_empty() {
            Ok(StackLayout::Unconfigured)
        } else {
            Ok(StackLayout::Wrapper { children })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::listing::memory::MemoryListing;
    use std::path::PathBuf;

    const CONFIG: &str = "terragrunt.hcl";

    #[test]
    fn directory_with_config_children_is_a_wrapper() {
        let listing = MemoryListing::new()
            .with_file("env/eks/common.hcl")
            .with_file("env/eks/cluster/terragrunt.hcl")
            .with_file("env/eks/addons/terragrunt.hcl")
            .with_dir("env/eks/docs");

        let layout = WrapperDetector::new(&listing, CONFIG)
            .detect(&PathBuf::from("env/eks"))
            .unwrap();
        assert_eq!(
            layout,
            StackLayout::Wrapper {
                children: vec!["addons".to_string(), "cluster".to_string()]
            }
        );
    }

    #[test]
    fn own_config_wins_over_children() {
        let listing = MemoryListing::new()
            .with_file("env/rds/terragrunt.hcl")
            .with_file("env/rds/replica/terragrunt.hcl")
            .with_file("env/rds/proxy/terragrunt.hcl");

        let layout = WrapperDetector::new(&listing, CONFIG)
            .detect(&PathBuf::from("env/rds"))
            .unwrap();
        assert_eq!(layout, StackLayout::Leaf);
    }

    #[test]
    fn grandchildren_are_not_inspected() {
        let listing = MemoryListing::new().with_file("env/apps/team/api/terragrunt.hcl");

        let layout = WrapperDetector::new(&listing, CONFIG)
            .detect(&PathBuf::from("env/apps"))
            .unwrap();
        assert_eq!(layout, StackLayout::Unconfigured);
    }

    #[test]
    fn config_file_named_like_a_directory_does_not_count() {
        let listing = MemoryListing::new().with_dir("env/odd/child/terragrunt.hcl");

        let layout = WrapperDetector::new(&listing, CONFIG)
            .detect(&PathBuf::from("env/odd"))
            .unwrap();
        assert_eq!(layout, StackLayout::Unconfigured);
    }
}
