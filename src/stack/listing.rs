use crate::error::Result;
use std::fs;
use std::path::Path;

/// A single child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

#[cfg(test)]
impl DirEntry {
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }
}

/// Read access to a directory tree.
pub trait DirectoryListing {
    fn entries(&self, dir: &Path) -> Result<Vec<DirEntry>>;

    fn is_file(&self, path: &Path) -> bool;

    fn exists(&self, path: &Path) -> bool;
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsListing;

impl DirectoryListing for FsListing {
    fn entries(&self, dir: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                // follows symlinks, like `Path::is_dir`
                is_dir: entry.path().is_dir(),
            });
        }
        Ok(entries)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Sorted names of the subdirectories that are not in the ignore set.
pub fn candidate_dirs(entries: &[DirEntry], ignored: &[String]) -> Vec<String> {
    let mut names: Vec<String> = entries
        .iter()
        .filter(|e| e.is_dir && !ignored.contains(&e.name))
        .map(|e| e.name.clone())
        .collect();
    names.sort();
    names
}

/// True when `dir` directly contains any of the marker files.
pub fn has_any_marker<L>(listing: &L, dir: &Path, markers: &[String]) -> bool
where
    L: DirectoryListing + ?Sized,
{
    markers.iter().any(|marker| listing.is_file(&dir.join(marker)))
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn ignored() -> Vec<String> {
        vec!["templates".to_string(), "README.md".to_string()]
    }

    #[test]
    fn candidates_skip_files_and_ignored_names() {
        let entries = vec![
            DirEntry::dir("prod"),
            DirEntry::dir("templates"),
            DirEntry::file("README.md"),
            DirEntry::file("account.hcl"),
            DirEntry::dir("nonprod"),
        ];
        assert_eq!(
            candidate_dirs(&entries, &ignored()),
            vec!["nonprod".to_string(), "prod".to_string()]
        );
    }

    #[test]
    fn marker_detection_in_memory() {
        let listing = memory::MemoryListing::new()
            .with_file("env/rds/terragrunt.hcl")
            .with_file("env/vpc/common.hcl")
            .with_file("env/docs/notes.txt");
        let markers = vec!["common.hcl".to_string(), "terragrunt.hcl".to_string()];

        assert!(has_any_marker(&listing, &PathBuf::from("env/rds"), &markers));
        assert!(has_any_marker(&listing, &PathBuf::from("env/vpc"), &markers));
        assert!(!has_any_marker(&listing, &PathBuf::from("env/docs"), &markers));
    }

    #[test]
    fn fs_listing_reports_kinds() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("dev")).unwrap();
        fs::write(dir.path().join("account.hcl"), "").unwrap();

        let mut entries = FsListing.entries(dir.path()).unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(
            entries,
            vec![DirEntry::file("account.hcl"), DirEntry::dir("dev")]
        );
        assert!(FsListing.is_file(&dir.path().join("account.hcl")));
        assert!(!FsListing.exists(&dir.path().join("missing")));
    }
}
