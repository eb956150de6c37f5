use crate::error::{Result, TgError};
use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Binaries that must be on `PATH` before anything else runs.
pub const REQUIRED_TOOLS: [&str; 2] = ["terragrunt", "terraform"];

/// Locates `name` in the directories of a `PATH`-style value.
pub fn find_in_path(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| candidates(&dir, name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    if cfg!(target_os = "windows") {
        vec![dir.join(format!("{name}.exe")), dir.join(name)]
    } else {
        vec![dir.join(name)]
    }
}

/// Fails with every missing tool listed when any of them is absent.
pub fn ensure_installed(tools: &[&str], path_var: &OsStr) -> Result<()> {
    let missing: Vec<String> = tools
        .iter()
        .filter(|tool| find_in_path(tool, path_var).is_none())
        .map(|tool| tool.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(TgError::MissingTools(missing))
    }
}

/// Reports the version of an installed tool.
pub trait ToolInspector {
    fn local_version(&self, tool: &str) -> Option<String>;
}

/// Runs `<tool> -version` and reads its first line.
#[derive(Debug, Default, Clone, Copy)]
pub struct VersionProbe;

impl ToolInspector for VersionProbe {
    fn local_version(&self, tool: &str) -> Option<String> {
        let output = match Command::new(tool).arg("-version").output() {
            Ok(output) => output,
            Err(e) => {
                debug!(tool, error = %e, "version probe failed");
                return None;
            }
        };

        if !output.status.success() {
            debug!(tool, status = ?output.status.code(), "version probe exited with error");
            return None;
        }

        // some releases print the banner on stderr
        let text = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };
        parse_version_banner(&text)
    }
}

/// `Terraform v1.9.5` / `terragrunt version v0.67.4` -> `1.9.5` / `0.67.4`.
pub fn parse_version_banner(output: &str) -> Option<String> {
    let first_line = output.lines().next()?;
    let token = first_line.split_whitespace().last()?;
    let version = token.trim_start_matches('v');
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::fs;
    use tempfile::tempdir;

    fn write_binary(path: &Path, executable: bool) {
        fs::write(path, "").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = if executable { 0o755 } else { 0o644 };
            fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
        }
        #[cfg(not(unix))]
        let _ = executable;
    }

    #[test]
    fn banner_parsing() {
        assert_eq!(
            parse_version_banner("Terraform v1.9.5\non linux_amd64\n"),
            Some("1.9.5".to_string())
        );
        assert_eq!(
            parse_version_banner("terragrunt version v0.67.4\n"),
            Some("0.67.4".to_string())
        );
        assert_eq!(parse_version_banner(""), None);
        assert_eq!(parse_version_banner("   \nv1"), None);
    }

    #[test]
    fn finds_binary_in_later_path_entry() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        let name = if cfg!(target_os = "windows") {
            "terragrunt.exe"
        } else {
            "terragrunt"
        };
        write_binary(&second.path().join(name), true);

        let path_var =
            env::join_paths([first.path(), second.path()]).unwrap_or_else(|_| OsString::new());
        assert_eq!(
            find_in_path("terragrunt", &path_var),
            Some(second.path().join(name))
        );
        assert_eq!(find_in_path("terraform", &path_var), None);
    }

    #[test]
    fn reports_all_missing_tools() {
        let empty = tempdir().unwrap();
        let path_var = OsString::from(empty.path());

        let err = ensure_installed(&REQUIRED_TOOLS, &path_var).unwrap_err();
        match err {
            TgError::MissingTools(missing) => {
                assert_eq!(missing, vec!["terragrunt".to_string(), "terraform".to_string()])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn directories_do_not_count_as_binaries() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("terraform")).unwrap();
        assert_eq!(find_in_path("terraform", dir.path().as_os_str()), None);
    }

    #[cfg(unix)]
    #[test]
    fn files_without_execute_bit_are_not_installed() {
        let dir = tempdir().unwrap();
        write_binary(&dir.path().join("terraform"), false);
        write_binary(&dir.path().join("terragrunt"), true);

        let err = ensure_installed(&REQUIRED_TOOLS, dir.path().as_os_str()).unwrap_err();
        match err {
            TgError::MissingTools(missing) => assert_eq!(missing, vec!["terraform".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn probe_of_missing_binary_is_none() {
        assert_eq!(VersionProbe.local_version("tgrun-test-no-such-binary"), None);
    }
}
