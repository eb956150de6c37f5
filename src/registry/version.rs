use std::cmp::Ordering;

/// Pre-release markers excluded from provider listings.
pub const PROVIDER_PRERELEASE_MARKERS: &[&str] = &["-alpha", "-beta", "-rc", "-pre"];

/// Pre-release markers excluded from module listings.
pub const MODULE_PRERELEASE_MARKERS: &[&str] = &["-beta", "-alpha", "-rc"];

const FALLBACK: [u64; 3] = [0, 0, 0];

/// Sort key for a version string: its leading run of dot-separated numbers.
///
/// Anything after the numeric run (`-rc1`, `+build`, ...) is ignored, and
/// strings that do not start with a digit collapse to `[0, 0, 0]` so they
/// rank lowest instead of failing the sort. When two keys tie, the bare
/// release ranks above the suffixed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub original: String,
    pub key: Vec<u64>,
    suffixed: bool,
}

impl Version {
    pub fn parse(version: &str) -> Self {
        let (mut key, consumed) = Self::numeric_prefix(version);
        if key.is_empty() {
            key = FALLBACK.to_vec();
        }

        Version {
            original: version.to_string(),
            key,
            suffixed: consumed < version.len(),
        }
    }

    /// Leading numbers plus the byte length of the numeric run.
    fn numeric_prefix(version: &str) -> (Vec<u64>, usize) {
        let mut numbers = Vec::new();
        let mut consumed = 0;

        for segment in version.split('.') {
            let end = segment
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(segment.len());
            let Ok(number) = segment[..end].parse::<u64>() else {
                break;
            };
            numbers.push(number);
            consumed = if numbers.len() == 1 { end } else { consumed + 1 + end };

            // a suffix such as "3-rc1" ends the numeric run
            if end < segment.len() {
                break;
            }
        }

        (numbers, consumed)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| other.suffixed.cmp(&self.suffixed))
    }
}

pub struct VersionComparator;

impl VersionComparator {
    /// Highest version in the list, or `None` when the list is empty.
    ///
    /// Versions that compare equal keep their listing order; the last one wins.
    pub fn get_latest(versions: &[String]) -> Option<String> {
        let mut parsed: Vec<Version> = versions.iter().map(|v| Version::parse(v)).collect();
        parsed.sort();
        parsed.pop().map(|v| v.original)
    }

    /// Drops every version that contains one of the given markers.
    pub fn stable_only(versions: Vec<String>, markers: &[&str]) -> Vec<String> {
        versions
            .into_iter()
            .filter(|v| !markers.iter().any(|marker| v.contains(marker)))
            .collect()
    }
}
