use std::env;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{MecabError, Result};

/// One row of the supported-platform table.
pub(crate) struct PlatformEntry {
    pub(crate) name: &'static str,
    pattern: Regex,
    pub(crate) default_library: &'static str,
    pub(crate) fallbacks: &'static [&'static str],
}

impl PlatformEntry {
    fn new(
        name: &'static str,
        pattern: &str,
        default_library: &'static str,
        fallbacks: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            // Patterns are literals below; a bad one is a programming error.
            pattern: Regex::new(pattern).unwrap_or_else(|error| {
                panic!("invalid platform pattern {pattern:?}: {error}")
            }),
            default_library,
            fallbacks,
        }
    }

    pub(crate) fn matches(&self, platform: &str) -> bool {
        self.pattern.is_match(platform)
    }
}

static SUPPORTED_PLATFORMS: Lazy<Vec<PlatformEntry>> = Lazy::new(|| {
    vec![
        PlatformEntry::new("Linux", r"(?i)^linux\b", "libmecab.so", &["libmecab.so.2"]),
        PlatformEntry::new(
            "macOS",
            r"(?i)^(macos|darwin)\b",
            "libmecab.dylib",
            &[
                "libmecab.2.dylib",
                "/opt/homebrew/lib/libmecab.dylib",
                "/usr/local/lib/libmecab.dylib",
            ],
        ),
        PlatformEntry::new("Windows", r"(?i)^windows\b", "libmecab.dll", &[]),
    ]
});

/// Platform identifier of the running process, e.g. `linux-x86_64`.
pub fn runtime_platform() -> String {
    format!("{}-{}", env::consts::OS, env::consts::ARCH)
}

/// Names of the platforms this crate knows how to load MeCab on.
pub fn supported_platforms() -> Vec<&'static str> {
    SUPPORTED_PLATFORMS.iter().map(|entry| entry.name).collect()
}

pub(crate) fn find_platform(platform: &str) -> Result<&'static PlatformEntry> {
    SUPPORTED_PLATFORMS
        .iter()
        .find(|entry| entry.matches(platform))
        .ok_or_else(|| MecabError::UnsupportedPlatform {
            platform: platform.to_string(),
            supported: supported_platforms()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
}

/// Ordered list of library names/paths to try for `entry`.
///
/// An explicit path is tried alone; otherwise the platform default comes
/// first, followed by its fallbacks.
pub(crate) fn library_candidates(
    entry: &PlatformEntry,
    explicit: Option<&Path>,
) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }
    std::iter::once(entry.default_library)
        .chain(entry.fallbacks.iter().copied())
        .map(PathBuf::from)
        .collect()
}
