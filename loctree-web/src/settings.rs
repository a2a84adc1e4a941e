//! Runtime-mutable analysis settings
//!
//! One shared, read-mostly structure guarded by its own reader/writer lock.
//! Every request takes an immutable snapshot up front so a concurrent update
//! can never tear a half-applied policy into a running analysis.

use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tracing::info;

/// Directory names that are safe to exclude for any repository: package
/// manager dependencies, version control, IDE state, caches.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    // Package manager dependencies
    "node_modules",
    "vendor",
    "Pods",
    ".venv",
    "venv",
    "env",
    "virtualenv",
    "__pycache__",
    ".bundle",
    "bower_components",
    "jspm_packages",
    // Version control
    ".git",
    ".svn",
    ".hg",
    // IDE state
    ".idea",
    ".vscode",
    ".vs",
    ".eclipse",
    // Caches
    ".cache",
    ".npm",
    ".yarn",
    ".gradle",
    ".nuget",
    ".pnp",
];

/// Analysis policy snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub cache_ttl_secs: u64,
    pub default_depth: usize,
    pub request_timeout_secs: u64,
    pub max_repo_size_mb: u64,
    pub exclude_dirs: Vec<String>,
    pub include_data_files: bool,
    pub include_documentation: bool,
    #[serde(skip)]
    pub github_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 60 * 60 * 24 * 7,
            default_depth: 5,
            request_timeout_secs: 120,
            max_repo_size_mb: 100,
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            include_data_files: false,
            include_documentation: false,
            github_token: None,
        }
    }
}

impl Settings {
    /// Bootstrap from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Some(ttl) = parse_env("LOCTREE_CACHE_TTL") {
            settings.cache_ttl_secs = ttl;
        }
        if let Some(depth) = parse_env("LOCTREE_DEFAULT_DEPTH") {
            settings.default_depth = depth;
        }
        if let Some(timeout) = parse_env("LOCTREE_REQUEST_TIMEOUT") {
            settings.request_timeout_secs = timeout;
        }
        if let Some(size) = parse_env("LOCTREE_MAX_REPO_SIZE_MB") {
            settings.max_repo_size_mb = size;
        }
        if let Ok(extra) = std::env::var("LOCTREE_EXCLUDE_DIRS") {
            for dir in extra.split(',') {
                let dir = dir.trim();
                if !dir.is_empty() {
                    settings.exclude_dirs.push(dir.to_string());
                }
            }
        }
        settings.github_token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());

        settings
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Partial settings update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub cache_ttl_secs: Option<u64>,
    pub default_depth: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub max_repo_size_mb: Option<u64>,
    /// Full replacement when present; an empty list clears all exclusions
    pub exclude_dirs: Option<Vec<String>>,
    pub include_data_files: Option<bool>,
    pub include_documentation: Option<bool>,
}

/// Settings handle shared across requests.
#[derive(Debug)]
pub struct SharedSettings {
    inner: RwLock<Settings>,
}

impl SharedSettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: RwLock::new(settings),
        }
    }

    /// Immutable copy of the current settings.
    pub fn snapshot(&self) -> Settings {
        self.inner.read().unwrap().clone()
    }

    /// Apply a partial update. Numeric fields only change for positive
    /// values. Returns true when the exclusion list changed, in which case
    /// the caller must invalidate the cache: already-cached results were
    /// produced under the old exclusion policy and cannot be reused.
    pub fn update(&self, update: SettingsUpdate) -> bool {
        let mut settings = self.inner.write().unwrap();

        if let Some(ttl) = update.cache_ttl_secs.filter(|v| *v > 0) {
            settings.cache_ttl_secs = ttl;
        }
        if let Some(depth) = update.default_depth.filter(|v| *v > 0) {
            settings.default_depth = depth;
        }
        if let Some(timeout) = update.request_timeout_secs.filter(|v| *v > 0) {
            settings.request_timeout_secs = timeout;
        }
        if let Some(size) = update.max_repo_size_mb.filter(|v| *v > 0) {
            settings.max_repo_size_mb = size;
        }
        if let Some(include) = update.include_data_files {
            settings.include_data_files = include;
        }
        if let Some(include) = update.include_documentation {
            settings.include_documentation = include;
        }

        let mut exclude_dirs_changed = false;
        if let Some(dirs) = update.exclude_dirs {
            exclude_dirs_changed = dirs != settings.exclude_dirs;
            settings.exclude_dirs = dirs;
        }

        info!(?settings, "Settings updated");
        exclude_dirs_changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.cache_ttl_secs, 604800);
        assert_eq!(settings.default_depth, 5);
        assert_eq!(settings.max_repo_size_mb, 100);
        assert!(!settings.include_data_files);
        assert!(!settings.include_documentation);
        assert!(settings.exclude_dirs.contains(&"node_modules".to_string()));
        assert!(settings.exclude_dirs.contains(&"env".to_string()));
        assert!(settings.exclude_dirs.contains(&".pnp".to_string()));
    }

    #[test]
    fn test_partial_update_keeps_absent_fields() {
        let shared = SharedSettings::new(Settings::default());

        shared.update(SettingsUpdate {
            default_depth: Some(3),
            include_documentation: Some(true),
            ..Default::default()
        });

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.default_depth, 3);
        assert!(snapshot.include_documentation);
        assert_eq!(snapshot.cache_ttl_secs, 604800);
    }

    #[test]
    fn test_zero_numeric_values_are_ignored() {
        let shared = SharedSettings::new(Settings::default());

        shared.update(SettingsUpdate {
            cache_ttl_secs: Some(0),
            max_repo_size_mb: Some(0),
            ..Default::default()
        });

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.cache_ttl_secs, 604800);
        assert_eq!(snapshot.max_repo_size_mb, 100);
    }

    #[test]
    fn test_exclude_dirs_change_detection() {
        let shared = SharedSettings::new(Settings::default());

        // Same list: no change reported
        let same = shared.snapshot().exclude_dirs;
        assert!(!shared.update(SettingsUpdate {
            exclude_dirs: Some(same),
            ..Default::default()
        }));

        // Replacement, including clearing to empty, is a change
        assert!(shared.update(SettingsUpdate {
            exclude_dirs: Some(vec![]),
            ..Default::default()
        }));
        assert!(shared.snapshot().exclude_dirs.is_empty());

        // Absent field: no change
        assert!(!shared.update(SettingsUpdate::default()));
    }
}
