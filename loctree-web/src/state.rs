//! Shared application state and per-request orchestration
//!
//! One analysis request flows: settings snapshot -> cache lookup -> on miss a
//! single, timeout-bounded fetch-and-count pass -> language filter on the
//! unfiltered snapshot -> tree builder + language aggregator.

use crate::{Settings, SettingsUpdate, SharedSettings, WebError, WebResult};
use loctree_core::{AnalysisResult, AnalysisSource, FileStat};
use loctree_repo::{extract_project_name, FetchOptions, RepoFetcher, RepoStatsSource};
use loctree_stats::{
    build_tree, cache_key, calculate_language_stats, should_include, StatsCache,
};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Runtime-mutable analysis settings
    pub settings: Arc<SharedSettings>,
    /// TTL cache of unfiltered per-file statistics
    pub cache: Arc<StatsCache>,
    /// The fetch-and-count collaborator
    pub fetcher: Arc<dyn RepoStatsSource>,
}

impl AppState {
    /// Create state with the default GitHub fetcher.
    pub fn new(settings: Settings) -> WebResult<Self> {
        let fetcher = RepoFetcher::new().map_err(WebError::Analysis)?;
        Ok(Self::with_source(settings, Arc::new(fetcher)))
    }

    /// Create state with a caller-supplied statistics source.
    pub fn with_source(settings: Settings, fetcher: Arc<dyn RepoStatsSource>) -> Self {
        Self {
            settings: Arc::new(SharedSettings::new(settings)),
            cache: Arc::new(StatsCache::new()),
            fetcher,
        }
    }

    /// Run one analysis request end to end.
    pub async fn analyze(
        &self,
        repo_url: &str,
        branch: &str,
        max_depth: i64,
    ) -> WebResult<AnalysisResult> {
        if repo_url.trim().is_empty() {
            return Err(WebError::Validation("repo_url is required".to_string()));
        }

        let settings = self.settings.snapshot();
        let key = cache_key(repo_url, branch);

        let (files, source) = match self.cache.get(&key) {
            Some(files) => {
                info!(%key, "Cache hit");
                (files, AnalysisSource::Cache)
            }
            None => {
                info!(%key, "Cache miss, fetching");
                let fetched = self.fetch_fresh(repo_url, branch, &settings).await?;
                let stored = self.cache.set(
                    &key,
                    fetched,
                    Duration::from_secs(settings.cache_ttl_secs),
                );
                (stored, AnalysisSource::Live)
            }
        };

        // Policy is re-applied at read time against the full unfiltered
        // record, not the policy in effect when the entry was cached.
        let filtered: Vec<FileStat> = files
            .iter()
            .filter(|f| {
                should_include(
                    &f.language,
                    settings.include_data_files,
                    settings.include_documentation,
                )
            })
            .cloned()
            .collect();
        debug!(
            total = files.len(),
            kept = filtered.len(),
            "Applied language filter"
        );

        let depth = if max_depth > 0 {
            max_depth as usize
        } else {
            settings.default_depth
        };
        let tree = build_tree(&filtered, depth, &extract_project_name(repo_url));
        let languages = calculate_language_stats(&filtered);

        Ok(AnalysisResult {
            source,
            repo: repo_url.to_string(),
            branch: branch.to_string(),
            timestamp: chrono::Utc::now().timestamp(),
            data: tree,
            languages,
        })
    }

    /// Single fetch attempt, bounded by the configured timeout. Failures are
    /// never cached; the next request simply tries again.
    async fn fetch_fresh(
        &self,
        repo_url: &str,
        branch: &str,
        settings: &Settings,
    ) -> WebResult<Vec<FileStat>> {
        let options = FetchOptions {
            exclude_dirs: settings.exclude_dirs.clone(),
            max_repo_size_mb: settings.max_repo_size_mb,
            access_token: settings.github_token.clone(),
        };

        let timeout = Duration::from_secs(settings.request_timeout_secs);
        let fetched = tokio::time::timeout(
            timeout,
            self.fetcher.fetch_stats(repo_url, branch, &options),
        )
        .await
        .map_err(|_| WebError::Timeout(settings.request_timeout_secs))??;

        Ok(fetched)
    }

    /// Apply a settings update; an exclusion-policy change invalidates every
    /// cached result.
    pub fn update_settings(&self, update: SettingsUpdate) -> Settings {
        if self.settings.update(update) {
            info!("Exclusion policy changed, clearing stats cache");
            self.cache.clear();
        }
        self.settings.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use loctree_core::{LoctreeError, LoctreeResult, NodeKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubSource {
        files: Vec<FileStat>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubSource {
        fn returning(files: Vec<FileStat>) -> Self {
            Self {
                files,
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                files: vec![],
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl RepoStatsSource for StubSource {
        async fn fetch_stats(
            &self,
            _repo_url: &str,
            _branch: &str,
            _options: &FetchOptions,
        ) -> LoctreeResult<Vec<FileStat>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(loctree_core::repository_error!("clone failed", "stub"));
            }
            Ok(self.files.clone())
        }
    }

    fn file(path: &str, language: &str, code: usize, comments: usize, blanks: usize) -> FileStat {
        FileStat {
            path: path.to_string(),
            language: language.to_string(),
            code,
            comments,
            blanks,
        }
    }

    fn sample_files() -> Vec<FileStat> {
        vec![
            file("src/a.go", "Go", 10, 2, 1),
            file("src/b.go", "Go", 5, 0, 0),
            file("README.md", "Markdown", 0, 0, 3),
        ]
    }

    fn state_with(source: StubSource) -> (AppState, Arc<StubSource>) {
        let source = Arc::new(source);
        let state = AppState::with_source(Settings::default(), source.clone());
        (state, source)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let (state, source) = state_with(StubSource::returning(sample_files()));

        let first = state
            .analyze("https://github.com/a/proj", "", 0)
            .await
            .unwrap();
        assert_eq!(first.source, AnalysisSource::Live);

        let second = state
            .analyze("https://github.com/a/proj", "", 0)
            .await
            .unwrap();
        assert_eq!(second.source, AnalysisSource::Cache);

        // Only the miss reached the collaborator
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_branches_do_not_share_cache_entries() {
        let (state, source) = state_with(StubSource::returning(sample_files()));

        state
            .analyze("https://github.com/a/proj", "", 0)
            .await
            .unwrap();
        let named = state
            .analyze("https://github.com/a/proj", "main", 0)
            .await
            .unwrap();

        assert_eq!(named.source, AnalysisSource::Live);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_repo_url_rejected_before_fetch() {
        let (state, source) = state_with(StubSource::returning(sample_files()));

        let err = state.analyze("  ", "", 0).await.unwrap_err();
        assert!(matches!(err, WebError::Validation(_)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    struct SlowSource;

    #[async_trait]
    impl RepoStatsSource for SlowSource {
        async fn fetch_stats(
            &self,
            _repo_url: &str,
            _branch: &str,
            _options: &FetchOptions,
        ) -> LoctreeResult<Vec<FileStat>> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_timeout_bounds_fetch_and_caches_nothing() {
        let settings = Settings {
            request_timeout_secs: 1,
            ..Default::default()
        };
        let state = AppState::with_source(settings, Arc::new(SlowSource));

        let err = state
            .analyze("https://github.com/a/proj", "", 0)
            .await
            .unwrap_err();

        assert!(matches!(err, WebError::Timeout(1)));
        // A timed-out fetch must leave no cache entry behind
        assert!(state.cache.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_cache_empty() {
        let (state, source) = state_with(StubSource::failing());

        let err = state
            .analyze("https://github.com/a/proj", "", 0)
            .await
            .unwrap_err();
        assert!(matches!(err, WebError::Analysis(LoctreeError::Repository { .. })));
        assert!(state.cache.is_empty());

        // A new request retries the fetch
        state
            .analyze("https://github.com/a/proj", "", 0)
            .await
            .unwrap_err();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_documentation_filtered_by_default() {
        let (state, _) = state_with(StubSource::returning(sample_files()));

        let result = state
            .analyze("https://github.com/a/proj", "", 2)
            .await
            .unwrap();

        // README.md is documentation and excluded under default policy
        assert!(!result.data.children.contains_key("README.md"));
        assert_eq!(result.data.stats.code, 15);
        assert_eq!(result.languages.len(), 1);
        assert_eq!(result.languages[0].language, "Go");
        assert_eq!(result.data.name, "proj");
    }

    #[tokio::test]
    async fn test_filter_policy_reapplied_from_cached_record() {
        let (state, source) = state_with(StubSource::returning(sample_files()));

        state
            .analyze("https://github.com/a/proj", "", 0)
            .await
            .unwrap();

        // Flip the documentation flag; the cached unfiltered record must
        // yield README.md without a refetch.
        state.update_settings(SettingsUpdate {
            include_documentation: Some(true),
            ..Default::default()
        });

        let result = state
            .analyze("https://github.com/a/proj", "", 2)
            .await
            .unwrap();
        assert_eq!(result.source, AnalysisSource::Cache);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.data.children["README.md"].kind, NodeKind::File);
    }

    #[tokio::test]
    async fn test_exclusion_change_invalidates_cache() {
        let (state, source) = state_with(StubSource::returning(sample_files()));

        state
            .analyze("https://github.com/a/proj", "", 0)
            .await
            .unwrap();

        state.update_settings(SettingsUpdate {
            exclude_dirs: Some(vec!["dist".to_string()]),
            ..Default::default()
        });

        let result = state
            .analyze("https://github.com/a/proj", "", 0)
            .await
            .unwrap();
        assert_eq!(result.source, AnalysisSource::Live);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_depth_override_falls_back_to_default() {
        let (state, _) = state_with(StubSource::returning(sample_files()));

        // Depth 1 collapses src/* into the src directory node
        let shallow = state
            .analyze("https://github.com/a/proj", "", 1)
            .await
            .unwrap();
        assert!(shallow.data.children["src"].children.is_empty());

        // Non-positive override uses the configured default (5)
        let deep = state
            .analyze("https://github.com/a/proj", "", -3)
            .await
            .unwrap();
        assert_eq!(
            deep.data.children["src"].children["a.go"].kind,
            NodeKind::File
        );
    }
}
