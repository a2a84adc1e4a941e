//! Repository fetcher - metadata check, shallow clone, counting pass
//!
//! One fetch is a single atomic, retry-free operation: any failure surfaces
//! to the caller and nothing is cached. The declared size is checked against
//! the configured limit before any clone cost is incurred.

use crate::{counter, github::GithubClient};
use async_trait::async_trait;
use loctree_core::{ErrorContext, FileStat, LoctreeError, LoctreeResult};
use std::path::Path;
use tokio::process::Command;
use tracing::{info, warn};

/// Per-request fetch policy, taken from the current settings snapshot.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Directory names omitted before line counting
    pub exclude_dirs: Vec<String>,
    /// Declared-size limit; larger repositories are rejected pre-clone
    pub max_repo_size_mb: u64,
    /// Optional API token for metadata lookup
    pub access_token: Option<String>,
}

/// The fetch-and-count collaborator consumed by the orchestrator.
#[async_trait]
pub trait RepoStatsSource: Send + Sync {
    /// Produce the flat, unfiltered per-file statistics for a repository.
    ///
    /// An empty `branch` means "use the repository's default branch".
    async fn fetch_stats(
        &self,
        repo_url: &str,
        branch: &str,
        options: &FetchOptions,
    ) -> LoctreeResult<Vec<FileStat>>;
}

/// Default fetcher: GitHub metadata lookup, shallow `git clone` into a
/// temporary directory, tokei counting pass.
pub struct RepoFetcher {
    github: GithubClient,
}

impl RepoFetcher {
    pub fn new() -> LoctreeResult<Self> {
        Ok(Self {
            github: GithubClient::new()?,
        })
    }

    pub fn with_client(github: GithubClient) -> Self {
        Self { github }
    }
}

#[async_trait]
impl RepoStatsSource for RepoFetcher {
    async fn fetch_stats(
        &self,
        repo_url: &str,
        branch: &str,
        options: &FetchOptions,
    ) -> LoctreeResult<Vec<FileStat>> {
        let meta = self
            .github
            .get_metadata(repo_url, options.access_token.as_deref())
            .await?;

        let size_mb = meta.size_kb / 1024;
        if size_mb > options.max_repo_size_mb {
            return Err(LoctreeError::RepoTooLarge {
                size_mb,
                limit_mb: options.max_repo_size_mb,
                context: ErrorContext::new("repo_fetcher")
                    .with_operation("size_check")
                    .with_suggestion("Raise max_repo_size_mb or analyze a smaller repository"),
            });
        }

        let target_branch = if branch.is_empty() {
            meta.default_branch.clone()
        } else {
            branch.to_string()
        };
        info!(
            repo_url,
            branch = %target_branch,
            size_mb,
            "Pre-flight checks passed, cloning"
        );

        let tmp = tempfile::Builder::new()
            .prefix("loctree-repo-")
            .tempdir()
            .map_err(LoctreeError::Io)?;

        clone_repository(repo_url, &target_branch, tmp.path()).await?;

        let exclude_dirs = options.exclude_dirs.clone();
        let stats = tokio::task::spawn_blocking(move || {
            // The TempDir moves into the task so the checkout outlives the
            // counting pass; it is removed when the task finishes.
            let result = counter::count_lines(tmp.path(), &exclude_dirs);
            drop(tmp);
            result
        })
        .await
        .map_err(|e| LoctreeError::Internal {
            message: format!("Counting task failed: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("repo_fetcher").with_operation("count_lines"),
        })??;

        info!(repo_url, files = stats.len(), "Analysis done");
        Ok(stats)
    }
}

/// Shallow-clone a single branch of `repo_url` into `target`.
async fn clone_repository(repo_url: &str, branch: &str, target: &Path) -> LoctreeResult<()> {
    let mut cmd = Command::new("git");
    cmd.arg("clone").arg("--depth=1").arg("--single-branch");
    if !branch.is_empty() {
        cmd.arg("--branch").arg(branch);
    }
    cmd.arg(repo_url).arg(target);
    // The caller bounds the whole fetch with a timeout; if that drops this
    // future mid-clone the child process must not linger.
    cmd.kill_on_drop(true);

    let output = cmd.output().await.map_err(|e| LoctreeError::Repository {
        message: format!("Failed to execute git clone: {}", e),
        source: Some(Box::new(e)),
        context: ErrorContext::new("repo_fetcher")
            .with_operation("clone_repository")
            .with_suggestion("Ensure git is installed and accessible"),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(repo_url, branch, "git clone failed");
        return Err(LoctreeError::Repository {
            message: format!("git clone failed: {}", stderr.trim()),
            source: None,
            context: ErrorContext::new("repo_fetcher")
                .with_operation("clone_repository")
                .with_suggestion("Check repository URL, branch name, and access permissions"),
        });
    }

    Ok(())
}

/// Derive a display name for the tree root from the repository URL.
pub fn extract_project_name(repo_url: &str) -> String {
    let cleaned = repo_url.trim_end_matches('/').trim_end_matches(".git");

    match cleaned.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "root".to_string(),
    }
}
