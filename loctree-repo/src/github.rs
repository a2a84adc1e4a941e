//! GitHub API client for repository metadata
//!
//! Used upstream of the clone to reject oversized repositories before
//! incurring clone cost and to resolve an unspecified branch.

use loctree_core::{ErrorContext, LoctreeError, LoctreeResult};
use serde::Deserialize;
use tracing::{debug, info};

const GITHUB_API_BASE: &str = "https://api.github.com";

/// Repository metadata as declared by the hosting platform.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoMetadata {
    /// Declared repository size in KB
    #[serde(rename = "size")]
    pub size_kb: u64,
    pub default_branch: String,
}

/// Thin GitHub API client.
pub struct GithubClient {
    client: reqwest::Client,
    base_url: String,
}

impl GithubClient {
    pub fn new() -> LoctreeResult<Self> {
        Self::with_base_url(GITHUB_API_BASE)
    }

    /// Create a client against a custom API base URL (GitHub Enterprise,
    /// or a local stub in tests).
    pub fn with_base_url(base_url: impl Into<String>) -> LoctreeResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("loctree/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| LoctreeError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("github_client").with_operation("create_client"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch declared size and default branch for a repository URL.
    pub async fn get_metadata(
        &self,
        repo_url: &str,
        token: Option<&str>,
    ) -> LoctreeResult<RepoMetadata> {
        let (owner, repo) = parse_owner_repo(repo_url)?;
        let url = format!("{}/repos/{}/{}", self.base_url, owner, repo);

        debug!(%url, "Fetching repository metadata");

        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github.v3+json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| LoctreeError::Network {
            message: format!("GitHub API request failed: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("github_client")
                .with_operation("get_metadata")
                .with_suggestion("Check network connectivity and API status"),
        })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(LoctreeError::Repository {
                message: format!("GitHub API error for {}/{}: {}", owner, repo, status),
                source: None,
                context: ErrorContext::new("github_client")
                    .with_operation("get_metadata")
                    .with_suggestion(match status.as_u16() {
                        401 => "Check your access token",
                        403 => "Check repository permissions or rate limits",
                        404 => "Repository not found or not accessible",
                        _ => "Check network connectivity and API status",
                    }),
            });
        }

        let meta: RepoMetadata =
            response.json().await.map_err(|e| LoctreeError::Repository {
                message: format!("Failed to decode GitHub API response: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("github_client").with_operation("get_metadata"),
            })?;

        info!(
            size_kb = meta.size_kb,
            default_branch = %meta.default_branch,
            authenticated = token.is_some(),
            "Repository metadata resolved"
        );

        Ok(meta)
    }
}

/// Extract `owner` and `repo` from a GitHub repository URL.
pub fn parse_owner_repo(repo_url: &str) -> LoctreeResult<(String, String)> {
    let trimmed = repo_url
        .trim_end_matches('/')
        .trim_end_matches(".git")
        .trim_end_matches('/');

    let mut parts = trimmed.rsplit('/');
    let repo = parts.next().filter(|s| !s.is_empty());
    let owner = parts.next().filter(|s| !s.is_empty() && !s.contains(':'));

    match (owner, repo) {
        (Some(owner), Some(repo)) => Ok((owner.to_string(), repo.to_string())),
        _ => Err(LoctreeError::Validation {
            message: format!("Invalid GitHub repository URL: {}", repo_url),
            field: Some("repo_url".to_string()),
            context: ErrorContext::new("github_client")
                .with_operation("parse_owner_repo")
                .with_suggestion("Expected a URL like https://github.com/owner/repo"),
        }),
    }
}
