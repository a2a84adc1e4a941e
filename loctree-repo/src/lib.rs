//! Loctree Repository - The fetch-and-count collaborator
//!
//! Responsible for repository metadata lookup, shallow cloning, and the
//! per-file line-counting pass that feeds the statistics engine.

pub mod counter;
pub mod fetcher;
pub mod github;

pub use counter::count_lines;
pub use fetcher::{extract_project_name, FetchOptions, RepoFetcher, RepoStatsSource};
pub use github::{GithubClient, RepoMetadata};
