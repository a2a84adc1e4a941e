//! Loctree Stats - The statistics aggregation engine
//!
//! Holds the TTL cache for computed per-file statistics, the directory-tree
//! builder, and the language classification and aggregation pass.

pub mod cache;
pub mod languages;
pub mod tree;

pub use cache::{cache_key, StatsCache};
pub use languages::{calculate_language_stats, category_of, should_include, LanguageCategory};
pub use tree::build_tree;
