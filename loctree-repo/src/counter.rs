//! Per-file line counting over a checked-out tree
//!
//! Wraps tokei to classify each file by language and count code, comment,
//! and blank lines. Exclusion happens here, before counting, so excluded
//! directories never appear in the produced statistics.

use loctree_core::{FileStat, LoctreeResult};
use std::path::Path;
use tokei::{Config, Languages};
use tracing::debug;

/// Count every file under `root`, skipping the named directories.
///
/// Paths in the result are relative to `root` and slash-normalized. The list
/// is unfiltered by language policy; the caller caches the complete record
/// and applies inclusion flags at read time.
pub fn count_lines(root: &Path, exclude_dirs: &[String]) -> LoctreeResult<Vec<FileStat>> {
    let config = Config::default();
    let ignored: Vec<&str> = exclude_dirs.iter().map(String::as_str).collect();

    let mut languages = Languages::new();
    languages.get_statistics(&[root], &ignored, &config);

    let mut stats = Vec::new();
    for (language_type, language) in languages.iter() {
        for report in &language.reports {
            let relative = report.name.strip_prefix(root).unwrap_or(&report.name);
            stats.push(FileStat {
                path: relative.to_string_lossy().replace('\\', "/"),
                language: language_type.to_string(),
                code: report.stats.code,
                comments: report.stats.comments,
                blanks: report.stats.blanks,
            });
        }
    }

    debug!(files = stats.len(), root = %root.display(), "Counting pass finished");
    Ok(stats)
}
