//! Language classification and depth-independent aggregation
//!
//! Classification assigns each language name to a category and, together with
//! the inclusion policy flags, decides whether a file participates in a view.
//! Aggregation computes global per-language totals over an already-filtered
//! file list.

use loctree_core::{FileStat, LanguageStat};
use std::collections::HashMap;

/// Category assigned to a language name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCategory {
    Programming,
    Data,
    Documentation,
    Other,
}

/// Data-definition and configuration languages (tokei naming).
fn is_data_language(language: &str) -> bool {
    matches!(
        language,
        "JSON"
            | "XML"
            | "YAML"
            | "TOML"
            | "INI"
            | "SVG"
            | "Protocol Buffers"
            | "Thrift"
            | "GraphQL"
            | "HCL"
            | "Jsonnet"
            | "Dhall"
            | "Nix"
            | "XAML"
            | "Dockerfile"
            | "Autoconf"
            | "Edn"
    )
}

/// Documentation languages (tokei naming).
fn is_documentation_language(language: &str) -> bool {
    matches!(
        language,
        "Markdown"
            | "Plain Text"
            | "ReStructuredText"
            | "AsciiDoc"
            | "Org"
            | "TeX"
    )
}

/// Classify a language name. Unknown names default to `Programming`.
pub fn category_of(language: &str) -> LanguageCategory {
    if is_data_language(language) {
        LanguageCategory::Data
    } else if is_documentation_language(language) {
        LanguageCategory::Documentation
    } else {
        LanguageCategory::Programming
    }
}

/// Decide whether a file of this language belongs in a view under the given
/// inclusion policy. Programming (and unknown) languages are always included.
pub fn should_include(language: &str, include_data: bool, include_docs: bool) -> bool {
    match category_of(language) {
        LanguageCategory::Data => include_data,
        LanguageCategory::Documentation => include_docs,
        LanguageCategory::Programming | LanguageCategory::Other => true,
    }
}

/// Compute per-language totals and percentages over the full filtered file
/// list, ignoring tree depth entirely. Records with an empty language are
/// skipped. The result is sorted by total line count, descending.
pub fn calculate_language_stats(files: &[FileStat]) -> Vec<LanguageStat> {
    let mut by_language: HashMap<&str, LanguageStat> = HashMap::new();
    let mut total_lines = 0usize;

    for file in files {
        if file.language.is_empty() {
            continue;
        }

        let entry = by_language
            .entry(file.language.as_str())
            .or_insert_with(|| LanguageStat {
                language: file.language.clone(),
                files: 0,
                lines: 0,
                code: 0,
                comments: 0,
                blanks: 0,
                percentage: 0.0,
            });

        entry.files += 1;
        entry.code += file.code;
        entry.comments += file.comments;
        entry.blanks += file.blanks;
        entry.lines += file.lines();
        total_lines += file.lines();
    }

    let mut stats: Vec<LanguageStat> = by_language.into_values().collect();
    if total_lines > 0 {
        for stat in &mut stats {
            stat.percentage = 100.0 * stat.lines as f64 / total_lines as f64;
        }
    }

    stats.sort_by(|a, b| b.lines.cmp(&a.lines));
    stats
}
