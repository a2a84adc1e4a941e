//! Core data model for repository line-count analysis

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-file line-count record produced by the counting pass.
///
/// Immutable once produced; a repository analysis yields a flat list of these
/// with no ordering or path-uniqueness guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    /// Slash-normalized path relative to the repository root, never empty
    pub path: String,
    /// Detected language name, empty if unclassified
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub language: String,
    pub code: usize,
    pub comments: usize,
    pub blanks: usize,
}

impl FileStat {
    /// Total line count of this file
    pub fn lines(&self) -> usize {
        self.code + self.comments + self.blanks
    }
}

/// Aggregate counters attached to every tree node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub lines: usize,
    pub code: usize,
    pub comments: usize,
    pub blanks: usize,
}

impl Summary {
    /// Accumulate one file's counters into this summary.
    pub fn add_file(&mut self, file: &FileStat) {
        self.code += file.code;
        self.comments += file.comments;
        self.blanks += file.blanks;
        self.lines += file.lines();
    }
}

/// Whether a tree node represents a directory or a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Dir,
    File,
}

/// One entry in the hierarchical output tree.
///
/// The root is always a `Dir` with an empty path. Children are keyed by path
/// segment; a node's kind and language are fixed by whichever file first
/// created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Slash-joined segments from the root, empty at the root
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub language: String,
    pub stats: Summary,
    pub children: HashMap<String, TreeNode>,
}

impl TreeNode {
    pub fn dir(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Dir,
            path: path.into(),
            language: String::new(),
            stats: Summary::default(),
            children: HashMap::new(),
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
            path: path.into(),
            language: language.into(),
            stats: Summary::default(),
            children: HashMap::new(),
        }
    }
}

/// Depth-independent per-language totals across the full filtered file list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageStat {
    pub language: String,
    pub files: usize,
    pub lines: usize,
    pub code: usize,
    pub comments: usize,
    pub blanks: usize,
    /// Share of total lines across all languages present, 0 if the total is 0
    pub percentage: f64,
}

/// Where an analysis result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Cache,
    Live,
}

/// Combined response payload for one analysis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub source: AnalysisSource,
    pub repo: String,
    pub branch: String,
    /// Unix timestamp of when the response was assembled
    pub timestamp: i64,
    pub data: TreeNode,
    /// Full language breakdown, independent of tree depth
    pub languages: Vec<LanguageStat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_accumulates_lines() {
        let mut summary = Summary::default();
        summary.add_file(&FileStat {
            path: "src/main.rs".to_string(),
            language: "Rust".to_string(),
            code: 10,
            comments: 2,
            blanks: 3,
        });

        assert_eq!(summary.code, 10);
        assert_eq!(summary.comments, 2);
        assert_eq!(summary.blanks, 3);
        assert_eq!(summary.lines, 15);
    }

    #[test]
    fn test_node_kind_serializes_lowercase() {
        let node = TreeNode::file("a.rs", "src/a.rs", "Rust");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "file");
        assert_eq!(json["language"], "Rust");

        let root = TreeNode::dir("root", "");
        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(json["type"], "dir");
        // Empty language is omitted entirely
        assert!(json.get("language").is_none());
    }
}
