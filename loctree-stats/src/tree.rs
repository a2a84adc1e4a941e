//! Directory-tree construction from flat per-file statistics
//!
//! Folds a flat file list into a rooted hierarchy bounded by a maximum depth.
//! Every ancestor, including the root, carries the rolled-up summary of all
//! files at or below it; segments beyond the depth bound collapse into the
//! deepest retained node.

use loctree_core::{FileStat, TreeNode};

/// Build the hierarchical directory tree for `files`.
///
/// The root absorbs every file's counters regardless of depth truncation, so
/// its summary always equals the elementwise sum over the input. A node's
/// kind and language are fixed by the first file that creates it: a path that
/// is truncated at `max_depth` creates a `dir` node there, and a later file
/// ending exactly at that prefix does not convert it to a `file`.
/// `max_depth` of 0 yields a childless root holding all mass.
pub fn build_tree(files: &[FileStat], max_depth: usize, project_name: &str) -> TreeNode {
    let name = if project_name.is_empty() {
        "root"
    } else {
        project_name
    };
    let mut root = TreeNode::dir(name, "");

    for file in files {
        let clean_path = file.path.replace('\\', "/");
        let segments: Vec<&str> = clean_path.split('/').collect();

        root.stats.add_file(file);

        let mut current = &mut root;
        for (i, segment) in segments.iter().enumerate() {
            if i >= max_depth {
                break;
            }

            let child = current
                .children
                .entry((*segment).to_string())
                .or_insert_with(|| {
                    let node_path = segments[..=i].join("/");
                    if i == segments.len() - 1 {
                        TreeNode::file(*segment, node_path, file.language.clone())
                    } else {
                        TreeNode::dir(*segment, node_path)
                    }
                });

            child.stats.add_file(file);
            current = child;
        }
    }

    root
}
