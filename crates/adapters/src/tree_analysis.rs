//! Directory tree materialization and aggregate analysis (spec §4.6).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use sandboxfs_domain::{Entry, EntryType, FsErrorKind, TopN, TreeNode, TreeNodeType};
use sandboxfs_shared::{ErrorEnvelope, Result};

/// Builds a nested [`TreeNode`] rooted at `base_path` from the walker's flat
/// entry list, indexing children by parent path and sorting each bucket
/// directories-first / case-sensitive name ascending.
pub fn build_tree(base_path: &Path, entries: &[Entry], include_size: bool) -> Result<TreeNode> {
    let base_name = base_path
        .file_name()
        .map_or_else(|| base_path.to_string_lossy().into_owned(), |name| name.to_string_lossy().into_owned());

    let mut children_by_parent: HashMap<PathBuf, Vec<TreeNode>> = HashMap::new();
    for entry in entries {
        let node = TreeNode {
            name: entry.name.clone(),
            node_type: match entry.entry_type {
                EntryType::Directory => TreeNodeType::Directory,
                _ => TreeNodeType::File,
            },
            size: if include_size {
                entry.size
            } else {
                None
            },
            children: matches!(entry.entry_type, EntryType::Directory).then(Vec::new),
        };
        children_by_parent
            .entry(entry.parent_path.clone())
            .or_default()
            .push(node);
    }

    let root = attach_children(base_path, base_name, &mut children_by_parent);
    Ok(root)
}

fn attach_children(
    path: &Path,
    name: String,
    children_by_parent: &mut HashMap<PathBuf, Vec<TreeNode>>,
) -> TreeNode {
    let mut children = children_by_parent.remove(path).unwrap_or_default();
    for child in &mut children {
        if child.children.is_some() {
            let child_path = path.join(&child.name);
            let rebuilt = attach_children(&child_path, child.name.clone(), children_by_parent);
            child.children = rebuilt.children;
        }
    }
    TreeNode::sort_children(&mut children);
    TreeNode {
        name,
        node_type: TreeNodeType::Directory,
        size: None,
        children: Some(children),
    }
}

/// One entry in a capped top-N heap, ordered by the field named in its
/// collection (`size` descending for `largestFiles`, `mtime` descending for
/// `recentlyModified`).
#[derive(Debug, Clone)]
pub struct RankedFile {
    /// Full path of the file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Last-modified time, when known.
    pub mtime: Option<SystemTime>,
}

/// Aggregate statistics produced while walking a directory (spec §4.6).
#[derive(Debug, Clone, Default)]
pub struct DirectoryAnalysis {
    /// Total files observed.
    pub total_files: usize,
    /// Total directories observed.
    pub total_directories: usize,
    /// Sum of all file sizes observed.
    pub total_size: u64,
    /// Lowercased extension (or `"(no extension)"`) to occurrence count.
    pub extension_counts: HashMap<String, usize>,
    /// The `topN` largest files by size, descending.
    pub largest_files: Vec<RankedFile>,
    /// The `topN` most recently modified files, descending.
    pub recently_modified: Vec<RankedFile>,
    /// Whether `maxEntries` was reached before the walk finished.
    pub truncated: bool,
}

const NO_EXTENSION: &str = "(no extension)";

/// Aggregates the walker's entries into a [`DirectoryAnalysis`], capping
/// combined files+directories at `max_entries` and each ranked heap at
/// `top_n`.
pub fn analyze(entries: &[Entry], top_n: TopN, max_entries: usize) -> Result<DirectoryAnalysis> {
    let top_n = top_n.get();
    let mut analysis = DirectoryAnalysis::default();
    let mut observed = 0usize;

    for entry in entries {
        if observed >= max_entries {
            analysis.truncated = true;
            break;
        }
        observed += 1;

        match entry.entry_type {
            EntryType::Directory => {
                analysis.total_directories += 1;
            },
            EntryType::File => {
                analysis.total_files += 1;
                let size = entry.size.unwrap_or(0);
                analysis.total_size += size;

                let extension = extension_key(&entry.name);
                *analysis.extension_counts.entry(extension).or_insert(0) += 1;

                push_ranked(
                    &mut analysis.largest_files,
                    RankedFile {
                        path: entry.path(),
                        size,
                        mtime: entry.mtime,
                    },
                    top_n,
                    |file| file.size,
                );
                push_ranked(
                    &mut analysis.recently_modified,
                    RankedFile {
                        path: entry.path(),
                        size,
                        mtime: entry.mtime,
                    },
                    top_n,
                    |file| {
                        file.mtime
                            .and_then(|time| time.duration_since(SystemTime::UNIX_EPOCH).ok())
                            .map_or(0, |duration| duration.as_secs())
                    },
                );
            },
            EntryType::Symlink | EntryType::Other => {},
        }
    }

    if observed >= max_entries && entries.len() > observed {
        analysis.truncated = true;
    }

    Ok(analysis)
}

fn extension_key(name: &str) -> String {
    match Path::new(name).extension() {
        Some(extension) => extension.to_string_lossy().to_lowercase(),
        None => NO_EXTENSION.to_string(),
    }
}

fn push_ranked<K: Ord>(
    heap: &mut Vec<RankedFile>,
    candidate: RankedFile,
    capacity: usize,
    key: impl Fn(&RankedFile) -> K,
) {
    let insert_at = heap
        .iter()
        .position(|existing| key(existing) < key(&candidate))
        .unwrap_or(heap.len());
    heap.insert(insert_at, candidate);
    heap.truncate(capacity);
}

/// Raised by `analyze` callers when the base path resolves to a file
/// instead of a directory, per §4.6.
#[must_use]
pub fn not_a_directory_error(path: &Path) -> ErrorEnvelope {
    ErrorEnvelope::expected(
        FsErrorKind::NotDirectory.into_error_code(),
        "analyze_directory requires a directory path",
    )
    .with_metadata("path", path.to_string_lossy())
}
