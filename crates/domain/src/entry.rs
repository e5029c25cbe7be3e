//! Walker output types: `Entry`, `TreeNode`, `WalkSummary` (spec §3).

use std::path::PathBuf;
use std::time::SystemTime;

/// The kind of filesystem object an [`Entry`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// A symbolic link (never traversed into).
    Symlink,
    /// Anything else (device node, FIFO, socket, ...).
    Other,
}

/// A single entry produced by the directory walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The parent directory's path.
    pub parent_path: PathBuf,
    /// The entry's bare name.
    pub name: String,
    /// The entry's type.
    pub entry_type: EntryType,
    /// Size in bytes, when known (files only).
    pub size: Option<u64>,
    /// Modification time, when known.
    pub mtime: Option<SystemTime>,
    /// Depth relative to the walk's base path (0 = direct child).
    pub depth: usize,
}

impl Entry {
    /// Full path of this entry (`parent_path` joined with `name`).
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.parent_path.join(&self.name)
    }
}

/// A node in a materialized directory tree (spec §4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// The node's bare name.
    pub name: String,
    /// Whether this node is a file or directory.
    pub node_type: TreeNodeType,
    /// Size in bytes, present only when `includeSize` was requested.
    pub size: Option<u64>,
    /// Children, present only for directories; `None` for files and for
    /// directories whose children were not (yet) materialized.
    pub children: Option<Vec<TreeNode>>,
}

/// Node-type discriminant for [`TreeNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeNodeType {
    /// A regular file.
    File,
    /// A directory.
    Directory,
}

impl TreeNode {
    /// Sorts `children` in place: directories first, then case-sensitive
    /// lexicographic name ascending within each group.
    pub fn sort_children(children: &mut [TreeNode]) {
        children.sort_by(|left, right| {
            let left_is_dir = matches!(left.node_type, TreeNodeType::Directory);
            let right_is_dir = matches!(right.node_type, TreeNodeType::Directory);
            right_is_dir
                .cmp(&left_is_dir)
                .then_with(|| left.name.cmp(&right.name))
        });
    }
}

/// The reason a traversal stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoppedReason {
    /// The `maxResults` budget was exhausted.
    MaxResults,
    /// The `maxFiles` (or `maxEntries`) budget was exhausted.
    MaxFiles,
    /// The operation's deadline or cancel token fired.
    Timeout,
}

/// Accumulated counters from a directory walk (spec §3, §8).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Total files emitted.
    pub total_files: usize,
    /// Total directories emitted.
    pub total_directories: usize,
    /// The maximum depth actually visited.
    pub max_depth_reached: usize,
    /// Whether the walk stopped early due to a budget.
    pub truncated: bool,
    /// Directories/entries skipped because they could not be opened/read.
    pub skipped_inaccessible: usize,
    /// Symlinks (or sandbox-escaping directories) that were not traversed.
    pub symlinks_not_followed: usize,
}

impl WalkSummary {
    /// Marks the walk as truncated. Invariant (§3): `truncated` is only ever
    /// set when a limit was actually reached, so this is the single place
    /// callers flip it.
    pub fn mark_truncated(&mut self) {
        self.truncated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_sort_puts_directories_before_files_then_sorts_by_name() {
        let mut children = vec![
            TreeNode {
                name: "zebra.txt".into(),
                node_type: TreeNodeType::File,
                size: None,
                children: None,
            },
            TreeNode {
                name: "alpha".into(),
                node_type: TreeNodeType::Directory,
                size: None,
                children: None,
            },
            TreeNode {
                name: "apple.txt".into(),
                node_type: TreeNodeType::File,
                size: None,
                children: None,
            },
            TreeNode {
                name: "beta".into(),
                node_type: TreeNodeType::Directory,
                size: None,
                children: None,
            },
        ];
        TreeNode::sort_children(&mut children);
        let names: Vec<&str> = children.iter().map(|node| node.name.as_str()).collect();
        assert_eq!(names, ["alpha", "beta", "apple.txt", "zebra.txt"]);
    }
}
