//! The allowed-root set (spec §3) and the pure prefix-containment rule.

use std::path::{Path, PathBuf};

/// An ordered, de-duplicated set of canonicalized absolute directory roots.
///
/// Populated at initialization and replaced atomically; never mutated in
/// place during an in-flight operation (enforced by callers holding an
/// owned snapshot rather than a mutable reference).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedRoots {
    roots: Vec<PathBuf>,
}

impl AllowedRoots {
    /// Builds a root set from already-normalized absolute paths,
    /// de-duplicating while preserving first-seen order.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>) -> Self {
        let mut seen = Vec::with_capacity(roots.len());
        for root in roots {
            let normalized = strip_trailing_separator(&root);
            if !seen.contains(&normalized) {
                seen.push(normalized);
            }
        }
        Self { roots: seen }
    }

    /// Returns the configured roots in insertion order.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// True when no roots have been configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Returns a new set with `extra` roots appended (de-duplicated), used
    /// to add real-path twins without disturbing already-validated roots.
    #[must_use]
    pub fn with_additional(&self, extra: Vec<PathBuf>) -> Self {
        let mut combined = self.roots.clone();
        combined.extend(extra);
        Self::new(combined)
    }

    /// The prefix-check rule from §4.1: a candidate matches an allowed root
    /// `a` iff `a` is a filesystem root and the candidate starts with `a`,
    /// or the candidate equals `a`, or the candidate starts with `a +
    /// separator`. Case-folded on Windows, byte-exact on POSIX.
    #[must_use]
    pub fn contains_prefix_of(&self, candidate: &Path) -> bool {
        self.roots
            .iter()
            .any(|root| path_is_prefixed_by(candidate, root))
    }
}

/// Implements the prefix-check rule for a single allowed root.
#[must_use]
pub fn path_is_prefixed_by(candidate: &Path, root: &Path) -> bool {
    if is_filesystem_root(root) {
        return path_starts_with(candidate, root);
    }
    if paths_equal(candidate, root) {
        return true;
    }
    path_starts_with(candidate, root) && {
        let candidate_str = candidate.to_string_lossy();
        let root_str = root.to_string_lossy();
        candidate_str.len() > root_str.len()
            && matches!(
                candidate_str.as_bytes().get(root_str.len()),
                Some(b'/' | b'\\')
            )
    }
}

fn is_filesystem_root(path: &Path) -> bool {
    path.parent().is_none()
}

fn paths_equal(left: &Path, right: &Path) -> bool {
    #[cfg(windows)]
    {
        left.to_string_lossy()
            .eq_ignore_ascii_case(&right.to_string_lossy())
    }
    #[cfg(not(windows))]
    {
        left == right
    }
}

fn path_starts_with(candidate: &Path, root: &Path) -> bool {
    #[cfg(windows)]
    {
        let candidate_str = candidate.to_string_lossy().to_lowercase();
        let root_str = root.to_string_lossy().to_lowercase();
        candidate_str.starts_with(&root_str)
    }
    #[cfg(not(windows))]
    {
        candidate.starts_with(root)
    }
}

fn strip_trailing_separator(path: &Path) -> PathBuf {
    if is_filesystem_root(path) {
        return path.to_path_buf();
    }
    let as_str = path.to_string_lossy();
    let trimmed = as_str.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        path.to_path_buf()
    } else {
        PathBuf::from(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplicates_while_preserving_order() {
        let roots = AllowedRoots::new(vec![
            PathBuf::from("/tmp/a"),
            PathBuf::from("/tmp/b"),
            PathBuf::from("/tmp/a"),
        ]);
        assert_eq!(
            roots.roots(),
            &[PathBuf::from("/tmp/a"), PathBuf::from("/tmp/b")]
        );
    }

    #[test]
    fn strips_trailing_separator() {
        let roots = AllowedRoots::new(vec![PathBuf::from("/tmp/a/")]);
        assert_eq!(roots.roots(), &[PathBuf::from("/tmp/a")]);
    }

    #[test]
    fn prefix_does_not_match_sibling_with_shared_prefix() {
        let roots = AllowedRoots::new(vec![PathBuf::from("/allowed")]);
        assert!(!roots.contains_prefix_of(Path::new("/allowed-foo")));
        assert!(roots.contains_prefix_of(Path::new("/allowed/child")));
        assert!(roots.contains_prefix_of(Path::new("/allowed")));
    }

    #[test]
    fn filesystem_root_matches_any_descendant() {
        let roots = AllowedRoots::new(vec![PathBuf::from("/")]);
        assert!(roots.contains_prefix_of(Path::new("/anything/at/all")));
    }

    #[test]
    fn empty_set_matches_nothing() {
        let roots = AllowedRoots::new(vec![]);
        assert!(roots.is_empty());
        assert!(!roots.contains_prefix_of(Path::new("/tmp")));
    }
}
