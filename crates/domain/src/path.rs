//! Validated-path value object (spec §3).

use std::path::PathBuf;

/// The result of running a path through the sandbox (§4.1).
///
/// Both `requested_path` and `resolved_path` are guaranteed (by whoever
/// constructs this type) to lie inside the allowed-root set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPath {
    /// The normalized form of the caller-supplied path.
    pub requested_path: PathBuf,
    /// The real (symlink-resolved) path.
    pub resolved_path: PathBuf,
    /// Whether `requested_path` and `resolved_path` differ under the
    /// platform's path-comparison rules.
    pub is_symlink: bool,
}

impl ValidatedPath {
    /// Builds a validated path, deriving `is_symlink` from whether the two
    /// paths differ.
    #[must_use]
    pub fn new(requested_path: PathBuf, resolved_path: PathBuf) -> Self {
        let is_symlink = requested_path != resolved_path;
        Self {
            requested_path,
            resolved_path,
            is_symlink,
        }
    }
}
