//! The sandbox's error taxonomy (spec §7).

use sandboxfs_shared::ErrorCode;

/// The ten error kinds exposed at the public boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsErrorKind {
    /// The requested path does not exist.
    NotFound,
    /// The caller lacks permission to access the path.
    PermissionDenied,
    /// A file-only operation was attempted on a directory.
    NotFile,
    /// A directory-only operation was attempted on a non-directory.
    NotDirectory,
    /// A symbolic link was encountered where following is not allowed.
    SymlinkNotAllowed,
    /// An operation exceeded its deadline.
    Timeout,
    /// The resolved path falls outside the allowed-root set.
    AccessDenied,
    /// The caller supplied a malformed or contradictory option.
    InvalidInput,
    /// A content-search pattern was rejected (e.g. ReDoS shield).
    InvalidPattern,
    /// An error that does not map to any other kind.
    Unknown,
}

impl FsErrorKind {
    /// The wire-level code string (`E_NOT_FOUND`, ...).
    #[must_use]
    pub const fn code_str(self) -> &'static str {
        match self {
            Self::NotFound => "E_NOT_FOUND",
            Self::PermissionDenied => "E_PERMISSION_DENIED",
            Self::NotFile => "E_NOT_FILE",
            Self::NotDirectory => "E_NOT_DIRECTORY",
            Self::SymlinkNotAllowed => "E_SYMLINK_NOT_ALLOWED",
            Self::Timeout => "E_TIMEOUT",
            Self::AccessDenied => "E_ACCESS_DENIED",
            Self::InvalidInput => "E_INVALID_INPUT",
            Self::InvalidPattern => "E_INVALID_PATTERN",
            Self::Unknown => "E_UNKNOWN",
        }
    }

    /// A canned suggestion string surfaced to the caller alongside the error.
    #[must_use]
    pub const fn suggestion(self) -> &'static str {
        match self {
            Self::NotFound => "check the path for typos or confirm it has been created",
            Self::PermissionDenied => {
                "check filesystem permissions for the requesting process and the target path"
            },
            Self::NotFile => "this operation requires a file; pass a path to a regular file",
            Self::NotDirectory => {
                "this operation requires a directory; pass a path to a directory"
            },
            Self::SymlinkNotAllowed => {
                "symbolic links are not followed outside the allowed roots"
            },
            Self::Timeout => "retry with a smaller scope or a longer deadline",
            Self::AccessDenied => {
                "request a broader allowed root, or pass --allow-cwd if running from the CLI"
            },
            Self::InvalidInput => "review the option contract for this operation and retry",
            Self::InvalidPattern => {
                "simplify the pattern; avoid nested quantifiers and large repetition counts"
            },
            Self::Unknown => "an unclassified error occurred; consult details for more context",
        }
    }

    /// Converts this kind into a stable [`ErrorCode`] in the `fs` namespace.
    #[must_use]
    pub fn into_error_code(self) -> ErrorCode {
        ErrorCode::new("fs", self.code_str())
    }

    /// Maps a Node-like OS error code name (e.g. `"ENOENT"`) to a kind.
    ///
    /// Falls back to [`FsErrorKind::NotFound`] when the code is unrecognized,
    /// per `toMcpError`'s stated default.
    #[must_use]
    pub fn from_os_code(code: &str) -> Self {
        match code {
            "ENOENT" => Self::NotFound,
            "EACCES" | "EPERM" => Self::PermissionDenied,
            "EISDIR" => Self::NotFile,
            "ENOTDIR" => Self::NotDirectory,
            "ELOOP" => Self::SymlinkNotAllowed,
            "ETIMEDOUT" | "EMFILE" | "ENFILE" => Self::Timeout,
            _ => Self::NotFound,
        }
    }
}

impl std::fmt::Display for FsErrorKind {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.code_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_code_mapping_matches_spec_table() {
        assert_eq!(FsErrorKind::from_os_code("ENOENT"), FsErrorKind::NotFound);
        assert_eq!(
            FsErrorKind::from_os_code("EACCES"),
            FsErrorKind::PermissionDenied
        );
        assert_eq!(
            FsErrorKind::from_os_code("EPERM"),
            FsErrorKind::PermissionDenied
        );
        assert_eq!(FsErrorKind::from_os_code("EISDIR"), FsErrorKind::NotFile);
        assert_eq!(
            FsErrorKind::from_os_code("ENOTDIR"),
            FsErrorKind::NotDirectory
        );
        assert_eq!(
            FsErrorKind::from_os_code("ELOOP"),
            FsErrorKind::SymlinkNotAllowed
        );
        assert_eq!(FsErrorKind::from_os_code("ETIMEDOUT"), FsErrorKind::Timeout);
        assert_eq!(FsErrorKind::from_os_code("EMFILE"), FsErrorKind::Timeout);
        assert_eq!(FsErrorKind::from_os_code("ENFILE"), FsErrorKind::Timeout);
        assert_eq!(FsErrorKind::from_os_code("EWEIRD"), FsErrorKind::NotFound);
    }

    #[test]
    fn every_kind_has_a_distinct_code_string() {
        let kinds = [
            FsErrorKind::NotFound,
            FsErrorKind::PermissionDenied,
            FsErrorKind::NotFile,
            FsErrorKind::NotDirectory,
            FsErrorKind::SymlinkNotAllowed,
            FsErrorKind::Timeout,
            FsErrorKind::AccessDenied,
            FsErrorKind::InvalidInput,
            FsErrorKind::InvalidPattern,
            FsErrorKind::Unknown,
        ];
        let mut codes: Vec<&str> = kinds.iter().map(|kind| kind.code_str()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
    }
}
