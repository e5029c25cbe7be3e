//! OS error -> `FsErrorKind` mapping and canned error builders (spec §4.9).

use sandboxfs_domain::{AllowedRoots, FsErrorKind};
use sandboxfs_shared::ErrorEnvelope;
use std::io;
use std::path::Path;

/// Maps an `io::Error` to the closest [`FsErrorKind`], the way `toMcpError`
/// maps Node-like OS codes. Falls back to `E_NOT_FOUND` when the error does
/// not match any known case, per spec §4.9.
#[must_use]
pub fn fs_error_kind_from_io(error: &io::Error) -> FsErrorKind {
    #[cfg(unix)]
    {
        if let Some(errno) = error.raw_os_error() {
            let mapped = match errno {
                2 => Some(FsErrorKind::NotFound),       // ENOENT
                13 | 1 => Some(FsErrorKind::PermissionDenied), // EACCES, EPERM
                21 => Some(FsErrorKind::NotFile),       // EISDIR
                20 => Some(FsErrorKind::NotDirectory),  // ENOTDIR
                40 => Some(FsErrorKind::SymlinkNotAllowed), // ELOOP
                110 | 24 | 23 => Some(FsErrorKind::Timeout), // ETIMEDOUT, EMFILE, ENFILE
                _ => None,
            };
            if let Some(kind) = mapped {
                return kind;
            }
        }
    }
    fallback_from_io_kind(error.kind())
}

fn fallback_from_io_kind(kind: io::ErrorKind) -> FsErrorKind {
    match kind {
        io::ErrorKind::NotFound => FsErrorKind::NotFound,
        io::ErrorKind::PermissionDenied => FsErrorKind::PermissionDenied,
        io::ErrorKind::TimedOut => FsErrorKind::Timeout,
        _ => FsErrorKind::NotFound,
    }
}

/// Builds a structured error from a raw I/O failure, attaching
/// `originalCode`/`originalMessage` details the way `toMcpError` does.
#[must_use]
pub fn to_mcp_error(path: Option<&Path>, error: &io::Error) -> ErrorEnvelope {
    let kind = fs_error_kind_from_io(error);
    let mut envelope = ErrorEnvelope::expected(kind.into_error_code(), operation_message(kind))
        .with_metadata("originalMessage", error.to_string())
        .with_metadata("suggestion", kind.suggestion());
    if let Some(errno) = error.raw_os_error() {
        envelope = envelope.with_metadata("originalCode", errno.to_string());
    }
    if let Some(path) = path {
        envelope = envelope.with_metadata("path", path.to_string_lossy());
    }
    envelope
}

fn operation_message(kind: FsErrorKind) -> &'static str {
    match kind {
        FsErrorKind::NotFound => "the requested path does not exist",
        FsErrorKind::PermissionDenied => "permission denied",
        FsErrorKind::NotFile => "expected a file but found a directory",
        FsErrorKind::NotDirectory => "expected a directory but found a file",
        FsErrorKind::SymlinkNotAllowed => "too many levels of symbolic links",
        FsErrorKind::Timeout => "the operation timed out",
        FsErrorKind::AccessDenied => "access denied",
        FsErrorKind::InvalidInput => "invalid input",
        FsErrorKind::InvalidPattern => "invalid pattern",
        FsErrorKind::Unknown => "an unknown error occurred",
    }
}

/// Builds the `E_ACCESS_DENIED` error whose message contains the literal
/// string `"Allowed:"` followed by the allowed-root list, per spec §4.9.
#[must_use]
pub fn to_access_denied_with_hint(
    requested: &Path,
    resolved: &Path,
    normalized_resolved: &Path,
    allowed: &AllowedRoots,
) -> ErrorEnvelope {
    let allowed_list = allowed
        .roots()
        .iter()
        .map(|root| root.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(", ");
    ErrorEnvelope::expected(
        FsErrorKind::AccessDenied.into_error_code(),
        format!(
            "Path \"{}\" is outside the allowed directories. Allowed: [{allowed_list}]",
            requested.display()
        ),
    )
    .with_metadata("requestedPath", requested.to_string_lossy())
    .with_metadata("resolvedPath", resolved.to_string_lossy())
    .with_metadata("normalizedResolvedPath", normalized_resolved.to_string_lossy())
    .with_metadata("suggestion", FsErrorKind::AccessDenied.suggestion())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn unknown_io_error_defaults_to_not_found() {
        let error = io::Error::other("mystery");
        assert_eq!(fs_error_kind_from_io(&error), FsErrorKind::NotFound);
    }

    #[test]
    fn access_denied_hint_contains_allowed_literal() {
        let allowed = AllowedRoots::new(vec![PathBuf::from("/tmp/sandbox")]);
        let error = to_access_denied_with_hint(
            Path::new("/etc/passwd"),
            Path::new("/etc/passwd"),
            Path::new("/etc/passwd"),
            &allowed,
        );
        assert!(error.message.contains("Allowed:"));
    }
}
