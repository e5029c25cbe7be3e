//! Builds the initial allowed-root set from host/CLI-supplied paths (§4.1
//! `setAllowedDirectoriesResolved`).

use sandboxfs_domain::AllowedRoots;
use sandboxfs_shared::{ErrorCode, ErrorEnvelope, Result};
use std::path::{Path, PathBuf};

/// Canonicalizes each supplied path and builds an [`AllowedRoots`] set that
/// also contains each root's real-path twin, exactly as
/// `setAllowedDirectoriesResolved` does. Every path must exist and be a
/// directory; this runs once at startup, before any request is served.
pub fn bootstrap_allowed_roots(paths: &[PathBuf]) -> Result<AllowedRoots> {
    if paths.is_empty() {
        return Err(ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            "at least one allowed directory must be configured",
        ));
    }

    let mut normalized = Vec::with_capacity(paths.len());
    let mut real_twins = Vec::with_capacity(paths.len());

    for path in paths {
        let metadata = std::fs::metadata(path).map_err(|error| {
            ErrorEnvelope::from(error).with_metadata("path", path.to_string_lossy())
        })?;
        if !metadata.is_dir() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "allowed directory entries must be directories",
            )
            .with_metadata("path", path.to_string_lossy()));
        }

        let normalized_path = normalize_absolute(path)?;
        let real_path = std::fs::canonicalize(path).map_err(|error| {
            ErrorEnvelope::from(error).with_metadata("path", path.to_string_lossy())
        })?;

        if real_path != normalized_path {
            real_twins.push(real_path);
        }
        normalized.push(normalized_path);
    }

    Ok(AllowedRoots::new(normalized).with_additional(real_twins))
}

fn normalize_absolute(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(ErrorEnvelope::from)?
            .join(path)
    };
    Ok(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_input() {
        let result = bootstrap_allowed_roots(&[]);
        assert!(result.is_err());
    }

    #[test]
    fn builds_roots_from_existing_directory() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let roots = bootstrap_allowed_roots(&[temp_dir.path().to_path_buf()])
            .expect("bootstrap should succeed for a real directory");
        assert!(!roots.is_empty());
    }

    #[test]
    fn rejects_a_path_to_a_file() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let file_path = temp_dir.path().join("not-a-dir.txt");
        std::fs::write(&file_path, b"hello").expect("write");
        let result = bootstrap_allowed_roots(&[file_path]);
        assert!(result.is_err());
    }
}
