//! The Path Sandbox (spec §4.1): the allowed-root gate every path passes
//! through before any I/O is performed against it.

use crate::error_map::{to_access_denied_with_hint, to_mcp_error};
use crate::path_utils;
use sandboxfs_domain::{AllowedRoots, FsErrorKind, ValidatedPath};
use sandboxfs_ports::FileSystemPort;
use sandboxfs_shared::{ErrorEnvelope, RequestContext, Result};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Owns the process-wide allowed-root set and implements the validation
/// algorithm of §4.1. A single instance is shared (read-mostly) across all
/// in-flight operations; [`PathSandbox::replace_roots`] is the only mutator
/// and swaps the whole set atomically.
pub struct PathSandbox {
    roots: RwLock<AllowedRoots>,
    base_dir: PathBuf,
}

impl PathSandbox {
    /// Builds a sandbox over an already-bootstrapped root set.
    #[must_use]
    pub fn new(roots: AllowedRoots, base_dir: PathBuf) -> Self {
        Self {
            roots: RwLock::new(roots),
            base_dir,
        }
    }

    /// Returns a snapshot of the currently configured allowed roots.
    #[must_use]
    pub fn allowed_directories(&self) -> AllowedRoots {
        self.roots.read().map_or_else(|_| AllowedRoots::default(), |guard| guard.clone())
    }

    /// Atomically replaces the allowed-root set.
    pub fn replace_roots(&self, roots: AllowedRoots) {
        if let Ok(mut guard) = self.roots.write() {
            *guard = roots;
        }
    }

    /// Runs the full §4.1 algorithm, returning the validated path triple.
    pub async fn validate_existing_path_detailed(
        &self,
        ctx: &RequestContext,
        fs: &dyn FileSystemPort,
        raw: &str,
    ) -> Result<ValidatedPath> {
        let roots = self.allowed_directories();

        let normalized = path_utils::normalize(raw, &self.base_dir)?;

        if roots.is_empty() {
            return Err(ErrorEnvelope::expected(
                FsErrorKind::AccessDenied.into_error_code(),
                "no allowed directories configured",
            ));
        }
        if !roots.contains_prefix_of(&normalized) {
            return Err(to_access_denied_with_hint(
                &normalized,
                &normalized,
                &normalized,
                &roots,
            ));
        }

        let canonical = fs
            .canonicalize(ctx, normalized.clone())
            .await
            .map_err(|error| annotate_with_path(error, &normalized))?;

        let canonical_normalized = path_utils::strip_trailing_separator(
            &path_utils::lower_drive_letter(&canonical),
        );

        if !roots.contains_prefix_of(&canonical_normalized) {
            return Err(to_access_denied_with_hint(
                &normalized,
                &canonical,
                &canonical_normalized,
                &roots,
            ));
        }

        Ok(ValidatedPath::new(normalized, canonical))
    }

    /// Validates a path and returns only its real path.
    pub async fn validate_existing_path(
        &self,
        ctx: &RequestContext,
        fs: &dyn FileSystemPort,
        raw: &str,
    ) -> Result<PathBuf> {
        self.validate_existing_path_detailed(ctx, fs, raw)
            .await
            .map(|validated| validated.resolved_path)
    }

    /// Validates a path, additionally requiring that it names a directory.
    pub async fn validate_existing_directory(
        &self,
        ctx: &RequestContext,
        fs: &dyn FileSystemPort,
        raw: &str,
    ) -> Result<PathBuf> {
        let resolved = self.validate_existing_path(ctx, fs, raw).await?;
        let metadata = fs
            .metadata(ctx, resolved.clone())
            .await
            .map_err(|error| annotate_with_path(error, &resolved))?;
        if !matches!(metadata.file_type, sandboxfs_ports::RawFileType::Directory) {
            return Err(ErrorEnvelope::expected(
                FsErrorKind::NotDirectory.into_error_code(),
                "expected a directory",
            )
            .with_metadata("path", resolved.to_string_lossy()));
        }
        Ok(resolved)
    }
}

fn annotate_with_path(error: ErrorEnvelope, path: &Path) -> ErrorEnvelope {
    if error.metadata.contains_key("path") {
        error
    } else {
        error.with_metadata("path", path.to_string_lossy())
    }
}

/// Translates a raw I/O failure encountered while validating a path into
/// the sandbox's error taxonomy. Exposed for adapters that perform their
/// own `canonicalize`/`stat` calls outside [`PathSandbox`]'s async port
/// plumbing (e.g. synchronous bootstrap code).
#[must_use]
pub fn map_io_error(path: &Path, error: &std::io::Error) -> ErrorEnvelope {
    to_mcp_error(Some(path), error)
}
