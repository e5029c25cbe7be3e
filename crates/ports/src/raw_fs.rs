//! The raw OS filesystem boundary (spec §4.1, §4.5, §5 "suspension points").

use crate::BoxFuture;
use sandboxfs_shared::{RequestContext, Result};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::SystemTime;
use tokio::fs::File;

/// The type of a raw directory entry or stat result, before sandbox policy
/// (hidden filtering, exclude globs, symlink non-follow) is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawFileType {
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// A symbolic link.
    Symlink,
    /// Anything else (device, FIFO, socket, ...).
    Other,
}

/// An entry yielded by a directory listing, before any policy is applied.
#[derive(Debug, Clone)]
pub struct RawDirEntry {
    /// The entry's bare name.
    pub name: OsString,
    /// The entry's type, as reported by `symlink_metadata` (does not follow
    /// the final component).
    pub file_type: RawFileType,
}

/// Metadata about a path, analogous to `std::fs::Metadata`.
#[derive(Debug, Clone, Copy)]
pub struct RawMetadata {
    /// The entry's type.
    pub file_type: RawFileType,
    /// Size in bytes.
    pub len: u64,
    /// Last-modified time, when the platform reports one.
    pub modified: Option<SystemTime>,
}

/// Boundary contract for the raw filesystem. Every method is a suspension
/// point (§5) and accepts a [`RequestContext`] so implementations can check
/// cancellation before issuing the underlying syscall.
///
/// Implementations MUST NOT apply sandbox policy (path validation, hidden
/// filtering, symlink non-follow) themselves — that is `sandboxfs-adapters`'
/// `PathSandbox` and walker's job, layered on top of this port.
pub trait FileSystemPort: Send + Sync {
    /// List the immediate children of a directory.
    fn read_dir(&self, ctx: &RequestContext, path: PathBuf) -> BoxFuture<'_, Result<Vec<RawDirEntry>>>;

    /// Stat a path, following a terminal symlink.
    fn metadata(&self, ctx: &RequestContext, path: PathBuf) -> BoxFuture<'_, Result<RawMetadata>>;

    /// Stat a path without following a terminal symlink.
    fn symlink_metadata(
        &self,
        ctx: &RequestContext,
        path: PathBuf,
    ) -> BoxFuture<'_, Result<RawMetadata>>;

    /// Resolve a path to its real (symlink-free) absolute form.
    fn canonicalize(&self, ctx: &RequestContext, path: PathBuf) -> BoxFuture<'_, Result<PathBuf>>;

    /// Open a file for streaming reads.
    fn open(&self, ctx: &RequestContext, path: PathBuf) -> BoxFuture<'_, Result<File>>;
}
