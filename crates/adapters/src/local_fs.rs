//! The real OS filesystem, implementing [`FileSystemPort`] (spec §4.1,
//! §4.5, §5 "suspension points"). Applies no sandbox policy of its own;
//! `PathSandbox` and the walker layer policy on top of this.

use sandboxfs_ports::{BoxFuture, FileSystemPort, RawDirEntry, RawFileType, RawMetadata};
use sandboxfs_shared::{ErrorEnvelope, RequestContext, Result};
use std::path::PathBuf;
use tokio::fs::File;

/// The real filesystem, reached through `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    /// Builds the adapter. Stateless; every call goes straight to the OS.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn raw_file_type(file_type: std::fs::FileType) -> RawFileType {
    if file_type.is_symlink() {
        RawFileType::Symlink
    } else if file_type.is_dir() {
        RawFileType::Directory
    } else if file_type.is_file() {
        RawFileType::File
    } else {
        RawFileType::Other
    }
}

fn to_raw_metadata(metadata: &std::fs::Metadata) -> RawMetadata {
    RawMetadata {
        file_type: raw_file_type(metadata.file_type()),
        len: metadata.len(),
        modified: metadata.modified().ok(),
    }
}

impl FileSystemPort for LocalFileSystem {
    fn read_dir(
        &self,
        ctx: &RequestContext,
        path: PathBuf,
    ) -> BoxFuture<'_, Result<Vec<RawDirEntry>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("local_fs.read_dir")?;
            let mut read_dir = tokio::fs::read_dir(&path)
                .await
                .map_err(|error| ErrorEnvelope::from(error).with_metadata("path", path.to_string_lossy()))?;

            let mut entries = Vec::new();
            loop {
                ctx.ensure_not_cancelled("local_fs.read_dir")?;
                let Some(entry) = read_dir
                    .next_entry()
                    .await
                    .map_err(|error| ErrorEnvelope::from(error).with_metadata("path", path.to_string_lossy()))?
                else {
                    break;
                };
                let file_type = entry.file_type().await.map_err(ErrorEnvelope::from)?;
                entries.push(RawDirEntry {
                    name: entry.file_name(),
                    file_type: raw_file_type(file_type),
                });
            }
            Ok(entries)
        })
    }

    fn metadata(&self, ctx: &RequestContext, path: PathBuf) -> BoxFuture<'_, Result<RawMetadata>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("local_fs.metadata")?;
            let metadata = tokio::fs::metadata(&path)
                .await
                .map_err(|error| ErrorEnvelope::from(error).with_metadata("path", path.to_string_lossy()))?;
            Ok(to_raw_metadata(&metadata))
        })
    }

    fn symlink_metadata(
        &self,
        ctx: &RequestContext,
        path: PathBuf,
    ) -> BoxFuture<'_, Result<RawMetadata>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("local_fs.symlink_metadata")?;
            let metadata = tokio::fs::symlink_metadata(&path)
                .await
                .map_err(|error| ErrorEnvelope::from(error).with_metadata("path", path.to_string_lossy()))?;
            Ok(to_raw_metadata(&metadata))
        })
    }

    fn canonicalize(&self, ctx: &RequestContext, path: PathBuf) -> BoxFuture<'_, Result<PathBuf>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("local_fs.canonicalize")?;
            tokio::fs::canonicalize(&path)
                .await
                .map_err(|error| ErrorEnvelope::from(error).with_metadata("path", path.to_string_lossy()))
        })
    }

    fn open(&self, ctx: &RequestContext, path: PathBuf) -> BoxFuture<'_, Result<File>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("local_fs.open")?;
            File::open(&path)
                .await
                .map_err(|error| ErrorEnvelope::from(error).with_metadata("path", path.to_string_lossy()))
        })
    }
}
