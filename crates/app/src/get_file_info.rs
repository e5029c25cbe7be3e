//! File-info use case (§10.6 supplement): a stat plus a cheap binary/MIME
//! probe, for callers that want to decide how to read a file before
//! committing to a full [`crate::read_file`] call.

use std::time::SystemTime;

use sandboxfs_adapters::binary::{is_probably_binary, sniff_mime_type};
use sandboxfs_ports::RawFileType;
use sandboxfs_shared::{RequestContext, Result};
use tokio::io::AsyncReadExt;

use crate::deps::Deps;
use crate::instrumentation::instrument;

const OP: &str = "get_file_info";

/// Bytes sampled from the start of a file to probe binary-ness and sniff a
/// MIME type; mirrors the sample size the binary heuristic itself reads.
const PROBE_SAMPLE_BYTES: usize = 8 * 1024;

/// Request payload for [`get_file_info`].
#[derive(Debug, Clone, Default)]
pub struct GetFileInfoInput {
    /// The path to stat.
    pub path: String,
}

/// Stat and content-class summary for a single path.
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// Size in bytes.
    pub size: u64,
    /// Last-modified time, when the platform reports one.
    pub mtime: Option<SystemTime>,
    /// Whether the path names a directory.
    pub is_directory: bool,
    /// Whether the path names a regular file.
    pub is_file: bool,
    /// Best-effort binary/text classification; `None` for directories.
    pub is_binary: Option<bool>,
    /// Best-effort MIME type sniffed from a leading sample; `None` when the
    /// path is not a file or the sample did not match a known signature.
    pub mime_type: Option<&'static str>,
}

/// Stats `path` and, for regular files, samples its leading bytes to
/// classify it as binary/text and sniff a MIME type.
pub async fn get_file_info(ctx: &RequestContext, deps: &Deps, input: GetFileInfoInput) -> Result<FileInfo> {
    instrument(
        deps.diagnostics.as_ref(),
        deps.clock.as_ref(),
        OP,
        Some(std::path::Path::new(&input.path)),
        async {
            let resolved = deps
                .sandbox
                .validate_existing_path(ctx, deps.fs.as_ref(), &input.path)
                .await?;
            let metadata = deps.fs.metadata(ctx, resolved.clone()).await?;
            let is_directory = matches!(metadata.file_type, RawFileType::Directory);
            let is_file = matches!(metadata.file_type, RawFileType::File);

            let (is_binary, mime_type) = if is_file {
                let mut file = deps.fs.open(ctx, resolved).await?;
                let mut sample = vec![0_u8; PROBE_SAMPLE_BYTES];
                let read = file.read(&mut sample).await.map_err(sandboxfs_shared::ErrorEnvelope::from)?;
                sample.truncate(read);
                (Some(is_probably_binary(&sample)), sniff_mime_type(&sample))
            } else {
                (None, None)
            };

            Ok(FileInfo {
                size: metadata.len,
                mtime: metadata.modified,
                is_directory,
                is_file,
                is_binary,
                mime_type,
            })
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandboxfs_shared::RequestContext;

    #[tokio::test]
    async fn reports_size_and_text_classification() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp_dir.path().join("a.txt"), b"hello world").expect("write");

        let deps = crate::test_support::deps_for(
            &temp_dir.path().canonicalize().expect("canonicalize"),
        );
        let ctx = RequestContext::new_request();
        let info = get_file_info(
            &ctx,
            &deps,
            GetFileInfoInput {
                path: temp_dir.path().join("a.txt").to_string_lossy().into_owned(),
            },
        )
        .await
        .expect("stat should succeed");

        assert_eq!(info.size, 11);
        assert!(info.is_file);
        assert!(!info.is_directory);
        assert_eq!(info.is_binary, Some(false));
    }

    #[tokio::test]
    async fn reports_directories_without_a_binary_verdict() {
        let temp_dir = tempfile::tempdir().expect("tempdir");

        let deps = crate::test_support::deps_for(
            &temp_dir.path().canonicalize().expect("canonicalize"),
        );
        let ctx = RequestContext::new_request();
        let info = get_file_info(
            &ctx,
            &deps,
            GetFileInfoInput {
                path: temp_dir.path().to_string_lossy().into_owned(),
            },
        )
        .await
        .expect("stat should succeed");

        assert!(info.is_directory);
        assert!(!info.is_file);
        assert_eq!(info.is_binary, None);
    }
}
