//! Multi-file read use case (§6 "Multi-read"): the same per-file read
//! contract as [`crate::read_file`], plus a combined size budget so one
//! oversized file cannot starve the rest of the batch.

use sandboxfs_adapters::{read_file as run_read, validate_mode, ReadOptions, ReadOutcome};
use sandboxfs_domain::FsErrorKind;
use sandboxfs_shared::{ErrorEnvelope, RequestContext, Result};

use crate::deps::Deps;
use crate::instrumentation::instrument;
use crate::read_file::ReadFileInput;

const OP: &str = "read_multiple_files";

/// Request payload for [`read_multiple_files`].
#[derive(Debug, Clone)]
pub struct ReadMultipleFilesInput {
    /// The paths to read, each validated independently through the sandbox.
    pub paths: Vec<String>,
    /// Options applied uniformly to every path.
    pub options: ReadFileInput,
    /// Combined budget across the whole batch; defaults to
    /// [`sandboxfs_config::limits::DEFAULT_MAX_TOTAL_SIZE_BYTES`].
    pub max_total_size: Option<u64>,
}

/// The outcome of reading a single path within a batch.
#[derive(Debug, Clone)]
pub struct ReadMultipleFilesItem {
    /// The path this item concerns.
    pub path: String,
    /// `Ok` with the decoded content, or `Err` with the per-item failure
    /// (budget overrun, sandbox rejection, read failure).
    pub outcome: Result<ReadOutcome, ErrorEnvelope>,
}

/// Runs independent reads over a batch of paths, accounting each file's
/// size against a shared `maxTotalSize` budget; files that would blow the
/// budget are skipped with a per-item error rather than aborting the batch.
pub async fn read_multiple_files(
    ctx: &RequestContext,
    deps: &Deps,
    input: ReadMultipleFilesInput,
) -> Result<Vec<ReadMultipleFilesItem>> {
    instrument(deps.diagnostics.as_ref(), deps.clock.as_ref(), OP, None, async {
        let max_total_size = input
            .max_total_size
            .unwrap_or(deps.limits.default_max_total_size_bytes);
        let max_size = input
            .options
            .max_size
            .unwrap_or(deps.limits.default_read_max_size_bytes)
            .min(deps.limits.hard_cap_read_max_size_bytes);
        let mode = validate_mode(
            input.options.head,
            input.options.tail,
            input.options.line_range,
        )?;

        let mut items = Vec::with_capacity(input.paths.len());
        let mut consumed: u64 = 0;

        for path in input.paths {
            ctx.ensure_not_cancelled("app.read_multiple_files")?;
            let outcome = read_one(
                ctx,
                deps,
                &path,
                mode,
                max_size,
                input.options.skip_binary,
                max_total_size,
                &mut consumed,
            )
            .await;
            items.push(ReadMultipleFilesItem { path, outcome });
        }

        Ok(items)
    })
    .await
}

async fn read_one(
    ctx: &RequestContext,
    deps: &Deps,
    path: &str,
    mode: sandboxfs_adapters::ReadMode,
    max_size: u64,
    skip_binary: bool,
    max_total_size: u64,
    consumed: &mut u64,
) -> Result<ReadOutcome, ErrorEnvelope> {
    let resolved = deps
        .sandbox
        .validate_existing_path(ctx, deps.fs.as_ref(), path)
        .await?;

    let metadata = deps.fs.metadata(ctx, resolved.clone()).await?;
    let projected = consumed.saturating_add(metadata.len.min(max_size));
    if projected > max_total_size {
        return Err(ErrorEnvelope::expected(
            FsErrorKind::InvalidInput.into_error_code(),
            "Skipped: combined estimated read would exceed maxTotalSize",
        )
        .with_metadata("path", resolved.to_string_lossy()));
    }

    let outcome = run_read(
        deps.fs.as_ref(),
        ctx,
        &resolved,
        ReadOptions {
            mode,
            max_size,
            skip_binary,
        },
    )
    .await?;

    *consumed = consumed.saturating_add(u64::try_from(outcome.content.len()).unwrap_or(u64::MAX));
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandboxfs_shared::RequestContext;

    #[tokio::test]
    async fn reads_each_path_independently() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp_dir.path().join("a.txt"), b"a").expect("write");
        std::fs::write(temp_dir.path().join("b.txt"), b"b").expect("write");

        let deps = crate::test_support::deps_for(
            &temp_dir.path().canonicalize().expect("canonicalize"),
        );
        let ctx = RequestContext::new_request();
        let items = read_multiple_files(
            &ctx,
            &deps,
            ReadMultipleFilesInput {
                paths: vec![
                    temp_dir.path().join("a.txt").to_string_lossy().into_owned(),
                    temp_dir.path().join("b.txt").to_string_lossy().into_owned(),
                    temp_dir.path().join("missing.txt").to_string_lossy().into_owned(),
                ],
                options: ReadFileInput::default(),
                max_total_size: None,
            },
        )
        .await
        .expect("batch read should succeed");

        assert_eq!(items.len(), 3);
        assert!(items[0].outcome.is_ok());
        assert!(items[1].outcome.is_ok());
        assert!(items[2].outcome.is_err());
    }

    #[tokio::test]
    async fn skips_files_that_would_exceed_the_total_budget() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp_dir.path().join("a.txt"), vec![b'x'; 50]).expect("write");
        std::fs::write(temp_dir.path().join("b.txt"), vec![b'y'; 50]).expect("write");

        let deps = crate::test_support::deps_for(
            &temp_dir.path().canonicalize().expect("canonicalize"),
        );
        let ctx = RequestContext::new_request();
        let items = read_multiple_files(
            &ctx,
            &deps,
            ReadMultipleFilesInput {
                paths: vec![
                    temp_dir.path().join("a.txt").to_string_lossy().into_owned(),
                    temp_dir.path().join("b.txt").to_string_lossy().into_owned(),
                ],
                options: ReadFileInput::default(),
                max_total_size: Some(60),
            },
        )
        .await
        .expect("batch read should succeed");

        assert!(items[0].outcome.is_ok());
        assert!(items[1].outcome.is_err());
    }
}
