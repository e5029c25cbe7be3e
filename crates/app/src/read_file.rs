//! Single-file read use case (§4.4, §6 "Read").

use sandboxfs_adapters::{read_file as run_read, validate_mode, ReadOptions, ReadOutcome};
use sandboxfs_domain::FsErrorKind;
use sandboxfs_shared::{ErrorEnvelope, RequestContext, Result};

use crate::deps::Deps;
use crate::instrumentation::instrument;

const OP: &str = "read_file";

/// Request payload for [`read_file`].
#[derive(Debug, Clone, Default)]
pub struct ReadFileInput {
    /// Path to read, resolved through the sandbox.
    pub path: String,
    /// Decoded text encoding; only `"utf-8"` is supported.
    pub encoding: Option<String>,
    /// Size budget in bytes; defaults to [`sandboxfs_config::limits::DEFAULT_READ_MAX_SIZE_BYTES`]
    /// and is clamped to the hard cap.
    pub max_size: Option<u64>,
    /// Emit only the first `n` lines.
    pub head: Option<u64>,
    /// Emit only the last `n` lines.
    pub tail: Option<u64>,
    /// Emit lines `[start, end]`, 1-indexed inclusive.
    pub line_range: Option<(u64, u64)>,
    /// Reject with `E_INVALID_INPUT` instead of returning garbled text when
    /// the file probes as binary.
    pub skip_binary: bool,
}

fn validate_encoding(encoding: Option<&str>) -> Result<()> {
    match encoding {
        None | Some("utf-8") => Ok(()),
        Some(other) => Err(ErrorEnvelope::expected(
            FsErrorKind::InvalidInput.into_error_code(),
            format!("unsupported encoding `{other}`; only \"utf-8\" is supported"),
        )),
    }
}

/// Runs a single-file read through the sandbox and the line-oriented reader.
pub async fn read_file(ctx: &RequestContext, deps: &Deps, input: ReadFileInput) -> Result<ReadOutcome> {
    instrument(
        deps.diagnostics.as_ref(),
        deps.clock.as_ref(),
        OP,
        Some(std::path::Path::new(&input.path)),
        async {
            validate_encoding(input.encoding.as_deref())?;
            let mode = validate_mode(input.head, input.tail, input.line_range)?;

            let resolved = deps
                .sandbox
                .validate_existing_path(ctx, deps.fs.as_ref(), &input.path)
                .await?;

            let max_size = input
                .max_size
                .unwrap_or(deps.limits.default_read_max_size_bytes)
                .min(deps.limits.hard_cap_read_max_size_bytes);

            run_read(
                deps.fs.as_ref(),
                ctx,
                &resolved,
                ReadOptions {
                    mode,
                    max_size,
                    skip_binary: input.skip_binary,
                },
            )
            .await
        },
    )
    .await
}
