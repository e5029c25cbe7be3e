//! The Line-Oriented Reader (spec §4.4): head / tail / line-range / full
//! reads over a single file, with truncation bookkeeping and a binary-skip
//! gate layered on the §4.3 heuristic.

use crate::binary::is_probably_binary;
use sandboxfs_config::limits::BINARY_SNIFF_SAMPLE_BYTES;
use sandboxfs_domain::FsErrorKind;
use sandboxfs_ports::FileSystemPort;
use sandboxfs_shared::{ErrorEnvelope, RequestContext, Result};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, BufReader, SeekFrom};

/// The mutually-exclusive partial-read modes of §4.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Decode the whole file as text.
    Full,
    /// Emit up to the first `n` lines.
    Head(u64),
    /// Emit up to the last `n` lines.
    Tail(u64),
    /// Emit lines `[start, end]`, both 1-indexed inclusive.
    LineRange {
        /// First line to include, 1-indexed.
        start: u64,
        /// Last line to include, 1-indexed.
        end: u64,
    },
}

/// Options threading through every read mode.
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    /// The selected read mode.
    pub mode: ReadMode,
    /// The size budget (bytes) this read may not exceed.
    pub max_size: u64,
    /// Reject with `E_INVALID_INPUT` rather than emit garbled text when the
    /// file probes as binary.
    pub skip_binary: bool,
}

/// The outcome of a read, regardless of mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    /// The decoded content for the requested mode.
    pub content: String,
    /// Whether the read stopped early due to a budget.
    pub truncated: bool,
    /// Whether lines beyond what was emitted are known to exist.
    pub has_more_lines: bool,
}

/// Chunk size used when scanning backward from EOF for tail reads.
const TAIL_CHUNK_BYTES: u64 = 64 * 1024;

fn invalid_input(message: impl Into<String>) -> ErrorEnvelope {
    ErrorEnvelope::expected(FsErrorKind::InvalidInput.into_error_code(), message.into())
}

/// Runs the selected read mode against `path`, a path the caller has
/// already validated through the sandbox.
pub async fn read_file(
    fs: &dyn FileSystemPort,
    ctx: &RequestContext,
    path: &Path,
    options: ReadOptions,
) -> Result<ReadOutcome> {
    match options.mode {
        ReadMode::Full => read_full(fs, ctx, path, options).await,
        ReadMode::Head(n) => read_head(fs, ctx, path, n, options).await,
        ReadMode::Tail(n) => read_tail(fs, ctx, path, n, options).await,
        ReadMode::LineRange { start, end } => {
            read_line_range(fs, ctx, path, start, end, options).await
        },
    }
}

async fn read_full(
    fs: &dyn FileSystemPort,
    ctx: &RequestContext,
    path: &Path,
    options: ReadOptions,
) -> Result<ReadOutcome> {
    let metadata = fs.metadata(ctx, path.to_path_buf()).await?;
    if metadata.len > options.max_size {
        return Err(invalid_input(format!(
            "file size {} exceeds maxSize {}; use head, tail, or lineRange instead",
            metadata.len, options.max_size
        ))
        .with_metadata("path", path.to_string_lossy()));
    }

    let mut file = fs.open(ctx, path.to_path_buf()).await?;
    let mut buffer = Vec::with_capacity(usize::try_from(metadata.len).unwrap_or(0));
    file.read_to_end(&mut buffer)
        .await
        .map_err(ErrorEnvelope::from)?;

    reject_binary_if_requested(&buffer, path, options.skip_binary)?;

    Ok(ReadOutcome {
        content: String::from_utf8_lossy(&buffer).into_owned(),
        truncated: false,
        has_more_lines: false,
    })
}

async fn read_head(
    fs: &dyn FileSystemPort,
    ctx: &RequestContext,
    path: &Path,
    n: u64,
    options: ReadOptions,
) -> Result<ReadOutcome> {
    let file = fs.open(ctx, path.to_path_buf()).await?;
    let mut reader = BufReader::with_capacity(BINARY_SNIFF_SAMPLE_BYTES, file);
    probe_binary(&mut reader, path, options.skip_binary).await?;

    let mut lines = Vec::new();
    let mut bytes_read: u64 = 0;
    let mut truncated = false;

    while (lines.len() as u64) < n {
        ctx.ensure_not_cancelled("reader.head")?;
        let mut raw = Vec::new();
        let read = reader
            .read_until(b'\n', &mut raw)
            .await
            .map_err(ErrorEnvelope::from)?;
        if read == 0 {
            break;
        }
        bytes_read = bytes_read.saturating_add(read as u64);
        lines.push(strip_newline(&raw));
        if bytes_read >= options.max_size {
            truncated = true;
            break;
        }
    }

    if !truncated {
        // Did the file have more lines than we emitted?
        let remaining = reader.fill_buf().await.map_err(ErrorEnvelope::from)?;
        if !remaining.is_empty() {
            truncated = true;
        }
    }

    let content = lines.join("\n");
    reject_binary_if_requested(content.as_bytes(), path, false)?;

    Ok(ReadOutcome {
        content,
        truncated,
        has_more_lines: truncated,
    })
}

async fn read_tail(
    fs: &dyn FileSystemPort,
    ctx: &RequestContext,
    path: &Path,
    n: u64,
    options: ReadOptions,
) -> Result<ReadOutcome> {
    let metadata = fs.metadata(ctx, path.to_path_buf()).await?;
    if metadata.len == 0 {
        return Ok(ReadOutcome {
            content: String::new(),
            truncated: false,
            has_more_lines: false,
        });
    }

    let mut file = fs.open(ctx, path.to_path_buf()).await?;
    {
        let probe_len = metadata.len.min(BINARY_SNIFF_SAMPLE_BYTES as u64);
        let mut sample = vec![0u8; usize::try_from(probe_len).unwrap_or(0)];
        file.read_exact(&mut sample).await.map_err(ErrorEnvelope::from)?;
        reject_binary_if_requested(&sample, path, options.skip_binary)?;
        file.rewind().await.map_err(ErrorEnvelope::from)?;
    }

    let mut pos = metadata.len;
    let mut accumulated: Vec<u8> = Vec::new();
    let mut newline_count: u64 = 0;
    let mut bytes_scanned: u64 = 0;
    let mut exhausted = false;

    while newline_count <= n && pos > 0 {
        ctx.ensure_not_cancelled("reader.tail")?;
        let read_len = pos.min(TAIL_CHUNK_BYTES);
        let mut new_pos = pos - read_len;

        if new_pos > 0 {
            new_pos = align_to_utf8_boundary(&mut file, new_pos).await?;
        }

        let chunk_len = usize::try_from(pos - new_pos).unwrap_or(0);
        let mut chunk = vec![0u8; chunk_len];
        file.seek(SeekFrom::Start(new_pos))
            .await
            .map_err(ErrorEnvelope::from)?;
        file.read_exact(&mut chunk).await.map_err(ErrorEnvelope::from)?;

        newline_count += chunk.iter().filter(|byte| **byte == b'\n').count() as u64;
        bytes_scanned = bytes_scanned.saturating_add(chunk.len() as u64);
        chunk.extend_from_slice(&accumulated);
        accumulated = chunk;
        pos = new_pos;

        if bytes_scanned >= options.max_size {
            exhausted = true;
            break;
        }
    }

    let text = String::from_utf8_lossy(&accumulated).into_owned();
    let mut all_lines: Vec<&str> = text.split('\n').collect();
    // A trailing '\n' produces one spurious empty trailing element.
    if all_lines.last().is_some_and(|line| line.is_empty()) {
        all_lines.pop();
    }

    let reached_start = pos == 0 && !exhausted;
    let has_more_lines = !reached_start || all_lines.len() as u64 > n;
    let selected: Vec<String> = all_lines
        .iter()
        .rev()
        .take(usize::try_from(n).unwrap_or(usize::MAX))
        .rev()
        .map(|line| strip_newline(line.as_bytes()))
        .collect();

    Ok(ReadOutcome {
        content: selected.join("\n"),
        truncated: exhausted,
        has_more_lines,
    })
}

/// Aligns a candidate split point to a UTF-8 code-point boundary by
/// peeking up to 4 bytes immediately preceding it (§4.3 `findUTF8Boundary`).
async fn align_to_utf8_boundary(file: &mut tokio::fs::File, candidate: u64) -> Result<u64> {
    let window_start = candidate.saturating_sub(4);
    let window_len = usize::try_from(candidate - window_start).unwrap_or(0);
    let mut window = vec![0u8; window_len];
    file.seek(SeekFrom::Start(window_start))
        .await
        .map_err(ErrorEnvelope::from)?;
    file.read_exact(&mut window).await.map_err(ErrorEnvelope::from)?;

    let boundary = crate::binary::find_utf8_boundary(&window, i64::try_from(window.len()).unwrap_or(0));
    Ok(window_start + boundary as u64)
}

async fn read_line_range(
    fs: &dyn FileSystemPort,
    ctx: &RequestContext,
    path: &Path,
    start: u64,
    end: u64,
    options: ReadOptions,
) -> Result<ReadOutcome> {
    let file = fs.open(ctx, path.to_path_buf()).await?;
    let mut reader = BufReader::with_capacity(BINARY_SNIFF_SAMPLE_BYTES, file);
    probe_binary(&mut reader, path, options.skip_binary).await?;

    let mut collected = Vec::new();
    let mut line_number: u64 = 0;
    let mut bytes_read: u64 = 0;
    let mut truncated = false;
    let mut has_more_lines = false;

    loop {
        ctx.ensure_not_cancelled("reader.line_range")?;
        let mut raw = Vec::new();
        let read = reader
            .read_until(b'\n', &mut raw)
            .await
            .map_err(ErrorEnvelope::from)?;
        if read == 0 {
            break;
        }
        line_number += 1;
        bytes_read = bytes_read.saturating_add(read as u64);

        if bytes_read > options.max_size {
            truncated = true;
            break;
        }
        if line_number >= start && line_number <= end {
            collected.push(strip_newline(&raw));
        }
        if line_number == end + 1 {
            has_more_lines = true;
            break;
        }
    }

    let content = collected.join("\n");
    reject_binary_if_requested(content.as_bytes(), path, false)?;

    Ok(ReadOutcome {
        content,
        truncated,
        has_more_lines,
    })
}

async fn probe_binary<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    path: &Path,
    skip_binary: bool,
) -> Result<()> {
    if !skip_binary {
        return Ok(());
    }
    let sample = reader.fill_buf().await.map_err(ErrorEnvelope::from)?;
    if is_probably_binary(sample) {
        return Err(binary_rejected(path));
    }
    Ok(())
}

fn reject_binary_if_requested(sample: &[u8], path: &Path, skip_binary: bool) -> Result<()> {
    if skip_binary && is_probably_binary(sample) {
        return Err(binary_rejected(path));
    }
    Ok(())
}

fn binary_rejected(path: &Path) -> ErrorEnvelope {
    invalid_input("refusing to read probable binary content; pass skipBinary=false to override")
        .with_metadata("path", path.to_string_lossy())
}

pub(crate) fn strip_newline(raw: &[u8]) -> String {
    let mut end = raw.len();
    if raw.last() == Some(&b'\n') {
        end -= 1;
    }
    if end > 0 && raw[end - 1] == b'\r' {
        end -= 1;
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Validates the read-mode option contract of §6/§8 ("Read mode
/// exclusivity"): at most one of `head`/`tail`/`lineRange`, with
/// `start >= 1`, `end >= start`.
pub fn validate_mode(
    head: Option<u64>,
    tail: Option<u64>,
    line_range: Option<(u64, u64)>,
) -> Result<ReadMode> {
    let selected_count =
        usize::from(head.is_some()) + usize::from(tail.is_some()) + usize::from(line_range.is_some());
    if selected_count > 1 {
        return Err(invalid_input(
            "Cannot specify multiple read modes; choose one of head, tail, or lineRange",
        ));
    }
    if let Some(n) = head {
        if n == 0 {
            return Err(invalid_input("head must be a positive integer"));
        }
        return Ok(ReadMode::Head(n));
    }
    if let Some(n) = tail {
        if n == 0 {
            return Err(invalid_input("tail must be a positive integer"));
        }
        return Ok(ReadMode::Tail(n));
    }
    if let Some((start, end)) = line_range {
        if start < 1 {
            return Err(invalid_input("lineRange.start must be >= 1"));
        }
        if end < start {
            return Err(invalid_input("lineRange.end must be >= lineRange.start"));
        }
        return Ok(ReadMode::LineRange { start, end });
    }
    Ok(ReadMode::Full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_fs::LocalFileSystem;
    use std::path::PathBuf;

    fn write_numbered_lines(path: &std::path::Path, count: u64) {
        let mut content = String::new();
        for i in 1..=count {
            content.push_str(&format!("Line {i}\n"));
        }
        std::fs::write(path, content).expect("write");
    }

    #[test]
    fn mode_exclusivity_rejects_multiple() {
        let result = validate_mode(Some(5), Some(10), None);
        assert!(result.is_err());
        if let Err(error) = result {
            assert!(error.message.contains("Cannot specify multiple"));
        }
    }

    #[test]
    fn line_range_requires_end_ge_start() {
        assert!(validate_mode(None, None, Some((10, 5))).is_err());
        assert!(validate_mode(None, None, Some((1, 1))).is_ok());
    }

    #[tokio::test]
    async fn head_overshoot_returns_all_lines_untruncated() -> Result<()> {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let path: PathBuf = temp_dir.path().join("f.txt");
        write_numbered_lines(&path, 5);

        let fs = LocalFileSystem::new();
        let ctx = RequestContext::new_request();
        let outcome = read_file(
            &fs,
            &ctx,
            &path,
            ReadOptions {
                mode: ReadMode::Head(100),
                max_size: 1_000_000,
                skip_binary: false,
            },
        )
        .await?;

        assert!(!outcome.truncated);
        assert_eq!(outcome.content.lines().count(), 5);
        assert!(outcome.content.contains("Line 5"));
        Ok(())
    }

    #[tokio::test]
    async fn tail_overshoot_returns_all_lines_untruncated() -> Result<()> {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let path: PathBuf = temp_dir.path().join("f.txt");
        write_numbered_lines(&path, 5);

        let fs = LocalFileSystem::new();
        let ctx = RequestContext::new_request();
        let outcome = read_file(
            &fs,
            &ctx,
            &path,
            ReadOptions {
                mode: ReadMode::Tail(100),
                max_size: 1_000_000,
                skip_binary: false,
            },
        )
        .await?;

        assert!(!outcome.truncated);
        assert!(!outcome.has_more_lines);
        assert_eq!(outcome.content.lines().count(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn tail_selects_last_n_lines() -> Result<()> {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let path: PathBuf = temp_dir.path().join("f.txt");
        write_numbered_lines(&path, 100);

        let fs = LocalFileSystem::new();
        let ctx = RequestContext::new_request();
        let outcome = read_file(
            &fs,
            &ctx,
            &path,
            ReadOptions {
                mode: ReadMode::Tail(3),
                max_size: 1_000_000,
                skip_binary: false,
            },
        )
        .await?;

        assert_eq!(outcome.content, "Line 98\nLine 99\nLine 100");
        assert!(outcome.has_more_lines);
        Ok(())
    }

    #[tokio::test]
    async fn line_range_beyond_eof_reports_truncated_content() -> Result<()> {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let path: PathBuf = temp_dir.path().join("f.txt");
        write_numbered_lines(&path, 100);

        let fs = LocalFileSystem::new();
        let ctx = RequestContext::new_request();
        let outcome = read_file(
            &fs,
            &ctx,
            &path,
            ReadOptions {
                mode: ReadMode::LineRange {
                    start: 95,
                    end: 200,
                },
                max_size: 1_000_000,
                skip_binary: false,
            },
        )
        .await?;

        assert!(outcome.content.contains("Line 100"));
        assert!(!outcome.has_more_lines);
        Ok(())
    }

    #[tokio::test]
    async fn full_mode_rejects_over_max_size() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let path: PathBuf = temp_dir.path().join("f.txt");
        std::fs::write(&path, vec![b'a'; 100]).expect("write");

        let fs = LocalFileSystem::new();
        let ctx = RequestContext::new_request();
        let result = read_file(
            &fs,
            &ctx,
            &path,
            ReadOptions {
                mode: ReadMode::Full,
                max_size: 10,
                skip_binary: false,
            },
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn skip_binary_rejects_binary_content() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let path: PathBuf = temp_dir.path().join("f.bin");
        std::fs::write(&path, [0u8, 1, 2, 0, 0, 0, 5]).expect("write");

        let fs = LocalFileSystem::new();
        let ctx = RequestContext::new_request();
        let result = read_file(
            &fs,
            &ctx,
            &path,
            ReadOptions {
                mode: ReadMode::Full,
                max_size: 1_000_000,
                skip_binary: true,
            },
        )
        .await;

        assert!(result.is_err());
        if let Err(error) = result {
            assert!(error.message.contains("binary"));
        }
    }
}
