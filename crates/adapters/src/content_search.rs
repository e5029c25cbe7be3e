//! Content-search matchers, per-file scanner, and the parallel scan
//! orchestrator (spec §4.8).
//!
//! The worker-pool description in §4.8.3 is written against a
//! `worker_threads`-style message-passing pool; this adapter reaches the
//! same externally observable contract (bounded concurrency, deterministic
//! trimming to `maxResults`, a `stoppedReason`) through
//! `sandboxfs_shared::WorkerPool::map`, which gives every in-flight scan
//! its own async task under a single bounded-concurrency executor instead
//! of hand-rolled worker slots and respawn bookkeeping.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use regex::{Regex, RegexBuilder};
use tokio::io::{AsyncBufReadExt, BufReader};

use sandboxfs_domain::{
    ContentMatch, ContentSearchSummary, Entry, EntryType, FileScanResult, FsErrorKind, StoppedReason,
};
use sandboxfs_ports::FileSystemPort;
use sandboxfs_shared::{ErrorEnvelope, RequestContext, Result, WorkerPool, WorkerPoolOptions};

use crate::binary::is_probably_binary;
use crate::reader::strip_newline;

fn invalid_pattern(message: impl Into<String>) -> ErrorEnvelope {
    ErrorEnvelope::expected(FsErrorKind::InvalidPattern.into_error_code(), message.into())
}

/// Options controlling how a pattern is compiled into a [`Matcher`].
#[derive(Debug, Clone)]
pub struct MatcherOptions {
    /// Case-insensitive matching.
    pub case_insensitive: bool,
    /// Wrap the pattern in `\b...\b`.
    pub whole_word: bool,
    /// Treat the pattern as a literal string rather than a regex.
    pub is_literal: bool,
    /// Wall-clock budget granted to a single line's regex match attempt.
    pub regex_timeout: Duration,
}

/// A compiled content-search matcher (spec §4.8.1).
pub enum Matcher {
    /// Non-overlapping substring counting.
    Literal {
        /// The needle, already lower-cased when case-insensitive.
        needle: String,
        /// Whether the haystack is lower-cased before scanning.
        case_insensitive: bool,
    },
    /// A compiled regex with a bounded, cooperative match loop.
    Regex {
        /// The compiled pattern.
        regex: Regex,
        /// Per-line wall-clock budget.
        timeout: Duration,
    },
}

impl Matcher {
    /// Compiles `pattern` per the rules in spec §4.8.1: literal patterns
    /// skip the ReDoS pre-check entirely; `wholeWord` and non-literal
    /// patterns go through the regex path.
    pub fn compile(pattern: &str, options: &MatcherOptions) -> Result<Self> {
        if options.is_literal && !options.whole_word {
            let needle = if options.case_insensitive {
                pattern.to_lowercase()
            } else {
                pattern.to_string()
            };
            return Ok(Self::Literal {
                needle,
                case_insensitive: options.case_insensitive,
            });
        }

        let mut source = if options.is_literal {
            regex::escape(pattern)
        } else {
            pattern.to_string()
        };
        if options.whole_word {
            source = format!(r"\b{source}\b");
        }

        if !options.is_literal {
            check_redos(pattern)?;
        }

        let regex = RegexBuilder::new(&source)
            .case_insensitive(options.case_insensitive)
            .build()
            .map_err(|error| invalid_pattern(format!("invalid regular expression: {error}")))?;

        Ok(Self::Regex {
            regex,
            timeout: options.regex_timeout,
        })
    }

    /// Counts occurrences of this matcher on `line`. Returns `-1` when a
    /// regex match attempt exhausted its iteration or wall-clock budget.
    #[must_use]
    pub fn count_matches(&self, line: &str) -> i64 {
        match self {
            Self::Literal {
                needle,
                case_insensitive,
            } => count_literal_matches(line, needle, *case_insensitive),
            Self::Regex { regex, timeout } => count_regex_matches(regex, line, *timeout),
        }
    }
}

fn count_literal_matches(haystack: &str, needle: &str, case_insensitive: bool) -> i64 {
    if needle.is_empty() {
        return 0;
    }
    let folded;
    let folded_haystack = if case_insensitive {
        folded = haystack.to_lowercase();
        folded.as_str()
    } else {
        haystack
    };

    let mut count = 0i64;
    let mut offset = 0usize;
    while offset <= folded_haystack.len() {
        let Some(found) = folded_haystack[offset..].find(needle) else {
            break;
        };
        count += 1;
        offset += found + needle.len();
    }
    count
}

const REGEX_MAX_ITERATIONS_CEILING: usize = 10_000;

fn count_regex_matches(regex: &Regex, line: &str, timeout: Duration) -> i64 {
    let deadline = Instant::now() + timeout;
    let max_iterations = (line.len().saturating_mul(2)).min(REGEX_MAX_ITERATIONS_CEILING);

    let mut count = 0i64;
    let mut last_index = 0usize;
    let mut iterations = 0usize;

    loop {
        if iterations >= max_iterations || Instant::now() >= deadline {
            return -1;
        }
        iterations += 1;

        if last_index > line.len() {
            break;
        }
        let Some(found) = regex.find_at(line, last_index) else {
            break;
        };

        count += 1;
        let next_index = if found.end() == found.start() {
            found.end() + 1
        } else {
            found.end()
        };
        if next_index <= last_index && found.end() > found.start() {
            return -1;
        }
        last_index = next_index;
    }

    count
}

const NESTED_QUANTIFIER_CHARS: &[char] = &['+', '*', '?', '}'];
const QUANTIFIER_START_CHARS: &[char] = &['+', '*', '?', '{'];

/// ReDoS pre-check (spec §4.8.1): rejects patterns with a nested-quantifier
/// construct or a `{n}`/`{n,m}` repetition whose `n` meets or exceeds
/// [`sandboxfs_config::limits::REDOS_QUANTIFIER_THRESHOLD`].
fn check_redos(pattern: &str) -> Result<()> {
    if has_nested_quantifier(pattern) {
        return Err(invalid_pattern(
            "pattern contains a nested quantifier (e.g. `(a+)+`), which risks catastrophic backtracking",
        ));
    }
    if has_large_quantifier(pattern, sandboxfs_config::limits::REDOS_QUANTIFIER_THRESHOLD) {
        return Err(invalid_pattern(format!(
            "pattern contains a repetition count at or above {}",
            sandboxfs_config::limits::REDOS_QUANTIFIER_THRESHOLD
        )));
    }
    Ok(())
}

fn has_nested_quantifier(pattern: &str) -> bool {
    let chars: Vec<char> = pattern.chars().collect();
    for (index, ch) in chars.iter().enumerate() {
        if *ch != ')' {
            continue;
        }
        let Some(before) = preceding_non_whitespace(&chars, index) else {
            continue;
        };
        if !NESTED_QUANTIFIER_CHARS.contains(&before) {
            continue;
        }
        let Some(after) = following_non_whitespace(&chars, index) else {
            continue;
        };
        if QUANTIFIER_START_CHARS.contains(&after) {
            return true;
        }
    }
    false
}

fn preceding_non_whitespace(chars: &[char], index: usize) -> Option<char> {
    chars[..index].iter().rev().find(|ch| !ch.is_whitespace()).copied()
}

fn following_non_whitespace(chars: &[char], index: usize) -> Option<char> {
    chars[index + 1..].iter().find(|ch| !ch.is_whitespace()).copied()
}

fn has_large_quantifier(pattern: &str, threshold: u32) -> bool {
    let bytes = pattern.as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] != b'{' {
            index += 1;
            continue;
        }
        let Some(close) = pattern[index..].find('}') else {
            break;
        };
        let body = &pattern[index + 1..index + close];
        let first_number = body.split(',').next().unwrap_or("");
        if let Ok(n) = first_number.parse::<u32>() {
            if n >= threshold {
                return true;
            }
        }
        index += close + 1;
    }
    false
}

/// Options for a single-file scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Files larger than this are reported as `skippedTooLarge`.
    pub max_file_size: u64,
    /// Probe for binary content and skip if so.
    pub skip_binary: bool,
    /// Number of context lines before/after a match to retain.
    pub context_lines: usize,
    /// Cap on the length of emitted match content.
    pub max_line_content_length: usize,
}

struct PendingAfter {
    match_index: usize,
    remaining: usize,
}

/// Scans a single file for matches of `matcher`, per spec §4.8.2.
pub async fn scan_file(
    fs: &dyn FileSystemPort,
    ctx: &RequestContext,
    resolved_path: &Path,
    display_path: &Path,
    matcher: &Matcher,
    options: &ScanOptions,
    max_matches: usize,
) -> Result<FileScanResult> {
    ctx.ensure_not_cancelled("content_search.scan_file")?;

    let metadata = fs.metadata(ctx, resolved_path.to_path_buf()).await?;
    if metadata.len > options.max_file_size {
        return Ok(FileScanResult {
            skipped_too_large: true,
            ..Default::default()
        });
    }

    let file = fs.open(ctx, resolved_path.to_path_buf()).await?;
    let mut reader = BufReader::new(file);

    if options.skip_binary {
        let sample = reader.fill_buf().await.map_err(ErrorEnvelope::from)?;
        if is_probably_binary(sample) {
            return Ok(FileScanResult {
                skipped_binary: true,
                ..Default::default()
            });
        }
    }

    let mut result = FileScanResult::default();
    let mut context_before: std::collections::VecDeque<String> =
        std::collections::VecDeque::with_capacity(options.context_lines);
    let mut pending_after: Vec<PendingAfter> = Vec::new();
    let mut line_number = 0u64;

    loop {
        if line_number % 256 == 0 {
            ctx.ensure_not_cancelled("content_search.scan_file")?;
        }

        let mut raw_line = Vec::new();
        let bytes_read = reader
            .read_until(b'\n', &mut raw_line)
            .await
            .map_err(ErrorEnvelope::from)?;
        if bytes_read == 0 {
            break;
        }
        line_number += 1;

        let line = strip_newline(&raw_line);

        for pending in &mut pending_after {
            if pending.remaining > 0 {
                result.matches[pending.match_index].context_after.push(line.clone());
                pending.remaining -= 1;
            }
        }
        pending_after.retain(|pending| pending.remaining > 0);

        let match_count = matcher.count_matches(&line);
        if match_count < 0 {
            result.lines_skipped_due_to_regex_timeout += 1;
        } else if match_count > 0 {
            let display_content = truncate_display(&line, options.max_line_content_length);
            result.matches.push(ContentMatch {
                file: display_path.to_path_buf(),
                line: line_number,
                content: display_content,
                context_before: context_before.iter().cloned().collect(),
                context_after: Vec::new(),
                match_count: u32::try_from(match_count).unwrap_or(u32::MAX),
            });
            result.matched = true;
            if options.context_lines > 0 {
                pending_after.push(PendingAfter {
                    match_index: result.matches.len() - 1,
                    remaining: options.context_lines,
                });
            }
            if result.matches.len() >= max_matches {
                break;
            }
        }

        if options.context_lines > 0 {
            if context_before.len() == options.context_lines {
                context_before.pop_front();
            }
            context_before.push_back(line);
        }
    }

    Ok(result)
}

fn truncate_display(line: &str, max_len: usize) -> String {
    if line.len() <= max_len {
        return line.to_string();
    }
    let mut end = max_len;
    while end > 0 && !line.is_char_boundary(end) {
        end -= 1;
    }
    line[..end].to_string()
}

/// A single file slated for scanning.
pub struct SearchCandidate {
    /// Resolved (real) path, used to open the file.
    pub resolved_path: PathBuf,
    /// Path to show the caller in results.
    pub display_path: PathBuf,
}

/// Runs the bounded-concurrency content search described in spec §4.8.3
/// over `candidates`, trimming to `max_results` and reporting a
/// `stoppedReason` when truncation or cancellation occurred.
pub async fn search_content(
    fs: std::sync::Arc<dyn FileSystemPort>,
    ctx: &RequestContext,
    candidates: Vec<SearchCandidate>,
    matcher: Matcher,
    scan_options: ScanOptions,
    max_results: usize,
    search_workers: usize,
) -> Result<(Vec<ContentMatch>, ContentSearchSummary)> {
    let concurrency = search_workers.max(1).min(max_results.max(1));
    let pool = WorkerPool::new(
        ctx.clone(),
        WorkerPoolOptions {
            concurrency,
            queue_capacity: None,
        },
    )?;

    let matcher = std::sync::Arc::new(matcher);
    let scan_options = std::sync::Arc::new(scan_options);

    let results = pool
        .map(candidates, move |candidate, _index| {
            let matcher = std::sync::Arc::clone(&matcher);
            let scan_options = std::sync::Arc::clone(&scan_options);
            let ctx = ctx.clone();
            let fs = std::sync::Arc::clone(&fs);
            async move {
                let scanned = scan_file(
                    fs.as_ref(),
                    &ctx,
                    &candidate.resolved_path,
                    &candidate.display_path,
                    &matcher,
                    &scan_options,
                    max_results,
                )
                .await;
                match scanned {
                    Ok(scan_result) => Ok((candidate.display_path, scan_result)),
                    Err(error) if error.is_cancelled() => Err(error),
                    Err(_) => Ok((candidate.display_path, FileScanResult::default())),
                }
            }
        })
        .await;

    let results = match results {
        Ok(results) => results,
        Err(error) if error.is_cancelled() => {
            let mut summary = ContentSearchSummary::default();
            summary.stopped_reason = Some(StoppedReason::Timeout);
            return Ok((Vec::new(), summary));
        },
        Err(error) => return Err(error),
    };

    let mut summary = ContentSearchSummary::default();
    let mut matches = Vec::new();
    for (_, scan_result) in results {
        summary.files_scanned += 1;
        if scan_result.skipped_too_large {
            summary.skipped_too_large += 1;
            continue;
        }
        if scan_result.skipped_binary {
            summary.skipped_binary += 1;
            continue;
        }
        summary.lines_skipped_due_to_regex_timeout += scan_result.lines_skipped_due_to_regex_timeout;
        if scan_result.matched {
            summary.files_matched += 1;
        }
        matches.extend(scan_result.matches);
    }

    // Spec §3/§5: results are ordered by (file, line) ascending, stable on
    // insertion index, regardless of which worker slot produced them.
    matches.sort_by(|a, b| a.file.cmp(&b.file).then(a.line.cmp(&b.line)));

    summary.total_matches = matches.len() as u64;
    if matches.len() > max_results {
        matches.truncate(max_results);
        summary.total_matches = matches.len() as u64;
        summary.stopped_reason = Some(StoppedReason::MaxResults);
    }

    Ok((matches, summary))
}

/// Entries filtered down to candidate files for content search, reused by
/// the app-layer use case to turn walker output into scan candidates.
#[must_use]
pub fn candidates_from_entries(base_path: &Path, entries: &[Entry]) -> Vec<SearchCandidate> {
    entries
        .iter()
        .filter(|entry| matches!(entry.entry_type, EntryType::File))
        .map(|entry| SearchCandidate {
            resolved_path: entry.path(),
            display_path: entry
                .path()
                .strip_prefix(base_path)
                .map_or_else(|_| entry.path(), std::path::Path::to_path_buf),
        })
        .collect()
}
