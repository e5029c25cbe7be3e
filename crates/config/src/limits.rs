//! Centralized numeric defaults and hard caps (spec §4, §6).
//!
//! Every magic number the reader, walker, tree/analysis builders, glob
//! search, and content-search engine reference lives here exactly once, so
//! adapters never duplicate a default.

/// Maximum bytes of binary-sniffing sample read by `isProbablyBinary` (§4.3).
pub const BINARY_SNIFF_SAMPLE_BYTES: usize = 8 * 1024;

/// Fraction of non-printable, non-whitespace bytes above which a sample is
/// classified as binary (§4.3).
pub const BINARY_NON_PRINTABLE_THRESHOLD: f64 = 0.30;

/// Maximum length, in bytes, of a single emitted content-search match line
/// (§3 `ContentMatch.content`, §4.8.2).
pub const MAX_LINE_CONTENT_LENGTH: usize = 2_000;

/// Default wall-clock budget, in milliseconds, granted to a single regex
/// match attempt against one line before it is counted as skipped (§4.8.1).
pub const REGEX_MATCH_TIMEOUT_MS: u64 = 100;

/// Default number of content-search worker threads (§4.8.3), when the host
/// does not override it. Falls back to 4 if the platform cannot report
/// available parallelism.
#[must_use]
pub fn default_search_workers() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(4)
        .min(16)
}

/// Worker-pool slot respawn budget before a slot is permanently disabled
/// (§4.8.3).
pub const MAX_RESPAWNS: u32 = 3;

/// Per-worker matcher cache capacity, LRU-trimmed (§4.8.3).
pub const MATCHER_CACHE_CAPACITY: usize = 100;

/// Iteration cap applied to a single regex match pass over one line,
/// expressed as `min(line.len() * 2, REGEX_MAX_ITERATIONS_CEILING)` (§4.8.1).
pub const REGEX_MAX_ITERATIONS_CEILING: usize = 10_000;

/// Nested-quantifier / large-repetition ReDoS shield threshold: any `{n}` or
/// `{n,m}` with `n` at or above this value is rejected (§4.8.1, §8).
pub const REDOS_QUANTIFIER_THRESHOLD: u32 = 25;

/// Default `maxSize` for a full-mode read, in bytes (§4.4).
pub const DEFAULT_READ_MAX_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Hard cap on `maxSize` for any read mode, in bytes (§4.4, §6).
pub const HARD_CAP_READ_MAX_SIZE_BYTES: u64 = 100 * 1024 * 1024;

/// Default `maxTotalSize` budget for a multi-file read, in bytes (§6).
pub const DEFAULT_MAX_TOTAL_SIZE_BYTES: u64 = 100 * 1024 * 1024;

/// Hard cap on `maxFileSize` for checksum computation, in bytes (§6).
pub const HARD_CAP_CHECKSUM_MAX_FILE_SIZE_BYTES: u64 = 1024 * 1024 * 1024;

/// Default `topN` for largest-files / recently-modified heaps (§4.6).
pub const DEFAULT_TOP_N: usize = 10;

/// Default `contextLines` for content search (§4.8.2).
pub const DEFAULT_CONTEXT_LINES: usize = 2;

/// Default `maxResults` for glob search and content search (§4.7, §6).
pub const DEFAULT_MAX_RESULTS: usize = 1_000;

/// Maximum length, in characters, of a glob or content-search pattern
/// (§4.7, §6).
pub const MAX_PATTERN_LENGTH: usize = 1_000;

/// Maximum number of exclude patterns accepted by list/tree/analyze/glob
/// inputs (§6).
pub const MAX_EXCLUDE_PATTERNS: usize = 100;

/// Maximum length, in characters, of a single exclude pattern (§6).
pub const MAX_EXCLUDE_PATTERN_LENGTH: usize = 500;

/// Chunk size used when streaming a file for checksum computation.
pub const CHECKSUM_STREAM_CHUNK_BYTES: usize = 64 * 1024;

/// All tunable limits bundled into a single value, so a process boots with
/// one `Limits::default()` rather than scattered magic numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    /// See [`DEFAULT_READ_MAX_SIZE_BYTES`].
    pub default_read_max_size_bytes: u64,
    /// See [`HARD_CAP_READ_MAX_SIZE_BYTES`].
    pub hard_cap_read_max_size_bytes: u64,
    /// See [`DEFAULT_MAX_TOTAL_SIZE_BYTES`].
    pub default_max_total_size_bytes: u64,
    /// See [`HARD_CAP_CHECKSUM_MAX_FILE_SIZE_BYTES`].
    pub hard_cap_checksum_max_file_size_bytes: u64,
    /// See [`DEFAULT_TOP_N`].
    pub default_top_n: usize,
    /// See [`DEFAULT_CONTEXT_LINES`].
    pub default_context_lines: usize,
    /// See [`DEFAULT_MAX_RESULTS`].
    pub default_max_results: usize,
    /// See [`MAX_PATTERN_LENGTH`].
    pub max_pattern_length: usize,
    /// See [`MAX_EXCLUDE_PATTERNS`].
    pub max_exclude_patterns: usize,
    /// See [`MAX_EXCLUDE_PATTERN_LENGTH`].
    pub max_exclude_pattern_length: usize,
    /// See [`default_search_workers`].
    pub search_workers: usize,
    /// See [`REGEX_MATCH_TIMEOUT_MS`].
    pub regex_match_timeout_ms: u64,
    /// See [`MAX_LINE_CONTENT_LENGTH`].
    pub max_line_content_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            default_read_max_size_bytes: DEFAULT_READ_MAX_SIZE_BYTES,
            hard_cap_read_max_size_bytes: HARD_CAP_READ_MAX_SIZE_BYTES,
            default_max_total_size_bytes: DEFAULT_MAX_TOTAL_SIZE_BYTES,
            hard_cap_checksum_max_file_size_bytes: HARD_CAP_CHECKSUM_MAX_FILE_SIZE_BYTES,
            default_top_n: DEFAULT_TOP_N,
            default_context_lines: DEFAULT_CONTEXT_LINES,
            default_max_results: DEFAULT_MAX_RESULTS,
            max_pattern_length: MAX_PATTERN_LENGTH,
            max_exclude_patterns: MAX_EXCLUDE_PATTERNS,
            max_exclude_pattern_length: MAX_EXCLUDE_PATTERN_LENGTH,
            search_workers: default_search_workers(),
            regex_match_timeout_ms: REGEX_MATCH_TIMEOUT_MS,
            max_line_content_length: MAX_LINE_CONTENT_LENGTH,
        }
    }
}
