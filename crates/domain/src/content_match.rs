//! Content-search result types (spec §3, §4.8).

use std::path::PathBuf;

/// A single content-search match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMatch {
    /// The file the match was found in.
    pub file: PathBuf,
    /// 1-indexed line number.
    pub line: u64,
    /// Trimmed, length-capped line content (matching itself used the raw
    /// line; this is only the emitted, display-safe copy).
    pub content: String,
    /// Lines preceding the match, oldest first, when context was requested.
    pub context_before: Vec<String>,
    /// Lines following the match, in order, when context was requested.
    pub context_after: Vec<String>,
    /// Number of occurrences of the pattern on this line.
    pub match_count: u32,
}

/// Per-file scan outcome (spec §4.8.2).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileScanResult {
    /// Matches found in the file, in line order.
    pub matches: Vec<ContentMatch>,
    /// Whether any match was found.
    pub matched: bool,
    /// The file was skipped for exceeding `maxFileSize`.
    pub skipped_too_large: bool,
    /// The file was skipped because it probed as binary.
    pub skipped_binary: bool,
    /// Number of lines skipped because the regex matcher's budget was
    /// exceeded on them.
    pub lines_skipped_due_to_regex_timeout: u64,
}

/// Aggregate counters returned alongside a content search (spec §6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentSearchSummary {
    /// Files that were opened and scanned.
    pub files_scanned: u64,
    /// Files that produced at least one match.
    pub files_matched: u64,
    /// Total number of matches across all files.
    pub total_matches: u64,
    /// Files skipped for exceeding `maxFileSize`.
    pub skipped_too_large: u64,
    /// Files skipped because they probed as binary.
    pub skipped_binary: u64,
    /// Lines skipped across all files due to regex budget exhaustion.
    pub lines_skipped_due_to_regex_timeout: u64,
    /// Why the scan stopped early, if it did.
    pub stopped_reason: Option<super::entry::StoppedReason>,
}
