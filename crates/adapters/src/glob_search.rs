//! Glob-based file-name search (spec §4.7), built on the bounded walker.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use sandboxfs_domain::{AllowedRoots, EntryType, StoppedReason};
use sandboxfs_ports::FileSystemPort;
use sandboxfs_shared::RequestContext;
use sandboxfs_shared::Result;

use crate::pattern::{to_posix_relative, validate_exclude_patterns, validate_search_pattern, ExcludeMatcher, PatternSet};
use crate::walker::{walk, WalkParams};

/// How matched results should be ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// Lexicographic by relative path.
    Name,
    /// Descending by size (directories sort last).
    Size,
    /// Descending by modification time (directories sort last).
    Modified,
}

/// Options for [`search_files`].
pub struct GlobSearchOptions<'a> {
    /// Maximum number of matches to return.
    pub max_results: usize,
    /// Maximum recursion depth passed to the walker.
    pub max_depth: usize,
    /// Match the pattern against the bare name instead of the relative path.
    pub base_name_match: bool,
    /// When false, symlinks are included as (non-traversed) match
    /// candidates instead of being dropped.
    pub skip_symlinks: bool,
    /// Whether dotfiles are considered at all.
    pub include_hidden: bool,
    /// Result ordering.
    pub sort_by: SortBy,
    /// Additional exclude patterns (distinct from the search pattern).
    pub exclude_patterns: &'a [String],
}

/// A single glob-search match.
#[derive(Debug, Clone)]
pub struct GlobMatch {
    /// Full path of the matched entry.
    pub path: PathBuf,
    /// POSIX-normalized path relative to `basePath`.
    pub relative_path: String,
    /// The entry's type.
    pub entry_type: EntryType,
    /// Size in bytes, when known.
    pub size: Option<u64>,
    /// Modification time, when known.
    pub mtime: Option<SystemTime>,
}

/// The outcome of a glob search.
#[derive(Debug, Clone, Default)]
pub struct GlobSearchOutput {
    /// Matches, already sorted and truncated to `maxResults`.
    pub matches: Vec<GlobMatch>,
    /// Set when the result set was truncated, naming the reason.
    pub stopped_reason: Option<StoppedReason>,
}

const MAX_PATTERN_LENGTH: usize = 1000;
const MAX_EXCLUDE_PATTERNS: usize = 100;
const MAX_EXCLUDE_PATTERN_LENGTH: usize = 500;

/// Runs a glob search rooted at `base_path`, honoring the pre-validation,
/// truncation, and ordering rules of spec §4.7.
pub async fn search_files(
    fs: &dyn FileSystemPort,
    ctx: &RequestContext,
    roots: &AllowedRoots,
    base_path: &Path,
    pattern: &str,
    options: GlobSearchOptions<'_>,
) -> Result<GlobSearchOutput> {
    validate_search_pattern(pattern, MAX_PATTERN_LENGTH)?;
    validate_exclude_patterns(
        options.exclude_patterns,
        MAX_EXCLUDE_PATTERNS,
        MAX_EXCLUDE_PATTERN_LENGTH,
    )?;

    let pattern_set = PatternSet::compile(&[pattern.to_string()])?;
    let exclude = ExcludeMatcher::compile(options.exclude_patterns)?;

    let walk_output = walk(
        fs,
        ctx,
        roots,
        WalkParams {
            base_path: base_path.to_path_buf(),
            max_depth: options.max_depth,
            max_files: usize::MAX,
            include_hidden: options.include_hidden,
            exclude: &exclude,
            only_files: false,
            emit_symlinks: !options.skip_symlinks,
        },
    )
    .await?;

    let mut matches = Vec::new();
    for entry in &walk_output.entries {
        let relative = to_posix_relative(entry.path().strip_prefix(base_path).unwrap_or(&entry.path()));
        let candidate = if options.base_name_match {
            entry.name.as_str()
        } else {
            relative.as_str()
        };
        if !pattern_set.is_match(candidate) {
            continue;
        }
        matches.push(GlobMatch {
            path: entry.path(),
            relative_path: relative,
            entry_type: entry.entry_type,
            size: entry.size,
            mtime: entry.mtime,
        });
    }

    sort_matches(&mut matches, options.sort_by);

    let stopped_reason = if matches.len() > options.max_results {
        matches.truncate(options.max_results);
        Some(StoppedReason::MaxResults)
    } else if walk_output.summary.truncated {
        Some(StoppedReason::MaxFiles)
    } else {
        None
    };

    Ok(GlobSearchOutput {
        matches,
        stopped_reason,
    })
}

fn sort_matches(matches: &mut [GlobMatch], sort_by: SortBy) {
    match sort_by {
        SortBy::Name => matches.sort_by(|left, right| left.relative_path.cmp(&right.relative_path)),
        SortBy::Size => matches.sort_by(|left, right| {
            right.size.unwrap_or(0).cmp(&left.size.unwrap_or(0))
        }),
        SortBy::Modified => matches.sort_by(|left, right| right.mtime.cmp(&left.mtime)),
    }
}
