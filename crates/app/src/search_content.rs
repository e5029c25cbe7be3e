//! Content search use case (§4.8, §6 "Content search").

use std::sync::Arc;
use std::time::Duration;

use sandboxfs_adapters::pattern::ExcludeMatcher;
use sandboxfs_adapters::{
    candidates_from_entries, search_content as run_search, walk, Matcher, MatcherOptions, ScanOptions,
    WalkParams,
};
use sandboxfs_domain::{ContentMatch, ContentSearchSummary, ContextLines, ResultBudget};
use sandboxfs_shared::{RequestContext, Result};

use crate::bounded::clamp_bounded;
use crate::deps::Deps;
use crate::instrumentation::instrument;

const OP: &str = "search_content";

/// Request payload for [`search_content`].
#[derive(Debug, Clone, Default)]
pub struct SearchContentInput {
    /// The directory the search is rooted at.
    pub path: String,
    /// The pattern to search for (literal or regex, per `is_literal`).
    pub pattern: String,
    /// Glob restricting which file names are scanned; `None` scans all.
    pub file_pattern: Option<String>,
    /// Additional exclude glob patterns applied during the walk.
    pub exclude_patterns: Vec<String>,
    /// Case-insensitive matching.
    pub case_sensitive: bool,
    /// Wrap the pattern in word boundaries.
    pub whole_word: bool,
    /// Treat `pattern` as a literal string rather than a regex.
    pub is_literal: bool,
    /// Lines of context retained before/after a match.
    pub context_lines: Option<usize>,
    /// Maximum number of matches to return.
    pub max_results: Option<usize>,
    /// Files larger than this are skipped rather than scanned.
    pub max_file_size: Option<u64>,
    /// Caps how many candidate files the walk will surface.
    pub max_files_scanned: Option<usize>,
    /// Per-line regex match budget, in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Probe each candidate for binary content and skip if so.
    pub skip_binary: bool,
    /// Whether dotfiles are considered at all.
    pub include_hidden: bool,
    /// Reserved: match `file_pattern` against the bare file name.
    pub base_name_match: bool,
    /// Reserved: case sensitivity for `file_pattern` itself.
    pub case_sensitive_file_match: bool,
}

/// The outcome of a content search: matches plus aggregate counters.
#[derive(Debug, Clone)]
pub struct SearchContentOutput {
    /// Matches, already trimmed to `maxResults`.
    pub matches: Vec<ContentMatch>,
    /// Aggregate scan counters and truncation reason.
    pub summary: ContentSearchSummary,
}

/// Walks `path`, filters candidates by `file_pattern`, and scans each for
/// occurrences of `pattern`, bounded by `max_results`/`max_file_size`.
pub async fn search_content(
    ctx: &RequestContext,
    deps: &Deps,
    input: SearchContentInput,
) -> Result<SearchContentOutput> {
    instrument(
        deps.diagnostics.as_ref(),
        deps.clock.as_ref(),
        OP,
        Some(std::path::Path::new(&input.path)),
        async {
            let resolved = deps
                .sandbox
                .validate_existing_directory(ctx, deps.fs.as_ref(), &input.path)
                .await?;
            let exclude = ExcludeMatcher::compile(&input.exclude_patterns)?;
            let roots = deps.sandbox.allowed_directories();

            let max_files: ResultBudget =
                clamp_bounded(input.max_files_scanned.unwrap_or(usize::MAX));
            let walk_output = walk(
                deps.fs.as_ref(),
                ctx,
                &roots,
                WalkParams {
                    base_path: resolved.clone(),
                    max_depth: usize::MAX,
                    max_files: max_files.get(),
                    include_hidden: input.include_hidden,
                    exclude: &exclude,
                    only_files: true,
                    emit_symlinks: false,
                },
            )
            .await?;

            let mut candidates = candidates_from_entries(&resolved, &walk_output.entries);
            if let Some(file_pattern) = &input.file_pattern {
                let pattern_set = sandboxfs_adapters::pattern::PatternSet::compile(&[file_pattern.clone()])?;
                candidates.retain(|candidate| {
                    let name = candidate
                        .display_path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let relative = sandboxfs_adapters::pattern::to_posix_relative(&candidate.display_path);
                    let haystack = if input.base_name_match { &name } else { &relative };
                    pattern_set.is_match(haystack)
                });
            }

            let matcher = Matcher::compile(
                &input.pattern,
                &MatcherOptions {
                    case_insensitive: !input.case_sensitive,
                    whole_word: input.whole_word,
                    is_literal: input.is_literal,
                    regex_timeout: Duration::from_millis(
                        input.timeout_ms.unwrap_or(deps.limits.regex_match_timeout_ms),
                    ),
                },
            )?;

            let context_lines: ContextLines =
                clamp_bounded(input.context_lines.unwrap_or(deps.limits.default_context_lines));
            let max_results: ResultBudget =
                clamp_bounded(input.max_results.unwrap_or(deps.limits.default_max_results));

            let scan_options = ScanOptions {
                max_file_size: input
                    .max_file_size
                    .unwrap_or(deps.limits.default_read_max_size_bytes)
                    .min(deps.limits.hard_cap_read_max_size_bytes),
                skip_binary: input.skip_binary,
                context_lines: context_lines.get(),
                max_line_content_length: deps.limits.max_line_content_length,
            };

            let (matches, summary) = run_search(
                Arc::clone(&deps.fs),
                ctx,
                candidates,
                matcher,
                scan_options,
                max_results.get(),
                deps.limits.search_workers,
            )
            .await?;

            Ok(SearchContentOutput { matches, summary })
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_a_literal_match_and_counts_files_scanned() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp_dir.path().join("a.txt"), b"needle in a haystack\n").expect("write");
        std::fs::write(temp_dir.path().join("b.txt"), b"nothing here\n").expect("write");

        let deps = crate::test_support::deps_for(
            &temp_dir.path().canonicalize().expect("canonicalize"),
        );
        let ctx = RequestContext::new_request();
        let output = search_content(
            &ctx,
            &deps,
            SearchContentInput {
                path: temp_dir.path().to_string_lossy().into_owned(),
                pattern: "needle".to_string(),
                is_literal: true,
                case_sensitive: true,
                ..Default::default()
            },
        )
        .await
        .expect("search should succeed");

        assert_eq!(output.matches.len(), 1);
        assert_eq!(output.summary.files_scanned, 2);
        assert_eq!(output.summary.files_matched, 1);
    }

    #[tokio::test]
    async fn file_pattern_restricts_which_files_are_scanned() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp_dir.path().join("a.rs"), b"needle\n").expect("write");
        std::fs::write(temp_dir.path().join("b.txt"), b"needle\n").expect("write");

        let deps = crate::test_support::deps_for(
            &temp_dir.path().canonicalize().expect("canonicalize"),
        );
        let ctx = RequestContext::new_request();
        let output = search_content(
            &ctx,
            &deps,
            SearchContentInput {
                path: temp_dir.path().to_string_lossy().into_owned(),
                pattern: "needle".to_string(),
                file_pattern: Some("*.rs".to_string()),
                is_literal: true,
                case_sensitive: true,
                ..Default::default()
            },
        )
        .await
        .expect("search should succeed");

        assert_eq!(output.summary.files_scanned, 1);
        assert_eq!(output.matches.len(), 1);
    }
}
