//! Glob file search use case (§4.7, §6 "Glob search").

use sandboxfs_adapters::{search_files as run_search, GlobSearchOptions, GlobSearchOutput, SortBy};
use sandboxfs_domain::{Depth, ResultBudget};
use sandboxfs_shared::{RequestContext, Result};

use crate::bounded::clamp_bounded;
use crate::deps::Deps;
use crate::instrumentation::instrument;

const OP: &str = "search_files";

/// Request payload for [`search_files`].
#[derive(Debug, Clone, Default)]
pub struct SearchFilesInput {
    /// The directory the search is rooted at.
    pub path: String,
    /// The glob pattern to match.
    pub pattern: String,
    /// Additional exclude glob patterns.
    pub exclude_patterns: Vec<String>,
    /// Maximum number of matches to return.
    pub max_results: Option<usize>,
    /// Maximum recursion depth.
    pub max_depth: Option<usize>,
    /// Match against the bare name instead of the relative path.
    pub base_name_match: bool,
    /// Reserved for case-sensitivity control; matching is always
    /// case-sensitive today, mirroring the underlying glob engine.
    pub case_sensitive_match: bool,
    /// Whether dotfiles are considered at all.
    pub include_hidden: bool,
    /// Drop symlinks from candidates instead of including them unresolved.
    pub skip_symlinks: bool,
    /// Result ordering.
    pub sort_by: SearchFilesSortBy,
}

/// Wire-level sort selector for [`SearchFilesInput`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchFilesSortBy {
    /// Lexicographic by relative path.
    #[default]
    Name,
    /// Descending by size.
    Size,
    /// Descending by modification time.
    Modified,
}

impl From<SearchFilesSortBy> for SortBy {
    fn from(value: SearchFilesSortBy) -> Self {
        match value {
            SearchFilesSortBy::Name => Self::Name,
            SearchFilesSortBy::Size => Self::Size,
            SearchFilesSortBy::Modified => Self::Modified,
        }
    }
}

/// Searches `path` for entries whose name or relative path matches `pattern`.
pub async fn search_files(
    ctx: &RequestContext,
    deps: &Deps,
    input: SearchFilesInput,
) -> Result<GlobSearchOutput> {
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
            let roots = deps.sandbox.allowed_directories();

            let max_depth: Depth = clamp_bounded(input.max_depth.unwrap_or(usize::MAX));
            let max_results: ResultBudget = clamp_bounded(
                input
                    .max_results
                    .unwrap_or(deps.limits.default_max_results),
            );

            run_search(
                deps.fs.as_ref(),
                ctx,
                &roots,
                &resolved,
                &input.pattern,
                GlobSearchOptions {
                    max_results: max_results.get(),
                    max_depth: max_depth.get(),
                    base_name_match: input.base_name_match,
                    skip_symlinks: input.skip_symlinks,
                    include_hidden: input.include_hidden,
                    sort_by: input.sort_by.into(),
                    exclude_patterns: &input.exclude_patterns,
                },
            )
            .await
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn matches_entries_by_extension() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp_dir.path().join("a.rs"), b"x").expect("write");
        std::fs::write(temp_dir.path().join("b.txt"), b"y").expect("write");

        let deps = crate::test_support::deps_for(
            &temp_dir.path().canonicalize().expect("canonicalize"),
        );
        let ctx = RequestContext::new_request();
        let output = search_files(
            &ctx,
            &deps,
            SearchFilesInput {
                path: temp_dir.path().to_string_lossy().into_owned(),
                pattern: "*.rs".to_string(),
                ..Default::default()
            },
        )
        .await
        .expect("search should succeed");

        assert_eq!(output.matches.len(), 1);
        assert_eq!(output.matches[0].relative_path, "a.rs");
    }
}
