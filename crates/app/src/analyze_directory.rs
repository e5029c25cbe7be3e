//! Directory analysis use case (§4.6 "Analysis builder", §6 "List/tree/analyze").

use sandboxfs_adapters::pattern::ExcludeMatcher;
use sandboxfs_adapters::{analyze, walk, DirectoryAnalysis, WalkParams};
use sandboxfs_domain::{Depth, ResultBudget};
use sandboxfs_shared::{RequestContext, Result};

use crate::bounded::clamp_bounded;
use crate::deps::Deps;
use crate::instrumentation::instrument;

const OP: &str = "analyze_directory";

/// Request payload for [`analyze_directory`].
#[derive(Debug, Clone, Default)]
pub struct AnalyzeDirectoryInput {
    /// The directory to analyze.
    pub path: String,
    /// Whether dotfiles/dot-directories are included at all.
    pub include_hidden: bool,
    /// Exclude glob patterns, matched against bare name or relative path.
    pub exclude_patterns: Vec<String>,
    /// Recursion depth cap.
    pub max_depth: usize,
    /// Caps the combined files+directories considered.
    pub max_entries: Option<usize>,
    /// Size of the largest-files / recently-modified ranked heaps.
    pub top_n: Option<usize>,
}

/// Walks `path` and aggregates it into a [`DirectoryAnalysis`].
pub async fn analyze_directory(
    ctx: &RequestContext,
    deps: &Deps,
    input: AnalyzeDirectoryInput,
) -> Result<DirectoryAnalysis> {
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

            let max_depth: Depth = clamp_bounded(input.max_depth);
            let max_entries: ResultBudget = clamp_bounded(input.max_entries.unwrap_or(usize::MAX));

            let walk_output = walk(
                deps.fs.as_ref(),
                ctx,
                &roots,
                WalkParams {
                    base_path: resolved.clone(),
                    max_depth: max_depth.get(),
                    max_files: usize::MAX,
                    include_hidden: input.include_hidden,
                    exclude: &exclude,
                    only_files: false,
                    emit_symlinks: false,
                },
            )
            .await?;

            let top_n = clamp_bounded(input.top_n.unwrap_or(deps.limits.default_top_n));
            analyze(&walk_output.entries, top_n, max_entries.get())
        },
    )
    .await
}
