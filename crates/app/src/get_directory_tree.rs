//! Directory tree use case (§4.6 "Tree builder", §6 "List/tree/analyze").

use sandboxfs_adapters::pattern::ExcludeMatcher;
use sandboxfs_adapters::{build_tree, walk, WalkParams};
use sandboxfs_domain::{Depth, ResultBudget, TreeNode, WalkSummary};
use sandboxfs_shared::{RequestContext, Result};

use crate::bounded::clamp_bounded;
use crate::deps::Deps;
use crate::instrumentation::instrument;

const OP: &str = "get_directory_tree";

/// Request payload for [`get_directory_tree`].
#[derive(Debug, Clone, Default)]
pub struct GetDirectoryTreeInput {
    /// The directory to materialize.
    pub path: String,
    /// Whether dotfiles/dot-directories are included at all.
    pub include_hidden: bool,
    /// Exclude glob patterns, matched against bare name or relative path.
    pub exclude_patterns: Vec<String>,
    /// Recursion depth cap; `0` returns only the root's direct children.
    pub max_depth: usize,
    /// Stop once this many files have been visited.
    pub max_files: Option<usize>,
    /// Whether file sizes are attached to leaf nodes.
    pub include_size: bool,
}

/// The outcome of a tree build: the nested node plus the walk's summary.
#[derive(Debug, Clone)]
pub struct GetDirectoryTreeOutput {
    /// The materialized tree, rooted at the requested path.
    pub tree: TreeNode,
    /// The underlying walk's accumulated counters.
    pub summary: WalkSummary,
}

/// Builds a nested directory tree bounded by `maxDepth`/`maxFiles`.
pub async fn get_directory_tree(
    ctx: &RequestContext,
    deps: &Deps,
    input: GetDirectoryTreeInput,
) -> Result<GetDirectoryTreeOutput> {
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
            let max_files: ResultBudget = clamp_bounded(input.max_files.unwrap_or(usize::MAX));

            let walk_output = walk(
                deps.fs.as_ref(),
                ctx,
                &roots,
                WalkParams {
                    base_path: resolved.clone(),
                    max_depth: max_depth.get(),
                    max_files: max_files.get(),
                    include_hidden: input.include_hidden,
                    exclude: &exclude,
                    only_files: false,
                    emit_symlinks: false,
                },
            )
            .await?;

            let tree = build_tree(&resolved, &walk_output.entries, input.include_size)?;
            Ok(GetDirectoryTreeOutput {
                tree,
                summary: walk_output.summary,
            })
        },
    )
    .await
}
