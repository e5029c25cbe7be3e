//! Directory listing use case (§4.5, §6 "List/tree/analyze").

use sandboxfs_adapters::pattern::ExcludeMatcher;
use sandboxfs_adapters::{walk, WalkOutput, WalkParams};
use sandboxfs_domain::{Depth, ResultBudget};
use sandboxfs_shared::{RequestContext, Result};

use crate::bounded::clamp_bounded;
use crate::deps::Deps;
use crate::instrumentation::instrument;

const OP: &str = "list_directory";

/// Request payload for [`list_directory`].
#[derive(Debug, Clone, Default)]
pub struct ListDirectoryInput {
    /// The directory to list.
    pub path: String,
    /// When false, only immediate children are listed (depth 0).
    pub recursive: bool,
    /// Whether dotfiles/dot-directories are included at all.
    pub include_hidden: bool,
    /// Exclude glob patterns, matched against bare name or relative path.
    pub exclude_patterns: Vec<String>,
    /// Recursion depth cap, honored only when `recursive` is set.
    pub max_depth: Option<usize>,
    /// Stop once this many files have been emitted.
    pub max_files: Option<usize>,
}

/// Lists a directory's contents, bounded per [`WalkParams`].
pub async fn list_directory(ctx: &RequestContext, deps: &Deps, input: ListDirectoryInput) -> Result<WalkOutput> {
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

            let max_depth: Depth = if input.recursive {
                clamp_bounded(input.max_depth.unwrap_or(usize::MAX))
            } else {
                clamp_bounded(0)
            };
            let max_files: ResultBudget = clamp_bounded(input.max_files.unwrap_or(usize::MAX));

            walk(
                deps.fs.as_ref(),
                ctx,
                &roots,
                WalkParams {
                    base_path: resolved,
                    max_depth: max_depth.get(),
                    max_files: max_files.get(),
                    include_hidden: input.include_hidden,
                    exclude: &exclude,
                    only_files: false,
                    emit_symlinks: false,
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
    async fn non_recursive_list_ignores_nested_files() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp_dir.path().join("top.txt"), b"x").expect("write");
        std::fs::create_dir(temp_dir.path().join("nested")).expect("mkdir");
        std::fs::write(temp_dir.path().join("nested/deep.txt"), b"y").expect("write");

        let deps = crate::test_support::deps_for(
            &temp_dir.path().canonicalize().expect("canonicalize"),
        );
        let ctx = RequestContext::new_request();
        let output = list_directory(
            &ctx,
            &deps,
            ListDirectoryInput {
                path: temp_dir.path().to_string_lossy().into_owned(),
                recursive: false,
                ..Default::default()
            },
        )
        .await
        .expect("list should succeed");

        assert_eq!(output.entries.len(), 2);
    }

    #[tokio::test]
    async fn recursive_list_honors_max_depth() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(temp_dir.path().join("a")).expect("mkdir");
        std::fs::write(temp_dir.path().join("a/file.txt"), b"x").expect("write");

        let deps = crate::test_support::deps_for(
            &temp_dir.path().canonicalize().expect("canonicalize"),
        );
        let ctx = RequestContext::new_request();
        let output = list_directory(
            &ctx,
            &deps,
            ListDirectoryInput {
                path: temp_dir.path().to_string_lossy().into_owned(),
                recursive: true,
                max_depth: Some(0),
                ..Default::default()
            },
        )
        .await
        .expect("list should succeed");

        assert!(output.entries.iter().all(|entry| entry.name != "file.txt"));
    }
}
