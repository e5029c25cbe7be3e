//! Integration test exercising the sandbox, walker, and tree/analysis
//! builders together against a real on-disk tree, the way the teacher's
//! `crates/adapters/tests/` suite drives whole adapter pipelines rather
//! than single functions.

use sandboxfs_adapters::pattern::ExcludeMatcher;
use sandboxfs_adapters::{analyze, build_tree, walk, LocalFileSystem, PathSandbox, WalkParams};
use sandboxfs_domain::{AllowedRoots, TopN};
use sandboxfs_shared::RequestContext;

fn write(path: &std::path::Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdir");
    }
    std::fs::write(path, contents).expect("write");
}

#[tokio::test]
async fn walk_tree_and_analysis_agree_on_a_realistic_layout() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let root = temp_dir.path().canonicalize().expect("canonicalize");

    write(&root.join("README.md"), b"# hello\n");
    write(&root.join("src/lib.rs"), b"pub fn run() {}\n");
    write(&root.join("src/nested/deep.rs"), b"// deep\n");
    write(&root.join(".hidden"), b"secret\n");

    let fs = LocalFileSystem::new();
    let sandbox = PathSandbox::new(AllowedRoots::new(vec![root.clone()]), root.clone());
    let ctx = RequestContext::new_request();

    let resolved = sandbox
        .validate_existing_directory(&ctx, &fs, &root.to_string_lossy())
        .await
        .expect("root should validate");

    let exclude = ExcludeMatcher::compile(&[]).expect("empty exclude set compiles");
    let roots = sandbox.allowed_directories();

    let walk_output = walk(
        &fs,
        &ctx,
        &roots,
        WalkParams {
            base_path: resolved.clone(),
            max_depth: usize::MAX,
            max_files: usize::MAX,
            include_hidden: false,
            exclude: &exclude,
            only_files: false,
            emit_symlinks: false,
        },
    )
    .await
    .expect("walk should succeed");

    assert_eq!(walk_output.summary.total_files, 3);
    assert!(walk_output
        .entries
        .iter()
        .all(|entry| entry.name != ".hidden"));

    let tree = build_tree(&resolved, &walk_output.entries, true).expect("tree should build");
    let src = tree
        .children
        .as_ref()
        .expect("root has children")
        .iter()
        .find(|node| node.name == "src")
        .expect("src directory present");
    assert!(src
        .children
        .as_ref()
        .is_some_and(|children| children.iter().any(|node| node.name == "nested")));

    let top_n = TopN::new(10).expect("10 is within bounds");
    let analysis = analyze(&walk_output.entries, top_n, usize::MAX).expect("analysis should build");
    assert_eq!(analysis.total_files, 3);
    assert_eq!(*analysis.extension_counts.get("rs").unwrap_or(&0), 2);
}

#[tokio::test]
async fn walk_refuses_to_cross_the_sandbox_boundary() {
    let allowed = tempfile::tempdir().expect("tempdir");
    let outside = tempfile::tempdir().expect("tempdir");
    write(&outside.path().join("secret.txt"), b"nope");

    let allowed_root = allowed.path().canonicalize().expect("canonicalize");
    let fs = LocalFileSystem::new();
    let sandbox = PathSandbox::new(
        AllowedRoots::new(vec![allowed_root.clone()]),
        allowed_root,
    );
    let ctx = RequestContext::new_request();

    let result = sandbox
        .validate_existing_directory(&ctx, &fs, &outside.path().to_string_lossy())
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn walk_never_follows_symlinked_directories() {
    let root_dir = tempfile::tempdir().expect("tempdir");
    let outside_dir = tempfile::tempdir().expect("tempdir");
    write(&outside_dir.path().join("escaped.txt"), b"should not appear");

    let root = root_dir.path().canonicalize().expect("canonicalize");
    let outside = outside_dir.path().canonicalize().expect("canonicalize");

    #[cfg(unix)]
    std::os::unix::fs::symlink(&outside, root.join("escape")).expect("symlink");
    #[cfg(not(unix))]
    return;

    let fs = LocalFileSystem::new();
    let sandbox = PathSandbox::new(AllowedRoots::new(vec![root.clone()]), root.clone());
    let ctx = RequestContext::new_request();
    let resolved = sandbox
        .validate_existing_directory(&ctx, &fs, &root.to_string_lossy())
        .await
        .expect("root should validate");

    let exclude = ExcludeMatcher::compile(&[]).expect("empty exclude set compiles");
    let roots = sandbox.allowed_directories();
    let walk_output = walk(
        &fs,
        &ctx,
        &roots,
        WalkParams {
            base_path: resolved,
            max_depth: usize::MAX,
            max_files: usize::MAX,
            include_hidden: false,
            exclude: &exclude,
            only_files: false,
            emit_symlinks: false,
        },
    )
    .await
    .expect("walk should succeed");

    assert!(walk_output.summary.symlinks_not_followed >= 1);
    assert!(walk_output
        .entries
        .iter()
        .all(|entry| entry.name != "escaped.txt"));
}
