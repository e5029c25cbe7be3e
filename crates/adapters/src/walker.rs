//! Bounded BFS directory walker (spec §4.5).

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use sandboxfs_domain::{AllowedRoots, Entry, EntryType, WalkSummary};
use sandboxfs_ports::{FileSystemPort, RawFileType};
use sandboxfs_shared::{RequestContext, Result};

use crate::pattern::{to_posix_relative, ExcludeMatcher};

/// Inputs to a single bounded walk.
pub struct WalkParams<'a> {
    /// The directory to start the walk from (already sandbox-validated).
    pub base_path: PathBuf,
    /// Maximum depth to recurse; 0 means "only `base_path` itself".
    pub max_depth: usize,
    /// Stop (and mark truncated) once this many files have been emitted.
    pub max_files: usize,
    /// Whether dotfiles/dot-directories are walked at all.
    pub include_hidden: bool,
    /// Exclude predicate, matched against bare name and POSIX relative path.
    pub exclude: &'a ExcludeMatcher,
    /// When true, directories are traversed but not emitted as entries.
    pub only_files: bool,
    /// When true, symlinks are emitted as non-traversed entries instead of
    /// being counted and dropped (used by glob search's `skipSymlinks:
    /// false`, spec §4.7).
    pub emit_symlinks: bool,
}

/// The result of a bounded walk: the emitted entries plus the summary
/// counters from spec §3/§8.
#[derive(Debug, Clone)]
pub struct WalkOutput {
    /// Entries in discovery (breadth-first) order.
    pub entries: Vec<Entry>,
    /// Accumulated counters.
    pub summary: WalkSummary,
}

struct QueueItem {
    path: PathBuf,
    depth: usize,
}

/// Runs the bounded BFS walk described in spec §4.5 over `fs`, validating
/// every directory's real path against `roots` before descending into it.
pub async fn walk(
    fs: &dyn FileSystemPort,
    ctx: &RequestContext,
    roots: &AllowedRoots,
    params: WalkParams<'_>,
) -> Result<WalkOutput> {
    let mut entries = Vec::new();
    let mut summary = WalkSummary::default();
    let mut queue = VecDeque::new();
    queue.push_back(QueueItem {
        path: params.base_path.clone(),
        depth: 0,
    });

    'outer: while let Some(item) = queue.pop_front() {
        ctx.ensure_not_cancelled("walker.walk")?;

        let raw_entries = match fs.read_dir(ctx, item.path.clone()).await {
            Ok(raw_entries) => raw_entries,
            Err(error) => {
                if error.is_cancelled() {
                    return Err(error);
                }
                summary.skipped_inaccessible += 1;
                continue;
            },
        };

        summary.max_depth_reached = summary.max_depth_reached.max(item.depth);

        for raw in raw_entries {
            ctx.ensure_not_cancelled("walker.walk")?;

            let name = raw.name.to_string_lossy().into_owned();
            let is_hidden = name.starts_with('.');
            if is_hidden && !params.include_hidden {
                continue;
            }

            let child_path = item.path.join(&name);
            let relative = to_posix_relative(
                child_path
                    .strip_prefix(&params.base_path)
                    .unwrap_or(&child_path),
            );
            if params.exclude.matches(&name, &relative) {
                continue;
            }

            match raw.file_type {
                RawFileType::Symlink => {
                    summary.symlinks_not_followed += 1;
                    if params.emit_symlinks {
                        entries.push(Entry {
                            parent_path: item.path.clone(),
                            name,
                            entry_type: EntryType::Symlink,
                            size: None,
                            mtime: None,
                            depth: item.depth,
                        });
                    }
                },
                RawFileType::File => {
                    let (size, mtime) = match fs.metadata(ctx, child_path.clone()).await {
                        Ok(metadata) => (Some(metadata.len), metadata.modified),
                        Err(_) => {
                            summary.skipped_inaccessible += 1;
                            continue;
                        },
                    };
                    entries.push(Entry {
                        parent_path: item.path.clone(),
                        name,
                        entry_type: EntryType::File,
                        size,
                        mtime,
                        depth: item.depth,
                    });
                    summary.total_files += 1;
                    if summary.total_files >= params.max_files {
                        summary.mark_truncated();
                        break 'outer;
                    }
                },
                RawFileType::Directory => {
                    let canonical = match fs.canonicalize(ctx, child_path.clone()).await {
                        Ok(canonical) => canonical,
                        Err(_) => {
                            summary.skipped_inaccessible += 1;
                            continue;
                        },
                    };
                    if !roots.contains_prefix_of(&canonical) {
                        summary.symlinks_not_followed += 1;
                        continue;
                    }

                    if !params.only_files {
                        entries.push(Entry {
                            parent_path: item.path.clone(),
                            name,
                            entry_type: EntryType::Directory,
                            size: None,
                            mtime: None,
                            depth: item.depth,
                        });
                    }
                    summary.total_directories += 1;

                    if item.depth + 1 <= params.max_depth {
                        queue.push_back(QueueItem {
                            path: child_path,
                            depth: item.depth + 1,
                        });
                    } else {
                        summary.mark_truncated();
                    }
                },
                RawFileType::Other => {
                    summary.skipped_inaccessible += 1;
                },
            }
        }
    }

    Ok(WalkOutput { entries, summary })
}

/// Returns the bare file name of `path` as a POSIX string for display; used
/// by callers building user-facing listings from walk entries.
#[must_use]
pub fn relative_display_path(base: &Path, entry: &Entry) -> String {
    to_posix_relative(entry.path().strip_prefix(base).unwrap_or(&entry.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_fs::LocalFileSystem;
    use sandboxfs_shared::RequestContext;

    fn roots_for(path: &Path) -> AllowedRoots {
        AllowedRoots::new(vec![path.to_path_buf()])
    }

    #[tokio::test]
    async fn walk_counts_files_and_directories() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp_dir.path().join("a.txt"), b"a").expect("write");
        std::fs::create_dir(temp_dir.path().join("sub")).expect("mkdir");
        std::fs::write(temp_dir.path().join("sub/b.txt"), b"b").expect("write");

        let fs = LocalFileSystem::new();
        let ctx = RequestContext::new_request();
        let roots = roots_for(
            &temp_dir
                .path()
                .canonicalize()
                .expect("canonicalize tempdir"),
        );
        let exclude = ExcludeMatcher::none();
        let output = walk(
            &fs,
            &ctx,
            &roots,
            WalkParams {
                base_path: temp_dir.path().to_path_buf(),
                max_depth: 10,
                max_files: 1000,
                include_hidden: false,
                exclude: &exclude,
                only_files: false,
                emit_symlinks: false,
            },
        )
        .await
        .expect("walk");

        assert_eq!(output.summary.total_files, 2);
        assert_eq!(output.summary.total_directories, 1);
        assert!(!output.summary.truncated);
    }

    #[tokio::test]
    async fn walk_skips_hidden_entries_by_default() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp_dir.path().join(".hidden"), b"x").expect("write");
        std::fs::write(temp_dir.path().join("visible.txt"), b"y").expect("write");

        let fs = LocalFileSystem::new();
        let ctx = RequestContext::new_request();
        let roots = roots_for(&temp_dir.path().canonicalize().expect("canon"));
        let exclude = ExcludeMatcher::none();
        let output = walk(
            &fs,
            &ctx,
            &roots,
            WalkParams {
                base_path: temp_dir.path().to_path_buf(),
                max_depth: 10,
                max_files: 1000,
                include_hidden: false,
                exclude: &exclude,
                only_files: false,
                emit_symlinks: false,
            },
        )
        .await
        .expect("walk");

        assert_eq!(output.summary.total_files, 1);
        assert_eq!(output.entries[0].name, "visible.txt");
    }

    #[tokio::test]
    async fn walk_respects_max_depth() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let nested = temp_dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).expect("mkdir_all");
        std::fs::write(nested.join("deep.txt"), b"deep").expect("write");

        let fs = LocalFileSystem::new();
        let ctx = RequestContext::new_request();
        let roots = roots_for(&temp_dir.path().canonicalize().expect("canon"));
        let exclude = ExcludeMatcher::none();
        let output = walk(
            &fs,
            &ctx,
            &roots,
            WalkParams {
                base_path: temp_dir.path().to_path_buf(),
                max_depth: 1,
                max_files: 1000,
                include_hidden: false,
                exclude: &exclude,
                only_files: false,
                emit_symlinks: false,
            },
        )
        .await
        .expect("walk");

        assert!(output.summary.truncated);
        assert_eq!(output.summary.total_files, 0);
    }

    #[tokio::test]
    async fn walk_stops_at_max_files_and_marks_truncated() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        for index in 0..5 {
            std::fs::write(temp_dir.path().join(format!("f{index}.txt")), b"x").expect("write");
        }

        let fs = LocalFileSystem::new();
        let ctx = RequestContext::new_request();
        let roots = roots_for(&temp_dir.path().canonicalize().expect("canon"));
        let exclude = ExcludeMatcher::none();
        let output = walk(
            &fs,
            &ctx,
            &roots,
            WalkParams {
                base_path: temp_dir.path().to_path_buf(),
                max_depth: 10,
                max_files: 2,
                include_hidden: false,
                exclude: &exclude,
                only_files: false,
                emit_symlinks: false,
            },
        )
        .await
        .expect("walk");

        assert_eq!(output.summary.total_files, 2);
        assert!(output.summary.truncated);
    }

    #[tokio::test]
    async fn walk_excludes_by_glob_pattern() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp_dir.path().join("keep.rs"), b"x").expect("write");
        std::fs::write(temp_dir.path().join("drop.log"), b"y").expect("write");

        let fs = LocalFileSystem::new();
        let ctx = RequestContext::new_request();
        let roots = roots_for(&temp_dir.path().canonicalize().expect("canon"));
        let exclude = ExcludeMatcher::compile(&["*.log".to_string()]).expect("compile");
        let output = walk(
            &fs,
            &ctx,
            &roots,
            WalkParams {
                base_path: temp_dir.path().to_path_buf(),
                max_depth: 10,
                max_files: 1000,
                include_hidden: false,
                exclude: &exclude,
                only_files: false,
                emit_symlinks: false,
            },
        )
        .await
        .expect("walk");

        assert_eq!(output.summary.total_files, 1);
        assert_eq!(output.entries[0].name, "keep.rs");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn walk_does_not_follow_symlinks() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let target = temp_dir.path().join("target.txt");
        std::fs::write(&target, b"x").expect("write");
        std::os::unix::fs::symlink(&target, temp_dir.path().join("link.txt")).expect("symlink");

        let fs = LocalFileSystem::new();
        let ctx = RequestContext::new_request();
        let roots = roots_for(&temp_dir.path().canonicalize().expect("canon"));
        let exclude = ExcludeMatcher::none();
        let output = walk(
            &fs,
            &ctx,
            &roots,
            WalkParams {
                base_path: temp_dir.path().to_path_buf(),
                max_depth: 10,
                max_files: 1000,
                include_hidden: false,
                exclude: &exclude,
                only_files: false,
                emit_symlinks: false,
            },
        )
        .await
        .expect("walk");

        assert_eq!(output.summary.total_files, 1);
        assert_eq!(output.summary.symlinks_not_followed, 1);
    }
}
