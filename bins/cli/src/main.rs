//! Thin bootstrap binary for the sandboxfs core.
//!
//! Per spec.md §1, the CLI/bootstrap is an external collaborator's
//! concern, so this stays deliberately thin: it parses allowed roots and
//! one subcommand's input from argv, wires a [`Deps`] bundle over the real
//! filesystem, dispatches a single `sandboxfs-app` use case, and prints the
//! result as JSON. No subcommand help catalog, no shell completions, no
//! human-friendly formatters.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use sandboxfs_adapters::local_fs::LocalFileSystem;
use sandboxfs_adapters::{PathSandbox, TracingDiagnosticsSink};
use sandboxfs_app::{
    analyze_directory, compute_checksum, get_directory_tree, get_file_info, list_directory,
    read_file, read_multiple_files, search_content, search_files, AnalyzeDirectoryInput,
    ChecksumAlgorithm, ChecksumEncoding, ComputeChecksumInput, Deps, GetDirectoryTreeInput,
    GetFileInfoInput, ListDirectoryInput, ReadFileInput, ReadMultipleFilesInput,
    SearchContentInput, SearchFilesInput, SearchFilesSortBy,
};
use sandboxfs_config::{bootstrap_allowed_roots, DiagnosticsConfig, Limits};
use sandboxfs_ports::SystemClock;
use sandboxfs_shared::{ErrorEnvelope, RequestContext};

#[derive(Debug, Parser)]
#[command(name = "sandboxfs", version, about = "Sandboxed filesystem-access core bootstrap")]
struct Cli {
    /// Directory the sandbox is allowed to operate in; may be repeated.
    #[arg(long = "allow", required = true, global = true)]
    allow: Vec<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read a single file (§4.4).
    ReadFile {
        path: String,
        #[arg(long)]
        head: Option<u64>,
        #[arg(long)]
        tail: Option<u64>,
        #[arg(long, value_names = ["START", "END"], num_args = 2)]
        line_range: Option<Vec<u64>>,
        #[arg(long)]
        max_size: Option<u64>,
        #[arg(long)]
        skip_binary: bool,
    },
    /// Read several files against a shared size budget (§6 "Multi-read").
    ReadMultipleFiles {
        paths: Vec<String>,
        #[arg(long)]
        max_total_size: Option<u64>,
    },
    /// List a directory's contents (§4.5).
    ListDirectory {
        path: String,
        #[arg(long)]
        recursive: bool,
        #[arg(long)]
        include_hidden: bool,
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Materialize a nested directory tree (§4.6).
    GetDirectoryTree {
        path: String,
        #[arg(long, default_value_t = 5)]
        max_depth: usize,
        #[arg(long)]
        include_hidden: bool,
        #[arg(long)]
        include_size: bool,
    },
    /// Aggregate directory statistics (§4.6).
    AnalyzeDirectory {
        path: String,
        #[arg(long, default_value_t = 5)]
        max_depth: usize,
        #[arg(long)]
        top_n: Option<usize>,
    },
    /// Glob-based file-name search (§4.7).
    SearchFiles {
        path: String,
        pattern: String,
        #[arg(long)]
        max_results: Option<usize>,
    },
    /// Regex/literal content search (§4.8).
    SearchContent {
        path: String,
        pattern: String,
        #[arg(long)]
        is_literal: bool,
        #[arg(long)]
        case_sensitive: bool,
        #[arg(long)]
        max_results: Option<usize>,
    },
    /// Stat a path and probe its binary/MIME classification (§10.6).
    GetFileInfo { path: String },
    /// Compute a file's checksum (§6 "Checksums").
    ComputeChecksum {
        path: String,
        #[arg(long, default_value = "sha256")]
        algorithm: String,
        #[arg(long, default_value = "hex")]
        encoding: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("error: failed to start runtime: {error}");
            return ExitCode::FAILURE;
        },
    };

    match runtime.block_on(run(cli)) {
        Ok(value) => {
            println!("{value:#}");
            ExitCode::SUCCESS
        },
        Err(error) => {
            let payload = json!({ "ok": false, "error": error });
            eprintln!("{payload:#}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<Value, ErrorEnvelope> {
    let roots = bootstrap_allowed_roots(&cli.allow)?;
    let base_dir = std::env::current_dir().map_err(ErrorEnvelope::from)?;

    let deps = Deps {
        fs: Arc::new(LocalFileSystem::new()),
        sandbox: Arc::new(PathSandbox::new(roots, base_dir)),
        diagnostics: Arc::new(TracingDiagnosticsSink::new(DiagnosticsConfig::from_env())),
        clock: Arc::new(SystemClock),
        limits: Limits::default(),
    };
    let ctx = RequestContext::new_request();

    match cli.command {
        Command::ReadFile {
            path,
            head,
            tail,
            line_range,
            max_size,
            skip_binary,
        } => {
            let line_range = match line_range.as_deref() {
                Some([start, end]) => Some((*start, *end)),
                _ => None,
            };
            let outcome = read_file(
                &ctx,
                &deps,
                ReadFileInput {
                    path,
                    encoding: None,
                    max_size,
                    head,
                    tail,
                    line_range,
                    skip_binary,
                },
            )
            .await?;
            Ok(json!({
                "ok": true,
                "content": outcome.content,
                "truncated": outcome.truncated,
                "hasMoreLines": outcome.has_more_lines,
            }))
        },
        Command::ReadMultipleFiles { paths, max_total_size } => {
            let items = read_multiple_files(
                &ctx,
                &deps,
                ReadMultipleFilesInput {
                    paths,
                    options: ReadFileInput::default(),
                    max_total_size,
                },
            )
            .await?;
            let rendered: Vec<Value> = items
                .into_iter()
                .map(|item| match item.outcome {
                    Ok(outcome) => json!({
                        "path": item.path,
                        "ok": true,
                        "content": outcome.content,
                        "truncated": outcome.truncated,
                    }),
                    Err(error) => json!({
                        "path": item.path,
                        "ok": false,
                        "error": error,
                    }),
                })
                .collect();
            Ok(json!({ "ok": true, "items": rendered }))
        },
        Command::ListDirectory {
            path,
            recursive,
            include_hidden,
            max_depth,
        } => {
            let output = list_directory(
                &ctx,
                &deps,
                ListDirectoryInput {
                    path,
                    recursive,
                    include_hidden,
                    exclude_patterns: Vec::new(),
                    max_depth,
                    max_files: None,
                },
            )
            .await?;
            let entries: Vec<Value> = output
                .entries
                .iter()
                .map(|entry| {
                    json!({
                        "name": entry.name,
                        "path": entry.path().to_string_lossy(),
                        "type": format!("{:?}", entry.entry_type),
                        "size": entry.size,
                        "depth": entry.depth,
                    })
                })
                .collect();
            Ok(json!({
                "ok": true,
                "entries": entries,
                "summary": summary_json(&output.summary),
            }))
        },
        Command::GetDirectoryTree {
            path,
            max_depth,
            include_hidden,
            include_size,
        } => {
            let output = get_directory_tree(
                &ctx,
                &deps,
                GetDirectoryTreeInput {
                    path,
                    include_hidden,
                    exclude_patterns: Vec::new(),
                    max_depth,
                    max_files: None,
                    include_size,
                },
            )
            .await?;
            Ok(json!({
                "ok": true,
                "tree": tree_json(&output.tree),
                "summary": summary_json(&output.summary),
            }))
        },
        Command::AnalyzeDirectory { path, max_depth, top_n } => {
            let analysis = analyze_directory(
                &ctx,
                &deps,
                AnalyzeDirectoryInput {
                    path,
                    include_hidden: false,
                    exclude_patterns: Vec::new(),
                    max_depth,
                    max_entries: None,
                    top_n,
                },
            )
            .await?;
            Ok(json!({
                "ok": true,
                "totalFiles": analysis.total_files,
                "totalDirectories": analysis.total_directories,
                "totalSize": analysis.total_size,
                "extensionCounts": analysis.extension_counts,
                "truncated": analysis.truncated,
                "largestFiles": analysis.largest_files.iter().map(|file| json!({
                    "path": file.path.to_string_lossy(),
                    "size": file.size,
                })).collect::<Vec<_>>(),
            }))
        },
        Command::SearchFiles { path, pattern, max_results } => {
            let output = search_files(
                &ctx,
                &deps,
                SearchFilesInput {
                    path,
                    pattern,
                    exclude_patterns: Vec::new(),
                    max_results,
                    max_depth: None,
                    base_name_match: false,
                    case_sensitive_match: true,
                    include_hidden: false,
                    skip_symlinks: true,
                    sort_by: SearchFilesSortBy::Name,
                },
            )
            .await?;
            let matches: Vec<Value> = output
                .matches
                .iter()
                .map(|item| {
                    json!({
                        "relativePath": item.relative_path,
                        "type": format!("{:?}", item.entry_type),
                        "size": item.size,
                    })
                })
                .collect();
            Ok(json!({
                "ok": true,
                "matches": matches,
                "stoppedReason": output.stopped_reason.map(|reason| format!("{reason:?}")),
            }))
        },
        Command::SearchContent {
            path,
            pattern,
            is_literal,
            case_sensitive,
            max_results,
        } => {
            let output = search_content(
                &ctx,
                &deps,
                SearchContentInput {
                    path,
                    pattern,
                    file_pattern: None,
                    exclude_patterns: Vec::new(),
                    case_sensitive,
                    whole_word: false,
                    is_literal,
                    context_lines: None,
                    max_results,
                    max_file_size: None,
                    max_files_scanned: None,
                    timeout_ms: None,
                    skip_binary: true,
                    include_hidden: false,
                    base_name_match: false,
                    case_sensitive_file_match: true,
                },
            )
            .await?;
            let matches: Vec<Value> = output
                .matches
                .iter()
                .map(|item| {
                    json!({
                        "file": item.file.to_string_lossy(),
                        "line": item.line,
                        "content": item.content,
                        "matchCount": item.match_count,
                    })
                })
                .collect();
            Ok(json!({
                "ok": true,
                "matches": matches,
                "filesScanned": output.summary.files_scanned,
                "filesMatched": output.summary.files_matched,
                "totalMatches": output.summary.total_matches,
            }))
        },
        Command::GetFileInfo { path } => {
            let info = get_file_info(&ctx, &deps, GetFileInfoInput { path }).await?;
            Ok(json!({
                "ok": true,
                "size": info.size,
                "isDirectory": info.is_directory,
                "isFile": info.is_file,
                "isBinary": info.is_binary,
                "mimeType": info.mime_type,
            }))
        },
        Command::ComputeChecksum { path, algorithm, encoding } => {
            let algorithm = parse_algorithm(&algorithm)?;
            let encoding = parse_encoding(&encoding)?;
            let digest = compute_checksum(
                &ctx,
                &deps,
                ComputeChecksumInput {
                    path,
                    algorithm,
                    encoding,
                    max_file_size: None,
                },
            )
            .await?;
            Ok(json!({ "ok": true, "digest": digest }))
        },
    }
}

fn summary_json(summary: &sandboxfs_domain::WalkSummary) -> Value {
    json!({
        "totalFiles": summary.total_files,
        "totalDirectories": summary.total_directories,
        "maxDepthReached": summary.max_depth_reached,
        "truncated": summary.truncated,
        "skippedInaccessible": summary.skipped_inaccessible,
        "symlinksNotFollowed": summary.symlinks_not_followed,
    })
}

fn tree_json(node: &sandboxfs_domain::TreeNode) -> Value {
    json!({
        "name": node.name,
        "type": format!("{:?}", node.node_type),
        "size": node.size,
        "children": node.children.as_ref().map(|children| {
            children.iter().map(tree_json).collect::<Vec<_>>()
        }),
    })
}

fn parse_algorithm(value: &str) -> Result<ChecksumAlgorithm, ErrorEnvelope> {
    match value.to_ascii_lowercase().as_str() {
        "md5" => Ok(ChecksumAlgorithm::Md5),
        "sha1" => Ok(ChecksumAlgorithm::Sha1),
        "sha256" => Ok(ChecksumAlgorithm::Sha256),
        "sha512" => Ok(ChecksumAlgorithm::Sha512),
        other => Err(ErrorEnvelope::expected(
            sandboxfs_domain::FsErrorKind::InvalidInput.into_error_code(),
            format!("unsupported checksum algorithm `{other}`"),
        )),
    }
}

fn parse_encoding(value: &str) -> Result<ChecksumEncoding, ErrorEnvelope> {
    match value.to_ascii_lowercase().as_str() {
        "hex" => Ok(ChecksumEncoding::Hex),
        "base64" => Ok(ChecksumEncoding::Base64),
        other => Err(ErrorEnvelope::expected(
            sandboxfs_domain::FsErrorKind::InvalidInput.into_error_code(),
            format!("unsupported checksum encoding `{other}`"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_read_file_with_allowed_root() {
        let cli = Cli::try_parse_from([
            "sandboxfs",
            "--allow",
            "/tmp",
            "read-file",
            "/tmp/a.txt",
            "--head",
            "10",
        ])
        .expect("parse should succeed");

        assert_eq!(cli.allow, vec![PathBuf::from("/tmp")]);
        match cli.command {
            Command::ReadFile { path, head, .. } => {
                assert_eq!(path, "/tmp/a.txt");
                assert_eq!(head, Some(10));
            },
            _ => panic!("expected read-file command"),
        }
    }

    #[test]
    fn cli_requires_at_least_one_allowed_root() {
        let result = Cli::try_parse_from(["sandboxfs", "read-file", "/tmp/a.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn version_flag_is_supported() {
        let result = Cli::command().try_get_matches_from(["sandboxfs", "--version"]);
        assert!(matches!(
            result,
            Err(error) if error.kind() == clap::error::ErrorKind::DisplayVersion
        ));
    }

    #[tokio::test]
    async fn end_to_end_read_file_round_trips_through_the_sandbox() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp_dir.path().join("a.txt"), b"hello\n").expect("write");

        let cli = Cli::try_parse_from([
            "sandboxfs",
            "--allow",
            &temp_dir.path().to_string_lossy(),
            "read-file",
            &temp_dir.path().join("a.txt").to_string_lossy(),
        ])
        .expect("parse should succeed");

        let value = run(cli).await.expect("read should succeed");
        assert_eq!(value["content"], "hello\n");
    }

    #[tokio::test]
    async fn end_to_end_rejects_paths_outside_the_sandbox() {
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let outside = tempfile::tempdir().expect("tempdir");
        std::fs::write(outside.path().join("secret.txt"), b"nope").expect("write");

        let cli = Cli::try_parse_from([
            "sandboxfs",
            "--allow",
            &temp_dir.path().to_string_lossy(),
            "read-file",
            &outside.path().join("secret.txt").to_string_lossy(),
        ])
        .expect("parse should succeed");

        let result = run(cli).await;
        assert!(result.is_err());
    }
}
