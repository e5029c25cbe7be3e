//! # sandboxfs-adapters
//!
//! Concrete implementations of the sandboxed filesystem-access core: the
//! local filesystem port, the path sandbox, binary/UTF-8 heuristics, the
//! line-oriented reader, the bounded directory walker, tree/analysis
//! builders, glob search, the content-search engine, checksum computation,
//! path utilities, OS-error mapping, and a `tracing`-backed diagnostics
//! sink. Depends on `domain`, `ports`, `shared`, and `config`.

pub mod binary;
pub mod checksum;
pub mod content_search;
pub mod diagnostics;
pub mod error_map;
pub mod glob_search;
pub mod local_fs;
pub mod path_utils;
pub mod pattern;
pub mod reader;
pub mod sandbox;
pub mod tree_analysis;
pub mod walker;

pub use checksum::{compute_checksum, Algorithm, Encoding};
pub use content_search::{
    candidates_from_entries, scan_file, search_content, Matcher, MatcherOptions, ScanOptions,
    SearchCandidate,
};
pub use diagnostics::TracingDiagnosticsSink;
pub use glob_search::{search_files, GlobMatch, GlobSearchOptions, GlobSearchOutput, SortBy};
pub use local_fs::LocalFileSystem;
pub use reader::{read_file, validate_mode, ReadMode, ReadOptions, ReadOutcome};
pub use sandbox::PathSandbox;
pub use tree_analysis::{analyze, build_tree, DirectoryAnalysis, RankedFile};
pub use walker::{relative_display_path, walk, WalkOutput, WalkParams};

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
