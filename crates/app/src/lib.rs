//! # sandboxfs-app
//!
//! Application use cases wiring ports, adapters, and domain together: one
//! function per externally exposed operation, each validating its own
//! input, resolving paths through the shared [`PathSandbox`], delegating
//! the heavy lifting to `sandboxfs-adapters`, and emitting the same
//! Start/End diagnostics contract via [`instrumentation::instrument`].
//!
//! [`PathSandbox`]: sandboxfs_adapters::PathSandbox

pub mod analyze_directory;
pub mod bounded;
pub mod compute_checksum;
pub mod deps;
pub mod get_directory_tree;
pub mod get_file_info;
pub mod instrumentation;
pub mod list_directory;
pub mod read_file;
pub mod read_multiple_files;
pub mod search_content;
pub mod search_files;
#[cfg(test)]
pub(crate) mod test_support;

pub use analyze_directory::{analyze_directory, AnalyzeDirectoryInput};
pub use compute_checksum::{
    compute_checksum, ChecksumAlgorithm, ChecksumEncoding, ComputeChecksumInput,
};
pub use deps::Deps;
pub use get_directory_tree::{get_directory_tree, GetDirectoryTreeInput, GetDirectoryTreeOutput};
pub use get_file_info::{get_file_info, FileInfo, GetFileInfoInput};
pub use list_directory::{list_directory, ListDirectoryInput};
pub use read_file::{read_file, ReadFileInput};
pub use read_multiple_files::{
    read_multiple_files, ReadMultipleFilesInput, ReadMultipleFilesItem,
};
pub use search_content::{search_content, SearchContentInput, SearchContentOutput};
pub use search_files::{search_files, SearchFilesInput, SearchFilesSortBy};

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_crate_compiles() {
        let version = app_crate_version();
        assert!(!version.is_empty());
    }
}
