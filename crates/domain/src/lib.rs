//! # sandboxfs-domain
//!
//! Domain entities, primitives, and value objects for the sandboxed
//! filesystem-access core.
//!
//! This crate contains the core domain model with no infrastructure
//! dependencies:
//!
//! - **Allowed roots** - the process-wide sandbox root set and its pure
//!   prefix-containment rule
//! - **Paths** - `ValidatedPath`
//! - **Walker output** - `Entry`, `TreeNode`, `WalkSummary`
//! - **Content search** - `ContentMatch`, `FileScanResult`
//! - **Errors** - `FsErrorKind`, the ten-code taxonomy
//! - **Primitives** - bounded numeric newtypes for depth/result budgets
//!
//! ## Dependency Rules
//!
//! - Depends only on the `shared` crate
//! - No infrastructure or adapter dependencies
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use sandboxfs_shared::shared_crate_version;

pub mod allowed_roots;
pub mod content_match;
pub mod entry;
pub mod error_kind;
pub mod path;
pub mod primitives;

pub use allowed_roots::{AllowedRoots, path_is_prefixed_by};
pub use content_match::{ContentMatch, ContentSearchSummary, FileScanResult};
pub use entry::{Entry, EntryType, StoppedReason, TreeNode, TreeNodeType, WalkSummary};
pub use error_kind::FsErrorKind;
pub use path::ValidatedPath;
pub use primitives::{ContextLines, Depth, ResultBudget, TopN};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
