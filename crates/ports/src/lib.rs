//! # sandboxfs-ports
//!
//! Port traits for the sandboxfs hexagonal architecture.
//!
//! This crate defines the interfaces between the domain and infrastructure
//! layers. It depends only on `domain` and `shared`.

use std::future::Future;
use std::pin::Pin;

/// Boxed future used by port traits.
///
/// We deliberately use boxed futures for boundary traits (I/O-bound work),
/// since these calls sit on the suspension points named in spec §5 and are
/// never on a hot, allocation-sensitive path.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod clock;
pub mod diagnostics;
pub mod raw_fs;

pub use clock::{ClockPort, SystemClock};
pub use diagnostics::{DiagnosticsEvent, DiagnosticsSink, NullDiagnosticsSink, PathDetailLevel};
pub use raw_fs::{FileSystemPort, RawDirEntry, RawFileType, RawMetadata};

// Re-export selected domain types used in port signatures, so adapter crates
// can implement ports without an extra import.
pub use sandboxfs_domain::{AllowedRoots, FsErrorKind, ValidatedPath};

#[cfg(test)]
mod tests {
    use super::*;
    use sandboxfs_domain::domain_crate_version;
    use sandboxfs_shared::shared_crate_version;

    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut deps = Vec::new();
        let mut in_deps = false;

        for raw_line in cargo_toml.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                in_deps = line == "[dependencies]";
                continue;
            }
            if !in_deps {
                continue;
            }
            if line.starts_with("sandboxfs-") {
                let key = line.split('=').next().unwrap_or("").trim();
                let name = key.split('.').next().unwrap_or("").trim();
                deps.push(name.to_string());
            }
        }

        deps
    }

    /// ports depends only on domain + shared among workspace crates
    #[test]
    fn ports_depends_only_on_domain_and_shared() {
        let deps = workspace_deps();
        let allowed = ["sandboxfs-domain", "sandboxfs-shared"];

        for dep in &deps {
            assert!(
                allowed.contains(&dep.as_str()),
                "unexpected dependency found: {dep}"
            );
        }
    }

    #[test]
    fn ports_crate_compiles() {
        let version = ports_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn ports_can_use_domain_and_shared() {
        let domain_version = domain_crate_version();
        let shared_version = shared_crate_version();

        assert!(!domain_version.is_empty());
        assert!(!shared_version.is_empty());
    }
}
