//! Test-only `Deps` fixture shared by this crate's use-case test modules.

use std::path::PathBuf;
use std::sync::Arc;

use sandboxfs_adapters::local_fs::LocalFileSystem;
use sandboxfs_adapters::PathSandbox;
use sandboxfs_config::Limits;
use sandboxfs_domain::AllowedRoots;
use sandboxfs_ports::{NullDiagnosticsSink, SystemClock};

use crate::deps::Deps;

/// Builds a `Deps` whose sandbox only allows `root` (already canonicalized).
pub fn deps_for(root: &std::path::Path) -> Deps {
    let roots = AllowedRoots::new(vec![root.to_path_buf()]);
    Deps {
        fs: Arc::new(LocalFileSystem::new()),
        sandbox: Arc::new(PathSandbox::new(roots, PathBuf::from("/"))),
        diagnostics: Arc::new(NullDiagnosticsSink),
        clock: Arc::new(SystemClock),
        limits: Limits::default(),
    }
}
