//! The dependency bundle every use case in this crate is built against.
//!
//! Every operation resolves paths through the same [`PathSandbox`] and
//! performs I/O through the same [`FileSystemPort`], so a single shared
//! `Deps` type is the natural generalization of the teacher's
//! per-use-case `XxxDeps` structs here, rather than nine near-identical
//! copies of the same three fields.

use std::sync::Arc;

use sandboxfs_adapters::PathSandbox;
use sandboxfs_config::Limits;
use sandboxfs_ports::{ClockPort, DiagnosticsSink, FileSystemPort};

/// Shared dependencies for every `sandboxfs-app` use case.
#[derive(Clone)]
pub struct Deps {
    /// The raw filesystem boundary.
    pub fs: Arc<dyn FileSystemPort>,
    /// The shared allowed-root gate.
    pub sandbox: Arc<PathSandbox>,
    /// The diagnostics emission channel.
    pub diagnostics: Arc<dyn DiagnosticsSink>,
    /// The monotonic clock used for diagnostics durations.
    pub clock: Arc<dyn ClockPort>,
    /// Centralized numeric defaults and hard caps.
    pub limits: Limits,
}
