//! The diagnostics channel contract (spec §4.9, §6).
//!
//! Publishing to subscribers beyond this process is an external
//! collaborator's concern (spec §1); this port only defines the emission
//! contract so `sandboxfs-adapters` can implement it over `tracing` while
//! `sandboxfs-app` stays decoupled from the concrete sink.

use std::path::Path;

/// Path-detail level controlling how much of a path diagnostics may reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathDetailLevel {
    /// Omit the path entirely.
    Omit,
    /// Emit a 16-character SHA-256 prefix of the path.
    HashPrefix,
    /// Emit the literal path.
    Full,
}

impl PathDetailLevel {
    /// Parses the `FILESYSTEM_CONTEXT_DIAGNOSTICS_DETAIL` values `{0,1,2}`.
    #[must_use]
    pub const fn from_env_value(value: u8) -> Self {
        match value {
            1 => Self::HashPrefix,
            2 => Self::Full,
            _ => Self::Omit,
        }
    }
}

/// A diagnostics event emitted around a tool call.
#[derive(Debug, Clone)]
pub enum DiagnosticsEvent<'a> {
    /// Emitted before a tool call begins.
    Start {
        /// The operation name (e.g. `"read_file"`).
        op: &'static str,
        /// The primary path the operation concerns, if any.
        path: Option<&'a Path>,
    },
    /// Emitted after a tool call completes.
    End {
        /// The operation name (e.g. `"read_file"`).
        op: &'static str,
        /// Whether the call succeeded.
        ok: bool,
        /// Wall-clock duration of the call, in milliseconds.
        duration_ms: u64,
        /// The error message, when `ok` is false.
        error: Option<&'a str>,
    },
}

/// A sink for diagnostics events. Implementations decide whether to emit at
/// all (the `FILESYSTEM_CONTEXT_DIAGNOSTICS` gate) and at what path-detail
/// level.
pub trait DiagnosticsSink: Send + Sync {
    /// Record a diagnostics event.
    fn emit(&self, event: &DiagnosticsEvent<'_>);
}

/// A sink that discards every event; the default when diagnostics are
/// disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDiagnosticsSink;

impl DiagnosticsSink for NullDiagnosticsSink {
    fn emit(&self, _event: &DiagnosticsEvent<'_>) {}
}
