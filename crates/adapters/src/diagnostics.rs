//! A `tracing`-backed [`DiagnosticsSink`] (spec §4.9, §6, §10.2).
//!
//! Publishing to subscribers beyond this process is an external
//! collaborator's concern; this adapter only decides what to emit and at
//! what path-detail level, then hands it to `tracing`.

use std::path::Path;

use sha2::Digest;

use sandboxfs_config::DiagnosticsConfig;
use sandboxfs_ports::{DiagnosticsEvent, DiagnosticsSink, PathDetailLevel};

/// Emits diagnostics events as `tracing` spans/events, gated by
/// [`DiagnosticsConfig::enabled`] and redacted per
/// [`DiagnosticsConfig::detail`].
#[derive(Debug, Clone, Copy)]
pub struct TracingDiagnosticsSink {
    config: DiagnosticsConfig,
}

impl TracingDiagnosticsSink {
    /// Builds a sink from an already-parsed configuration.
    #[must_use]
    pub const fn new(config: DiagnosticsConfig) -> Self {
        Self { config }
    }

    fn describe_path(&self, path: Option<&Path>) -> Option<String> {
        let path = path?;
        match self.config.detail {
            PathDetailLevel::Omit => None,
            PathDetailLevel::HashPrefix => Some(hash_prefix(path)),
            PathDetailLevel::Full => Some(path.to_string_lossy().into_owned()),
        }
    }
}

impl DiagnosticsSink for TracingDiagnosticsSink {
    fn emit(&self, event: &DiagnosticsEvent<'_>) {
        if !self.config.enabled {
            return;
        }

        match event {
            DiagnosticsEvent::Start { op, path } => {
                let path = self.describe_path(path.as_deref());
                tracing::debug!(phase = "start", tool = *op, path = path.as_deref(), "fs tool start");
            },
            DiagnosticsEvent::End {
                op,
                ok,
                duration_ms,
                error,
            } => {
                tracing::debug!(
                    phase = "end",
                    tool = *op,
                    ok = *ok,
                    duration_ms = *duration_ms,
                    error = *error,
                    "fs tool end"
                );
            },
        }
    }
}

/// Computes a 16-character SHA-256 hex prefix of `path`'s string form, per
/// spec §4.9's path-detail level `1`.
fn hash_prefix(path: &Path) -> String {
    let mut hasher = sha2::Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    digest.iter().take(8).map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn hash_prefix_is_sixteen_hex_characters() {
        let prefix = hash_prefix(&PathBuf::from("/some/secret/path"));
        assert_eq!(prefix.len(), 16);
        assert!(prefix.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn describe_path_omits_when_configured() {
        let sink = TracingDiagnosticsSink::new(DiagnosticsConfig {
            enabled: true,
            detail: PathDetailLevel::Omit,
        });
        assert_eq!(sink.describe_path(Some(Path::new("/x"))), None);
    }

    #[test]
    fn describe_path_emits_literal_at_full_detail() {
        let sink = TracingDiagnosticsSink::new(DiagnosticsConfig {
            enabled: true,
            detail: PathDetailLevel::Full,
        });
        assert_eq!(
            sink.describe_path(Some(Path::new("/x/y"))),
            Some("/x/y".to_string())
        );
    }

    #[test]
    fn disabled_sink_emits_nothing_observable() {
        let sink = TracingDiagnosticsSink::new(DiagnosticsConfig {
            enabled: false,
            detail: PathDetailLevel::Full,
        });
        sink.emit(&DiagnosticsEvent::Start {
            op: "read_file",
            path: Some(Path::new("/x")),
        });
    }
}
