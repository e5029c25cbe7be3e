//! Wraps a use case body with the Start/End diagnostics events of §4.9/§6,
//! so every operation emits them the same way instead of each use case
//! reaching into `DiagnosticsSink` by hand.

use std::future::Future;
use std::path::Path;

use sandboxfs_ports::{ClockPort, DiagnosticsEvent, DiagnosticsSink};
use sandboxfs_shared::Result;

/// Runs `body`, emitting a `Start` event before and an `End` event after,
/// with a monotonic `duration_ms` computed from `clock`.
pub async fn instrument<T, Fut>(
    diagnostics: &dyn DiagnosticsSink,
    clock: &dyn ClockPort,
    op: &'static str,
    path: Option<&Path>,
    body: Fut,
) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    diagnostics.emit(&DiagnosticsEvent::Start { op, path });
    let started = clock.now();

    let outcome = body.await;

    let duration_ms = u64::try_from(clock.now().saturating_duration_since(started).as_millis())
        .unwrap_or(u64::MAX);
    match &outcome {
        Ok(_) => diagnostics.emit(&DiagnosticsEvent::End {
            op,
            ok: true,
            duration_ms,
            error: None,
        }),
        Err(error) => diagnostics.emit(&DiagnosticsEvent::End {
            op,
            ok: false,
            duration_ms,
            error: Some(&error.message),
        }),
    }

    outcome
}
