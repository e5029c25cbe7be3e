//! # sandboxfs-config
//!
//! Limits, environment parsing, and allowed-root bootstrap for the
//! sandboxed filesystem-access core.
//!
//! This crate holds every numeric default/hard-cap named in the component
//! design (`Limits`), parses the two diagnostics environment variables, and
//! performs the startup-time canonicalization pass that turns host/CLI
//! input into an `AllowedRoots` set.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod bootstrap;
pub mod env;
pub mod limits;

pub use bootstrap::bootstrap_allowed_roots;
pub use env::{DiagnosticsConfig, ENV_DIAGNOSTICS, ENV_DIAGNOSTICS_DETAIL};
pub use limits::Limits;

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
