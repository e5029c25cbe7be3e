//! Environment variable parsing (spec §6).

use sandboxfs_ports::PathDetailLevel;

/// Env var: enable diagnostics emission.
pub const ENV_DIAGNOSTICS: &str = "FILESYSTEM_CONTEXT_DIAGNOSTICS";
/// Env var: diagnostics path-detail level.
pub const ENV_DIAGNOSTICS_DETAIL: &str = "FILESYSTEM_CONTEXT_DIAGNOSTICS_DETAIL";

/// Truthy values accepted for boolean-flag env vars.
const TRUTHY_VALUES: &[&str] = &["1", "true", "yes"];

/// Parsed diagnostics configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticsConfig {
    /// Whether diagnostics emission is enabled.
    pub enabled: bool,
    /// The path-detail level to emit at.
    pub detail: PathDetailLevel,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            detail: PathDetailLevel::Omit,
        }
    }
}

impl DiagnosticsConfig {
    /// Reads the diagnostics configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var(ENV_DIAGNOSTICS).ok().as_deref(),
            std::env::var(ENV_DIAGNOSTICS_DETAIL).ok().as_deref(),
        )
    }

    /// Parses from explicit values, independent of the process environment
    /// (used by tests and by the CLI bootstrap).
    #[must_use]
    pub fn from_values(enabled: Option<&str>, detail: Option<&str>) -> Self {
        let enabled = enabled
            .map(|value| TRUTHY_VALUES.contains(&value.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        let detail = match detail {
            Some("1") => PathDetailLevel::HashPrefix,
            Some("2") => PathDetailLevel::Full,
            _ => PathDetailLevel::Omit,
        };
        Self { enabled, detail }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_values_enable_diagnostics() {
        for value in ["1", "true", "yes", "TRUE", "Yes"] {
            let config = DiagnosticsConfig::from_values(Some(value), None);
            assert!(config.enabled, "{value} should enable diagnostics");
        }
    }

    #[test]
    fn unset_or_falsy_disables_diagnostics() {
        assert!(!DiagnosticsConfig::from_values(None, None).enabled);
        assert!(!DiagnosticsConfig::from_values(Some("0"), None).enabled);
        assert!(!DiagnosticsConfig::from_values(Some("nope"), None).enabled);
    }

    #[test]
    fn detail_level_parses_0_1_2() {
        assert_eq!(
            DiagnosticsConfig::from_values(None, Some("0")).detail,
            PathDetailLevel::Omit
        );
        assert_eq!(
            DiagnosticsConfig::from_values(None, Some("1")).detail,
            PathDetailLevel::HashPrefix
        );
        assert_eq!(
            DiagnosticsConfig::from_values(None, Some("2")).detail,
            PathDetailLevel::Full
        );
        assert_eq!(
            DiagnosticsConfig::from_values(None, Some("garbage")).detail,
            PathDetailLevel::Omit
        );
    }
}
