//! Shared glob-pattern matching for the directory walker's exclude
//! predicate (§4.5) and the glob-search engine (§4.7): `*`, `**`, `?`,
//! character classes, and `{a,b}` alternation, case-insensitive on Windows.

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use sandboxfs_domain::FsErrorKind;
use sandboxfs_shared::{ErrorEnvelope, Result};

fn invalid_pattern(message: impl Into<String>) -> ErrorEnvelope {
    ErrorEnvelope::expected(FsErrorKind::InvalidPattern.into_error_code(), message.into())
}

/// Expands `{a,b,c}` brace alternation into the cartesian product of
/// literal patterns; `globset` itself has no brace support. Handles
/// multiple non-nested groups in a single pattern by expanding one group
/// at a time.
#[must_use]
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };
    let Some(close_rel) = pattern[open..].find('}') else {
        return vec![pattern.to_string()];
    };
    let close = open + close_rel;

    let prefix = &pattern[..open];
    let alternatives = &pattern[open + 1..close];
    let suffix = &pattern[close + 1..];

    let mut expanded = Vec::new();
    for alt in alternatives.split(',') {
        let candidate = format!("{prefix}{alt}{suffix}");
        expanded.extend(expand_braces(&candidate));
    }
    expanded
}

/// A compiled set of glob patterns, case-folded per platform.
pub struct PatternSet {
    set: GlobSet,
    /// `true` when the set was built with zero patterns (nothing ever
    /// excludes / matches).
    pub is_empty: bool,
}

impl PatternSet {
    /// Compiles one or more raw glob patterns (each possibly containing
    /// `{a,b}` alternation) into a single matchable set.
    pub fn compile(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut count = 0usize;

        for raw in patterns {
            for expanded in expand_braces(raw) {
                let glob = build_glob(&expanded)?;
                builder.add(glob);
                count += 1;
            }
        }

        let set = builder.build().map_err(|error| {
            invalid_pattern(format!("invalid glob pattern: {error}"))
        })?;

        Ok(Self {
            set,
            is_empty: count == 0,
        })
    }

    /// True if `candidate` (a POSIX-style relative path or bare name)
    /// matches any compiled pattern.
    #[must_use]
    pub fn is_match(&self, candidate: &str) -> bool {
        !self.is_empty && self.set.is_match(candidate)
    }
}

fn build_glob(pattern: &str) -> Result<Glob> {
    GlobBuilder::new(pattern)
        .case_insensitive(cfg!(windows))
        .literal_separator(true)
        .build()
        .map_err(|error| invalid_pattern(format!("invalid glob pattern `{pattern}`: {error}")))
}

/// An exclude predicate built from caller-supplied glob patterns (§4.5,
/// §6): a file/directory is excluded when its bare name or its
/// POSIX-normalized relative path matches any pattern.
pub struct ExcludeMatcher {
    patterns: PatternSet,
}

impl ExcludeMatcher {
    /// Compiles an exclude matcher; `patterns` is empty for "exclude
    /// nothing".
    pub fn compile(patterns: &[String]) -> Result<Self> {
        Ok(Self {
            patterns: PatternSet::compile(patterns)?,
        })
    }

    /// An empty matcher that excludes nothing.
    #[must_use]
    pub fn none() -> Self {
        Self {
            patterns: PatternSet {
                set: GlobSetBuilder::new()
                    .build()
                    .expect("empty glob set always builds"),
                is_empty: true,
            },
        }
    }

    /// True when `name` or `relative_posix_path` matches any exclude
    /// pattern.
    #[must_use]
    pub fn matches(&self, name: &str, relative_posix_path: &str) -> bool {
        self.patterns.is_match(name) || self.patterns.is_match(relative_posix_path)
    }
}

/// Converts a platform path's components (already relative) into a
/// POSIX-style, `/`-separated string for glob matching, per §4.5/§4.7.
#[must_use]
pub fn to_posix_relative(path: &std::path::Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Validates a glob-search pattern per §4.7: absolute-prefix and `..`
/// segments are rejected, as is excessive length.
pub fn validate_search_pattern(pattern: &str, max_len: usize) -> Result<()> {
    if pattern.is_empty() {
        return Err(invalid_pattern("pattern must not be empty"));
    }
    if pattern.len() > max_len {
        return Err(invalid_pattern(format!(
            "pattern exceeds maximum length of {max_len} characters"
        )));
    }
    if is_absolute_prefixed(pattern) {
        return Err(invalid_pattern(
            "pattern must not be absolute (no leading `/`, `\\`, drive letter, or UNC prefix)",
        ));
    }
    if pattern.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(invalid_pattern("pattern must not contain `..` segments"));
    }
    if pattern.contains("**/**/**") {
        return Err(invalid_pattern(
            "pattern must not nest recursive wildcards more than two levels deep",
        ));
    }
    Ok(())
}

fn is_absolute_prefixed(pattern: &str) -> bool {
    if pattern.starts_with('/') || pattern.starts_with('\\') {
        return true;
    }
    if pattern.starts_with("\\\\") {
        return true;
    }
    let bytes = pattern.as_bytes();
    matches!(bytes, [drive, b':', ..] if drive.is_ascii_alphabetic())
}

/// Validates an exclude-pattern set's cardinality/length caps (§6).
pub fn validate_exclude_patterns(
    patterns: &[String],
    max_count: usize,
    max_len: usize,
) -> Result<()> {
    if patterns.len() > max_count {
        return Err(invalid_pattern(format!(
            "at most {max_count} exclude patterns are allowed"
        )));
    }
    for pattern in patterns {
        if pattern.len() > max_len {
            return Err(invalid_pattern(format!(
                "exclude pattern exceeds maximum length of {max_len} characters"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brace_expansion_produces_cartesian_product() {
        let expanded = expand_braces("**/*.{ts,tsx}");
        assert_eq!(expanded, vec!["**/*.ts".to_string(), "**/*.tsx".to_string()]);
    }

    #[test]
    fn brace_expansion_is_noop_without_braces() {
        assert_eq!(expand_braces("**/*.rs"), vec!["**/*.rs".to_string()]);
    }

    #[test]
    fn exclude_matcher_matches_name_or_relative_path() {
        let matcher = ExcludeMatcher::compile(&["**/docs/**".to_string()]).expect("compile");
        assert!(matcher.matches("readme.md", "project/docs/readme.md"));
        assert!(!matcher.matches("readme.md", "project/src/readme.md"));
    }

    #[test]
    fn exclude_matcher_supports_brace_alternation() {
        let matcher = ExcludeMatcher::compile(&["*.{log,tmp}".to_string()]).expect("compile");
        assert!(matcher.matches("debug.log", "debug.log"));
        assert!(matcher.matches("scratch.tmp", "scratch.tmp"));
        assert!(!matcher.matches("main.rs", "main.rs"));
    }

    #[test]
    fn validate_search_pattern_rejects_absolute_and_dotdot() {
        assert!(validate_search_pattern("/etc/passwd", 1000).is_err());
        assert!(validate_search_pattern("../escape", 1000).is_err());
        assert!(validate_search_pattern("C:\\Windows", 1000).is_err());
        assert!(validate_search_pattern("**/*.rs", 1000).is_ok());
    }

    #[test]
    fn validate_search_pattern_rejects_triple_recursive_wildcard() {
        assert!(validate_search_pattern("**/**/**", 1000).is_err());
    }

    #[test]
    fn validate_exclude_patterns_enforces_caps() {
        let many = vec!["*".to_string(); 200];
        assert!(validate_exclude_patterns(&many, 100, 500).is_err());
        let long = vec!["a".repeat(600)];
        assert!(validate_exclude_patterns(&long, 100, 500).is_err());
    }
}
