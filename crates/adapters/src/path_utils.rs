//! Path Utilities (spec component 10): normalization, home expansion,
//! Windows drive-letter lowering, reserved-name detection.

use sandboxfs_shared::{ErrorCode, ErrorEnvelope, Result};
use std::path::{Component, Path, PathBuf};

const WINDOWS_RESERVED_STEMS: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Runs the syntactic checks from §4.1 step 1 on the raw, pre-normalization
/// input string.
pub fn check_syntax(raw: &str) -> Result<()> {
    if raw.trim().is_empty() {
        return Err(ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            "path must not be empty or whitespace-only",
        ));
    }
    if raw.contains('\0') {
        return Err(ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            "path must not contain embedded NUL bytes",
        ));
    }
    if is_windows_drive_relative(raw) {
        return Err(ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            "drive-relative paths (e.g. `C:foo`) are not allowed",
        ));
    }
    if let Some(leaf) = raw.split(['/', '\\']).next_back() {
        if is_reserved_device_name(leaf) {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "path must not use a reserved device name",
            ));
        }
    }
    Ok(())
}

/// `C:` or `C:foo` — a drive letter with no following separator, which
/// Windows treats as relative to that drive's current directory.
fn is_windows_drive_relative(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    matches!(bytes, [drive, b':', rest @ ..] if drive.is_ascii_alphabetic() && !matches!(rest.first(), Some(b'/' | b'\\')))
}

/// Matches `{CON, PRN, AUX, NUL, COM1..9, LPT1..9}`, case-insensitive, with
/// any suffix, trailing dot/space, or `::$DATA` stream suffix tolerated.
fn is_reserved_device_name(leaf: &str) -> bool {
    let trimmed = leaf.trim_end_matches([' ', '.']);
    let base = trimmed
        .split("::$DATA")
        .next()
        .unwrap_or(trimmed)
        .split('.')
        .next()
        .unwrap_or(trimmed);
    let upper = base.to_ascii_uppercase();
    WINDOWS_RESERVED_STEMS.contains(&upper.as_str())
}

/// Expands a leading `~` (or `~/...`) to the user's home directory.
/// Paths that do not start with `~` are returned unchanged.
#[must_use]
pub fn expand_home(raw: &str) -> String {
    if raw == "~" {
        return dirs::home_dir()
            .map(|home| home.to_string_lossy().into_owned())
            .unwrap_or_else(|| raw.to_owned());
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().into_owned();
        }
    }
    raw.to_owned()
}

/// Lowercases a Windows drive letter prefix (`C:\...` -> `c:\...`); a no-op
/// on platforms without drive letters.
#[must_use]
pub fn lower_drive_letter(path: &Path) -> PathBuf {
    let as_str = path.to_string_lossy();
    let bytes = as_str.as_bytes();
    if matches!(bytes, [drive, b':', ..] if drive.is_ascii_alphabetic()) {
        let mut chars: Vec<char> = as_str.chars().collect();
        if let Some(first) = chars.first_mut() {
            *first = first.to_ascii_lowercase();
        }
        return PathBuf::from(chars.into_iter().collect::<String>());
    }
    path.to_path_buf()
}

/// Strips a trailing path separator, except when the path is exactly a
/// filesystem root.
#[must_use]
pub fn strip_trailing_separator(path: &Path) -> PathBuf {
    if path.parent().is_none() {
        return path.to_path_buf();
    }
    let as_str = path.to_string_lossy();
    let trimmed = as_str.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        path.to_path_buf()
    } else {
        PathBuf::from(trimmed)
    }
}

/// Collapses `.` and `..` components lexically (no filesystem access),
/// mirroring step 2 of §4.1's normalization.
#[must_use]
pub fn collapse_dot_components(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                if !matches!(out.components().next_back(), Some(Component::RootDir) | None) {
                    out.pop();
                } else if out.components().next_back().is_none() {
                    out.push(Component::ParentDir.as_os_str());
                }
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Runs the full syntactic-check + normalize pipeline (§4.1 steps 1-2),
/// without touching the filesystem. `base_dir` supplies the current
/// directory for resolving relative input.
pub fn normalize(raw: &str, base_dir: &Path) -> Result<PathBuf> {
    check_syntax(raw)?;
    let expanded = expand_home(raw);
    let expanded_path = Path::new(&expanded);
    let absolute = if expanded_path.is_absolute() {
        expanded_path.to_path_buf()
    } else {
        base_dir.join(expanded_path)
    };
    let collapsed = collapse_dot_components(&absolute);
    let lowered = lower_drive_letter(&collapsed);
    Ok(strip_trailing_separator(&lowered))
}
