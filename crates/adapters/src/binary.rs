//! Binary/UTF-8 Heuristics (spec §4.3) and minimal MIME sniffing for
//! `readMediaFile` (§10.6 supplement).

use sandboxfs_config::limits::{BINARY_NON_PRINTABLE_THRESHOLD, BINARY_SNIFF_SAMPLE_BYTES};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Classifies a byte sample as probable binary content, per §4.3: empty is
/// text, a UTF-8 BOM is text, a NUL byte or a non-printable fraction above
/// the configured threshold is binary.
#[must_use]
pub fn is_probably_binary(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return false;
    }
    if sample.starts_with(&UTF8_BOM) {
        return false;
    }

    let probe = &sample[..sample.len().min(BINARY_SNIFF_SAMPLE_BYTES)];
    if probe.contains(&0u8) {
        return true;
    }

    let non_printable = probe
        .iter()
        .filter(|byte| is_non_printable_non_whitespace(**byte))
        .count();
    let fraction = non_printable as f64 / probe.len() as f64;
    fraction > BINARY_NON_PRINTABLE_THRESHOLD
}

fn is_non_printable_non_whitespace(byte: u8) -> bool {
    match byte {
        b'\t' | b'\n' | b'\r' => false,
        0x20..=0x7E => false,
        _ => true,
    }
}

/// Finds the start of the UTF-8 sequence that contains (or ends at)
/// `position`, per §4.3 `findUTF8Boundary`. `window` is up to the last 4
/// bytes of the buffer ending at `position`; returns an offset (from the
/// start of `window`, i.e. relative to `position - window.len()`).
///
/// Returns `0` for non-positive positions, matching the spec.
#[must_use]
pub fn find_utf8_boundary(window: &[u8], position: i64) -> usize {
    if position <= 0 || window.is_empty() {
        return 0;
    }
    let bound = window.len().min(4);
    let tail = &window[window.len() - bound..];
    for (offset, byte) in tail.iter().enumerate().rev() {
        if byte & 0b1100_0000 != 0b1000_0000 {
            return window.len() - bound + offset;
        }
    }
    0
}

/// Magic-byte table for the five signatures `readMediaFile` needs.
const MAGIC_TABLE: &[(&[u8], &str)] = &[
    (&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A], "image/png"),
    (&[0xFF, 0xD8, 0xFF], "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"%PDF-", "application/pdf"),
];

/// Sniffs a MIME type from a file's leading bytes. WEBP additionally
/// requires the `WEBP` tag after the RIFF header at offset 8.
#[must_use]
pub fn sniff_mime_type(sample: &[u8]) -> Option<&'static str> {
    for (magic, mime) in MAGIC_TABLE {
        if sample.starts_with(magic) {
            return Some(mime);
        }
    }
    if sample.len() >= 12 && sample.starts_with(b"RIFF") && &sample[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    None
}
