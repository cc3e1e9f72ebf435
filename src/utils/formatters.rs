use crate::scanner::classify::FileKind;
use colored::Colorize;
use std::collections::BTreeMap;

/// Length of abbreviated commit hashes
pub const SHORT_HASH_LEN: usize = 8;

/// Formats a commit hash for display (first 8 characters)
#[must_use]
pub fn format_short_hash(hash: &str) -> &str {
    hash.char_indices()
        .nth(SHORT_HASH_LEN)
        .map_or(hash, |(idx, _)| &hash[..idx])
}

/// Formats ahead/behind counts, e.g. `2 ahead, 0 behind`
#[must_use]
pub fn format_branch_status(ahead: u32, behind: u32) -> String {
    let ahead = format!("{ahead} ahead");
    let behind = format!("{behind} behind");
    format!("{}, {}", ahead.green(), behind.yellow())
}

/// Formats per-kind counts as `kind: n` pairs in tag order
#[must_use]
pub fn format_kind_counts(counts: &BTreeMap<FileKind, usize>) -> String {
    counts
        .iter()
        .map(|(kind, count)| format!("{kind}: {count}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Formats bytes into human-readable size
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    #[allow(clippy::cast_precision_loss)]
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{bytes} {}", UNITS[unit_index])
    } else {
        format!("{size:.2} {}", UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1024 * 1024), "1.00 MB");
    }

    #[test]
    fn test_format_short_hash() {
        assert_eq!(format_short_hash("0123456789abcdef"), "01234567");
        assert_eq!(format_short_hash("abc"), "abc");
        assert_eq!(format_short_hash(""), "");
    }

    #[test]
    fn test_format_kind_counts() {
        let mut counts = BTreeMap::new();
        counts.insert(FileKind::Json, 2);
        counts.insert(FileKind::Javascript, 1);
        assert_eq!(format_kind_counts(&counts), "javascript: 1, json: 2");
        assert_eq!(format_kind_counts(&BTreeMap::new()), "");
    }
}
