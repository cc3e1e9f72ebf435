use crate::config::ScanConfig;
use crate::manifest::FileRecord;
use crate::scanner::classify::FileKind;
use crate::scanner::ignore::IgnoreMatcher;
use crate::utils::formatters::format_size;
use crate::utils::paths::relative_slash_path;
use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use walkdir::WalkDir;

/// Load every scanned file under `root`
///
/// Directories rejected by `matcher` are pruned without being entered. Files
/// are kept when their extension is in the classification table and the
/// matcher does not ignore them. Records come back sorted by path.
///
/// # Errors
///
/// Returns an error naming the offending path if traversal, metadata or a
/// read fails.
pub fn scan(root: &Path, matcher: &IgnoreMatcher, config: &ScanConfig) -> Result<Vec<FileRecord>> {
    let mut records = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(config.follow_symlinks)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            // Never reject the root itself
            if e.depth() == 0 {
                return true;
            }
            let relative = e.path().strip_prefix(root).unwrap_or(e.path());
            !matcher.ignores(relative, e.file_type().is_dir())
        });

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to traverse {}", root.display()))?;
        let path = entry.path();
        // Linked files are read through the link; linked directories are
        // only entered when follow_symlinks is set
        let is_file =
            entry.file_type().is_file() || (entry.path_is_symlink() && path.is_file());
        if !is_file {
            continue;
        }

        let kind = FileKind::classify(path);
        if kind == FileKind::Unknown {
            continue;
        }

        let size = std::fs::metadata(path)
            .with_context(|| format!("Failed to read metadata: {}", path.display()))?
            .len();
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;

        records.push(FileRecord {
            path: relative_slash_path(path, root)?,
            kind,
            size,
            content: decode_text(bytes),
        });
    }

    records.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(root = %root.display(), files = records.len(), "scan complete");
    Ok(records)
}

/// Decode file bytes as UTF-8, replacing invalid sequences
fn decode_text(bytes: Vec<u8>) -> String {
    if simdutf8::basic::from_utf8(&bytes).is_ok() {
        // SAFETY: validated as UTF-8 just above
        return unsafe { String::from_utf8_unchecked(bytes) };
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// File count and byte total of a scan, for log and terminal output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Number of records
    pub files: usize,
    /// Sum of record sizes
    pub bytes: u64,
}

impl ScanSummary {
    /// Summarise `records`
    #[must_use]
    pub fn from_records(records: &[FileRecord]) -> Self {
        Self {
            files: records.len(),
            bytes: records.iter().map(|r| r.size).sum(),
        }
    }
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.files == 1 { "file" } else { "files" };
        write!(f, "{} {noun} ({})", self.files, format_size(self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &[u8]) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn scan_default(root: &Path) -> Vec<FileRecord> {
        let config = ScanConfig::default();
        let matcher = IgnoreMatcher::compile(root, &config).unwrap();
        scan(root, &matcher, &config).unwrap()
    }

    #[test]
    fn test_scan_collects_allowed_files_sorted() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/index.js", b"console.log('hi')");
        write(root, "README.md", b"# readme");
        write(root, "src/components/App.tsx", b"export {}");
        write(root, "notes.txt", b"skipped");

        let records = scan_default(root);
        let paths: Vec<_> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["README.md", "src/components/App.tsx", "src/index.js"]);
        assert_eq!(records[1].kind, FileKind::ReactTypescript);
        assert_eq!(records[2].size, 17);
        assert_eq!(records[2].content, "console.log('hi')");
    }

    #[test]
    fn test_scan_prunes_excluded_directories_and_files() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "node_modules/lib/index.js", b"x");
        write(root, "dist/bundle.js", b"x");
        write(root, "packages/a/coverage/report.json", b"{}");
        write(root, "package-lock.json", b"{}");
        write(root, "src/main.js", b"x");

        let records = scan_default(root);
        let paths: Vec<_> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["src/main.js"]);
    }

    #[test]
    fn test_scan_honours_ignore_file() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, ".gitignore", b"*.log\ngenerated/\n");
        write(root, "generated/types.ts", b"x");
        write(root, "src/a.ts", b"x");

        let records = scan_default(root);
        let paths: Vec<_> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["src/a.ts"]);
    }

    #[test]
    fn test_scan_replaces_invalid_utf8() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "bad.js", &[b'a', 0xFF, b'b']);

        let records = scan_default(temp.path());
        assert_eq!(records[0].content, "a\u{FFFD}b");
        assert_eq!(records[0].size, 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_reads_linked_files_without_entering_linked_dirs() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        let outside = temp.path().join("outside");
        let root = temp.path().join("root");
        write(&outside, "shared.js", b"export const shared = 1;");
        write(&outside, "lib/deep.js", b"x");
        write(&root, "src/main.js", b"x");
        symlink(outside.join("shared.js"), root.join("src/shared.js")).unwrap();
        symlink(outside.join("lib"), root.join("lib")).unwrap();
        symlink(outside.join("gone.js"), root.join("dangling.js")).unwrap();

        let records = scan_default(&root);
        let paths: Vec<_> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["src/main.js", "src/shared.js"]);
        assert_eq!(records[1].content, "export const shared = 1;");
        assert_eq!(records[1].size, 24);

        let config = ScanConfig {
            follow_symlinks: true,
            ..ScanConfig::default()
        };
        let matcher = IgnoreMatcher::compile(&root, &config).unwrap();
        fs::remove_file(root.join("dangling.js")).unwrap();
        let followed = scan(&root, &matcher, &config).unwrap();
        let paths: Vec<_> = followed.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["lib/deep.js", "src/main.js", "src/shared.js"]);
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");
        let config = ScanConfig::default();
        let matcher = IgnoreMatcher::builtin();
        assert!(scan(&missing, &matcher, &config).is_err());
    }

    #[test]
    fn test_scan_summary_display() {
        let records = vec![FileRecord {
            path: "a.js".to_string(),
            kind: FileKind::Javascript,
            size: 2048,
            content: String::new(),
        }];
        let summary = ScanSummary::from_records(&records);
        assert_eq!(summary.to_string(), "1 file (2.00 KB)");
    }
}
