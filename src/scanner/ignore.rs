use crate::config::ScanConfig;
use anyhow::{Context, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Directory names that are never traversed
pub const EXCLUDED_DIRS: &[&str] = &["node_modules", "dist", "build", ".git", ".next", "coverage"];

/// File names that are never recorded
pub const EXCLUDED_FILES: &[&str] = &[
    ".DS_Store",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
];

/// Decides which entries of a tree are left out of a snapshot
///
/// Combines the built-in name lists, the extra names from `[scan]`
/// configuration, and the pattern file at the tree root.
#[derive(Debug)]
pub struct IgnoreMatcher {
    /// Compiled pattern file; empty when the file is absent
    patterns: Gitignore,
    /// Extra directory names from configuration
    extra_dirs: Vec<String>,
    /// Extra file names from configuration
    extra_files: Vec<String>,
}

impl IgnoreMatcher {
    /// Compile the matcher for the tree at `root`
    ///
    /// A missing pattern file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern file exists but cannot be read or
    /// contains an invalid pattern.
    pub fn compile(root: &Path, config: &ScanConfig) -> Result<Self> {
        let pattern_file = root.join(&config.ignore_file);
        let mut builder = GitignoreBuilder::new(root);

        if pattern_file.is_file() {
            if let Some(err) = builder.add(&pattern_file) {
                return Err(err).with_context(|| {
                    format!("Failed to read ignore file: {}", pattern_file.display())
                });
            }
            tracing::debug!(file = %pattern_file.display(), "loaded ignore patterns");
        }

        let patterns = builder
            .build()
            .with_context(|| format!("Invalid ignore patterns in {}", pattern_file.display()))?;

        Ok(Self {
            patterns,
            extra_dirs: config.exclude_dirs.clone(),
            extra_files: config.exclude_files.clone(),
        })
    }

    /// Matcher with only the built-in name lists
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            patterns: Gitignore::empty(),
            extra_dirs: Vec::new(),
            extra_files: Vec::new(),
        }
    }

    /// Whether the entry at `relative_path` is left out
    ///
    /// `relative_path` is relative to the tree root. A path is ignored when its
    /// final name is an excluded directory (for directories) or an excluded
    /// file (for files), or when a pattern matches the path or one of its
    /// parents.
    #[must_use]
    pub fn ignores(&self, relative_path: &Path, is_dir: bool) -> bool {
        if let Some(name) = relative_path.file_name().and_then(|n| n.to_str()) {
            let excluded = if is_dir {
                self.is_excluded_dir(name)
            } else {
                self.is_excluded_file(name)
            };
            if excluded {
                return true;
            }
        }

        if relative_path.as_os_str().is_empty() {
            return false;
        }

        self.patterns
            .matched_path_or_any_parents(relative_path, is_dir)
            .is_ignore()
    }

    /// Whether `name` is an excluded directory name
    #[must_use]
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        EXCLUDED_DIRS.contains(&name) || self.extra_dirs.iter().any(|d| d == name)
    }

    /// Whether `name` is an excluded file name
    #[must_use]
    pub fn is_excluded_file(&self, name: &str) -> bool {
        EXCLUDED_FILES.contains(&name) || self.extra_files.iter().any(|f| f == name)
    }

    /// Number of patterns loaded from the pattern file
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.patterns.num_ignores() as usize + self.patterns.num_whitelists() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn matcher_with(patterns: &str) -> (TempDir, IgnoreMatcher) {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".gitignore"), patterns).unwrap();
        let matcher = IgnoreMatcher::compile(temp.path(), &ScanConfig::default()).unwrap();
        (temp, matcher)
    }

    #[test]
    fn test_builtin_directories_are_excluded() {
        let matcher = IgnoreMatcher::builtin();
        for dir in EXCLUDED_DIRS {
            assert!(matcher.ignores(Path::new(dir), true), "{dir}");
            assert!(matcher.ignores(&Path::new("packages/a").join(dir), true));
        }
        assert!(!matcher.ignores(Path::new("src"), true));
    }

    #[test]
    fn test_builtin_files_are_excluded() {
        let matcher = IgnoreMatcher::builtin();
        for file in EXCLUDED_FILES {
            assert!(matcher.ignores(Path::new(file), false), "{file}");
        }
        assert!(!matcher.ignores(Path::new("package.json"), false));
    }

    #[test]
    fn test_directory_name_does_not_exclude_file_of_same_name() {
        let matcher = IgnoreMatcher::builtin();
        assert!(!matcher.ignores(Path::new("build"), false));
    }

    #[test]
    fn test_missing_pattern_file_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let matcher = IgnoreMatcher::compile(temp.path(), &ScanConfig::default()).unwrap();
        assert_eq!(matcher.pattern_count(), 0);
        assert!(!matcher.ignores(Path::new("src/index.js"), false));
    }

    #[test]
    fn test_glob_and_negation() {
        let (_temp, matcher) = matcher_with("*.log\n!keep.log\n");
        assert!(matcher.ignores(Path::new("debug.log"), false));
        assert!(matcher.ignores(Path::new("nested/debug.log"), false));
        assert!(!matcher.ignores(Path::new("keep.log"), false));
    }

    #[test]
    fn test_anchored_and_directory_only_patterns() {
        let (_temp, matcher) = matcher_with("/secret.js\ngenerated/\n");
        assert!(matcher.ignores(Path::new("secret.js"), false));
        assert!(!matcher.ignores(Path::new("lib/secret.js"), false));
        assert!(matcher.ignores(Path::new("generated"), true));
        assert!(matcher.ignores(Path::new("generated/out.js"), false));
        assert!(!matcher.ignores(Path::new("generated"), false));
    }

    #[test]
    fn test_config_extras() {
        let temp = TempDir::new().unwrap();
        let config = ScanConfig {
            exclude_dirs: vec!["tmp".to_string()],
            exclude_files: vec!["secrets.json".to_string()],
            ..ScanConfig::default()
        };
        let matcher = IgnoreMatcher::compile(temp.path(), &config).unwrap();
        assert!(matcher.ignores(Path::new("tmp"), true));
        assert!(matcher.ignores(Path::new("config/secrets.json"), false));
        assert!(!matcher.ignores(Path::new("config/public.json"), false));
    }

    #[test]
    fn test_custom_pattern_file_name() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".snapignore"), "drafts/\n").unwrap();
        let config = ScanConfig {
            ignore_file: ".snapignore".to_string(),
            ..ScanConfig::default()
        };
        let matcher = IgnoreMatcher::compile(temp.path(), &config).unwrap();
        assert!(matcher.ignores(Path::new("drafts"), true));
    }
}
