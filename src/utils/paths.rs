use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Joins the components of `path` with `/`, whatever the platform separator
#[must_use]
pub fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Path of `path` relative to `base`, `/`-separated
///
/// # Errors
///
/// Returns an error if `base` is not a prefix of `path`
pub fn relative_slash_path(path: &Path, base: &Path) -> Result<String> {
    let relative = path.strip_prefix(base).with_context(|| {
        format!("{} is not inside {}", path.display(), base.display())
    })?;
    Ok(to_slash_path(relative))
}

/// Whether `path` stays inside the directory it is joined to
///
/// Rejects empty paths and any root, prefix or `..` component.
#[must_use]
pub fn is_contained_relative(path: &Path) -> bool {
    if path.as_os_str().is_empty() {
        return false;
    }
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Ensures parent directories exist for a given path
///
/// # Errors
///
/// Returns an error if the parent directories cannot be created
pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create parent directories for {}", path.display())
        })?;
    }
    Ok(())
}

/// Makes a path absolute, resolving relative paths from current directory
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined
pub fn make_absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir()?;
        Ok(current_dir.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_to_slash_path() {
        let path: PathBuf = ["src", "components", "App.tsx"].iter().collect();
        assert_eq!(to_slash_path(&path), "src/components/App.tsx");
        assert_eq!(to_slash_path(Path::new("index.js")), "index.js");
    }

    #[test]
    fn test_relative_slash_path() {
        let base = PathBuf::from("/work/app");
        let path = base.join("src").join("main.ts");
        assert_eq!(relative_slash_path(&path, &base).unwrap(), "src/main.ts");
        assert!(relative_slash_path(Path::new("/elsewhere/x.js"), &base).is_err());
    }

    #[test]
    fn test_is_contained_relative() {
        assert!(is_contained_relative(Path::new("src/app.js")));
        assert!(is_contained_relative(Path::new("./README.md")));
        assert!(!is_contained_relative(Path::new("")));
        assert!(!is_contained_relative(Path::new("../outside.js")));
        assert!(!is_contained_relative(Path::new("src/../../x.js")));
        assert!(!is_contained_relative(Path::new("/etc/passwd")));
    }

    #[test]
    fn test_ensure_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_file = temp_dir.path().join("a/b/c/file.txt");

        ensure_parent_dirs(&nested_file).unwrap();
        assert!(nested_file.parent().unwrap().exists());
        ensure_parent_dirs(Path::new("bare.txt")).unwrap();
    }

    #[test]
    fn test_make_absolute() {
        let absolute = PathBuf::from("/absolute/path");
        assert_eq!(make_absolute(&absolute).unwrap(), absolute);

        let result = make_absolute(Path::new("relative/path")).unwrap();
        assert!(result.is_absolute());
        assert!(result.ends_with("relative/path"));
    }
}
