#![allow(dead_code)]

use anyhow::{Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Throwaway git repository with a project checked out at `<temp>/app`
pub struct GitRepo {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl GitRepo {
    /// Repository on `master` with one commit holding a small React project
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join("app");
        fs::create_dir_all(&root)?;

        let repo = Self { temp_dir, root };
        repo.git(&["init", "--quiet", "--initial-branch=master"])?;
        repo.git(&["config", "user.name", "Test User"])?;
        repo.git(&["config", "user.email", "test@example.com"])?;
        repo.git(&["config", "commit.gpgsign", "false"])?;

        repo.write(
            "package.json",
            r#"{"dependencies":{"react":"^18.2.0"},"devDependencies":{"vite":"^5.0.0"}}"#,
        )?;
        repo.write("src/App.jsx", "export default function App() {}\n")?;
        repo.write(".gitignore", "code.json\n")?;
        repo.commit_all("Initial commit")?;

        Ok(repo)
    }

    /// Path of the project root
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Run git in the project root, returning trimmed stdout
    pub fn git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env("HOME", self.temp_dir.path())
            .output()?;
        if !output.status.success() {
            bail!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Write a file relative to the project root, creating parents
    pub fn write(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Read a file relative to the project root
    pub fn read(&self, relative: &str) -> Result<String> {
        Ok(fs::read_to_string(self.root.join(relative))?)
    }

    /// Stage everything and commit
    pub fn commit_all(&self, message: &str) -> Result<()> {
        self.git(&["add", "--all"])?;
        self.git(&["commit", "--quiet", "--message", message])?;
        Ok(())
    }

    /// Create and switch to a new branch
    pub fn branch(&self, name: &str) -> Result<()> {
        self.git(&["checkout", "--quiet", "-b", name])?;
        Ok(())
    }

    /// Switch to an existing branch
    pub fn checkout(&self, name: &str) -> Result<()> {
        self.git(&["checkout", "--quiet", name])?;
        Ok(())
    }

    pub fn current_branch(&self) -> Result<String> {
        self.git(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    pub fn status(&self) -> Result<String> {
        self.git(&["status", "--porcelain"])
    }

    pub fn stash_list(&self) -> Result<String> {
        self.git(&["stash", "list"])
    }

    /// Whether a merge is in progress
    pub fn merging(&self) -> bool {
        self.root.join(".git/MERGE_HEAD").exists()
    }
}
