//! Version-control port and its `git` command-line implementation.
//!
//! The speculative merge only needs a handful of operations. Keeping them
//! behind [`Vcs`] lets the merge state machine be exercised against a scripted
//! repository in tests, including failures that are hard to provoke with a
//! real one.

use crate::git::errors::GitError;
use crate::manifest::LastCommit;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Name `git rev-parse --abbrev-ref HEAD` reports when HEAD is detached
pub const DETACHED_HEAD: &str = "HEAD";

/// Message attached to stash entries created by a speculative merge
pub const STASH_MESSAGE: &str = "treesnap: speculative merge";

/// Field separator for `git log` output (ASCII unit separator)
const LOG_FIELD_SEPARATOR: char = '\u{1f}';

/// Operations the snapshot workflow needs from a version-control system
///
/// Every failure is reported as a typed [`GitError`]; implementations must
/// never substitute a default value for a failed query.
pub trait Vcs {
    /// Absolute path of the repository's git directory
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory is not inside a repository.
    fn git_dir(&self) -> Result<PathBuf, GitError>;

    /// Name of the checked-out branch ([`DETACHED_HEAD`] when detached)
    ///
    /// # Errors
    ///
    /// Returns an error if HEAD cannot be resolved.
    fn current_branch(&self) -> Result<String, GitError>;

    /// Whether the working tree has uncommitted or untracked changes
    ///
    /// # Errors
    ///
    /// Returns an error if the status query fails.
    fn is_dirty(&self) -> Result<bool, GitError>;

    /// Stash all local changes, untracked files included
    ///
    /// Returns `true` only if a new stash entry was actually created.
    ///
    /// # Errors
    ///
    /// Returns an error if stashing fails.
    fn stash_save(&self) -> Result<bool, GitError>;

    /// Pop the most recent stash entry
    ///
    /// # Errors
    ///
    /// Returns an error if the stash cannot be applied cleanly.
    fn stash_pop(&self) -> Result<(), GitError>;

    /// Check out `branch`
    ///
    /// # Errors
    ///
    /// Returns an error if the branch does not exist or local changes block it.
    fn checkout(&self, branch: &str) -> Result<(), GitError>;

    /// Merge `branch` into the current branch without committing and without
    /// fast-forwarding
    ///
    /// # Errors
    ///
    /// Returns [`GitError::Conflict`] when the merge stops on conflicts.
    fn merge_no_commit(&self, branch: &str) -> Result<(), GitError>;

    /// Abort an in-progress merge
    ///
    /// # Errors
    ///
    /// Returns an error if there is no merge to abort.
    fn merge_abort(&self) -> Result<(), GitError>;

    /// Reset any uncommitted merge state
    ///
    /// # Errors
    ///
    /// Returns an error if the reset fails.
    fn reset_merge(&self) -> Result<(), GitError>;

    /// Best common ancestor of two branches
    ///
    /// # Errors
    ///
    /// Returns an error if either branch is unknown or they share no history.
    fn merge_base(&self, a: &str, b: &str) -> Result<String, GitError>;

    /// Number of commits reachable from `to` but not from `from`
    ///
    /// # Errors
    ///
    /// Returns an error if either revision is unknown.
    fn count_commits(&self, from: &str, to: &str) -> Result<u32, GitError>;

    /// Metadata of the most recent commit on `branch`
    ///
    /// # Errors
    ///
    /// Returns an error if the branch is unknown or has no commits.
    fn last_commit(&self, branch: &str) -> Result<LastCommit, GitError>;
}

/// [`Vcs`] implementation that shells out to the `git` binary
#[derive(Debug, Clone)]
pub struct GitCli {
    /// Resolved path of the git executable
    git: PathBuf,
    /// Directory every command runs in
    work_dir: PathBuf,
}

impl GitCli {
    /// Locate `git` on PATH and bind it to `work_dir`
    ///
    /// # Errors
    ///
    /// Returns [`GitError::Unavailable`] if no git executable can be found.
    pub fn new(work_dir: &Path) -> Result<Self, GitError> {
        let git = which::which("git")
            .map_err(|e| GitError::Unavailable(format!("git executable not found: {e}")))?;
        Ok(Self {
            git,
            work_dir: work_dir.to_path_buf(),
        })
    }

    /// Run a git command, returning trimmed stdout on success
    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        match self.run_raw(args)? {
            Ok(stdout) => Ok(stdout),
            Err((command, output)) => Err(GitError::from_stderr(&command, &output)),
        }
    }

    /// Run a query that exits non-zero with no stderr when the answer is "none"
    fn run_optional(&self, args: &[&str]) -> Result<Option<String>, GitError> {
        match self.run_raw(args)? {
            Ok(stdout) => Ok(Some(stdout)),
            Err((_, output)) if output.trim().is_empty() => Ok(None),
            Err((command, output)) => Err(GitError::from_stderr(&command, &output)),
        }
    }

    /// Spawn git; the inner `Err` carries the command line and combined output
    /// of a non-zero exit
    #[allow(clippy::type_complexity)]
    fn run_raw(&self, args: &[&str]) -> Result<Result<String, (String, String)>, GitError> {
        let command = format!("git {}", args.join(" "));
        debug!(%command, dir = %self.work_dir.display(), "running git");

        let output = Command::new(&self.git)
            .args(args)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| GitError::Unavailable(format!("{command}: failed to spawn git: {e}")))?;

        if output.status.success() {
            return Ok(Ok(String::from_utf8_lossy(&output.stdout).trim().to_string()));
        }

        // Conflicts are reported on stdout, everything else on stderr
        let mut combined = String::from_utf8_lossy(&output.stderr).into_owned();
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            combined.push('\n');
            combined.push_str(&stdout);
        }
        debug!(%command, status = ?output.status.code(), "git failed");
        Ok(Err((command, combined)))
    }

    /// Current tip of `refs/stash`, if any stash entry exists
    fn stash_tip(&self) -> Result<Option<String>, GitError> {
        self.run_optional(&["rev-parse", "--quiet", "--verify", "refs/stash"])
    }
}

impl Vcs for GitCli {
    fn git_dir(&self) -> Result<PathBuf, GitError> {
        self.run(&["rev-parse", "--absolute-git-dir"])
            .map(PathBuf::from)
    }

    fn current_branch(&self) -> Result<String, GitError> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    fn is_dirty(&self) -> Result<bool, GitError> {
        self.run(&["status", "--porcelain"])
            .map(|status| !status.is_empty())
    }

    fn stash_save(&self) -> Result<bool, GitError> {
        let before = self.stash_tip()?;
        self.run(&[
            "stash",
            "push",
            "--include-untracked",
            "--message",
            STASH_MESSAGE,
        ])?;
        let after = self.stash_tip()?;
        Ok(after.is_some() && after != before)
    }

    fn stash_pop(&self) -> Result<(), GitError> {
        self.run(&["stash", "pop"]).map(drop)
    }

    fn checkout(&self, branch: &str) -> Result<(), GitError> {
        self.run(&["checkout", branch]).map(drop)
    }

    fn merge_no_commit(&self, branch: &str) -> Result<(), GitError> {
        self.run(&["merge", "--no-commit", "--no-ff", branch])
            .map(drop)
    }

    fn merge_abort(&self) -> Result<(), GitError> {
        self.run(&["merge", "--abort"]).map(drop)
    }

    fn reset_merge(&self) -> Result<(), GitError> {
        self.run(&["reset", "--merge"]).map(drop)
    }

    fn merge_base(&self, a: &str, b: &str) -> Result<String, GitError> {
        self.run(&["merge-base", a, b])
    }

    fn count_commits(&self, from: &str, to: &str) -> Result<u32, GitError> {
        let range = format!("{from}..{to}");
        let count = self.run(&["rev-list", "--count", &range])?;
        count.parse().map_err(|_| {
            GitError::UnexpectedOutput(format!(
                "git rev-list --count {range}: expected a number, got '{count}'"
            ))
        })
    }

    fn last_commit(&self, branch: &str) -> Result<LastCommit, GitError> {
        let line = self.run(&["log", "-1", "--format=%H%x1f%s%x1f%an%x1f%ad", branch, "--"])?;
        parse_log_line(&line).ok_or_else(|| {
            GitError::UnexpectedOutput(format!("git log -1 {branch}: unexpected output '{line}'"))
        })
    }
}

/// Split a `%H %s %an %ad` line joined by unit separators
fn parse_log_line(line: &str) -> Option<LastCommit> {
    let mut fields = line.splitn(4, LOG_FIELD_SEPARATOR);
    let hash = fields.next()?.trim();
    let subject = fields.next()?;
    let author = fields.next()?;
    let date = fields.next()?;
    if hash.is_empty() {
        return None;
    }
    Some(LastCommit {
        hash: hash.to_string(),
        subject: subject.to_string(),
        author: author.to_string(),
        date: date.to_string(),
    })
}
