//! Git error categorization.
//!
//! Every failed git invocation is turned into a [`GitError`] by inspecting the
//! command's output, so callers can branch on the category (a merge conflict
//! is handled differently from a missing branch) instead of matching strings.

use thiserror::Error;

/// Categorized git operation errors with actionable guidance
#[derive(Debug, Clone, Error)]
pub enum GitError {
    /// The `git` binary could not be found or spawned
    #[error("{0}")]
    Unavailable(String),
    /// The working directory is not inside a git repository
    #[error("{0}")]
    NotARepository(String),
    /// Resource not found (branch, commit, stash entry)
    #[error("{0}")]
    NotFound(String),
    /// Merge conflicts or local changes that would be overwritten
    #[error("{0}")]
    Conflict(String),
    /// File system permission errors
    #[error("{0}")]
    Permission(String),
    /// Invalid reference name or format
    #[error("{0}")]
    InvalidRef(String),
    /// Git succeeded but printed something we could not interpret
    #[error("{0}")]
    UnexpectedOutput(String),
    /// Unknown or uncategorized error
    #[error("{0}")]
    Unknown(String),
}

impl GitError {
    /// Parse git command output to categorize the error
    ///
    /// `output` should contain both stdout and stderr: merge conflicts are
    /// reported on stdout, most other failures on stderr.
    #[must_use]
    pub fn from_stderr(command: &str, output: &str) -> Self {
        let lower = output.to_lowercase();
        let detail = extract_meaningful_message(output);

        if lower.contains("not a git repository") {
            return Self::NotARepository(format!("{command}: Not a git repository - {detail}"));
        }

        if lower.contains("conflict")
            || lower.contains("automatic merge failed")
            || lower.contains("would be overwritten")
            || lower.contains("unmerged")
            || lower.contains("you have not concluded your merge")
        {
            return Self::Conflict(format!("{command}: Conflict detected - {detail}"));
        }

        if lower.contains("permission denied")
            || lower.contains("unable to create")
            || lower.contains("read-only")
            || lower.contains("cannot open")
        {
            return Self::Permission(format!("{command}: Permission error - {detail}"));
        }

        if lower.contains("invalid ref")
            || lower.contains("malformed")
            || lower.contains("bad revision")
            || lower.contains("ambiguous argument")
            || lower.contains("not a valid object name")
        {
            return Self::InvalidRef(format!("{command}: Invalid reference - {detail}"));
        }

        if lower.contains("did not match any")
            || lower.contains("does not exist")
            || lower.contains("not found")
            || lower.contains("no stash entries")
            || lower.contains("no such")
            || lower.contains("unknown revision")
            || lower.contains("not something we can merge")
        {
            return Self::NotFound(format!("{command}: Resource not found - {detail}"));
        }

        Self::Unknown(format!("{command}: {detail}"))
    }

    /// Get a user-friendly error message with actionable guidance
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unavailable(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Install git and make sure it is on PATH\n\
                 - Run without --git to take a plain snapshot"
            ),
            Self::NotARepository(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Run the snapshot from inside a git working tree\n\
                 - Run without --git to take a plain snapshot"
            ),
            Self::NotFound(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Verify the trunk branch exists locally (git branch --list)\n\
                 - Set [git] trunk_branch in .treesnap.toml or pass --target"
            ),
            Self::Conflict(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Merge or rebase onto the trunk branch and resolve conflicts\n\
                 - Run the snapshot again once the branch merges cleanly"
            ),
            Self::Permission(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Check file and directory permissions\n\
                 - Check if another process has the repository locked"
            ),
            Self::InvalidRef(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Check the branch name for typos or invalid characters"
            ),
            Self::UnexpectedOutput(msg) | Self::Unknown(msg) => format!(
                "{msg}\n\nThis is an unexpected error. Please check the message above for details."
            ),
        }
    }

    /// Whether this failure means the speculative merge itself conflicted
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Extract the most meaningful part of the error message
///
/// Removes noise and focuses on the actual error description
fn extract_meaningful_message(output: &str) -> String {
    // First 3 non-empty lines usually carry the key information
    let lines: Vec<&str> = output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(3)
        .collect();

    if lines.is_empty() {
        return "No error details available".to_string();
    }

    lines.join(" | ")
}
