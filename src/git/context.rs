use super::GitContextProvider;
use super::errors::GitError;
use super::vcs::Vcs;
use crate::manifest::{BranchStatus, GitContext};
use crate::output;
use crate::utils::formatters::format_short_hash;

impl<V: Vcs> GitContextProvider<V> {
    /// Capture branch facts without changing repository state
    ///
    /// Failures are absorbed: a warning is printed and `None` is returned, so
    /// the snapshot can go on without a `git` section.
    pub fn capture_context(&self) -> Option<GitContext> {
        match self.try_capture_context() {
            Ok(context) => Some(context),
            Err(e) => {
                tracing::warn!(error = %e, "git context unavailable");
                output::warning(&format!("Could not read git context: {e}"));
                None
            }
        }
    }

    /// Capture branch facts, reporting the first failing query
    ///
    /// # Errors
    ///
    /// Returns the error of the first git query that fails.
    pub fn try_capture_context(&self) -> Result<GitContext, GitError> {
        let vcs = self.vcs();
        let target = self.target_branch();
        let source = vcs.current_branch()?;

        let merge_base = vcs.merge_base(target, &source)?;
        let ahead = vcs.count_commits(target, &source)?;
        let behind = vcs.count_commits(&source, target)?;
        let last_commit = vcs.last_commit(&source)?;

        tracing::debug!(
            source = %source,
            target = %target,
            ahead,
            behind,
            "captured git context"
        );

        Ok(GitContext {
            source_branch: source,
            target_branch: target.to_string(),
            branch_status: BranchStatus {
                ahead,
                behind,
                merge_base_short_hash: format_short_hash(&merge_base).to_string(),
            },
            last_commit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::merge::tests::ScriptedVcs;

    #[test]
    fn test_capture_context() {
        let vcs = ScriptedVcs::on_branch("feature");
        let provider = GitContextProvider::new(vcs, "master");

        let context = provider.try_capture_context().unwrap();
        assert_eq!(context.source_branch, "feature");
        assert_eq!(context.target_branch, "master");
        assert_eq!(context.branch_status.ahead, 2);
        assert_eq!(context.branch_status.behind, 1);
        assert_eq!(context.branch_status.merge_base_short_hash, "0123abcd");
        assert_eq!(context.last_commit.subject, "Feature changes");
        assert!(provider.vcs().calls().iter().all(|c| !c.starts_with("checkout")));
    }

    #[test]
    fn test_capture_context_absorbs_failures() {
        let vcs = ScriptedVcs::on_branch("feature");
        vcs.fail_on("merge_base", GitError::InvalidRef("unknown revision master".into()));
        let provider = GitContextProvider::new(vcs, "master");

        assert!(provider.capture_context().is_none());
    }
}
