use mrpulse_core::{Commit, CommitDetail, FileDiff, MergeRequest, MrPulseError};

/// Remote operations the analysis pipeline depends on.
///
/// Every operation is independently failable. Implementations report
/// failures as errors; [`crate::pipeline`] decides which failures degrade to
/// an empty result and which abort the run.
#[allow(async_fn_in_trait)]
pub trait RepositoryGateway {
    /// Find an open merge request from `source_branch` into `target_branch`.
    async fn find_open_merge_request(
        &self,
        source_branch: &str,
        target_branch: &str,
    ) -> Result<Option<MergeRequest>, MrPulseError>;

    /// Open a new merge request.
    async fn create_merge_request(
        &self,
        source_branch: &str,
        target_branch: &str,
        title: &str,
    ) -> Result<MergeRequest, MrPulseError>;

    /// List a merge request's commits in the order the remote reports them.
    async fn list_merge_request_commits(&self, iid: u64) -> Result<Vec<Commit>, MrPulseError>;

    /// Fetch metadata for a single commit.
    async fn get_commit(&self, sha: &str) -> Result<CommitDetail, MrPulseError>;

    /// Fetch the per-file diffs of a single commit.
    async fn get_commit_diff(&self, sha: &str) -> Result<Vec<FileDiff>, MrPulseError>;
}
