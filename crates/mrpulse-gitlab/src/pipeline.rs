use mrpulse_core::{Commit, MergeRequest, MrPulseConfig, MrPulseError};
use mrpulse_difflens::classify::DiffStats;
use mrpulse_impact::attribution::AuthorLineMap;
use mrpulse_impact::commits::count_commits;
use mrpulse_impact::ranking::{rank_contributors, top_contributor};
use tracing::{debug, info, warn};

use crate::gateway::RepositoryGateway;
use crate::report::{ContributionReport, SkippedCommit};

/// Inputs for one analysis run.
///
/// # Examples
///
/// ```
/// use mrpulse_core::MrPulseConfig;
/// use mrpulse_gitlab::pipeline::AnalysisOptions;
///
/// let options = AnalysisOptions::from_config(&MrPulseConfig::default());
/// assert_eq!(options.source_branch, "develop");
/// assert!(!options.create_if_missing);
/// ```
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Branch being merged.
    pub source_branch: String,
    /// Branch merged into.
    pub target_branch: String,
    /// Open a merge request when none exists instead of failing.
    pub create_if_missing: bool,
    /// Title for a created merge request.
    pub title: Option<String>,
}

impl AnalysisOptions {
    /// Build options from a resolved configuration.
    pub fn from_config(config: &MrPulseConfig) -> Self {
        Self {
            source_branch: config.branches.source.clone(),
            target_branch: config.branches.target.clone(),
            create_if_missing: config.merge_request.create_if_missing,
            title: config.merge_request.title.clone(),
        }
    }

    fn creation_title(&self) -> String {
        self.title.clone().unwrap_or_else(|| {
            format!("Merge {} into {}", self.source_branch, self.target_branch)
        })
    }
}

/// Analyze the merge request between the configured branches.
///
/// Runs strictly sequentially: merge request lookup, commit listing, then
/// one commit at a time metadata and diff fetches. Failed lookups and
/// listings degrade to empty results and are logged; a commit whose metadata
/// or diff cannot be fetched is skipped from attribution but still counted.
///
/// # Errors
///
/// Returns [`MrPulseError::NoMergeRequest`] when no merge request can be
/// found (or created, with `create_if_missing`).
pub async fn analyze_merge_request<G: RepositoryGateway>(
    gateway: &G,
    options: &AnalysisOptions,
) -> Result<ContributionReport, MrPulseError> {
    let (merge_request, created) = resolve_merge_request(gateway, options).await?;
    info!(iid = merge_request.iid, created, "analyzing merge request");

    let commits = match gateway.list_merge_request_commits(merge_request.iid).await {
        Ok(commits) => commits,
        Err(e) => {
            warn!(iid = merge_request.iid, error = %e, "failed to list merge request commits");
            Vec::new()
        }
    };
    info!(count = commits.len(), "fetched merge request commits");

    let commit_counts = count_commits(&commits);
    let mut lines = AuthorLineMap::new();
    let mut skipped_commits = Vec::new();

    for commit in &commits {
        match attribute_commit(gateway, commit, &mut lines).await {
            Ok(attributed) => {
                debug!(sha = %commit.short_id, attributed, "attributed commit");
            }
            Err(e) => {
                warn!(sha = %commit.id, error = %e, "skipping commit");
                skipped_commits.push(SkippedCommit {
                    sha: commit.id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let line_counts = lines.line_counts();
    let ranking = rank_contributors(&line_counts, &commit_counts);
    let top = top_contributor(&line_counts, &commit_counts);

    Ok(ContributionReport {
        merge_request,
        created,
        commits_analyzed: commits.len(),
        skipped_commits,
        lines,
        line_counts,
        commit_counts,
        ranking,
        top_contributor: top,
    })
}

async fn resolve_merge_request<G: RepositoryGateway>(
    gateway: &G,
    options: &AnalysisOptions,
) -> Result<(MergeRequest, bool), MrPulseError> {
    let source = options.source_branch.as_str();
    let target = options.target_branch.as_str();

    match gateway.find_open_merge_request(source, target).await {
        Ok(Some(mr)) => return Ok((mr, false)),
        Ok(None) => info!(source, target, "no open merge request found"),
        Err(e) => warn!(source, target, error = %e, "merge request lookup failed"),
    }

    if options.create_if_missing {
        let title = options.creation_title();
        match gateway.create_merge_request(source, target, &title).await {
            Ok(mr) => {
                info!(iid = mr.iid, "created merge request");
                return Ok((mr, true));
            }
            Err(e) => warn!(source, target, error = %e, "failed to create merge request"),
        }
    }

    Err(MrPulseError::NoMergeRequest {
        source_branch: options.source_branch.clone(),
        target_branch: options.target_branch.clone(),
    })
}

async fn attribute_commit<G: RepositoryGateway>(
    gateway: &G,
    commit: &Commit,
    lines: &mut AuthorLineMap,
) -> Result<usize, MrPulseError> {
    let detail = gateway.get_commit(&commit.id).await?;
    let diffs = gateway.get_commit_diff(&commit.id).await?;

    let mut stats = DiffStats::default();
    for diff in &diffs {
        stats += DiffStats::from_diff(&diff.diff);
    }
    debug!(
        sha = %commit.short_id,
        files = diffs.len(),
        added = stats.added,
        removed = stats.removed,
        "fetched commit diff"
    );

    Ok(lines.attribute_commit(&detail.author_name, &diffs))
}
