//! Weighted impact scoring and contributor ranking.
//!
//! `score = lines_added + commits * COMMIT_WEIGHT`. Only contributors present
//! in the line-count mapping are scored: an author whose commits added no
//! lines (merge commits, pure deletions) is not ranked.

use serde::{Deserialize, Serialize};

use crate::attribution::AuthorLineCounts;
use crate::commits::AuthorCommitMap;

/// Weight of one commit relative to one added line.
pub const COMMIT_WEIGHT: usize = 10;

/// Compute the impact score for one contributor.
///
/// # Examples
///
/// ```
/// use mrpulse_impact::ranking::impact_score;
///
/// assert_eq!(impact_score(5, 10), 105);
/// assert_eq!(impact_score(100, 0), 100);
/// ```
pub fn impact_score(lines_added: usize, commits: usize) -> usize {
    lines_added.saturating_add(commits.saturating_mul(COMMIT_WEIGHT))
}

/// A scored contributor.
///
/// # Examples
///
/// ```
/// use mrpulse_impact::ranking::ContributorImpact;
///
/// let impact = ContributorImpact {
///     name: "alice".into(),
///     lines_added: 5,
///     commits: 10,
///     score: 105,
/// };
/// assert_eq!(impact.score, 105);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorImpact {
    /// Contributor name.
    pub name: String,
    /// Added lines attributed to the contributor.
    pub lines_added: usize,
    /// Commits authored by the contributor.
    pub commits: usize,
    /// Weighted impact score.
    pub score: usize,
}

/// Score every contributor in `line_counts`, in its iteration order.
pub fn score_contributors(
    line_counts: &AuthorLineCounts,
    commit_counts: &AuthorCommitMap,
) -> Vec<ContributorImpact> {
    line_counts
        .iter()
        .map(|(name, &lines_added)| {
            let commits = commit_counts.get(name).copied().unwrap_or(0);
            ContributorImpact {
                name: name.clone(),
                lines_added,
                commits,
                score: impact_score(lines_added, commits),
            }
        })
        .collect()
}

/// Select the contributor with the highest impact score.
///
/// On a tie the contributor seen first in `line_counts` wins. Returns `None`
/// when `line_counts` is empty.
///
/// # Examples
///
/// ```
/// use mrpulse_impact::attribution::AuthorLineCounts;
/// use mrpulse_impact::commits::AuthorCommitMap;
/// use mrpulse_impact::ranking::top_contributor;
///
/// let lines: AuthorLineCounts = [("A".to_string(), 5), ("B".to_string(), 100)].into_iter().collect();
/// let commits: AuthorCommitMap = [("A".to_string(), 10), ("B".to_string(), 0)].into_iter().collect();
///
/// let top = top_contributor(&lines, &commits).unwrap();
/// assert_eq!(top.name, "A");
/// assert_eq!(top.score, 105);
/// ```
pub fn top_contributor(
    line_counts: &AuthorLineCounts,
    commit_counts: &AuthorCommitMap,
) -> Option<ContributorImpact> {
    let mut best: Option<ContributorImpact> = None;
    for candidate in score_contributors(line_counts, commit_counts) {
        let beats = best
            .as_ref()
            .map_or(true, |current| candidate.score > current.score);
        if beats {
            best = Some(candidate);
        }
    }
    best
}

/// Rank every scored contributor, highest score first.
///
/// The sort is stable, so tied contributors keep their `line_counts` order
/// and the first entry always equals [`top_contributor`].
pub fn rank_contributors(
    line_counts: &AuthorLineCounts,
    commit_counts: &AuthorCommitMap,
) -> Vec<ContributorImpact> {
    let mut ranked = score_contributors(line_counts, commit_counts);
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}
