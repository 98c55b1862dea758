//! Commit counts per contributor.

use indexmap::IndexMap;
use mrpulse_core::Commit;

/// Commit count per contributor, in first-seen order.
pub type AuthorCommitMap = IndexMap<String, usize>;

/// Count commits per author name (exact string match).
///
/// # Examples
///
/// ```
/// use mrpulse_core::Commit;
/// use mrpulse_impact::commits::count_commits;
///
/// let commit = |author: &str| Commit {
///     id: "sha".into(),
///     short_id: "sha".into(),
///     title: "change".into(),
///     author_name: author.into(),
///     created_at: None,
///     position: 0,
/// };
/// let counts = count_commits(&[commit("A"), commit("B"), commit("A")]);
/// assert_eq!(counts["A"], 2);
/// assert_eq!(counts["B"], 1);
/// ```
pub fn count_commits(commits: &[Commit]) -> AuthorCommitMap {
    let mut counts = AuthorCommitMap::new();
    for commit in commits {
        *counts.entry(commit.author_name.clone()).or_default() += 1;
    }
    counts
}
