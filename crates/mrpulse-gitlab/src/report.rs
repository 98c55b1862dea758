use std::fmt;

use mrpulse_core::MergeRequest;
use mrpulse_impact::attribution::{AuthorLineCounts, AuthorLineMap};
use mrpulse_impact::commits::AuthorCommitMap;
use mrpulse_impact::ranking::ContributorImpact;
use serde::Serialize;

/// Outcome of analyzing one merge request.
///
/// Serializes to JSON with camelCase keys. The full per-line attribution is
/// kept in [`ContributionReport::lines`] but left out of the serialized form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionReport {
    /// The analyzed merge request.
    pub merge_request: MergeRequest,
    /// Whether the merge request was created by this run.
    pub created: bool,
    /// Commits listed for the merge request.
    pub commits_analyzed: usize,
    /// Commits left out of line attribution.
    pub skipped_commits: Vec<SkippedCommit>,
    /// Added lines per contributor.
    #[serde(skip)]
    pub lines: AuthorLineMap,
    /// Added-line count per contributor.
    pub line_counts: AuthorLineCounts,
    /// Commit count per contributor.
    pub commit_counts: AuthorCommitMap,
    /// Scored contributors, highest first.
    pub ranking: Vec<ContributorImpact>,
    /// Contributor with the highest impact score, if anyone added lines.
    pub top_contributor: Option<ContributorImpact>,
}

/// A commit whose metadata or diff could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedCommit {
    /// Full commit SHA.
    pub sha: String,
    /// Why the commit was skipped.
    pub reason: String,
}

impl fmt::Display for ContributionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = if self.created { "Created" } else { "Found" };
        writeln!(f, "{action} merge request {}", self.merge_request)?;
        write!(f, "Commits analyzed: {}", self.commits_analyzed)?;
        if !self.skipped_commits.is_empty() {
            write!(f, " ({} skipped)", self.skipped_commits.len())?;
        }
        writeln!(f, "\n")?;

        writeln!(f, "Lines added per author:")?;
        for (author, lines) in &self.line_counts {
            writeln!(f, "Author: {author} | Lines Added: {lines}")?;
        }
        writeln!(f)?;

        writeln!(f, "Commits per author:")?;
        for (author, commits) in &self.commit_counts {
            writeln!(f, "Author: {author} | Commits: {commits}")?;
        }
        writeln!(f)?;

        if !self.ranking.is_empty() {
            writeln!(
                f,
                "{:<4} {:<30} {:>8} {:>8} {:>8}",
                "#", "Author", "Lines", "Commits", "Score"
            )?;
            writeln!(f, "{}", "-".repeat(62))?;
            for (i, c) in self.ranking.iter().enumerate() {
                writeln!(
                    f,
                    "{:<4} {:<30} {:>8} {:>8} {:>8}",
                    i + 1,
                    c.name,
                    c.lines_added,
                    c.commits,
                    c.score
                )?;
            }
            writeln!(f)?;
        }

        match &self.top_contributor {
            Some(top) => writeln!(f, "Contributor with the most impact: {}", top.name),
            None => writeln!(f, "No contributor with added lines found"),
        }
    }
}

impl ContributionReport {
    /// Render the report as GitHub-flavored Markdown.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "# Contributor Impact: !{} {}\n\n",
            self.merge_request.iid, self.merge_request.title
        ));
        out.push_str(&format!(
            "**Branches:** `{}` → `{}`  \n**Commits analyzed:** {}",
            self.merge_request.source_branch,
            self.merge_request.target_branch,
            self.commits_analyzed
        ));
        if !self.skipped_commits.is_empty() {
            out.push_str(&format!(" ({} skipped)", self.skipped_commits.len()));
        }
        out.push_str("\n\n");

        match &self.top_contributor {
            Some(top) => out.push_str(&format!(
                "**Contributor with the most impact:** {} (score {})\n\n",
                top.name, top.score
            )),
            None => out.push_str("**No contributor with added lines found.**\n\n"),
        }

        if !self.ranking.is_empty() {
            out.push_str("| # | Author | Lines Added | Commits | Score |\n");
            out.push_str("|---|--------|-------------|---------|-------|\n");
            for (i, c) in self.ranking.iter().enumerate() {
                out.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    i + 1,
                    c.name,
                    c.lines_added,
                    c.commits,
                    c.score
                ));
            }
            out.push('\n');
        }

        if !self.commit_counts.is_empty() {
            out.push_str("## Commits per author\n\n");
            out.push_str("| Author | Commits |\n");
            out.push_str("|--------|---------|\n");
            for (author, commits) in &self.commit_counts {
                out.push_str(&format!("| {author} | {commits} |\n"));
            }
            out.push('\n');
        }

        if !self.skipped_commits.is_empty() {
            out.push_str("## Skipped commits\n\n");
            for skipped in &self.skipped_commits {
                out.push_str(&format!("- `{}`: {}\n", skipped.sha, skipped.reason));
            }
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use mrpulse_core::FileDiff;
    use mrpulse_impact::ranking::{rank_contributors, top_contributor};

    use super::*;

    fn report() -> ContributionReport {
        let mut lines = AuthorLineMap::new();
        lines.attribute_commit(
            "alice",
            &[FileDiff {
                old_path: "a.rs".into(),
                new_path: "a.rs".into(),
                diff: "@@ -0,0 +1,2 @@\n+x\n+y\n".into(),
                new_file: true,
                renamed_file: false,
                deleted_file: false,
            }],
        );
        let line_counts = lines.line_counts();
        let commit_counts: AuthorCommitMap = [("alice".to_string(), 1), ("merger".to_string(), 1)]
            .into_iter()
            .collect();

        ContributionReport {
            merge_request: MergeRequest {
                iid: 7,
                title: "Add parser".into(),
                source_branch: "develop".into(),
                target_branch: "main".into(),
                state: "opened".into(),
                web_url: None,
            },
            created: false,
            commits_analyzed: 2,
            skipped_commits: vec![],
            ranking: rank_contributors(&line_counts, &commit_counts),
            top_contributor: top_contributor(&line_counts, &commit_counts),
            lines,
            line_counts,
            commit_counts,
        }
    }

    #[test]
    fn text_report_has_the_three_facts() {
        let text = report().to_string();
        assert!(text.contains("Author: alice | Lines Added: 2"));
        assert!(text.contains("Author: alice | Commits: 1"));
        assert!(text.contains("Author: merger | Commits: 1"));
        assert!(text.contains("Contributor with the most impact: alice"));
    }

    #[test]
    fn text_report_without_contributor() {
        let mut empty = report();
        empty.line_counts.clear();
        empty.ranking.clear();
        empty.top_contributor = None;
        let text = empty.to_string();
        assert!(text.contains("No contributor with added lines found"));
        assert!(!text.contains("Contributor with the most impact"));
    }

    #[test]
    fn text_report_mentions_skipped_commits() {
        let mut partial = report();
        partial.skipped_commits.push(SkippedCommit {
            sha: "abc".into(),
            reason: "GitLab API error".into(),
        });
        assert!(partial.to_string().contains("Commits analyzed: 2 (1 skipped)"));
    }

    #[test]
    fn markdown_report_has_ranking_table() {
        let md = report().to_markdown();
        assert!(md.starts_with("# Contributor Impact: !7 Add parser"));
        assert!(md.contains("| 1 | alice | 2 | 1 | 12 |"));
        assert!(md.contains("| merger | 1 |"));
    }

    #[test]
    fn json_report_uses_camel_case_and_skips_lines() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["lineCounts"]["alice"], 2);
        assert_eq!(json["commitCounts"]["merger"], 1);
        assert_eq!(json["topContributor"]["name"], "alice");
        assert_eq!(json["topContributor"]["score"], 12);
        assert!(json.get("lines").is_none());
    }
}
