use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An open (or freshly created) merge request.
///
/// # Examples
///
/// ```
/// use mrpulse_core::MergeRequest;
///
/// let mr = MergeRequest {
///     iid: 12,
///     title: "Add search".into(),
///     source_branch: "feature/search".into(),
///     target_branch: "main".into(),
///     state: "opened".into(),
///     web_url: None,
/// };
/// assert_eq!(mr.to_string(), "!12 Add search (feature/search -> main)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    /// Project-scoped merge request number.
    pub iid: u64,
    /// Merge request title.
    pub title: String,
    /// Branch being merged.
    pub source_branch: String,
    /// Branch merged into.
    pub target_branch: String,
    /// Remote state, e.g. `opened`.
    pub state: String,
    /// Browser URL, when the remote provides one.
    pub web_url: Option<String>,
}

impl fmt::Display for MergeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "!{} {} ({} -> {})",
            self.iid, self.title, self.source_branch, self.target_branch
        )
    }
}

/// A commit belonging to a merge request.
///
/// `author_name` is the free-text name reported by the remote and is used
/// verbatim as the contributor identity.
///
/// # Examples
///
/// ```
/// use mrpulse_core::Commit;
///
/// let commit = Commit {
///     id: "6104942438c14ec7bd21c6cd5bd995272b3faff6".into(),
///     short_id: "6104942".into(),
///     title: "Sanitize for network graph".into(),
///     author_name: "randx".into(),
///     created_at: None,
///     position: 0,
/// };
/// assert_eq!(commit.author_name, "randx");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    /// Full commit SHA.
    pub id: String,
    /// Abbreviated SHA.
    pub short_id: String,
    /// First line of the commit message.
    pub title: String,
    /// Author name.
    pub author_name: String,
    /// Creation timestamp, when reported.
    pub created_at: Option<DateTime<Utc>>,
    /// Zero-based index in the merge request's commit list.
    pub position: usize,
}

/// Metadata fetched for a single commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitDetail {
    /// Full commit SHA.
    pub id: String,
    /// Author name.
    pub author_name: String,
    /// Author email, when reported.
    pub author_email: Option<String>,
}

/// The diff of one file within one commit.
///
/// # Examples
///
/// ```
/// use mrpulse_core::FileDiff;
///
/// let diff = FileDiff {
///     old_path: "src/lib.rs".into(),
///     new_path: "src/lib.rs".into(),
///     diff: "@@ -1 +1,2 @@\n fn a() {}\n+fn b() {}\n".into(),
///     new_file: false,
///     renamed_file: false,
///     deleted_file: false,
/// };
/// assert_eq!(diff.path(), "src/lib.rs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiff {
    /// Path before the change.
    pub old_path: String,
    /// Path after the change.
    pub new_path: String,
    /// Raw unified-diff text (hunks only, no file headers).
    pub diff: String,
    /// The file was created by this commit.
    pub new_file: bool,
    /// The file was renamed by this commit.
    pub renamed_file: bool,
    /// The file was deleted by this commit.
    pub deleted_file: bool,
}

impl FileDiff {
    /// Path lines in this diff are attributed to.
    pub fn path(&self) -> &str {
        if self.new_path.is_empty() {
            &self.old_path
        } else {
            &self.new_path
        }
    }
}

/// An added line attributed to a contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineAttribution {
    /// File the line was added to.
    pub file_path: String,
    /// Line content without the leading `+`.
    pub content: String,
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use mrpulse_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "markdown".parse::<OutputFormat>().unwrap(),
            OutputFormat::Markdown
        );
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn output_format_display() {
        assert_eq!(OutputFormat::Text.to_string(), "text");
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
    }

    #[test]
    fn file_diff_path_falls_back_to_old_path() {
        let diff = FileDiff {
            old_path: "gone.rs".into(),
            new_path: String::new(),
            diff: String::new(),
            new_file: false,
            renamed_file: false,
            deleted_file: true,
        };
        assert_eq!(diff.path(), "gone.rs");
    }

    #[test]
    fn commit_serializes_camel_case() {
        let commit = Commit {
            id: "abc".into(),
            short_id: "a".into(),
            title: "t".into(),
            author_name: "alice".into(),
            created_at: None,
            position: 3,
        };
        let json = serde_json::to_value(&commit).unwrap();
        assert_eq!(json["authorName"], "alice");
        assert!(json.get("author_name").is_none());
    }

    #[test]
    fn line_attribution_serializes_camel_case() {
        let line = LineAttribution {
            file_path: "src/main.rs".into(),
            content: "let x = 1;".into(),
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["filePath"], "src/main.rs");
    }
}
