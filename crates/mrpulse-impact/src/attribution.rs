//! Attribution of added lines to commit authors.
//!
//! Folds the added lines of each commit's file diffs into a running map keyed
//! by the commit author's name, preserving discovery order.

use indexmap::IndexMap;
use mrpulse_core::{FileDiff, LineAttribution};
use mrpulse_difflens::classify::added_lines;
use serde::Serialize;

/// Added-line count per contributor, in first-attribution order.
pub type AuthorLineCounts = IndexMap<String, usize>;

/// Added lines per contributor, accumulated across a merge request.
///
/// A contributor appears only once at least one line has been attributed to
/// them. Within a contributor, lines are kept in commit, diff and line order.
///
/// # Examples
///
/// ```
/// use mrpulse_core::FileDiff;
/// use mrpulse_impact::attribution::AuthorLineMap;
///
/// let diff = FileDiff {
///     old_path: "a.rs".into(),
///     new_path: "a.rs".into(),
///     diff: "@@ -1,1 +1,2 @@\n+foo\n context\n-bar\n".into(),
///     new_file: false,
///     renamed_file: false,
///     deleted_file: false,
/// };
///
/// let mut map = AuthorLineMap::new();
/// map.attribute_commit("alice", &[diff]);
/// let lines = map.get("alice").unwrap();
/// assert_eq!(lines.len(), 1);
/// assert_eq!(lines[0].content, "foo");
/// assert_eq!(lines[0].file_path, "a.rs");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AuthorLineMap {
    authors: IndexMap<String, Vec<LineAttribution>>,
}

impl AuthorLineMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every added line of one commit's diffs to `author`.
    ///
    /// Returns the number of lines attributed by this call.
    pub fn attribute_commit(&mut self, author: &str, diffs: &[FileDiff]) -> usize {
        let attributed: Vec<LineAttribution> = diffs
            .iter()
            .flat_map(|file| {
                let path = file.path();
                added_lines(&file.diff).map(move |content| LineAttribution {
                    file_path: path.to_string(),
                    content: content.to_string(),
                })
            })
            .collect();

        let count = attributed.len();
        if count > 0 {
            self.authors
                .entry(author.to_string())
                .or_default()
                .extend(attributed);
        }
        count
    }

    /// Lines attributed to `author`, if any.
    pub fn get(&self, author: &str) -> Option<&[LineAttribution]> {
        self.authors.get(author).map(Vec::as_slice)
    }

    /// Number of contributors with at least one attributed line.
    pub fn len(&self) -> usize {
        self.authors.len()
    }

    /// Whether no line has been attributed yet.
    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    /// Iterate contributors and their lines in first-attribution order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[LineAttribution])> {
        self.authors
            .iter()
            .map(|(name, lines)| (name.as_str(), lines.as_slice()))
    }

    /// Derive the per-contributor added-line counts, preserving order.
    ///
    /// # Examples
    ///
    /// ```
    /// use mrpulse_impact::attribution::AuthorLineMap;
    ///
    /// assert!(AuthorLineMap::new().line_counts().is_empty());
    /// ```
    pub fn line_counts(&self) -> AuthorLineCounts {
        self.authors
            .iter()
            .map(|(name, lines)| (name.clone(), lines.len()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, diff: &str) -> FileDiff {
        FileDiff {
            old_path: path.into(),
            new_path: path.into(),
            diff: diff.into(),
            new_file: false,
            renamed_file: false,
            deleted_file: false,
        }
    }

    #[test]
    fn diff_without_hunks_attributes_nothing() {
        let mut map = AuthorLineMap::new();
        let count = map.attribute_commit("alice", &[file("a.rs", "+foo\n-bar\n+baz\n")]);
        assert_eq!(count, 0);
        assert!(map.is_empty());
        assert!(map.get("alice").is_none());
    }

    #[test]
    fn removed_lines_are_not_attributed() {
        let mut map = AuthorLineMap::new();
        map.attribute_commit(
            "alice",
            &[file("a.rs", "@@ -1,1 +1,2 @@\n+foo\n context\n-bar\n")],
        );
        let lines = map.get("alice").unwrap();
        assert_eq!(
            lines,
            &[LineAttribution {
                file_path: "a.rs".into(),
                content: "foo".into()
            }]
        );
    }

    #[test]
    fn accumulates_across_commits_in_order() {
        let mut map = AuthorLineMap::new();
        map.attribute_commit(
            "alice",
            &[
                file("a.rs", "@@ -0,0 +1 @@\n+one\n"),
                file("b.rs", "@@ -0,0 +1,2 @@\n+two\n+three\n"),
            ],
        );
        map.attribute_commit("bob", &[file("c.rs", "@@ -0,0 +1 @@\n+bob\n")]);
        map.attribute_commit("alice", &[file("a.rs", "@@ -1 +1,2 @@\n one\n+four\n")]);

        let contents: Vec<_> = map
            .get("alice")
            .unwrap()
            .iter()
            .map(|l| (l.file_path.as_str(), l.content.as_str()))
            .collect();
        assert_eq!(
            contents,
            vec![
                ("a.rs", "one"),
                ("b.rs", "two"),
                ("b.rs", "three"),
                ("a.rs", "four"),
            ]
        );

        let names: Vec<_> = map.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[test]
    fn line_counts_preserve_insertion_order() {
        let mut map = AuthorLineMap::new();
        map.attribute_commit("zed", &[file("z.rs", "@@ -0,0 +1 @@\n+z\n")]);
        map.attribute_commit("amy", &[file("a.rs", "@@ -0,0 +1,2 @@\n+a\n+b\n")]);

        let counts = map.line_counts();
        let entries: Vec<_> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(entries, vec![("zed", 1), ("amy", 2)]);
    }

    #[test]
    fn deleted_file_lines_use_old_path() {
        let mut diff = file("gone.rs", "@@ -1 +0,0 @@\n-x\n");
        diff.new_path = String::new();
        diff.deleted_file = true;
        let mut map = AuthorLineMap::new();
        assert_eq!(map.attribute_commit("alice", &[diff]), 0);
    }

    #[test]
    fn renamed_file_attributes_to_new_path() {
        let mut diff = file("old.rs", "@@ -1 +1,2 @@\n x\n+y\n");
        diff.new_path = "new.rs".into();
        diff.renamed_file = true;
        let mut map = AuthorLineMap::new();
        map.attribute_commit("alice", &[diff]);
        assert_eq!(map.get("alice").unwrap()[0].file_path, "new.rs");
    }

    #[test]
    fn serializes_as_plain_map() {
        let mut map = AuthorLineMap::new();
        map.attribute_commit("alice", &[file("a.rs", "@@ -0,0 +1 @@\n+x\n")]);
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["alice"][0]["content"], "x");
    }
}
