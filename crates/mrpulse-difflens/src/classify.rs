use serde::Serialize;

/// One line of a file diff, classified by its role.
///
/// # Examples
///
/// ```
/// use mrpulse_difflens::classify::{classify_diff, ClassifiedLine};
///
/// let lines = classify_diff("@@ -1 +1,2 @@\n+added\n kept\n");
/// assert_eq!(lines[0], ClassifiedLine::HunkHeader);
/// assert_eq!(lines[1], ClassifiedLine::Added("added".into()));
/// assert_eq!(lines[2], ClassifiedLine::Context);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum ClassifiedLine {
    /// A line added inside a hunk, without its leading `+`.
    Added(String),
    /// A line removed inside a hunk, without its leading `-`.
    Removed(String),
    /// An unchanged line inside a hunk.
    Context,
    /// A `@@ ... @@` hunk header.
    HunkHeader,
    /// File metadata outside a hunk, or a `+++`/`---` path marker.
    Noise,
}

impl ClassifiedLine {
    /// Content of an added line, if this is one.
    pub fn as_added(&self) -> Option<&str> {
        match self {
            ClassifiedLine::Added(content) => Some(content),
            _ => None,
        }
    }
}

/// Classify every line of one file's diff text.
///
/// Lines before the first `@@` header are [`ClassifiedLine::Noise`]. Inside a
/// hunk, a `+` line is added and a `-` line is removed unless it is a
/// `+++`/`---` path marker; everything else is context. Total over any input.
///
/// # Examples
///
/// ```
/// use mrpulse_difflens::classify::classify_diff;
///
/// assert!(classify_diff("").is_empty());
/// ```
pub fn classify_diff(diff: &str) -> Vec<ClassifiedLine> {
    let mut in_hunk = false;
    diff.lines()
        .map(|line| classify_line(line, &mut in_hunk))
        .collect()
}

/// Iterate over the contents of added lines only, in diff order.
///
/// # Examples
///
/// ```
/// use mrpulse_difflens::classify::added_lines;
///
/// let added: Vec<_> = added_lines("@@ -1,1 +1,2 @@\n+foo\n context\n-bar\n").collect();
/// assert_eq!(added, vec!["foo"]);
/// ```
pub fn added_lines(diff: &str) -> impl Iterator<Item = &str> + '_ {
    let mut in_hunk = false;
    diff.lines().filter_map(move |line| {
        match classify_line(line, &mut in_hunk) {
            ClassifiedLine::Added(_) => line.strip_prefix('+'),
            _ => None,
        }
    })
}

fn classify_line(line: &str, in_hunk: &mut bool) -> ClassifiedLine {
    if line.starts_with("@@") {
        *in_hunk = true;
        return ClassifiedLine::HunkHeader;
    }

    if !*in_hunk || is_path_marker(line) {
        return ClassifiedLine::Noise;
    }

    if let Some(content) = line.strip_prefix('+') {
        ClassifiedLine::Added(content.to_string())
    } else if let Some(content) = line.strip_prefix('-') {
        ClassifiedLine::Removed(content.to_string())
    } else {
        ClassifiedLine::Context
    }
}

// `+++ b/path` / `--- a/path` headers, or the bare markers.
fn is_path_marker(line: &str) -> bool {
    matches!(line, "+++" | "---") || line.starts_with("+++ ") || line.starts_with("--- ")
}

/// Line statistics for one file's diff text.
///
/// # Examples
///
/// ```
/// use mrpulse_difflens::classify::DiffStats;
///
/// let stats = DiffStats::from_diff("@@ -1,2 +1,2 @@\n-old\n+new\n same\n");
/// assert_eq!(stats.added, 1);
/// assert_eq!(stats.removed, 1);
/// assert_eq!(stats.hunks, 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffStats {
    /// Added lines.
    pub added: usize,
    /// Removed lines.
    pub removed: usize,
    /// Hunk headers seen.
    pub hunks: usize,
}

impl DiffStats {
    /// Compute statistics for a diff text.
    pub fn from_diff(diff: &str) -> Self {
        Self::from_lines(&classify_diff(diff))
    }

    /// Compute statistics from already classified lines.
    pub fn from_lines(lines: &[ClassifiedLine]) -> Self {
        lines.iter().fold(Self::default(), |mut stats, line| {
            match line {
                ClassifiedLine::Added(_) => stats.added += 1,
                ClassifiedLine::Removed(_) => stats.removed += 1,
                ClassifiedLine::HunkHeader => stats.hunks += 1,
                ClassifiedLine::Context | ClassifiedLine::Noise => {}
            }
            stats
        })
    }
}

impl std::ops::AddAssign for DiffStats {
    fn add_assign(&mut self, rhs: Self) {
        self.added += rhs.added;
        self.removed += rhs.removed;
        self.hunks += rhs.hunks;
    }
}
