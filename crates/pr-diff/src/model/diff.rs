//! Diff data structures representing one pull request's file changes.

use serde::{Deserialize, Serialize};

/// A single file's change record.
///
/// Built once per parse call and never mutated afterwards. `lines` keeps
/// the order in which rows appear in the diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffFile {
    /// File path after the change (identity for annotation lookups).
    pub path: String,
    /// Path before the change, only set for renames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
    /// Rendered rows: hunk headers plus classified, numbered lines.
    pub lines: Vec<DiffLine>,
    /// The original diff text for this file, including the `diff --git ` line.
    pub raw_fragment: String,
}

impl DiffFile {
    /// Create a file record. `old_path` is dropped when it equals `path`.
    pub fn new(
        path: impl Into<String>,
        old_path: Option<String>,
        lines: Vec<DiffLine>,
        raw_fragment: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let old_path = old_path.filter(|old| *old != path);
        Self {
            path,
            old_path,
            lines,
            raw_fragment: raw_fragment.into(),
        }
    }

    /// Whether the file was moved.
    pub fn is_rename(&self) -> bool {
        self.old_path.is_some()
    }

    /// Name for headings: `old → new` for renames, the path otherwise.
    pub fn display_name(&self) -> String {
        match &self.old_path {
            Some(old) => format!("{} → {}", old, self.path),
            None => self.path.clone(),
        }
    }

    /// Number of added lines.
    pub fn additions(&self) -> usize {
        self.count(LineKind::Add)
    }

    /// Number of removed lines.
    pub fn deletions(&self) -> usize {
        self.count(LineKind::Remove)
    }

    /// Number of hunk headers.
    pub fn hunk_count(&self) -> usize {
        self.count(LineKind::Header)
    }

    /// Find the row showing line `number` of the new file version.
    pub fn line_for_new_number(&self, number: u32) -> Option<&DiffLine> {
        self.lines
            .iter()
            .find(|line| line.new_line_number == Some(number))
    }

    /// Find the row showing line `number` of the old file version.
    pub fn line_for_old_number(&self, number: u32) -> Option<&DiffLine> {
        self.lines
            .iter()
            .find(|line| line.old_line_number == Some(number))
    }

    fn count(&self, kind: LineKind) -> usize {
        self.lines.iter().filter(|l| l.kind == kind).count()
    }
}

/// A single rendered row of a file diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffLine {
    /// Row classification.
    pub kind: LineKind,
    /// Content without the leading `+`/`-`/space marker. For headers, the
    /// whole `@@ ... @@` line.
    pub text: String,
    /// Line number in the old file (Context and Remove).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_line_number: Option<u32>,
    /// Line number in the new file (Context and Add).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_line_number: Option<u32>,
}

impl DiffLine {
    /// Create a hunk header row. Headers carry no line numbers.
    pub fn header(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Header,
            text: text.into(),
            old_line_number: None,
            new_line_number: None,
        }
    }

    /// Create an added line.
    pub fn addition(text: impl Into<String>, new_line: u32) -> Self {
        Self {
            kind: LineKind::Add,
            text: text.into(),
            old_line_number: None,
            new_line_number: Some(new_line),
        }
    }

    /// Create a removed line.
    pub fn removal(text: impl Into<String>, old_line: u32) -> Self {
        Self {
            kind: LineKind::Remove,
            text: text.into(),
            old_line_number: Some(old_line),
            new_line_number: None,
        }
    }

    /// Create an unchanged context line.
    pub fn context(text: impl Into<String>, old_line: u32, new_line: u32) -> Self {
        Self {
            kind: LineKind::Context,
            text: text.into(),
            old_line_number: Some(old_line),
            new_line_number: Some(new_line),
        }
    }

    /// Line number to display (prefers the new side, falls back to the old).
    pub fn display_line_number(&self) -> Option<u32> {
        self.new_line_number.or(self.old_line_number)
    }
}

/// Row type in the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// `@@` hunk header, rendered as a section divider.
    Header,
    /// Added line (+).
    Add,
    /// Removed line (-).
    Remove,
    /// Unchanged line.
    Context,
}

/// Aggregate change counts across parsed files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    /// Number of file records.
    pub files: usize,
    /// Total added lines.
    pub additions: usize,
    /// Total removed lines.
    pub deletions: usize,
}

impl DiffStats {
    /// Sum up the given files.
    pub fn from_files(files: &[DiffFile]) -> Self {
        Self {
            files: files.len(),
            additions: files.iter().map(DiffFile::additions).sum(),
            deletions: files.iter().map(DiffFile::deletions).sum(),
        }
    }

    /// Added plus removed lines.
    pub fn changed_lines(&self) -> usize {
        self.additions + self.deletions
    }
}
