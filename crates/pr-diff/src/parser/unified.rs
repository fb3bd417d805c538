//! Parse unified diff text (as returned by `gh pr diff`) into file records.

use super::{cut_at_markers, FILE_MARKER};
use crate::model::{DiffFile, DiffLine};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

/// `a/<old> b/<new>` on the first line of a section. The lazy old-path group
/// splits at the first ` b/`; neither group takes a `\r` from CRLF input.
static FILE_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"a/([^\r\n]+?) b/([^\r\n]+)").expect("hardcoded file header regex")
});

/// `@@ -<old>[,<count>] +<new>[,<count>] @@`, optionally followed by a
/// function context.
static HUNK_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,\d+)? \+(\d+)(?:,\d+)? @@").expect("hardcoded hunk regex")
});

/// Extended header lines that never produce a row.
const METADATA_PREFIXES: &[&str] = &[
    "index ",
    "--- ",
    "+++ ",
    "new file",
    "deleted file",
    "old mode",
    "new mode",
    "similarity",
    "rename",
    "Binary",
];

/// Parse a multi-file unified diff into one [`DiffFile`] per file section.
///
/// Sections whose first line does not carry `a/<path> b/<path>` are skipped.
/// Line numbers come from the hunk header starts and advance with each
/// line marker; hunk counts are not checked against the body.
///
/// # Example
/// ```rust
/// use pr_diff::parse_unified_diff;
///
/// let files = parse_unified_diff("diff --git a/x.txt b/x.txt\n@@ -1 +1,2 @@\n x\n+y\n");
/// assert_eq!(files.len(), 1);
/// assert_eq!(files[0].lines.len(), 3);
/// ```
pub fn parse_unified_diff(raw_diff: &str) -> Vec<DiffFile> {
    let mut files = Vec::new();

    for piece in cut_at_markers(raw_diff) {
        let section = piece.strip_prefix(FILE_MARKER).unwrap_or(piece);
        match parse_section(section) {
            Some(file) => files.push(file),
            None => debug!(
                "Skipping diff section without file header: {:?}",
                first_line(section)
            ),
        }
    }

    debug!("Parsed {} file(s) from diff", files.len());
    files
}

/// Running line counters for one file section.
#[derive(Debug, Default)]
struct LineCursor {
    old_line: u32,
    new_line: u32,
}

impl LineCursor {
    fn reset(&mut self, old_start: u32, new_start: u32) {
        self.old_line = old_start;
        self.new_line = new_start;
    }

    fn take_old(&mut self) -> u32 {
        let current = self.old_line;
        self.old_line = self.old_line.saturating_add(1);
        current
    }

    fn take_new(&mut self) -> u32 {
        let current = self.new_line;
        self.new_line = self.new_line.saturating_add(1);
        current
    }
}

/// Parse one section (the text after the stripped `diff --git ` marker).
fn parse_section(section: &str) -> Option<DiffFile> {
    let mut lines = section_lines(section);
    let (old_path, new_path) = parse_file_header(lines.next()?)?;

    // Counters start at zero; rows before the first hunk header keep them.
    let mut cursor = LineCursor::default();
    let mut rows = Vec::new();

    for line in lines {
        if let Some((old_start, new_start)) = parse_hunk_header(line) {
            cursor.reset(old_start, new_start);
            rows.push(DiffLine::header(line));
            continue;
        }

        if is_metadata(line) {
            continue;
        }

        if let Some(text) = line.strip_prefix('+') {
            rows.push(DiffLine::addition(text, cursor.take_new()));
        } else if let Some(text) = line.strip_prefix('-') {
            rows.push(DiffLine::removal(text, cursor.take_old()));
        } else if let Some(text) = line.strip_prefix(' ') {
            rows.push(DiffLine::context(text, cursor.take_old(), cursor.take_new()));
        } else if line.is_empty() {
            rows.push(DiffLine::context("", cursor.take_old(), cursor.take_new()));
        }
        // Anything else ("\ No newline at end of file", stray text) is ignored.
    }

    Some(DiffFile::new(
        new_path,
        Some(old_path.to_string()),
        rows,
        format!("{FILE_MARKER}{section}"),
    ))
}

/// Split a section into lines. The final newline terminates the last line
/// rather than starting an empty one.
fn section_lines(section: &str) -> std::str::Split<'_, char> {
    section.strip_suffix('\n').unwrap_or(section).split('\n')
}

fn first_line(section: &str) -> &str {
    section.split('\n').next().unwrap_or_default()
}

/// Extract `(old_path, new_path)` from `a/<old> b/<new>`.
fn parse_file_header(line: &str) -> Option<(&str, &str)> {
    let caps = FILE_HEADER_RE.captures(line)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Extract `(old_start, new_start)` from a hunk header line.
fn parse_hunk_header(line: &str) -> Option<(u32, u32)> {
    let caps = HUNK_HEADER_RE.captures(line)?;
    let old_start = caps[1].parse().ok()?;
    let new_start = caps[2].parse().ok()?;
    Some((old_start, new_start))
}

fn is_metadata(line: &str) -> bool {
    METADATA_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}
