//! Split a multi-file diff into per-file fragments for independent analysis.

use super::cut_at_markers;
use crate::model::{FileFragment, UNKNOWN_FILE_NAME};
use regex::Regex;
use std::sync::LazyLock;

/// Same lazy split as the parser's file header, so fragment names agree
/// with parsed paths.
static FILE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"diff --git a/[^\r\n]+? b/([^\r\n]+)").expect("hardcoded file name regex")
});

/// Split a raw diff into one [`FileFragment`] per `diff --git ` section.
///
/// The marker line stays inside each fragment. Fragments appear in input
/// order; a fragment whose name cannot be read is named
/// [`UNKNOWN_FILE_NAME`].
///
/// # Example
/// ```rust
/// use pr_diff::split_diff_by_file;
///
/// let raw = "diff --git a/a.rs b/a.rs\n+a\ndiff --git a/b.rs b/b.rs\n+b\n";
/// let fragments = split_diff_by_file(raw);
/// assert_eq!(fragments.len(), 2);
/// assert_eq!(fragments[1].file_name, "b.rs");
/// assert_eq!(fragments[1].diff_text, "diff --git a/b.rs b/b.rs\n+b\n");
/// ```
pub fn split_diff_by_file(raw_diff: &str) -> Vec<FileFragment<'_>> {
    cut_at_markers(raw_diff)
        .into_iter()
        .map(|section| FileFragment::new(extract_file_name(section), section))
        .collect()
}

fn extract_file_name(section: &str) -> &str {
    FILE_NAME_RE
        .captures(section)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(UNKNOWN_FILE_NAME)
}
