//! Per-file slices of a multi-file diff.

use serde::Serialize;

/// Fallback name for a fragment whose `diff --git` line could not be read.
pub const UNKNOWN_FILE_NAME: &str = "unknown";

/// One file's raw diff text, borrowed from the full diff.
///
/// Fragments are handed straight to per-file analysis and are not retained,
/// so they borrow instead of copying the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFragment<'a> {
    /// File path taken from the `b/` side of the `diff --git` line.
    pub file_name: &'a str,
    /// The fragment text, starting with its `diff --git ` line.
    pub diff_text: &'a str,
}

impl<'a> FileFragment<'a> {
    pub fn new(file_name: &'a str, diff_text: &'a str) -> Self {
        Self {
            file_name,
            diff_text,
        }
    }

    /// True when no file name could be extracted.
    pub fn is_unknown(&self) -> bool {
        self.file_name == UNKNOWN_FILE_NAME
    }
}
