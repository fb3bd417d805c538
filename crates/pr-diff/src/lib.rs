//! # pr-diff
//!
//! Turns raw unified diff text (as printed by `gh pr diff` or `git diff`)
//! into a structured, line-addressable model for rendering and for mapping
//! review annotations onto lines.
//!
//! The crate exposes two independent, pure entry points that consume the
//! same raw text:
//!
//! - [`parse_unified_diff`] builds one [`DiffFile`] per file section, each
//!   holding classified and numbered [`DiffLine`]s.
//! - [`split_diff_by_file`] cuts the raw text into per-file
//!   [`FileFragment`]s so each file can be analysed on its own.
//!
//! Neither function fails: unexpected shapes are skipped rather than
//! reported, so one odd file section never breaks a whole review.
//!
//! ## Usage
//!
//! ```rust
//! use pr_diff::{parse_unified_diff, split_diff_by_file, LineKind};
//!
//! let raw = "diff --git a/x.txt b/x.txt\n--- a/x.txt\n+++ b/x.txt\n@@ -1 +1 @@\n-old\n+new\n";
//!
//! let files = parse_unified_diff(raw);
//! assert_eq!(files[0].path, "x.txt");
//! assert_eq!(files[0].lines[1].kind, LineKind::Remove);
//!
//! let fragments = split_diff_by_file(raw);
//! assert_eq!(fragments[0].file_name, "x.txt");
//! ```

pub mod model;
pub mod parser;

pub use model::{DiffFile, DiffLine, DiffStats, FileFragment, LineKind, UNKNOWN_FILE_NAME};
pub use parser::{parse_unified_diff, split_diff_by_file};
