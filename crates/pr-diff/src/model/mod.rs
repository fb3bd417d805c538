//! Data models for diff representation.

mod diff;
mod fragment;

pub use diff::{DiffFile, DiffLine, DiffStats, LineKind};
pub use fragment::{FileFragment, UNKNOWN_FILE_NAME};
