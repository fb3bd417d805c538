//! Parsers for unified diff text.

mod splitter;
mod unified;

pub use splitter::split_diff_by_file;
pub use unified::parse_unified_diff;

/// Marker that opens every file section.
pub(crate) const FILE_MARKER: &str = "diff --git ";

/// Byte offsets where a line starts with [`FILE_MARKER`].
pub(crate) fn marker_offsets(raw: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut line_start = 0;

    for line in raw.split_inclusive('\n') {
        if line.starts_with(FILE_MARKER) {
            offsets.push(line_start);
        }
        line_start += line.len();
    }

    offsets
}

/// Cut `raw` at every marker offset, keeping any text before the first
/// marker as its own piece. Empty pieces are dropped.
pub(crate) fn cut_at_markers(raw: &str) -> Vec<&str> {
    let offsets = marker_offsets(raw);
    let mut pieces = Vec::with_capacity(offsets.len() + 1);
    let mut start = 0;

    for &offset in offsets.iter().chain(std::iter::once(&raw.len())) {
        let piece = &raw[start..offset];
        if !piece.is_empty() {
            pieces.push(piece);
        }
        start = offset;
    }

    pieces
}
