//! Mapping analysis notes onto diff lines
//!
//! Annotations refer to line numbers of the new file version, so they are
//! matched against [`DiffLine::new_line_number`]. Removed lines and hunk
//! headers have no new number and never carry notes.

use crate::types::FileAnalysis;
use pr_diff::{DiffFile, DiffLine};
use serde::Serialize;
use std::collections::HashMap;

/// Lookup of annotation text by file path and new line number
#[derive(Debug, Default)]
pub struct AnnotationIndex<'a> {
    notes: HashMap<&'a str, HashMap<u32, Vec<&'a str>>>,
}

impl<'a> AnnotationIndex<'a> {
    /// Index the annotations of every analysis
    pub fn new(analyses: &'a [FileAnalysis]) -> Self {
        let mut notes: HashMap<&'a str, HashMap<u32, Vec<&'a str>>> = HashMap::new();
        for analysis in analyses {
            let by_line = notes.entry(analysis.file.as_str()).or_default();
            for annotation in &analysis.annotations {
                by_line
                    .entry(annotation.line_number)
                    .or_default()
                    .push(annotation.annotation.as_str());
            }
        }
        Self { notes }
    }

    /// Notes for one line, in the order the analyzer gave them
    pub fn notes_for(&self, path: &str, new_line_number: u32) -> &[&'a str] {
        self.notes
            .get(path)
            .and_then(|by_line| by_line.get(&new_line_number))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Notes for a diff row; empty for rows without a new line number
    pub fn notes_for_line(&self, path: &str, line: &DiffLine) -> &[&'a str] {
        match line.new_line_number {
            Some(number) => self.notes_for(path, number),
            None => &[],
        }
    }

    /// Total number of indexed notes
    pub fn len(&self) -> usize {
        self.notes
            .values()
            .flat_map(|by_line| by_line.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A diff row with the notes attached to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedLine<'a> {
    #[serde(flatten)]
    pub line: &'a DiffLine,
    pub notes: Vec<&'a str>,
}

/// A parsed file paired with its analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedFile<'a> {
    pub path: &'a str,
    pub old_path: Option<&'a str>,
    pub analysis: Option<&'a FileAnalysis>,
    pub lines: Vec<AnnotatedLine<'a>>,
    /// Line numbers with notes that match no row of the diff
    pub unplaced: Vec<u32>,
}

impl AnnotatedFile<'_> {
    /// Number of notes placed on lines
    pub fn note_count(&self) -> usize {
        self.lines.iter().map(|line| line.notes.len()).sum()
    }
}

/// Pair every parsed file with its analysis and every line with its notes
///
/// Files without an analysis are kept with `analysis: None` and no notes.
pub fn annotate<'a>(files: &'a [DiffFile], analyses: &'a [FileAnalysis]) -> Vec<AnnotatedFile<'a>> {
    let index = AnnotationIndex::new(analyses);

    files
        .iter()
        .map(|file| {
            let path = file.path.as_str();
            let analysis = analyses.iter().find(|a| a.file == path);

            let lines = file
                .lines
                .iter()
                .map(|line| AnnotatedLine {
                    line,
                    notes: index.notes_for_line(path, line).to_vec(),
                })
                .collect();

            let mut unplaced: Vec<u32> = analysis
                .map(|a| {
                    a.annotations
                        .iter()
                        .map(|note| note.line_number)
                        .filter(|number| file.line_for_new_number(*number).is_none())
                        .collect()
                })
                .unwrap_or_default();
            unplaced.sort_unstable();
            unplaced.dedup();

            AnnotatedFile {
                path,
                old_path: file.old_path.as_deref(),
                analysis,
                lines,
                unplaced,
            }
        })
        .collect()
}
