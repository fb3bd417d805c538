//! # pr-analysis
//!
//! Drives per-file review analysis of a pull request and maps the resulting
//! notes back onto diff lines.
//!
//! ## Architecture
//!
//! ```text
//! raw diff ──► split_diff_by_file ──► Analyzer::analyze_file (bounded fan-out)
//!                                              │
//!                       AnalysisEvent::Progress ◄┤
//!                                              ▼
//!                                    Analyzer::synthesize
//!                                              │
//!                          LruCache ◄──────────┤
//!                                              ▼
//!                                   AnalysisEvent::Done
//! ```
//!
//! The [`Analyzer`] itself (usually a language model) is supplied by the
//! caller. Failed files and a failed synthesis are replaced with
//! placeholder results, so a run always ends with `Done`.
//!
//! Once an [`AnalysisResult`] is available, [`annotate`] pairs the parsed
//! [`pr_diff::DiffFile`]s with their analyses line by line.

pub mod analyzer;
pub mod annotations;
pub mod dispatcher;
pub mod events;
pub mod types;

pub use analyzer::Analyzer;
pub use annotations::{annotate, AnnotatedFile, AnnotatedLine, AnnotationIndex};
pub use dispatcher::{AnalysisDispatcher, SharedAnalysisCache};
pub use events::AnalysisEvent;
pub use types::{
    AnalysisContext, AnalysisResult, CodeObject, Concept, ConceptSize, FileAnalysis,
    LineAnnotation, ObjectMember, PrAnalysis, RiskLevel,
};
