//! Analyzer trait
//!
//! The service that reads diffs and writes review notes (typically a
//! language model) sits behind this trait. The dispatcher only consumes the
//! shapes it returns.

use crate::types::{AnalysisContext, FileAnalysis, PrAnalysis};
use async_trait::async_trait;

/// Produces review notes for diffs
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the dispatcher calls
/// [`analyze_file`](Self::analyze_file) for several files at once.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyse the diff of one file
    ///
    /// # Arguments
    ///
    /// * `diff` - The file's raw diff text, starting at its `diff --git ` line
    /// * `file_name` - Path of the file
    /// * `context` - Title and description of the PR
    async fn analyze_file(
        &self,
        diff: &str,
        file_name: &str,
        context: &AnalysisContext,
    ) -> anyhow::Result<FileAnalysis>;

    /// Combine the per-file analyses into a PR-wide picture
    async fn synthesize(
        &self,
        file_analyses: &[FileAnalysis],
        context: &AnalysisContext,
    ) -> anyhow::Result<PrAnalysis>;
}
