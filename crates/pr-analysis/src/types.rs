//! Analysis data transfer objects
//!
//! The shapes an [`Analyzer`](crate::Analyzer) produces. Field names are
//! camelCase on the wire so results can be handed to a web front end as-is.

use pr_source::PullRequestDetail;
use serde::{Deserialize, Serialize};

/// Pull request information handed to the analyzer along with each diff
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisContext {
    /// PR title
    pub title: String,
    /// PR body, empty when none was written
    #[serde(default)]
    pub description: String,
}

impl AnalysisContext {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Build from fetched PR metadata
    pub fn from_detail(detail: &PullRequestDetail) -> Self {
        Self::new(detail.title.clone(), detail.body.clone())
    }
}

/// A member of a changed code object (a method, field, variant...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMember {
    pub name: String,
    pub kind: String,
    pub desc: String,
}

/// A code object touched by a file's changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeObject {
    pub name: String,
    pub kind: String,
    pub desc: String,
    #[serde(default)]
    pub members: Vec<ObjectMember>,
}

/// A note attached to one line of the new file version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineAnnotation {
    pub line_number: u32,
    pub annotation: String,
}

impl LineAnnotation {
    pub fn new(line_number: u32, annotation: impl Into<String>) -> Self {
        Self {
            line_number,
            annotation: annotation.into(),
        }
    }
}

/// Review notes for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAnalysis {
    /// Path of the analysed file
    pub file: String,
    /// One or two sentences describing the change
    pub summary: String,
    #[serde(default)]
    pub objects: Vec<CodeObject>,
    #[serde(default)]
    pub annotations: Vec<LineAnnotation>,
    #[serde(default)]
    pub risk_notes: Vec<String>,
    #[serde(default)]
    pub decisions: Vec<String>,
}

impl FileAnalysis {
    /// An analysis carrying only a summary
    pub fn summary_only(file: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            summary: summary.into(),
            objects: Vec::new(),
            annotations: Vec::new(),
            risk_notes: Vec::new(),
            decisions: Vec::new(),
        }
    }

    /// Placeholder for a file whose analysis raised an error
    pub fn failed(file: impl Into<String>, error: &anyhow::Error) -> Self {
        Self::summary_only(file, format!("Analysis failed: {error}"))
    }

    /// Whether this is a placeholder produced by [`FileAnalysis::failed`]
    pub fn is_failure(&self) -> bool {
        self.summary.starts_with("Analysis failed: ")
    }
}

/// Overall risk of merging a PR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// T-shirt size of a concept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConceptSize {
    #[serde(rename = "S")]
    Small,
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "L")]
    Large,
    #[serde(rename = "XL")]
    ExtraLarge,
}

/// A group of files that together implement one idea
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub id: String,
    pub label: String,
    pub icon: String,
    pub size: ConceptSize,
    pub summary: String,
    /// Paths of the files belonging to this concept
    pub file_ids: Vec<String>,
}

/// PR-wide synthesis of the per-file analyses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrAnalysis {
    #[serde(default)]
    pub summary: String,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub key_changes: Vec<String>,
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub concepts: Vec<Concept>,
}

impl PrAnalysis {
    /// Used when synthesis fails: one concept covering every file
    pub fn fallback(file_analyses: &[FileAnalysis]) -> Self {
        Self {
            summary: String::new(),
            risk_level: RiskLevel::Medium,
            key_changes: Vec::new(),
            intent: String::new(),
            concepts: vec![Concept {
                id: "all-changes".to_string(),
                label: "All Changes".to_string(),
                icon: "📝".to_string(),
                size: ConceptSize::Large,
                summary: "All files changed in this PR".to_string(),
                file_ids: file_analyses.iter().map(|f| f.file.clone()).collect(),
            }],
        }
    }
}

/// Everything produced for one PR at one head commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub pr_analysis: PrAnalysis,
    pub file_analyses: Vec<FileAnalysis>,
}

impl AnalysisResult {
    /// Find the analysis of a file by path
    pub fn file(&self, path: &str) -> Option<&FileAnalysis> {
        self.file_analyses.iter().find(|f| f.file == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_file_analysis_deserializes_partial_json() {
        let json = r#"{
            "file": "src/lib.rs",
            "summary": "Adds a parser",
            "annotations": [{ "lineNumber": 12, "annotation": "entry point" }],
            "riskNotes": ["no tests"]
        }"#;

        let analysis: FileAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.annotations, vec![LineAnnotation::new(12, "entry point")]);
        assert_eq!(analysis.risk_notes, vec!["no tests".to_string()]);
        assert!(analysis.objects.is_empty());
        assert!(analysis.decisions.is_empty());
    }

    #[test]
    fn test_failed_analysis() {
        let err = anyhow::anyhow!("rate limited");
        let analysis = FileAnalysis::failed("a.rs", &err);
        assert_eq!(analysis.file, "a.rs");
        assert_eq!(analysis.summary, "Analysis failed: rate limited");
        assert!(analysis.is_failure());
        assert!(!FileAnalysis::summary_only("a.rs", "fine").is_failure());
    }

    #[test]
    fn test_fallback_pr_analysis() {
        let files = vec![
            FileAnalysis::summary_only("a.rs", "x"),
            FileAnalysis::summary_only("b.rs", "y"),
        ];
        let fallback = PrAnalysis::fallback(&files);

        assert_eq!(fallback.risk_level, RiskLevel::Medium);
        assert_eq!(fallback.concepts.len(), 1);
        let concept = &fallback.concepts[0];
        assert_eq!(concept.id, "all-changes");
        assert_eq!(concept.label, "All Changes");
        assert_eq!(concept.icon, "📝");
        assert_eq!(concept.size, ConceptSize::Large);
        assert_eq!(concept.file_ids, vec!["a.rs", "b.rs"]);
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(PrAnalysis::fallback(&[])).unwrap();
        assert_eq!(json["riskLevel"], "medium");
        assert_eq!(json["keyChanges"], serde_json::json!([]));
        assert_eq!(json["concepts"][0]["size"], "L");
        assert_eq!(json["concepts"][0]["fileIds"], serde_json::json!([]));

        let size: ConceptSize = serde_json::from_str("\"XL\"").unwrap();
        assert_eq!(size, ConceptSize::ExtraLarge);
    }

    #[test]
    fn test_result_file_lookup() {
        let result = AnalysisResult {
            pr_analysis: PrAnalysis::fallback(&[]),
            file_analyses: vec![FileAnalysis::summary_only("a.rs", "x")],
        };
        assert_eq!(result.file("a.rs").map(|f| f.summary.as_str()), Some("x"));
        assert!(result.file("b.rs").is_none());
    }
}
