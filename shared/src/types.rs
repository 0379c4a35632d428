//! Core shared types and identifiers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::{SharedError, SharedResult};
use crate::labels::LabelSet;

/// Unique identifier for a tuning run, attached to every log event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> SharedResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| SharedError::InvalidRunId { input: s.to_string() })
    }

    /// Short form used in log lines
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run_{}", self.short())
    }
}

/// Identifier of a case, derived from its input file name
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(String);

impl CaseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single evaluation case: opaque input payload plus ground-truth labels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub input: serde_json::Value,
    pub ground_truth: Vec<String>,
}

impl Case {
    pub fn new(id: impl Into<String>, input: serde_json::Value, ground_truth: Vec<String>) -> Self {
        Self {
            id: CaseId::new(id),
            input,
            ground_truth,
        }
    }
}

/// Set differences between a prediction and its ground truth
///
/// `recall` is `|correct| / |truth|` and `precision` is `|correct| / |predicted|`;
/// each is 0.0 when its denominator set is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DifferenceReport {
    pub missed: LabelSet,
    pub wrong: LabelSet,
    pub correct: LabelSet,
    pub recall: f64,
    pub precision: f64,
}

/// Outcome of evaluating one case within a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    pub case_id: CaseId,
    pub predicted: Vec<String>,
    pub truth: Vec<String>,
    pub report: DifferenceReport,
    pub overlap_score: f64,
    pub analysis: String,
}

/// Round-level summary of what went wrong across cases
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub total_cases: usize,
    pub common_missed: LabelSet,
    pub common_wrong: LabelSet,
}

/// What happened to the optimizer's candidate prompt in a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CandidateStatus {
    /// Candidate passed skeleton validation and was evaluated
    Accepted,
    /// Candidate broke the template skeleton; previous best prompt evaluated instead
    Rejected { reason: String },
    /// Optimizer service failed after retries; previous best prompt evaluated instead
    GenerationFailed { reason: String },
}

impl CandidateStatus {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CandidateStatus::Accepted)
    }
}

/// Immutable record of one optimization round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub index: u32,
    pub prompt_before: String,
    pub prompt_after: String,
    pub candidate: CandidateStatus,
    pub per_case: Vec<CaseResult>,
    pub skipped_cases: Vec<CaseId>,
    pub aggregate_overlap_score: f64,
    pub summary: RoundSummary,
    pub completed_at: DateTime<Utc>,
}

/// Per-case slice of the feedback sent to the optimizer service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseFeedback {
    pub case_id: CaseId,
    pub predictions: Vec<String>,
    pub ground_truth: Vec<String>,
    pub missed_diagnoses: LabelSet,
    pub wrong_diagnoses: LabelSet,
    pub analysis_report: String,
}

/// Feedback bundle built from the previous round's record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackBundle {
    pub prompt: String,
    pub case_analyses: Vec<CaseFeedback>,
    pub analysis_summary: RoundSummary,
}

impl From<&IterationRecord> for FeedbackBundle {
    fn from(record: &IterationRecord) -> Self {
        let case_analyses = record
            .per_case
            .iter()
            .map(|result| CaseFeedback {
                case_id: result.case_id.clone(),
                predictions: result.predicted.clone(),
                ground_truth: result.truth.clone(),
                missed_diagnoses: result.report.missed.clone(),
                wrong_diagnoses: result.report.wrong.clone(),
                analysis_report: result.analysis.clone(),
            })
            .collect();

        Self {
            prompt: record.prompt_after.clone(),
            case_analyses,
            analysis_summary: record.summary.clone(),
        }
    }
}

/// Request sent to the optimizer service for a new prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub current_prompt: String,
    pub round: u32,
    pub feedback: Option<FeedbackBundle>,
}

/// Request sent to the analyzer service for one case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub input: serde_json::Value,
    pub predicted: Vec<String>,
    pub truth: Vec<String>,
    pub report: DifferenceReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> IterationRecord {
        IterationRecord {
            index: 2,
            prompt_before: "before".to_string(),
            prompt_after: "after".to_string(),
            candidate: CandidateStatus::Accepted,
            per_case: vec![CaseResult {
                case_id: CaseId::new("c1"),
                predicted: vec!["Gastritis".to_string()],
                truth: vec!["Gastritis".to_string(), "Anemia".to_string()],
                report: DifferenceReport {
                    missed: LabelSet::from_labels(["anemia"]),
                    wrong: LabelSet::new(),
                    correct: LabelSet::from_labels(["gastritis"]),
                    recall: 0.5,
                    precision: 1.0,
                },
                overlap_score: 0.5,
                analysis: "missed anemia".to_string(),
            }],
            skipped_cases: vec![],
            aggregate_overlap_score: 0.5,
            summary: RoundSummary {
                total_cases: 1,
                common_missed: LabelSet::from_labels(["anemia"]),
                common_wrong: LabelSet::new(),
            },
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_run_id_display() {
        let run = RunId::new();
        let shown = run.to_string();
        assert!(shown.starts_with("run_"));
        assert_eq!(shown.len(), "run_".len() + 8);
    }

    #[test]
    fn test_run_id_rejects_garbage() {
        assert!(RunId::from_string("not-a-uuid").is_err());
    }

    #[test]
    fn test_feedback_bundle_uses_prompt_after() {
        let record = sample_record();
        let bundle = FeedbackBundle::from(&record);

        assert_eq!(bundle.prompt, "after");
        assert_eq!(bundle.case_analyses.len(), 1);
        assert_eq!(bundle.case_analyses[0].analysis_report, "missed anemia");
        assert!(bundle.case_analyses[0].missed_diagnoses.contains("Anemia"));
        assert_eq!(bundle.analysis_summary.total_cases, 1);
    }

    #[test]
    fn test_candidate_status_serialization() {
        let json = serde_json::to_value(CandidateStatus::Rejected { reason: "missing marker".to_string() }).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["reason"], "missing marker");
    }
}
