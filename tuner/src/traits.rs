//! Trait definitions with mockall annotations for testing
//!
//! The tuning loop reaches the outside world only through these traits and
//! the oracle traits, so every collaborator can be swapped for a mock.

use std::path::PathBuf;

use shared::{CandidateStatus, CaseId, CaseResult, IterationRecord};

use crate::core::{ProgressReport, TerminationCause};
use crate::error::{TunerError, TunerResult};
use crate::types::OptimizationReport;

/// Persistence of per-round and final run artifacts
#[mockall::automock]
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Snapshot the best prompt after an improving round (`best_prompt_<round>.txt`)
    async fn save_best_prompt_snapshot(&self, round: u32, prompt: &str) -> TunerResult<PathBuf>;

    /// Result bundle of one round (`iteration_<round>_results.json`)
    async fn save_round_results(&self, record: &IterationRecord, best_score: f64) -> TunerResult<PathBuf>;

    /// Final best prompt (`best_prompt.txt`)
    async fn save_final_prompt(&self, prompt: &str) -> TunerResult<PathBuf>;

    /// Final run report (`optimization_report.json`)
    async fn save_report(&self, report: &OptimizationReport) -> TunerResult<PathBuf>;
}

/// Run event sink
///
/// Implementations decide how events are surfaced; the loop never logs
/// directly.
#[mockall::automock]
pub trait RunReporter: Send + Sync {
    fn run_started(&self, total_cases: usize, max_rounds: u32);

    fn round_started(&self, round: u32, max_rounds: u32, best_score: f64, sample_size: usize);

    fn candidate_rejected(&self, round: u32, status: &CandidateStatus);

    fn prompt_selected(&self, round: u32, previous: &str, selected: &str);

    fn case_scored(&self, round: u32, result: &CaseResult);

    fn case_skipped(&self, round: u32, case_id: &CaseId, reason: &str);

    /// A prediction attempt produced no usable labels
    fn prediction_failed(&self, round: u32, case_id: &CaseId, attempt: u32, error: &TunerError);

    /// The analyzer failed and the placeholder text was stored
    fn analysis_failed(&self, round: u32, case_id: &CaseId, error: &TunerError);

    fn round_completed(&self, record: &IterationRecord, progress: &ProgressReport);

    fn improvement(&self, round: u32, previous_best: f64, new_best: f64);

    fn sampling_adjusted(&self, sample_size: usize, stagnating_streak: usize);

    fn artifact_failed(&self, artifact: &str, error: &TunerError);

    fn terminated(&self, cause: TerminationCause, rounds: u32, best_score: f64);
}
