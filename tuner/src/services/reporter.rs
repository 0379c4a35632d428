//! Run reporter that emits tracing events tagged with the run id

use shared::{run_debug, run_info, run_warn, CandidateStatus, CaseId, CaseResult, IterationRecord, RunId};

use crate::core::template::rules_excerpt;
use crate::core::{ProgressReport, TerminationCause};
use crate::error::TunerError;
use crate::traits::RunReporter;

pub struct TracingReporter {
    run_id: RunId,
}

impl TracingReporter {
    pub fn new(run_id: RunId) -> Self {
        Self { run_id }
    }
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

impl RunReporter for TracingReporter {
    fn run_started(&self, total_cases: usize, max_rounds: u32) {
        run_info!(self.run_id, total_cases, max_rounds, "🚀 Tuning started with {} cases", total_cases);
    }

    fn round_started(&self, round: u32, max_rounds: u32, best_score: f64, sample_size: usize) {
        run_info!(
            self.run_id,
            round,
            sample_size,
            "🔄 Round {}/{} (best overlap {})",
            round,
            max_rounds,
            percent(best_score)
        );
    }

    fn candidate_rejected(&self, round: u32, status: &CandidateStatus) {
        let reason = match status {
            CandidateStatus::Rejected { reason } => format!("skeleton violation: {reason}"),
            CandidateStatus::GenerationFailed { reason } => format!("generation failed: {reason}"),
            CandidateStatus::Accepted => return,
        };
        run_warn!(self.run_id, round, "⚠️ Candidate discarded ({}), evaluating previous best prompt", reason);
    }

    fn prompt_selected(&self, round: u32, previous: &str, selected: &str) {
        run_debug!(
            self.run_id,
            round,
            "📝 Rules before:\n{}\n📝 Rules after:\n{}",
            rules_excerpt(previous),
            rules_excerpt(selected)
        );
    }

    fn case_scored(&self, round: u32, result: &CaseResult) {
        run_info!(
            self.run_id,
            round,
            case = %result.case_id,
            overlap = result.overlap_score,
            "📋 Case {}: predicted [{}] truth [{}] overlap {} recall {} precision {}",
            result.case_id,
            result.predicted.join(", "),
            result.truth.join(", "),
            percent(result.overlap_score),
            percent(result.report.recall),
            percent(result.report.precision)
        );
        if !result.report.missed.is_empty() {
            run_debug!(self.run_id, case = %result.case_id, "missed: {}", result.report.missed);
        }
        if !result.report.wrong.is_empty() {
            run_debug!(self.run_id, case = %result.case_id, "wrong: {}", result.report.wrong);
        }
        run_debug!(self.run_id, case = %result.case_id, "analysis: {}", result.analysis);
    }

    fn case_skipped(&self, round: u32, case_id: &CaseId, reason: &str) {
        run_warn!(self.run_id, round, case = %case_id, "⏭️ Case {} skipped: {}", case_id, reason);
    }

    fn prediction_failed(&self, round: u32, case_id: &CaseId, attempt: u32, error: &TunerError) {
        run_warn!(
            self.run_id,
            round,
            case = %case_id,
            attempt,
            error = %error,
            "🔁 Prediction attempt {} for case {} gave no labels",
            attempt,
            case_id
        );
    }

    fn analysis_failed(&self, round: u32, case_id: &CaseId, error: &TunerError) {
        run_warn!(self.run_id, round, case = %case_id, error = %error, "Analysis unavailable for case {}", case_id);
    }

    fn round_completed(&self, record: &IterationRecord, progress: &ProgressReport) {
        run_info!(
            self.run_id,
            round = record.index,
            status = %progress.status,
            "📊 Round {} mean overlap {} over {} cases; {} (best recall {} in round {})",
            record.index,
            percent(record.aggregate_overlap_score),
            record.per_case.len(),
            progress.message,
            percent(progress.best_recall),
            progress.best_round
        );
        if !record.summary.common_missed.is_empty() {
            run_info!(self.run_id, round = record.index, "common missed: {}", record.summary.common_missed);
        }
        if !record.summary.common_wrong.is_empty() {
            run_info!(self.run_id, round = record.index, "common wrong: {}", record.summary.common_wrong);
        }
    }

    fn improvement(&self, round: u32, previous_best: f64, new_best: f64) {
        run_info!(
            self.run_id,
            round,
            "✨ New best prompt: {} -> {} (+{})",
            percent(previous_best),
            percent(new_best),
            percent(new_best - previous_best)
        );
    }

    fn sampling_adjusted(&self, sample_size: usize, stagnating_streak: usize) {
        run_info!(
            self.run_id,
            sample_size,
            stagnating_streak,
            "🔍 Evaluation sample now {} cases",
            sample_size
        );
    }

    fn artifact_failed(&self, artifact: &str, error: &TunerError) {
        run_warn!(self.run_id, artifact, error = %error, "💾 Could not save {}", artifact);
    }

    fn terminated(&self, cause: TerminationCause, rounds: u32, best_score: f64) {
        run_info!(
            self.run_id,
            cause = %cause,
            "🏁 Tuning finished after {} rounds ({}), best overlap {}",
            rounds,
            cause,
            percent(best_score)
        );
    }
}
