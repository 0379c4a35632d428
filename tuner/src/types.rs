//! Run outcome and report types

use serde::{Deserialize, Serialize};
use shared::IterationRecord;

use crate::core::{History, LoopPhase, ProgressReport, TerminationCause};

/// Contents of `optimization_report.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub total_rounds: u32,
    pub best_score: f64,
    pub best_round: Option<u32>,
    pub termination_cause: TerminationCause,
    pub progress: ProgressReport,
    pub timestamp: String,
}

/// Everything a finished run hands back to its caller
#[derive(Debug, Clone)]
pub struct TuningOutcome {
    pub best_prompt: String,
    pub best_score: f64,
    pub best_round: Option<u32>,
    pub history: History,
    pub termination_cause: TerminationCause,
    pub progress: ProgressReport,
    /// Phase the loop ended in
    pub phase: LoopPhase,
}

impl TuningOutcome {
    pub fn rounds(&self) -> u32 {
        self.history.latest().map(|r: &IterationRecord| r.index).unwrap_or(0)
    }
}
