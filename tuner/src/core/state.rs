//! Mutable state of one tuning run

use serde::{Deserialize, Serialize};
use shared::IterationRecord;
use std::fmt;

use crate::config::TunerConfig;
use crate::core::history::History;
use crate::core::progress::ProgressStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPhase {
    Init,
    Generating,
    Evaluating,
    Deciding,
    Terminated,
}

impl LoopPhase {
    /// Whether the loop may move from `self` to `next`
    pub fn can_advance_to(self, next: LoopPhase) -> bool {
        use LoopPhase::*;
        matches!(
            (self, next),
            (Init, Generating)
                | (Generating, Evaluating)
                | (Evaluating, Deciding)
                | (Deciding, Generating)
                | (Deciding, Terminated)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationCause {
    PerfectScore,
    Stagnation,
    MaxRounds,
}

impl fmt::Display for TerminationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TerminationCause::PerfectScore => "perfect_score",
            TerminationCause::Stagnation => "stagnation",
            TerminationCause::MaxRounds => "max_rounds",
        };
        f.write_str(name)
    }
}

/// State owned by the control loop
///
/// The best prompt and score only move on a strict improvement, and the
/// history only grows.
#[derive(Debug, Clone)]
pub struct OptimizationState {
    phase: LoopPhase,
    round: u32,
    best_prompt: String,
    best_score: f64,
    best_round: Option<u32>,
    stagnation_count: u32,
    stagnating_streak: usize,
    sample_size: usize,
    base_sample_size: usize,
    total_cases: usize,
    history: History,
}

impl OptimizationState {
    pub fn new(initial_prompt: impl Into<String>, total_cases: usize, base_sample_size: usize) -> Self {
        Self {
            phase: LoopPhase::Init,
            round: 0,
            best_prompt: initial_prompt.into(),
            best_score: 0.0,
            best_round: None,
            stagnation_count: 0,
            stagnating_streak: 0,
            sample_size: base_sample_size.min(total_cases),
            base_sample_size,
            total_cases,
            history: History::new(),
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn enter(&mut self, phase: LoopPhase) {
        debug_assert!(
            self.phase.can_advance_to(phase),
            "invalid phase transition {:?} -> {:?}",
            self.phase,
            phase
        );
        self.phase = phase;
    }

    /// Advance to the next round and enter generation; returns the 1-based round index
    pub fn begin_round(&mut self) -> u32 {
        self.round += 1;
        self.enter(LoopPhase::Generating);
        self.round
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn best_prompt(&self) -> &str {
        &self.best_prompt
    }

    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    pub fn best_round(&self) -> Option<u32> {
        self.best_round
    }

    pub fn stagnation_count(&self) -> u32 {
        self.stagnation_count
    }

    pub fn stagnating_streak(&self) -> usize {
        self.stagnating_streak
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn into_history(self) -> History {
        self.history
    }

    /// Append a finished round and update the best prompt; returns whether it improved
    pub fn record_round(&mut self, record: IterationRecord) -> bool {
        let improved = record.aggregate_overlap_score > self.best_score;
        if improved {
            self.best_score = record.aggregate_overlap_score;
            self.best_prompt = record.prompt_after.clone();
            self.best_round = Some(record.index);
            self.stagnation_count = 0;
        } else {
            self.stagnation_count += 1;
        }
        self.history.push(record);
        improved
    }

    /// Grow the evaluated prefix while progress keeps stagnating, reset it otherwise
    pub fn adapt_sampling(&mut self, status: ProgressStatus) {
        if status == ProgressStatus::Stagnating {
            self.stagnating_streak += 1;
        } else {
            self.stagnating_streak = 0;
        }
        self.sample_size = (self.base_sample_size + self.stagnating_streak).min(self.total_cases);
    }

    /// Termination decision for the round just recorded
    pub fn termination(&self, config: &TunerConfig) -> Option<TerminationCause> {
        let latest = self.history.latest()?;
        if latest.aggregate_overlap_score >= 1.0 {
            Some(TerminationCause::PerfectScore)
        } else if self.stagnation_count >= config.stagnation_limit {
            Some(TerminationCause::Stagnation)
        } else if self.round >= config.max_rounds {
            Some(TerminationCause::MaxRounds)
        } else {
            None
        }
    }
}
