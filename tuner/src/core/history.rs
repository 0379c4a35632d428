//! Append-only log of completed rounds

use serde::{Deserialize, Serialize};
use shared::{FeedbackBundle, IterationRecord};

use crate::core::progress::ProgressReport;
use crate::core::scoring::mean;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    records: Vec<IterationRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: IterationRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    pub fn latest(&self) -> Option<&IterationRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Feedback for the optimizer, built from the most recent round only
    pub fn feedback_bundle(&self) -> Option<FeedbackBundle> {
        self.latest().map(FeedbackBundle::from)
    }

    /// Mean per-case recall of every round, oldest first
    pub fn recall_trend(&self) -> Vec<f64> {
        self.records
            .iter()
            .map(|record| {
                let recalls: Vec<f64> = record.per_case.iter().map(|c| c.report.recall).collect();
                mean(&recalls)
            })
            .collect()
    }

    pub fn progress(&self, epsilon: f64) -> ProgressReport {
        ProgressReport::from_trend(self.recall_trend(), epsilon)
    }
}
