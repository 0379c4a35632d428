//! Artifact persistence on the local file system

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use tokio::fs;

use shared::IterationRecord;

use crate::error::{TunerError, TunerResult};
use crate::traits::ArtifactStore;
use crate::types::OptimizationReport;

/// Writes prompts and reports under `results_dir`, round bundles under `logs_dir`
pub struct RealArtifactStore {
    results_dir: PathBuf,
    logs_dir: PathBuf,
}

#[derive(Serialize)]
struct RoundResults<'a> {
    iteration: u32,
    avg_overlap: f64,
    best_avg_overlap: f64,
    #[serde(flatten)]
    record: &'a IterationRecord,
}

impl RealArtifactStore {
    pub fn new(results_dir: impl Into<PathBuf>, logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
            logs_dir: logs_dir.into(),
        }
    }

    async fn write(&self, path: PathBuf, contents: &str) -> TunerResult<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| TunerError::file("create directory", parent, e))?;
        }
        fs::write(&path, contents)
            .await
            .map_err(|e| TunerError::file("write", &path, e))?;
        Ok(path)
    }
}

#[async_trait]
impl ArtifactStore for RealArtifactStore {
    async fn save_best_prompt_snapshot(&self, round: u32, prompt: &str) -> TunerResult<PathBuf> {
        let path = self.results_dir.join(format!("best_prompt_{round}.txt"));
        self.write(path, prompt).await
    }

    async fn save_round_results(&self, record: &IterationRecord, best_score: f64) -> TunerResult<PathBuf> {
        let bundle = RoundResults {
            iteration: record.index,
            avg_overlap: record.aggregate_overlap_score,
            best_avg_overlap: best_score,
            record,
        };
        let contents = serde_json::to_string_pretty(&bundle)?;
        let path = self.logs_dir.join(format!("iteration_{}_results.json", record.index));
        self.write(path, &contents).await
    }

    async fn save_final_prompt(&self, prompt: &str) -> TunerResult<PathBuf> {
        self.write(self.results_dir.join("best_prompt.txt"), prompt).await
    }

    async fn save_report(&self, report: &OptimizationReport) -> TunerResult<PathBuf> {
        let contents = serde_json::to_string_pretty(report)?;
        self.write(self.results_dir.join("optimization_report.json"), &contents).await
    }
}
