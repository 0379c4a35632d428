//! Case loading from disk and spreadsheet export preparation
//!
//! Layout under the data directory:
//! - `inputs/<id>_exam_input.json`: opaque case payload
//! - `gts/<id>_gt.json`: ground truth as `{"diseases": [...]}`, a list, or a single string

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;

use shared::{Case, CaseId};

use crate::error::{TunerError, TunerResult};

pub const INPUT_SUFFIX: &str = "_exam_input.json";
pub const TRUTH_SUFFIX: &str = "_gt.json";

/// Result of scanning the data directory
#[derive(Debug, Default)]
pub struct CaseLoad {
    /// Valid cases sorted by id
    pub cases: Vec<Case>,
    /// One DataIntegrity error per input that could not be paired or parsed
    pub failures: Vec<TunerError>,
}

pub struct CaseStore {
    data_dir: PathBuf,
}

impl CaseStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub fn inputs_dir(&self) -> PathBuf {
        self.data_dir.join("inputs")
    }

    pub fn truths_dir(&self) -> PathBuf {
        self.data_dir.join("gts")
    }

    /// Load every input with a matching ground-truth file
    pub async fn load(&self) -> TunerResult<CaseLoad> {
        let inputs_dir = self.inputs_dir();
        let mut entries = fs::read_dir(&inputs_dir)
            .await
            .map_err(|e| TunerError::file("read directory", &inputs_dir, e))?;

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(id) = entry.file_name().to_str().and_then(|n| n.strip_suffix(INPUT_SUFFIX)) {
                ids.push(id.to_string());
            }
        }
        ids.sort();

        let mut load = CaseLoad::default();
        for id in ids {
            match self.load_case(&id).await {
                Ok(case) => load.cases.push(case),
                Err(error) => load.failures.push(error),
            }
        }
        Ok(load)
    }

    async fn load_case(&self, id: &str) -> TunerResult<Case> {
        let case_id = CaseId::new(id);
        let input_path = self.inputs_dir().join(format!("{id}{INPUT_SUFFIX}"));
        let truth_path = self.truths_dir().join(format!("{id}{TRUTH_SUFFIX}"));

        let input = read_json(&case_id, &input_path).await?;
        let truth = read_json(&case_id, &truth_path).await?;
        let ground_truth = truth_labels(&case_id, &truth)?;

        Ok(Case {
            id: case_id,
            input,
            ground_truth,
        })
    }
}

async fn read_json(case_id: &CaseId, path: &Path) -> TunerResult<Value> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|e| TunerError::integrity(case_id, format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| TunerError::integrity(case_id, format!("invalid JSON in {}: {e}", path.display())))
}

/// Ground-truth labels from any of the accepted file shapes
pub fn truth_labels(case_id: &CaseId, value: &Value) -> TunerResult<Vec<String>> {
    let items = match value {
        Value::Object(map) => match map.get("diseases") {
            Some(diseases) => diseases,
            None => return Err(TunerError::integrity(case_id, "ground truth has no diseases field")),
        },
        other => other,
    };

    let labels = match items {
        Value::Array(list) => list.iter().filter_map(stringify).collect(),
        Value::Null => Vec::new(),
        single => stringify(single).into_iter().collect(),
    };
    Ok(labels)
}

fn stringify(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// Column names of the spreadsheet export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvColumns {
    pub id: String,
    pub content: String,
    pub truth: String,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            id: "ID号".to_string(),
            content: "content".to_string(),
            truth: "gt".to_string(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PrepareSummary {
    pub written: usize,
    pub skipped: usize,
}

/// Split a ground-truth cell on ASCII and full-width commas
pub fn split_truth_cell(cell: &str) -> Vec<String> {
    cell.split([',', '，'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Convert a CSV export into per-case input and ground-truth files
///
/// Rows with a blank id are skipped. Existing files for the same id are
/// overwritten.
pub fn prepare_from_csv(csv_path: &Path, data_dir: &Path, columns: &CsvColumns) -> TunerResult<PrepareSummary> {
    let mut reader = csv::Reader::from_path(csv_path)?;
    let headers = reader.headers()?.clone();

    let position = |name: &str| headers.iter().position(|h| h.trim() == name);
    let (id_col, content_col, truth_col) = match (
        position(&columns.id),
        position(&columns.content),
        position(&columns.truth),
    ) {
        (Some(i), Some(c), Some(t)) => (i, c, t),
        _ => {
            let missing: Vec<&str> = [&columns.id, &columns.content, &columns.truth]
                .into_iter()
                .filter(|name| position(name).is_none())
                .map(String::as_str)
                .collect();
            return Err(TunerError::fatal(format!(
                "{} is missing columns: {}",
                csv_path.display(),
                missing.join(", ")
            )));
        }
    };

    let store = CaseStore::new(data_dir);
    let (inputs_dir, truths_dir) = (store.inputs_dir(), store.truths_dir());
    for dir in [&inputs_dir, &truths_dir] {
        std::fs::create_dir_all(dir).map_err(|e| TunerError::file("create directory", dir, e))?;
    }

    let mut summary = PrepareSummary::default();
    for row in reader.records() {
        let row = row?;
        let id = row.get(id_col).unwrap_or("").trim();
        if id.is_empty() {
            summary.skipped += 1;
            continue;
        }

        let input = serde_json::json!({ "content": row.get(content_col).unwrap_or("") });
        let truth = serde_json::json!({ "diseases": split_truth_cell(row.get(truth_col).unwrap_or("")) });

        let input_path = inputs_dir.join(format!("{id}{INPUT_SUFFIX}"));
        let truth_path = truths_dir.join(format!("{id}{TRUTH_SUFFIX}"));
        std::fs::write(&input_path, serde_json::to_string_pretty(&input)?)
            .map_err(|e| TunerError::file("write", &input_path, e))?;
        std::fs::write(&truth_path, serde_json::to_string_pretty(&truth)?)
            .map_err(|e| TunerError::file("write", &truth_path, e))?;

        summary.written += 1;
    }

    Ok(summary)
}
