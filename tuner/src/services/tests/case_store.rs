//! Tests for CaseStore and CSV preparation

use std::path::Path;

use serde_json::json;
use tempfile::TempDir;

use shared::CaseId;

use crate::error::TunerError;
use crate::services::case_store::{prepare_from_csv, split_truth_cell, truth_labels, CaseStore, CsvColumns};

fn write(path: &Path, contents: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

#[tokio::test]
async fn test_load_pairs_inputs_with_truth() {
    let dir = TempDir::new().unwrap();
    let data = dir.path();
    write(&data.join("inputs/b_exam_input.json"), r#"{"content": "肝内钙化灶"}"#);
    write(&data.join("gts/b_gt.json"), r#"{"diseases": ["肝钙化灶"]}"#);
    write(&data.join("inputs/a_exam_input.json"), r#"{"content": "甲状腺结节"}"#);
    write(&data.join("gts/a_gt.json"), r#"["甲状腺结节", null, " "]"#);
    write(&data.join("inputs/notes.txt"), "ignored");

    let load = CaseStore::new(data).load().await.unwrap();

    assert!(load.failures.is_empty());
    let ids: Vec<&str> = load.cases.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(load.cases[0].ground_truth, vec!["甲状腺结节"]);
    assert_eq!(load.cases[1].input["content"], "肝内钙化灶");
}

#[tokio::test]
async fn test_unpaired_or_broken_cases_are_reported() {
    let dir = TempDir::new().unwrap();
    let data = dir.path();
    write(&data.join("inputs/ok_exam_input.json"), "{}");
    write(&data.join("gts/ok_gt.json"), r#""胆囊息肉""#);
    write(&data.join("inputs/orphan_exam_input.json"), "{}");
    write(&data.join("inputs/broken_exam_input.json"), "{not json");
    write(&data.join("gts/broken_gt.json"), "[]");

    let load = CaseStore::new(data).load().await.unwrap();

    assert_eq!(load.cases.len(), 1);
    assert_eq!(load.cases[0].ground_truth, vec!["胆囊息肉"]);
    assert_eq!(load.failures.len(), 2);
    assert!(load
        .failures
        .iter()
        .all(|e| matches!(e, TunerError::DataIntegrity { .. })));
}

#[tokio::test]
async fn test_missing_inputs_dir_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(CaseStore::new(dir.path()).load().await.is_err());
}

#[test]
fn test_truth_shapes() {
    let id = CaseId::new("x");
    assert_eq!(truth_labels(&id, &json!({"diseases": "贫血"})).unwrap(), vec!["贫血"]);
    assert_eq!(truth_labels(&id, &json!({"diseases": ["a", 1]})).unwrap(), vec!["a", "1"]);
    assert!(truth_labels(&id, &json!({"labels": []})).is_err());
}

#[test]
fn test_split_truth_cell_handles_both_commas() {
    assert_eq!(split_truth_cell("肺结节, 肺气肿，支气管炎,,"), vec!["肺结节", "肺气肿", "支气管炎"]);
    assert!(split_truth_cell("").is_empty());
}

#[test]
fn test_prepare_from_csv_writes_case_files() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("export.csv");
    write(
        &csv_path,
        "ID号,content,gt,pred\n001,双肺纹理增多,\"支气管炎，肺气肿\",x\n,empty id,a,x\n002,未见异常,,x\n",
    );
    let data = dir.path().join("data");

    let summary = prepare_from_csv(&csv_path, &data, &CsvColumns::default()).unwrap();

    assert_eq!(summary.written, 2);
    assert_eq!(summary.skipped, 1);

    let input: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(data.join("inputs/001_exam_input.json")).unwrap()).unwrap();
    assert_eq!(input, json!({"content": "双肺纹理增多"}));

    let truth: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(data.join("gts/001_gt.json")).unwrap()).unwrap();
    assert_eq!(truth, json!({"diseases": ["支气管炎", "肺气肿"]}));

    let empty: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(data.join("gts/002_gt.json")).unwrap()).unwrap();
    assert_eq!(empty, json!({"diseases": []}));
}

#[test]
fn test_prepare_from_csv_requires_columns() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("export.csv");
    write(&csv_path, "id,text\n1,x\n");

    let err = prepare_from_csv(&csv_path, &dir.path().join("data"), &CsvColumns::default()).unwrap_err();
    assert!(err.to_string().contains("ID号"));
}
