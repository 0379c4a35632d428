//! Test fixtures and data for tuner tests
//!
//! Cases carry their id inside the input payload so mock predictors can
//! look up the matching ground truth.

use serde_json::{json, Value};

use shared::Case;
use tuner::{PromptTemplate, DEFAULT_TEMPLATE};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const CASE_COUNT: usize = 6;

    /// Rules bodies used by mock optimizers
    pub const RULES_ROUND_1: &'static str = "\n1. 结节直径大于5毫米时诊断为肺结节\n\n";
    pub const RULES_ROUND_3: &'static str = "\n1. 仅在多个指标同时异常时诊断\n\n";

    fn truths() -> [(&'static str, &'static [&'static str]); 6] {
        [
            ("case_01", &["肺结节", "肺气肿"]),
            ("case_02", &["脂肪肝"]),
            ("case_03", &["胆囊结石", "胆囊炎"]),
            ("case_04", &["甲状腺结节"]),
            ("case_05", &["肾囊肿", "肾结石"]),
            ("case_06", &["支气管炎"]),
        ]
    }

    pub fn cases() -> Vec<Case> {
        Self::truths()
            .iter()
            .map(|(id, truth)| {
                Case::new(
                    *id,
                    json!({ "id": id, "content": format!("{id} 影像报告") }),
                    truth.iter().map(|t| t.to_string()).collect(),
                )
            })
            .collect()
    }

    pub fn truth_for(input: &Value) -> Vec<String> {
        let id = input["id"].as_str().unwrap_or_default();
        Self::truths()
            .iter()
            .find(|(case_id, _)| *case_id == id)
            .map(|(_, truth)| truth.iter().map(|t| t.to_string()).collect())
            .unwrap_or_default()
    }

    /// Predictor response that matches the case's ground truth exactly
    pub fn exact_response(input: &Value) -> String {
        json!({ "diseases": Self::truth_for(input) }).to_string()
    }

    /// Predictor response with only the first ground-truth label
    pub fn partial_response(input: &Value) -> String {
        let first: Vec<String> = Self::truth_for(input).into_iter().take(1).collect();
        format!("```json\n{}\n```", json!({ "diseases": first }))
    }

    pub fn empty_response() -> String {
        r#"{"diseases": []}"#.to_string()
    }

    /// Well-formed candidate whose fixed sections differ from the skeleton
    pub fn candidate_with_rules(rules: &str) -> String {
        let rewritten = DEFAULT_TEMPLATE.replace("仔细分析输入的医学影像数据", "请分析影像数据");
        PromptTemplate::parse(&rewritten)
            .expect("fixture template parses")
            .with_rules(rules)
            .render()
    }

    pub fn candidate_missing_rules_marker() -> String {
        DEFAULT_TEMPLATE.replace("【重要规则】", "重要规则：")
    }
}
