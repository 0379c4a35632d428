//! Message construction for the three chat services

use shared::{AnalysisRequest, GenerationRequest, SectionKind};

use crate::error::OracleResult;
use crate::types::ChatMessage;

/// Appended to predictor prompts that do not already describe the label payload
pub const FORMAT_INSTRUCTION: &str = r#"请严格按照以下JSON格式返回结果：
{
    "diseases": [
        "疾病1",
        "疾病2"
    ]
}

格式要求：
1. 必须是合法的JSON格式
2. diseases数组必须存在，即使为空也要保留
3. 每个疾病名称必须是非空字符串
4. 不要在JSON外添加任何注释或说明
5. 不要使用Markdown代码块

示例输出：
{"diseases": ["支气管炎", "肺气肿"]}"#;

/// System message for the optimizer service
pub const OPTIMIZER_SYSTEM: &str = r#"你是一个专业的医疗prompt优化专家。你必须严格按照以下规则工作：

1. 格式控制（最重要）:
- 你只能修改【重要规则】部分的内容
- 其他部分（【任务说明】、【输出要求】、【输出格式】）必须保持完全一致
- 禁止添加、删除或修改任何分隔符【】
- 所有格式标记必须使用中文方括号【】

2. 规则优化要求:
- 每条规则必须明确、具体、可执行
- 规则必须包含明确的判断标准和阈值
- 禁止在规则中包含任何ICD编码
- 避免使用模糊的描述词

3. 输出规范：
- 必须确保优化后的规则符合JSON输出格式要求
- 禁止添加任何会破坏JSON结构的内容
- 疾病名称必须是标准化的中文名称

你的输出必须严格保持以下格式：

【任务说明】
(保持原文不变)

【重要规则】
(这里是你唯一可以修改的部分)

【输出要求】
(保持原文不变)

【输出格式】
(保持原文不变)"#;

/// System message for the analyzer service
pub const ANALYZER_SYSTEM: &str = r#"你是一个专业的医疗诊断分析专家。
你的任务是分析模型预测结果与真实标签之间的差异，为优化器提供具体的改进建议。

分析重点：
1. 对比预测结果和真实结果的差异
2. 找出漏诊和误诊的具体原因
3. 提供明确的改进建议

输出格式要求：
1. 分析报告必须包含具体的数字和案例
2. 建议必须可执行，有明确的判断标准
3. 重点关注影响准确率的主要问题"#;

/// Predictor prompt with the format instruction appended when needed
pub fn enhance_prediction_prompt(prompt: &str) -> String {
    if prompt.contains("diseases") {
        prompt.to_string()
    } else {
        format!("{prompt}\n\n{FORMAT_INSTRUCTION}")
    }
}

/// Prompt as system message, case payload as pretty JSON user message
pub fn predictor_messages(prompt: &str, input: &serde_json::Value) -> OracleResult<Vec<ChatMessage>> {
    let payload = serde_json::to_string_pretty(input)?;
    Ok(vec![
        ChatMessage::system(enhance_prediction_prompt(prompt)),
        ChatMessage::user(payload),
    ])
}

pub fn optimizer_messages(request: &GenerationRequest) -> OracleResult<Vec<ChatMessage>> {
    let rules = SectionKind::Rules.marker();
    let user = match &request.feedback {
        None => format!(
            "这是第 {round} 轮优化。\n\n当前prompt:\n{prompt}\n\n\
             请严格按照当前prompt的格式优化{rules}部分，确保：\n\
             1. 只修改{rules}部分\n2. 其他部分保持完全一致\n3. 优化后的规则更加明确和可执行",
            round = request.round,
            prompt = request.current_prompt,
        ),
        Some(feedback) => format!(
            "这是第 {round} 轮优化。\n\n分析结果：\n{analysis}\n\n当前prompt：\n{prompt}\n\n\
             请基于分析结果优化{rules}部分，确保：\n\
             1. 只修改{rules}部分\n2. 其他部分保持完全一致\n3. 新规则必须解决分析中发现的问题",
            round = request.round,
            analysis = serde_json::to_string_pretty(feedback)?,
            prompt = request.current_prompt,
        ),
    };

    Ok(vec![ChatMessage::system(OPTIMIZER_SYSTEM), ChatMessage::user(user)])
}

pub fn analyzer_messages(request: &AnalysisRequest) -> OracleResult<Vec<ChatMessage>> {
    let report = &request.report;
    let user = format!(
        "请分析以下诊断结果：\n\n输入数据: {input}\n预测疾病: {predicted:?}\n实际疾病: {truth:?}\n\n\
         差异分析:\n- 漏诊: {missed:?}\n- 误诊: {wrong:?}\n- 召回率: {recall:.2}%\n- 精确率: {precision:.2}%",
        input = serde_json::to_string_pretty(&request.input)?,
        predicted = request.predicted,
        truth = request.truth,
        missed = report.missed.to_vec(),
        wrong = report.wrong.to_vec(),
        recall = report.recall * 100.0,
        precision = report.precision * 100.0,
    );

    Ok(vec![ChatMessage::system(ANALYZER_SYSTEM), ChatMessage::user(user)])
}
