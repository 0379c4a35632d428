//! Typed model of the sectioned diagnosis prompt
//!
//! A template is a preamble followed by the four [`SectionKind`] sections,
//! each opened by its marker. Parsing and rendering are exact inverses, so a
//! template re-renders byte-identically.

use std::fmt;

use shared::SectionKind;

use crate::error::{TunerError, TunerResult};

/// Initial template used when no template file is supplied
pub const DEFAULT_TEMPLATE: &str = r#"你是一位拥有30年临床经验的资深医生，精通各种医学影像的解读和疾病诊断。请严格按照以下要求分析患者的影像报告：

【任务说明】
仔细分析输入的医学影像数据，识别所有异常描述，结合临床经验判断可能的疾病。你需要综合考虑各项指标之间的相互关系，而不是孤立地看待单个异常值。

【重要规则】
1. 只输出有明确异常支持的疾病诊断
2. 如果指标在正常范围内或异常程度轻微，不作为诊断依据
3. 优先考虑常见病、多发病
4. 使用标准ICD-10疾病命名，但一定不要输出icd-10编码，只许输出疾病名称
5. 必须保证输出格式不变

【输出要求】
1. 必须以 JSON 格式输出，包含 diseases 数组
2. 不要输出任何解释性文字

【输出格式】
{
    "diseases": ["疾病1", "疾病2", "疾病3"]
}"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    preamble: String,
    /// Section bodies in [`SectionKind::ORDERED`] order
    bodies: [String; 4],
}

impl PromptTemplate {
    /// Parse text that carries every section marker exactly once, in order
    pub fn parse(text: &str) -> TunerResult<Self> {
        let mut positions = [0usize; 4];

        for (slot, kind) in SectionKind::ORDERED.iter().enumerate() {
            let marker = kind.marker();
            let mut found = text.match_indices(marker).map(|(at, _)| at);
            let at = found
                .next()
                .ok_or_else(|| TunerError::skeleton(format!("missing {marker}")))?;
            if found.next().is_some() {
                return Err(TunerError::skeleton(format!("{marker} appears more than once")));
            }
            if slot > 0 && at < positions[slot - 1] {
                return Err(TunerError::skeleton(format!(
                    "{marker} appears before {}",
                    SectionKind::ORDERED[slot - 1].marker()
                )));
            }
            positions[slot] = at;
        }

        let body = |slot: usize| {
            let start = positions[slot] + SectionKind::ORDERED[slot].marker().len();
            let end = positions.get(slot + 1).copied().unwrap_or(text.len());
            text[start..end].to_string()
        };

        Ok(Self {
            preamble: text[..positions[0]].to_string(),
            bodies: [body(0), body(1), body(2), body(3)],
        })
    }

    /// Structural check without keeping the parsed model
    pub fn validate(text: &str) -> TunerResult<()> {
        Self::parse(text).map(|_| ())
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    pub fn section(&self, kind: SectionKind) -> &str {
        &self.bodies[Self::slot(kind)]
    }

    pub fn rules(&self) -> &str {
        self.section(SectionKind::Rules)
    }

    /// Same template with a new rules body; every fixed section is kept
    pub fn with_rules(&self, rules: &str) -> Self {
        let mut next = self.clone();
        next.bodies[Self::slot(SectionKind::Rules)] = rules.to_string();
        next
    }

    /// Take only the mutable section of `candidate` onto this skeleton
    pub fn splice(&self, candidate: &PromptTemplate) -> Self {
        self.with_rules(candidate.rules())
    }

    /// Whether every fixed section (and the preamble) matches `other`
    pub fn same_skeleton(&self, other: &PromptTemplate) -> bool {
        self.preamble == other.preamble
            && SectionKind::ORDERED
                .iter()
                .filter(|kind| !kind.is_mutable())
                .all(|kind| self.section(*kind) == other.section(*kind))
    }

    pub fn render(&self) -> String {
        let mut text = self.preamble.clone();
        for (kind, body) in SectionKind::ORDERED.iter().zip(self.bodies.iter()) {
            text.push_str(kind.marker());
            text.push_str(body);
        }
        text
    }

    fn slot(kind: SectionKind) -> usize {
        match kind {
            SectionKind::Task => 0,
            SectionKind::Rules => 1,
            SectionKind::OutputRequirements => 2,
            SectionKind::OutputFormat => 3,
        }
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Rules section with its marker, for before/after logging
pub fn rules_excerpt(prompt: &str) -> String {
    match PromptTemplate::parse(prompt) {
        Ok(template) => format!("{}{}", SectionKind::Rules.marker(), template.rules().trim_end()),
        Err(_) => "(rules section not found)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_on_markers(text: &str) -> usize {
        let mut parts = vec![text.to_string()];
        for kind in SectionKind::ORDERED {
            parts = parts
                .iter()
                .flat_map(|p| p.split(kind.marker()).map(str::to_string).collect::<Vec<_>>())
                .collect();
        }
        parts.len()
    }

    #[test]
    fn test_default_template_round_trips() {
        let template = PromptTemplate::parse(DEFAULT_TEMPLATE).unwrap();
        assert_eq!(template.render(), DEFAULT_TEMPLATE);
        assert_eq!(split_on_markers(DEFAULT_TEMPLATE), 5);
        assert!(template.rules().contains("只输出有明确异常支持的疾病诊断"));
        assert!(template.section(SectionKind::OutputFormat).contains("diseases"));
    }

    #[test]
    fn test_missing_any_marker_is_rejected() {
        for kind in SectionKind::ORDERED {
            let broken = DEFAULT_TEMPLATE.replace(kind.marker(), "");
            let err = PromptTemplate::parse(&broken).unwrap_err();
            assert!(matches!(err, TunerError::SkeletonViolation { .. }), "{kind}");
        }
    }

    #[test]
    fn test_duplicate_marker_is_rejected() {
        let doubled = format!("{DEFAULT_TEMPLATE}\n【重要规则】\n6. extra");
        assert!(PromptTemplate::validate(&doubled).is_err());
    }

    #[test]
    fn test_out_of_order_markers_are_rejected() {
        let swapped = "【重要规则】r【任务说明】t【输出要求】o【输出格式】f";
        assert!(PromptTemplate::validate(swapped).is_err());
    }

    #[test]
    fn test_splice_keeps_fixed_sections_byte_identical() {
        let skeleton = PromptTemplate::parse(DEFAULT_TEMPLATE).unwrap();
        let candidate = PromptTemplate::parse(
            "改写的前言【任务说明】\n被改写的任务\n【重要规则】\n1. 新规则\n【输出要求】\n随意\n【输出格式】\n{}",
        )
        .unwrap();

        let spliced = skeleton.splice(&candidate);
        assert!(spliced.same_skeleton(&skeleton));
        assert_eq!(spliced.rules(), "\n1. 新规则\n");
        assert!(!candidate.same_skeleton(&skeleton));

        let rendered = spliced.render();
        assert!(rendered.starts_with(skeleton.preamble()));
        assert!(rendered.ends_with(skeleton.section(SectionKind::OutputFormat)));
        assert_eq!(PromptTemplate::parse(&rendered).unwrap(), spliced);
    }

    #[test]
    fn test_rules_excerpt() {
        assert!(rules_excerpt(DEFAULT_TEMPLATE).starts_with("【重要规则】\n1."));
        assert_eq!(rules_excerpt("nothing"), "(rules section not found)");
    }
}
