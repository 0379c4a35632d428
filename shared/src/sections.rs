//! Named sections of the diagnosis prompt template

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four sections every prompt template carries, in template order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Task,
    Rules,
    OutputRequirements,
    OutputFormat,
}

impl SectionKind {
    /// All sections in the order they must appear
    pub const ORDERED: [SectionKind; 4] = [
        SectionKind::Task,
        SectionKind::Rules,
        SectionKind::OutputRequirements,
        SectionKind::OutputFormat,
    ];

    /// Literal marker that opens the section in template text
    pub fn marker(&self) -> &'static str {
        match self {
            SectionKind::Task => "【任务说明】",
            SectionKind::Rules => "【重要规则】",
            SectionKind::OutputRequirements => "【输出要求】",
            SectionKind::OutputFormat => "【输出格式】",
        }
    }

    /// Only the rules section may change between rounds
    pub fn is_mutable(&self) -> bool {
        matches!(self, SectionKind::Rules)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKind::Task => write!(f, "task"),
            SectionKind::Rules => write!(f, "rules"),
            SectionKind::OutputRequirements => write!(f, "output_requirements"),
            SectionKind::OutputFormat => write!(f, "output_format"),
        }
    }
}
