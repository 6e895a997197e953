/// 解释为空时的占位文本
pub const NO_EXPLANATION: &str = "No explanation provided.";

/// 选项展示描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDescriptor {
    /// 选项标签，如 "A"
    pub label: String,
    pub text: String,
    pub is_correct: bool,
}

/// 选择题卡片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McqCard {
    /// 题号（从1开始）
    pub number: usize,
    /// 带题号的题干，如 "1. 题干"
    pub heading: String,
    pub options: Vec<OptionDescriptor>,
    pub explanation: String,
}

/// 问答题卡片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaCard {
    pub number: usize,
    pub heading: String,
    pub answer: String,
}

/// 可直接展示的卡片
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardDescriptor {
    Mcq(McqCard),
    Qa(QaCard),
}

impl CardDescriptor {
    pub fn heading(&self) -> &str {
        match self {
            CardDescriptor::Mcq(c) => &c.heading,
            CardDescriptor::Qa(c) => &c.heading,
        }
    }
}
