use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// 题目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// 选择题
    Mcq,
    /// 问答题
    Qa,
}

impl RecordType {
    /// 请求体 `type` 字段的取值
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Mcq => "mcq",
            RecordType::Qa => "qa",
        }
    }

    /// 后端约定的列表键名
    pub fn conventional_key(&self) -> &'static str {
        match self {
            RecordType::Mcq => "mcq_list",
            RecordType::Qa => "qa_list",
        }
    }

    /// 判断一条记录是否"看起来像"该类型时必须存在的字段
    pub fn required_fields(&self) -> [&'static str; 2] {
        match self {
            RecordType::Mcq => ["question", "options"],
            RecordType::Qa => ["question", "answer"],
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mcq" => Ok(RecordType::Mcq),
            "qa" => Ok(RecordType::Qa),
            other => Err(InputError::UnknownRecordType(other.to_string())),
        }
    }
}

/// 选择题记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McqRecord {
    pub id: Option<String>,
    pub prompt: String,
    /// 至少包含一个选项
    pub options: Vec<String>,
    /// 正确选项序号（从1开始），越界或缺失时没有选项被标记为正确
    pub correct_option: Option<i64>,
    pub explanation: Option<String>,
}

/// 问答题记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaRecord {
    pub id: Option<String>,
    pub prompt: String,
    pub answer: String,
}

/// 经过校验的单条题目
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Mcq(McqRecord),
    Qa(QaRecord),
}

impl Record {
    pub fn prompt(&self) -> &str {
        match self {
            Record::Mcq(r) => &r.prompt,
            Record::Qa(r) => &r.prompt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_parse() {
        assert_eq!("mcq".parse::<RecordType>().unwrap(), RecordType::Mcq);
        assert_eq!(" QA ".parse::<RecordType>().unwrap(), RecordType::Qa);
        assert_eq!(
            "essay".parse::<RecordType>().unwrap_err(),
            InputError::UnknownRecordType("essay".to_string())
        );
    }

    #[test]
    fn test_record_type_keys() {
        assert_eq!(RecordType::Mcq.conventional_key(), "mcq_list");
        assert_eq!(RecordType::Qa.conventional_key(), "qa_list");
        assert_eq!(RecordType::Qa.required_fields(), ["question", "answer"]);
        assert_eq!(serde_json::to_string(&RecordType::Mcq).unwrap(), "\"mcq\"");
    }
}
