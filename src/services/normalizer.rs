//! 响应归一化服务 - 业务能力层
//!
//! 把后端返回的任意 JSON（裸列表、带键容器、单条记录）还原为同一类型的题目列表。
//!
//! 解析顺序（先成功者胜出）：
//! 1. 负载本身就是列表
//! 2. 约定键（`mcq_list` / `qa_list`）
//! 3. 按键顺序扫描，取第一个"首元素像目标类型记录"的非空列表
//! 4. 负载本身就是一条记录
//!
//! 单条记录校验失败只会被丢弃并记录日志，不会中断整批。

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{McqRecord, QaRecord, Record, RecordType};
use crate::utils::logging::truncate_text;

/// 负载形态
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PayloadShape<'a> {
    /// 有序列表
    Sequence(&'a [Value]),
    /// 带键容器（不满足单条记录的字段要求）
    KeyedContainer(&'a Map<String, Value>),
    /// 本身满足目标类型字段要求的单条记录
    SingleRecord(&'a Value),
    /// 缺失或其他类型
    Unrecognized,
}

impl<'a> PayloadShape<'a> {
    /// 根据目标类型判定负载形态
    pub fn decode(payload: &'a Value, record_type: RecordType) -> Self {
        match payload {
            Value::Array(items) => PayloadShape::Sequence(items),
            Value::Object(map) if has_required_fields(map, record_type) => {
                PayloadShape::SingleRecord(payload)
            }
            Value::Object(map) => PayloadShape::KeyedContainer(map),
            _ => PayloadShape::Unrecognized,
        }
    }

    /// 容器形态下的键值表（单条记录同样是容器）
    fn entries(&self) -> Option<&'a Map<String, Value>> {
        match self {
            PayloadShape::KeyedContainer(map) => Some(*map),
            PayloadShape::SingleRecord(value) => (*value).as_object(),
            _ => None,
        }
    }

    fn is_object(&self) -> bool {
        matches!(
            self,
            PayloadShape::KeyedContainer(_) | PayloadShape::SingleRecord(_)
        )
    }
}

/// 候选列表提取策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Sequence,
    ConventionalKey,
    ScanKeys,
    SingleRecord,
}

impl Strategy {
    /// 按优先级排列的全部策略
    pub const ORDERED: [Strategy; 4] = [
        Strategy::Sequence,
        Strategy::ConventionalKey,
        Strategy::ScanKeys,
        Strategy::SingleRecord,
    ];

    /// 尝试提取候选列表
    ///
    /// 列表一旦命中即为最终结果，即使为空也不再尝试后续策略。
    fn apply<'a>(&self, shape: &PayloadShape<'a>, record_type: RecordType) -> Extraction<'a> {
        let found: Option<&'a [Value]> = match self {
            Strategy::Sequence => match shape {
                PayloadShape::Sequence(items) => Some(*items),
                _ => None,
            },
            Strategy::ConventionalKey => shape
                .entries()
                .and_then(|map| map.get(record_type.conventional_key()))
                .and_then(Value::as_array)
                .map(Vec::as_slice),
            Strategy::ScanKeys => shape.entries().and_then(|map| {
                map.iter().find_map(|(key, value)| {
                    let items = value.as_array()?;
                    let first = items.first()?.as_object()?;
                    has_required_fields(first, record_type).then(|| {
                        debug!("扫描命中键 '{}'，共 {} 条候选", key, items.len());
                        items.as_slice()
                    })
                })
            }),
            Strategy::SingleRecord => match shape {
                PayloadShape::SingleRecord(value) => Some(std::slice::from_ref(*value)),
                _ => None,
            },
        };
        match found {
            Some([]) => Extraction::Empty,
            Some(items) => Extraction::Found(items),
            None => Extraction::Miss,
        }
    }
}

/// 单个策略的提取结果
#[derive(Debug, Clone, Copy, PartialEq)]
enum Extraction<'a> {
    Found(&'a [Value]),
    /// 命中但列表为空，终止后续策略
    Empty,
    Miss,
}

/// 归一化失败（两种情况对应不同的提示文本）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NormalizationFailure {
    /// 负载是对象，但里面找不到有效题目
    #[error("The model returned an object, but no valid questions could be found inside it.")]
    NoMatchingRecords,
    /// 负载缺失、为空或格式完全不对
    #[error("The model returned no results or an unexpected data format. Try again.")]
    NoUsableData,
}

/// 单条记录被丢弃的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecordRejection {
    #[error("记录不是对象")]
    NotAnObject,
    #[error("question 不是文本")]
    QuestionNotText,
    #[error("options 不是列表")]
    OptionsNotSequence,
    #[error("options 为空")]
    OptionsEmpty,
    #[error("answer 不是文本")]
    AnswerNotText,
}

/// 归一化结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedBatch {
    pub records: Vec<Record>,
    /// 命中的策略
    pub strategy: Strategy,
    /// 候选条数（校验前）
    pub candidates: usize,
    /// 被丢弃的条数
    pub dropped: usize,
}

impl NormalizedBatch {
    pub fn is_partial(&self) -> bool {
        self.dropped > 0
    }
}

/// 把后端负载归一化为同类型题目列表
///
/// 结果只由输入决定；空结果视为失败而不是空成功。
pub fn normalize(
    payload: &Value,
    record_type: RecordType,
) -> Result<NormalizedBatch, NormalizationFailure> {
    let shape = PayloadShape::decode(payload, record_type);
    let failure = if shape.is_object() {
        NormalizationFailure::NoMatchingRecords
    } else {
        NormalizationFailure::NoUsableData
    };

    let (strategy, candidates) = Strategy::ORDERED
        .iter()
        .find_map(|s| match s.apply(&shape, record_type) {
            Extraction::Found(items) => Some(Some((*s, items))),
            Extraction::Empty => {
                debug!("策略 {:?} 命中空列表", s);
                Some(None)
            }
            Extraction::Miss => None,
        })
        .flatten()
        .ok_or_else(|| {
            debug!("负载形态 {} 未找到 {} 候选列表", shape_name(&shape), record_type);
            failure
        })?;

    let mut records = Vec::with_capacity(candidates.len());
    for (index, item) in candidates.iter().enumerate() {
        match validate_record(item, record_type) {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!(
                    "跳过第 {} 条格式错误的 {} 记录 ({}): {}",
                    index + 1,
                    record_type,
                    reason,
                    truncate_text(&item.to_string(), 120)
                );
            }
        }
    }

    if records.is_empty() {
        warn!("{} 条候选全部校验失败", candidates.len());
        return Err(failure);
    }

    let dropped = candidates.len() - records.len();
    debug!(
        "归一化完成: 策略 {:?}，有效 {} 条，丢弃 {} 条",
        strategy,
        records.len(),
        dropped
    );

    Ok(NormalizedBatch {
        records,
        strategy,
        candidates: candidates.len(),
        dropped,
    })
}

/// 单条记录类型校验
pub fn validate_record(item: &Value, record_type: RecordType) -> Result<Record, RecordRejection> {
    let map = item.as_object().ok_or(RecordRejection::NotAnObject)?;
    let prompt = map
        .get("question")
        .and_then(Value::as_str)
        .ok_or(RecordRejection::QuestionNotText)?
        .to_string();
    let id = map.get("id").and_then(Value::as_str).map(str::to_string);

    match record_type {
        RecordType::Mcq => {
            let options: Vec<String> = map
                .get("options")
                .and_then(Value::as_array)
                .ok_or(RecordRejection::OptionsNotSequence)?
                .iter()
                .map(option_text)
                .collect();
            if options.is_empty() {
                return Err(RecordRejection::OptionsEmpty);
            }
            Ok(Record::Mcq(McqRecord {
                id,
                prompt,
                options,
                correct_option: map.get("correct_index").and_then(parse_ordinal),
                explanation: map.get("explanation").and_then(explanation_text),
            }))
        }
        RecordType::Qa => {
            let answer = map
                .get("answer")
                .and_then(Value::as_str)
                .ok_or(RecordRejection::AnswerNotText)?
                .to_string();
            Ok(Record::Qa(QaRecord { id, prompt, answer }))
        }
    }
}

/// 解析正确选项序号：整数原样，小数截断，字符串取开头的整数部分
pub fn parse_ordinal(value: &Value) -> Option<i64> {
    static LEADING_INT: OnceLock<Option<Regex>> = OnceLock::new();

    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => {
            let re = LEADING_INT
                .get_or_init(|| Regex::new(r"^\s*([+-]?\d+)").ok())
                .as_ref()?;
            re.captures(s)?.get(1)?.as_str().parse().ok()
        }
        _ => None,
    }
}

fn option_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn explanation_text(value: &Value) -> Option<String> {
    if !is_truthy(value) {
        return None;
    }
    Some(option_text(value))
}

fn has_required_fields(map: &Map<String, Value>, record_type: RecordType) -> bool {
    record_type
        .required_fields()
        .iter()
        .all(|field| map.get(*field).is_some_and(is_truthy))
}

/// null、false、0 与空字符串视为"不存在"
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn shape_name(shape: &PayloadShape<'_>) -> &'static str {
    match shape {
        PayloadShape::Sequence(_) => "Sequence",
        PayloadShape::KeyedContainer(_) => "KeyedContainer",
        PayloadShape::SingleRecord(_) => "SingleRecord",
        PayloadShape::Unrecognized => "Unrecognized",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prompts(batch: &NormalizedBatch) -> Vec<&str> {
        batch.records.iter().map(Record::prompt).collect()
    }

    #[test]
    fn test_bare_list_is_used_directly() {
        let payload = json!([
            {"question": "Q1", "options": ["a", "b"], "correct_index": 1},
            {"question": "Q2", "options": ["c", "d"], "correct_index": 2}
        ]);
        let batch = normalize(&payload, RecordType::Mcq).unwrap();
        assert_eq!(batch.strategy, Strategy::Sequence);
        assert_eq!(prompts(&batch), vec!["Q1", "Q2"]);
        assert!(!batch.is_partial());
    }

    #[test]
    fn test_conventional_key_mcq() {
        let payload = json!({"mcq_list": [{"question": "Q1", "options": ["a", "b"]}]});
        let batch = normalize(&payload, RecordType::Mcq).unwrap();
        assert_eq!(batch.strategy, Strategy::ConventionalKey);
        assert_eq!(batch.records.len(), 1);
    }

    #[test]
    fn test_mcq_payload_fails_for_qa() {
        let payload = json!({"mcq_list": [{"question": "Q1", "options": ["a", "b"]}]});
        assert_eq!(
            normalize(&payload, RecordType::Qa),
            Err(NormalizationFailure::NoMatchingRecords)
        );
    }

    #[test]
    fn test_empty_list_is_failure() {
        assert_eq!(
            normalize(&json!([]), RecordType::Mcq),
            Err(NormalizationFailure::NoUsableData)
        );
        assert_eq!(
            normalize(&json!([]), RecordType::Qa),
            Err(NormalizationFailure::NoUsableData)
        );
    }

    #[test]
    fn test_scan_finds_unconventional_key() {
        let payload = json!({"questions": [{"question": "Q", "answer": "A"}]});
        let batch = normalize(&payload, RecordType::Qa).unwrap();
        assert_eq!(batch.strategy, Strategy::ScanKeys);
        assert_eq!(
            batch.records,
            vec![Record::Qa(QaRecord {
                id: None,
                prompt: "Q".to_string(),
                answer: "A".to_string(),
            })]
        );
    }

    #[test]
    fn test_scan_uses_key_order_and_skips_non_matching_lists() {
        let payload = json!({
            "meta": {"model": "x"},
            "tags": ["history", "europe"],
            "empty": [],
            "first": [{"question": "F", "answer": "1"}],
            "second": [{"question": "S", "answer": "2"}]
        });
        let batch = normalize(&payload, RecordType::Qa).unwrap();
        assert_eq!(prompts(&batch), vec!["F"]);
    }

    #[test]
    fn test_empty_conventional_key_stops_search() {
        let payload = json!({
            "mcq_list": [],
            "backup": [{"question": "Q", "options": ["a", "b"]}]
        });
        assert_eq!(
            normalize(&payload, RecordType::Mcq),
            Err(NormalizationFailure::NoMatchingRecords)
        );
    }

    #[test]
    fn test_non_list_conventional_key_falls_through_to_scan() {
        let payload = json!({
            "qa_list": "none",
            "items": [{"question": "Q", "answer": "A"}]
        });
        let batch = normalize(&payload, RecordType::Qa).unwrap();
        assert_eq!(batch.strategy, Strategy::ScanKeys);
    }

    #[test]
    fn test_single_record_is_wrapped() {
        let payload = json!({"question": "Only", "answer": "One", "id": "QA1"});
        let batch = normalize(&payload, RecordType::Qa).unwrap();
        assert_eq!(batch.strategy, Strategy::SingleRecord);
        assert_eq!(
            batch.records[0],
            Record::Qa(QaRecord {
                id: Some("QA1".to_string()),
                prompt: "Only".to_string(),
                answer: "One".to_string(),
            })
        );
    }

    #[test]
    fn test_single_mcq_record_with_option_list() {
        let payload = json!({"question": "Pick", "options": ["x", "y"], "correct_index": "2"});
        let batch = normalize(&payload, RecordType::Mcq).unwrap();
        assert_eq!(batch.strategy, Strategy::SingleRecord);
        match &batch.records[0] {
            Record::Mcq(r) => assert_eq!(r.correct_option, Some(2)),
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_malformed_middle_record_is_dropped() {
        let payload = json!([
            {"question": "Q1", "answer": "A1"},
            {"answer": "A2"},
            {"question": "Q3", "answer": "A3"}
        ]);
        let batch = normalize(&payload, RecordType::Qa).unwrap();
        assert_eq!(prompts(&batch), vec!["Q1", "Q3"]);
        assert_eq!(batch.candidates, 3);
        assert_eq!(batch.dropped, 1);
        assert!(batch.is_partial());
    }

    #[test]
    fn test_all_records_dropped_is_failure() {
        let list = json!([{"question": 7, "options": "abc"}, "junk"]);
        assert_eq!(
            normalize(&list, RecordType::Mcq),
            Err(NormalizationFailure::NoUsableData)
        );

        let wrapped = json!({"mcq_list": [{"question": "Q", "options": []}]});
        assert_eq!(
            normalize(&wrapped, RecordType::Mcq),
            Err(NormalizationFailure::NoMatchingRecords)
        );
    }

    #[test]
    fn test_absent_or_scalar_payload() {
        for payload in [json!(null), json!("text"), json!(42), json!(true)] {
            assert_eq!(
                normalize(&payload, RecordType::Mcq),
                Err(NormalizationFailure::NoUsableData)
            );
        }
    }

    #[test]
    fn test_object_without_records() {
        let payload = json!({"status": "ok", "count": 0});
        assert_eq!(
            normalize(&payload, RecordType::Mcq),
            Err(NormalizationFailure::NoMatchingRecords)
        );
    }

    #[test]
    fn test_falsy_fields_do_not_match_shape_checks() {
        let payload = json!({"question": "", "answer": "A"});
        assert_eq!(
            PayloadShape::decode(&payload, RecordType::Qa),
            PayloadShape::KeyedContainer(payload.as_object().unwrap())
        );
        assert_eq!(
            normalize(&payload, RecordType::Qa),
            Err(NormalizationFailure::NoMatchingRecords)
        );
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let payload = json!({
            "result": [
                {"question": "Q1", "options": ["a", 2, null], "correct_index": 2.9},
                {"question": "Q2"}
            ]
        });
        let first = normalize(&payload, RecordType::Mcq);
        let second = normalize(&payload, RecordType::Mcq);
        assert_eq!(first, second);
    }

    #[test]
    fn test_option_and_explanation_coercion() {
        let item = json!({
            "question": "Q",
            "options": ["a", 2, true, null],
            "explanation": ""
        });
        match validate_record(&item, RecordType::Mcq).unwrap() {
            Record::Mcq(r) => {
                assert_eq!(r.options, vec!["a", "2", "true", "null"]);
                assert_eq!(r.explanation, None);
                assert_eq!(r.correct_option, None);
            }
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejection_reasons() {
        assert_eq!(
            validate_record(&json!("Q"), RecordType::Qa),
            Err(RecordRejection::NotAnObject)
        );
        assert_eq!(
            validate_record(&json!({"question": "Q", "answer": 1}), RecordType::Qa),
            Err(RecordRejection::AnswerNotText)
        );
        assert_eq!(
            validate_record(&json!({"question": "Q", "options": {"a": 1}}), RecordType::Mcq),
            Err(RecordRejection::OptionsNotSequence)
        );
    }

    #[test]
    fn test_parse_ordinal() {
        assert_eq!(parse_ordinal(&json!(3)), Some(3));
        assert_eq!(parse_ordinal(&json!(2.7)), Some(2));
        assert_eq!(parse_ordinal(&json!(" 4 ")), Some(4));
        assert_eq!(parse_ordinal(&json!("2nd")), Some(2));
        assert_eq!(parse_ordinal(&json!("-1")), Some(-1));
        assert_eq!(parse_ordinal(&json!("B")), None);
        assert_eq!(parse_ordinal(&json!(null)), None);
    }
}
