//! 卡片渲染服务
//!
//! 纯函数：已校验的题目 → 展示用卡片描述，不做任何校验。

use crate::models::{
    CardDescriptor, McqCard, McqRecord, OptionDescriptor, QaCard, QaRecord, Record, NO_EXPLANATION,
};

/// 渲染整批题目，题号按顺序从1开始
pub fn render(records: &[Record]) -> Vec<CardDescriptor> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let number = index + 1;
            match record {
                Record::Mcq(r) => CardDescriptor::Mcq(render_mcq(number, r)),
                Record::Qa(r) => CardDescriptor::Qa(render_qa(number, r)),
            }
        })
        .collect()
}

fn render_mcq(number: usize, record: &McqRecord) -> McqCard {
    let options = record
        .options
        .iter()
        .enumerate()
        .map(|(i, text)| OptionDescriptor {
            label: option_label(i),
            text: text.clone(),
            is_correct: record.correct_option == Some(i as i64 + 1),
        })
        .collect();

    let explanation = match record.explanation.as_deref() {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => NO_EXPLANATION.to_string(),
    };

    McqCard {
        number,
        heading: format!("{}. {}", number, record.prompt),
        options,
        explanation,
    }
}

fn render_qa(number: usize, record: &QaRecord) -> QaCard {
    QaCard {
        number,
        heading: format!("{}. {}", number, record.prompt),
        answer: record.answer.clone(),
    }
}

/// 0 → "A"，25 → "Z"，之后退化为数字序号
fn option_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        _ => (index + 1).to_string(),
    }
}
