//! JSON 数据源解析
//!
//! 顶层可以是题目数组，也可以是带 `questions` 字段的对象。
//! 每条记录单独反序列化，一条记录出错不影响其它记录。

use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{AppError, AppResult, SourceError};
use crate::models::question::Label;
use crate::models::{AnswerEntry, AnswerGroup, Question, RawCorrect};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDocument {
    List(Vec<JsonValue>),
    Wrapped { questions: Vec<JsonValue> },
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default)]
    id: Option<Label>,
    #[serde(default)]
    counter: Option<Label>,
    #[serde(default, alias = "content")]
    question: Option<RawContent>,
    #[serde(default, rename = "answerGroups")]
    answer_groups: Option<Vec<RawAnswerGroup>>,
    #[serde(default, rename = "answersSections")]
    answers_sections: Option<Vec<RawAnswerGroup>>,
    #[serde(default)]
    help: Option<String>,
    #[serde(default)]
    type_text: Option<String>,
    #[serde(default)]
    correct: Option<RawCorrect>,
}

/// 题干：段落数组或者已经拼好的 HTML
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawContent {
    Block(String),
    Paragraphs(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawAnswerGroup {
    #[serde(default, rename = "quest-title")]
    quest_title: Option<String>,
    #[serde(default)]
    answers: Vec<RawAnswer>,
}

#[derive(Debug, Deserialize)]
struct RawAnswer {
    marker: Label,
    #[serde(default, alias = "html")]
    answer: String,
}

/// 解析 JSON 文档中的所有题目
pub fn parse_json(content: &str) -> AppResult<Vec<Result<Question, SourceError>>> {
    let document: RawDocument = serde_json::from_str(content)
        .map_err(|e| AppError::parse_failed(format!("JSON 文档格式错误: {}", e)))?;

    let records = match document {
        RawDocument::List(records) | RawDocument::Wrapped { questions: records } => records,
    };
    debug!("JSON 中找到 {} 条题目记录", records.len());

    Ok(records
        .into_iter()
        .enumerate()
        .map(|(i, record)| normalize_record(record, i + 1))
        .collect())
}

fn normalize_record(record: JsonValue, index: usize) -> Result<Question, SourceError> {
    let raw: RawQuestion = serde_json::from_value(record)
        .map_err(|source| SourceError::InvalidRecord { index, source })?;

    let missing = |field: &str| SourceError::MissingField {
        index,
        field: field.to_string(),
    };

    let counter = raw
        .counter
        .map(|label| label.0.trim().to_string())
        .filter(|counter| !counter.is_empty())
        .ok_or_else(|| missing("counter"))?;

    let content = match raw.question {
        Some(RawContent::Block(html)) if !html.trim().is_empty() => vec![html.trim().to_string()],
        Some(RawContent::Paragraphs(paragraphs)) if !paragraphs.is_empty() => paragraphs
            .iter()
            .map(|p| format!("<p>{}</p>", p.trim()))
            .collect(),
        _ => return Err(missing("question")),
    };

    // 两个字段同时存在时以 answersSections 为准
    let answer_groups = raw
        .answers_sections
        .or(raw.answer_groups)
        .unwrap_or_default()
        .into_iter()
        .map(|group| AnswerGroup {
            title: group
                .quest_title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .map(|t| format!("<i>{}</i>", t)),
            entries: group
                .answers
                .into_iter()
                .map(|a| AnswerEntry::new(a.marker.0.trim(), a.answer.trim()))
                .collect(),
        })
        .collect();

    Ok(Question {
        index,
        id: raw.id.map(|label| label.0).unwrap_or_default(),
        counter,
        help: raw.help.unwrap_or_default(),
        type_text: raw.type_text.unwrap_or_default(),
        content,
        answer_groups,
        correct: raw.correct.map(Into::into),
    })
}
