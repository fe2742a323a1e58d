use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer};

/// 规范化后的题目
///
/// 无论来自 HTML 还是 JSON，进入渲染阶段前都会被转换成这个结构。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Question {
    /// 题目序号（从1开始，按数据源顺序分配）
    pub index: usize,
    pub id: String,
    /// 显示用的题号标签
    pub counter: String,
    /// 参考链接
    pub help: String,
    /// 题型名称
    pub type_text: String,
    /// 题干 HTML 片段（按顺序）
    pub content: Vec<String>,
    pub answer_groups: Vec<AnswerGroup>,
    pub correct: Option<Correct>,
}

/// 一组答案选项
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerGroup {
    /// 组标题（HTML）
    pub title: Option<String>,
    pub entries: Vec<AnswerEntry>,
}

/// 单个答案选项
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerEntry {
    /// 选项标记（А、Б、1、2 ...）
    pub marker: String,
    /// 选项内容（HTML，不含标记）
    pub html: String,
}

impl AnswerEntry {
    pub fn new(marker: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            html: html.into(),
        }
    }
}

/// 正确答案的几种编码方式
#[derive(Debug, Clone, PartialEq)]
pub enum Correct {
    /// 单个标签
    Single(String),
    /// 标签列表
    List(Vec<String>),
    /// 子题标记 → 选中的标签
    Keyed(Vec<(String, String)>),
    /// HTML 结果表格中被标记的单元格
    Marked(Vec<MarkedRow>),
}

/// 结果表格中的一行
#[derive(Debug, Clone, PartialEq)]
pub struct MarkedRow {
    /// 行标题（子题号），没有行标题时为 None
    pub subquestion: Option<String>,
    /// 被标记的列（从0开始）
    pub columns: Vec<usize>,
}

/// JSON 中的正确答案字段
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCorrect {
    Single(Label),
    List(Vec<Label>),
    Keyed(BTreeMap<String, Label>),
}

impl From<RawCorrect> for Correct {
    fn from(raw: RawCorrect) -> Self {
        match raw {
            RawCorrect::Single(label) => Correct::Single(label.0),
            RawCorrect::List(labels) => Correct::List(labels.into_iter().map(|l| l.0).collect()),
            RawCorrect::Keyed(map) => {
                Correct::Keyed(map.into_iter().map(|(k, v)| (k, v.0)).collect())
            }
        }
    }
}

/// 答案标签，JSON 中可能是字符串也可能是整数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label(pub String);

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LabelVisitor).map(Label)
    }
}

/// 接受字符串或整数
pub(crate) struct LabelVisitor;

impl<'de> serde::de::Visitor<'de> for LabelVisitor {
    type Value = String;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string or integer label")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(value.to_string())
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(value.to_string())
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_correct_shapes() {
        let single: RawCorrect = serde_json::from_str(r#""В""#).unwrap();
        assert_eq!(Correct::from(single), Correct::Single("В".to_string()));

        let list: RawCorrect = serde_json::from_str(r#"["А", 3]"#).unwrap();
        assert_eq!(
            Correct::from(list),
            Correct::List(vec!["А".to_string(), "3".to_string()])
        );

        let keyed: RawCorrect = serde_json::from_str(r#"{"2": "Б", "1": 4}"#).unwrap();
        match Correct::from(keyed) {
            Correct::Keyed(pairs) => {
                assert_eq!(pairs.len(), 2);
                assert!(pairs.contains(&("1".to_string(), "4".to_string())));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_label_rejects_objects() {
        assert!(serde_json::from_str::<Label>(r#"{"a": 1}"#).is_err());
    }
}
