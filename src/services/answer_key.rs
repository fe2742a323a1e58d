//! 标准答案提取 - 业务能力层
//!
//! 把几种不同编码的正确答案统一成一行文本，无法确定时返回空字符串。

use crate::models::{Correct, MarkedRow};

/// 结果表格的列标签从西里尔字母 А 开始
const FIRST_COLUMN_LETTER: char = 'А';

/// 提取一道题的标准答案
pub fn extract(correct: &Correct) -> String {
    match correct {
        Correct::Single(label) => label.clone(),
        Correct::List(labels) => extract_list(labels),
        Correct::Keyed(pairs) => extract_keyed(pairs),
        Correct::Marked(rows) => extract_marked(rows),
    }
}

fn extract_list(labels: &[String]) -> String {
    labels
        .iter()
        .map(|label| label.trim())
        .filter(|label| !label.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// 子题号全部是整数时按数值排序，否则按字典序
fn extract_keyed(pairs: &[(String, String)]) -> String {
    let mut sorted: Vec<(&str, &str)> = pairs
        .iter()
        .map(|(marker, label)| (marker.trim(), label.trim()))
        .collect();

    if sorted.iter().all(|(m, _)| m.parse::<i64>().is_ok()) {
        sorted.sort_by_key(|(m, _)| m.parse::<i64>().unwrap_or_default());
    } else {
        sorted.sort_by(|a, b| a.0.cmp(b.0));
    }

    sorted
        .iter()
        .map(|(marker, label)| format!("{}-{}", marker, label))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 有行标题的行输出每个被标记的列，没有行标题的行只取第一个
fn extract_marked(rows: &[MarkedRow]) -> String {
    let mut parts = Vec::new();
    for row in rows {
        match &row.subquestion {
            Some(sub) => {
                for &column in &row.columns {
                    if let Some(letter) = column_letter(column) {
                        parts.push(format!("{}-{}", sub, letter));
                    }
                }
            }
            None => {
                if let Some(letter) = row.columns.first().and_then(|&c| column_letter(c)) {
                    parts.push(letter.to_string());
                }
            }
        }
    }
    parts.join(", ")
}

/// 第 `column` 列（从0开始）对应的字母：А, Б, В, Г, Д ...
pub fn column_letter(column: usize) -> Option<char> {
    u32::try_from(column)
        .ok()
        .and_then(|offset| char::from_u32(FIRST_COLUMN_LETTER as u32 + offset))
}

/// 生成 answers.md 内容：按题号升序的 `{index}) {answer}` 行，空答案跳过
pub fn answer_key_lines(answers: &[(usize, String)]) -> String {
    let mut lines: Vec<&(usize, String)> = answers
        .iter()
        .filter(|(_, answer)| !answer.trim().is_empty())
        .collect();
    lines.sort_by_key(|(index, _)| *index);
    lines
        .iter()
        .map(|(index, answer)| format!("{}) {}", index, answer.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}
