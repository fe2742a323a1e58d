//! HTML 数据源解析
//!
//! 每个 `.task-card` 容器对应一道题，按文档顺序编号。

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::{AppError, AppResult, SourceError};
use crate::models::{AnswerEntry, AnswerGroup, Correct, MarkedRow, Question};

/// 卡片没有题干时使用的占位内容
pub const MISSING_QUESTION_PLACEHOLDER: &str = "Питання відсутнє";

/// 解析后的 HTML 文档
#[derive(Debug)]
pub struct HtmlSource {
    /// `<base href>` 的值
    pub base_href: Option<String>,
    pub questions: Vec<Result<Question, SourceError>>,
}

/// 解析 HTML 文档中的所有题目卡片
pub fn parse_html(html: &str) -> AppResult<HtmlSource> {
    let selectors = CardSelectors::new()?;
    let document = Html::parse_document(html);

    let base_href = document
        .select(&selectors.base)
        .next()
        .and_then(|base| base.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty());

    let questions: Vec<_> = document
        .select(&selectors.card)
        .enumerate()
        .map(|(i, card)| Ok(selectors.parse_card(card, i + 1)))
        .collect();

    debug!("HTML 中找到 {} 个题目卡片", questions.len());

    Ok(HtmlSource {
        base_href,
        questions,
    })
}

fn selector(css: &str) -> AppResult<Selector> {
    Selector::parse(css).map_err(|e| AppError::parse_failed(format!("无效的选择器 {}: {}", css, e)))
}

struct CardSelectors {
    base: Selector,
    card: Selector,
    counter: Selector,
    question: Selector,
    answers: Selector,
    quest_title: Selector,
    answer: Selector,
    marker: Selector,
    description_link: Selector,
    results_table: Selector,
    row: Selector,
    row_header: Selector,
    cell: Selector,
    marked: Selector,
}

impl CardSelectors {
    fn new() -> AppResult<Self> {
        Ok(Self {
            base: selector("base[href]")?,
            card: selector(".task-card")?,
            counter: selector(".counter")?,
            question: selector(".question")?,
            answers: selector(".answers")?,
            quest_title: selector(".quest-title")?,
            answer: selector(".answer")?,
            marker: selector(".marker")?,
            description_link: selector(".description a")?,
            results_table: selector("table.select-answers-variants")?,
            row: selector("tr")?,
            row_header: selector("th.r")?,
            cell: selector("td")?,
            marked: selector("span.marker.ok")?,
        })
    }

    fn parse_card(&self, card: ElementRef<'_>, index: usize) -> Question {
        let counter = card
            .select(&self.counter)
            .next()
            .map(text_of)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| format!("Завдання {}", index));

        let body = card
            .select(&self.question)
            .next()
            .map(|body| body.inner_html().trim().to_string())
            .unwrap_or_else(|| {
                debug!("题目卡片 #{} 没有题干，使用占位内容", index);
                format!("<p>{}</p>", MISSING_QUESTION_PLACEHOLDER)
            });

        let (help, type_text) = card
            .select(&self.description_link)
            .next()
            .map(|link| {
                (
                    link.value().attr("href").unwrap_or_default().to_string(),
                    text_of(link),
                )
            })
            .unwrap_or_default();

        Question {
            index,
            id: card.value().attr("id").unwrap_or_default().to_string(),
            counter,
            help,
            type_text,
            content: vec![body],
            answer_groups: card
                .select(&self.answers)
                .map(|group| self.parse_group(group))
                .collect(),
            correct: self.parse_results_table(card),
        }
    }

    fn parse_group(&self, group: ElementRef<'_>) -> AnswerGroup {
        let title = group
            .select(&self.quest_title)
            .next()
            .map(|title| title.inner_html().trim().to_string())
            .filter(|title| !title.is_empty());

        let entries = group
            .select(&self.answer)
            .map(|answer| {
                let marker_el = answer.select(&self.marker).next();
                let inner = answer.inner_html();
                let html = match marker_el {
                    Some(marker) => inner.replacen(&marker.html(), "", 1),
                    None => inner,
                };
                AnswerEntry::new(
                    marker_el.map(text_of).unwrap_or_default(),
                    html.trim(),
                )
            })
            .collect();

        AnswerGroup { title, entries }
    }

    /// 结果表格：第一行是表头，`th.r` 是子题号，`span.marker.ok` 标记选中的列
    fn parse_results_table(&self, card: ElementRef<'_>) -> Option<Correct> {
        let table = card.select(&self.results_table).next()?;
        let rows = table
            .select(&self.row)
            .skip(1)
            .map(|row| MarkedRow {
                subquestion: row
                    .select(&self.row_header)
                    .next()
                    .map(text_of)
                    .filter(|text| !text.is_empty()),
                columns: row
                    .select(&self.cell)
                    .enumerate()
                    .filter(|(_, cell)| cell.select(&self.marked).next().is_some())
                    .map(|(column, _)| column)
                    .collect(),
            })
            .collect();
        Some(Correct::Marked(rows))
    }
}

fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
