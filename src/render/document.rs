//! 题目文档生成
//!
//! 同一个 `Question` 生成两份内容：markdown 文本和用于截图的 HTML 页面。

use regex::{Captures, Regex};

use crate::error::AppResult;
use crate::models::Question;
use crate::render::markdown::{Converted, ImageRef, MarkdownConverter};

/// 题型说明前缀
const TYPE_LABEL: &str = "Вид завдання";

/// 一道题的渲染结果（图片之外的部分）
#[derive(Debug, Clone)]
pub struct QuestionDocument {
    pub markdown: String,
    /// 完整的 HTML 页面，交给浏览器截图
    pub html: String,
    pub images: Vec<ImageRef>,
}

impl QuestionDocument {
    pub fn build(question: &Question, converter: &MarkdownConverter, width: u32) -> AppResult<Self> {
        let converted = question_markdown(question, converter);
        let card = task_card_html(question, converter)?;
        Ok(Self {
            markdown: converted.text,
            html: styled_document(&card, width),
            images: converted.images,
        })
    }
}

/// 生成题目 markdown
pub fn question_markdown(question: &Question, converter: &MarkdownConverter) -> Converted {
    let mut images = Vec::new();
    let mut convert = |html: &str| {
        let converted = converter.convert(html);
        images.extend(converted.images);
        converted.text
    };

    let mut sections = vec![format!("## {}", question.counter.trim())];

    let body = question
        .content
        .iter()
        .map(|block| convert(block.as_str()))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    if !body.is_empty() {
        sections.push(body);
    }

    for group in &question.answer_groups {
        if let Some(title) = &group.title {
            let title = convert(title.as_str());
            if !title.is_empty() {
                sections.push(title);
            }
        }
        for entry in &group.entries {
            let answer = convert(entry.html.as_str());
            let marker = entry.marker.trim();
            sections.push(if answer.is_empty() {
                format!("**{}**", marker)
            } else {
                format!("**{}** {}", marker, answer)
            });
        }
    }

    if !question.type_text.trim().is_empty() {
        sections.push(format!(
            "{}: [{}]({})",
            TYPE_LABEL,
            question.type_text.trim(),
            question.help.trim()
        ));
    }

    Converted {
        text: sections.join("\n\n") + "\n",
        images,
    }
}

/// 生成题目卡片 HTML，图片地址替换为绝对地址
pub fn task_card_html(question: &Question, converter: &MarkdownConverter) -> AppResult<String> {
    let mut html = format!(
        "<div id=\"{}\" class=\"task-card\">\n<div class=\"counter\">{}</div>\n<div class=\"question\">\n",
        escape_html(&question.id),
        escape_html(question.counter.trim())
    );
    for block in &question.content {
        html.push_str(block);
        html.push('\n');
    }
    html.push_str("</div>\n");

    for group in &question.answer_groups {
        html.push_str("<div class=\"answers\">\n");
        if let Some(title) = &group.title {
            html.push_str(&format!("<div class=\"quest-title\">{}</div>\n", title));
        }
        for entry in &group.entries {
            html.push_str(&format!(
                "<div class=\"answer\"><span class=\"marker\">{}</span> {}</div>\n",
                escape_html(entry.marker.trim()),
                entry.html
            ));
        }
        html.push_str("</div>\n");
    }

    if !question.type_text.trim().is_empty() {
        html.push_str(&format!(
            "<div class=\"description\">{}: <a href=\"{}\" target=\"_blank\">{}</a></div>\n",
            TYPE_LABEL,
            escape_html(question.help.trim()),
            escape_html(question.type_text.trim())
        ));
    }
    html.push_str("</div>\n");

    absolutize_image_sources(&html, converter)
}

/// 包装成带样式的完整页面
pub fn styled_document(body: &str, width: u32) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
html,body{{margin:0;background-color:white;}}
body{{width:{width}px;box-sizing:border-box;font-family:sans-serif;padding:1.25rem;}}
.counter{{color:lightseagreen;font-size:1.5em;font-weight:bold;margin-bottom:0.75rem;}}
.answers{{margin-top:0.75rem;}}
.quest-title{{margin-bottom:0.5rem;}}
.answer{{margin:0.25rem 0;}}
.marker{{font-weight:bold;}}
.description{{margin-top:0.75rem;font-size:0.85em;}}
strong,b{{font-weight:bold;}}
em,i{{font-style:italic;}}
img{{max-width:100%;}}
table{{border-collapse:collapse;}}
table,td,th{{border:0.0625rem solid black;padding:0.3125rem;}}
</style>
</head>
<body>
{body}</body>
</html>
"#
    )
}

/// 把 `<img src>` 中的相对地址替换为绝对地址
pub fn absolutize_image_sources(html: &str, converter: &MarkdownConverter) -> AppResult<String> {
    let re = Regex::new(r#"(<img\b[^>]*?\ssrc\s*=\s*)(?:"([^"]*)"|'([^']*)')"#)?;
    let replaced = re.replace_all(html, |caps: &Captures| {
        let src = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
            .unwrap_or_default();
        format!(
            "{}\"{}\"",
            &caps[1],
            converter.resolve_src(src).replace('"', "&quot;")
        )
    });
    Ok(replaced.into_owned())
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
