//! HTML → Markdown 转换
//!
//! 题干、选项、组标题共用同一套递归转换规则，HTML 和 JSON 两种数据源都走这里。

use scraper::node::Node;
use scraper::{ElementRef, Html};
use url::Url;

/// 题目中引用的图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// 绝对地址（渲染图片时使用）
    pub url: String,
    /// 写进 markdown 的文件名
    pub file_name: String,
}

/// 转换结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Converted {
    pub text: String,
    pub images: Vec<ImageRef>,
}

/// HTML 片段转换器
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter {
    base_url: Option<Url>,
}

impl MarkdownConverter {
    /// `base_url` 为空或无法解析时，相对地址保持原样
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: Url::parse(base_url).ok(),
        }
    }

    /// 转换一个 HTML 片段
    pub fn convert(&self, html: &str) -> Converted {
        let fragment = Html::parse_fragment(html);
        let mut out = String::new();
        let mut images = Vec::new();
        self.walk_children(fragment.root_element(), &mut out, &mut images);
        Converted {
            text: tidy(&out),
            images,
        }
    }

    /// 把图片地址解析成绝对地址
    pub fn resolve_src(&self, src: &str) -> String {
        resolve_image_src(src, self.base_url.as_ref())
    }

    fn walk_children(&self, element: ElementRef<'_>, out: &mut String, images: &mut Vec<ImageRef>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => push_text(out, text),
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        self.walk_element(child_el, out, images);
                    }
                }
                _ => {}
            }
        }
    }

    fn walk_element(&self, element: ElementRef<'_>, out: &mut String, images: &mut Vec<ImageRef>) {
        match element.value().name() {
            "b" | "strong" => self.push_emphasis(element, "**", out, images),
            "i" | "em" => self.push_emphasis(element, "*", out, images),
            "br" => out.push('\n'),
            "img" => {
                let src = element.value().attr("src").unwrap_or_default();
                let alt = element.value().attr("alt").unwrap_or_default();
                let url = self.resolve_src(src);
                let file_name = image_file_name(&url);
                out.push_str(&format!("![{}]({})", alt.trim(), file_name));
                images.push(ImageRef { url, file_name });
            }
            "table" => self.push_table(element, out, images),
            "p" | "div" => {
                out.push_str("\n\n");
                self.walk_children(element, out, images);
                out.push_str("\n\n");
            }
            "script" | "style" => {}
            _ => self.walk_children(element, out, images),
        }
    }

    fn push_emphasis(
        &self,
        element: ElementRef<'_>,
        mark: &str,
        out: &mut String,
        images: &mut Vec<ImageRef>,
    ) {
        let mut inner = String::new();
        self.walk_children(element, &mut inner, images);
        let trimmed = inner.trim();
        if trimmed.is_empty() {
            push_text(out, &inner);
            return;
        }
        let leading_space = element
            .text()
            .next()
            .is_some_and(|t| t.starts_with(char::is_whitespace));
        if leading_space {
            push_text(out, " ");
        }
        out.push_str(mark);
        out.push_str(trimmed);
        out.push_str(mark);
        if inner.ends_with(char::is_whitespace) {
            out.push(' ');
        }
    }

    fn push_table(&self, table: ElementRef<'_>, out: &mut String, images: &mut Vec<ImageRef>) {
        let rows: Vec<Vec<String>> = table
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "tr")
            .map(|tr| {
                tr.children()
                    .filter_map(ElementRef::wrap)
                    .filter(|cell| matches!(cell.value().name(), "th" | "td"))
                    .map(|cell| self.cell_text(cell, images))
                    .collect()
            })
            .collect();

        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return;
        }

        out.push_str("\n\n");
        for (i, row) in rows.iter().enumerate() {
            out.push_str(&table_row(row, columns));
            out.push('\n');
            if i == 0 {
                out.push_str(&format!("|{}\n", " --- |".repeat(columns)));
            }
        }
        out.push('\n');
    }

    fn cell_text(&self, cell: ElementRef<'_>, images: &mut Vec<ImageRef>) -> String {
        let mut text = String::new();
        self.walk_children(cell, &mut text, images);
        let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
        single_line.replace('|', "\\|")
    }
}

fn table_row(cells: &[String], columns: usize) -> String {
    let mut row = String::from("|");
    for i in 0..columns {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        row.push(' ');
        row.push_str(cell);
        row.push_str(" |");
    }
    row
}

/// 按浏览器规则折叠空白
fn push_text(out: &mut String, text: &str) {
    let mut prev_space = out.is_empty() || out.ends_with([' ', '\n']);
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
}

/// 去掉行首行尾空白，合并连续空行
fn tidy(raw: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in raw.lines().map(str::trim) {
        if line.is_empty() {
            if lines.last().is_some_and(|last| !last.is_empty()) {
                lines.push("");
            }
        } else {
            lines.push(line);
        }
    }
    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// 相对地址按 base 解析，已经是绝对地址的保持不变
pub fn resolve_image_src(src: &str, base: Option<&Url>) -> String {
    let src = src.trim();
    if Url::parse(src).is_ok() {
        return src.to_string();
    }
    match base.and_then(|b| b.join(src).ok()) {
        Some(url) => url.to_string(),
        None => src.to_string(),
    }
}

/// 取地址中的文件名并清理成安全字符
pub fn image_file_name(url: &str) -> String {
    let raw = match Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "data" => String::new(),
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .unwrap_or_default()
            .to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let sanitized: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches(['_', '.']).is_empty() {
        "image".to_string()
    } else {
        sanitized
    }
}
