//! 数据源层：把 HTML 页面或 JSON 导出规范化成 `Question`
//!
//! - 网络地址通过 [`ContentFetcher`] 获取，本地路径直接读取
//! - 根据扩展名或内容首字符判断格式
//! - 单道题目解析失败只影响该题

pub mod fetcher;
pub mod html_source;
pub mod json_source;

use std::path::Path;

use tracing::{debug, info, warn};
use url::Url;

use crate::error::{AppError, AppResult, SourceError};
use crate::models::Question;

pub use fetcher::{is_remote, ContentFetcher, HttpFetcher};
pub use html_source::parse_html;
pub use json_source::parse_json;

/// 数据源格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Html,
    Json,
}

impl SourceFormat {
    /// `.json` 扩展名或以 `[` / `{` 开头的内容视为 JSON
    pub fn detect(identifier: &str, content: &str) -> Self {
        let path = identifier
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        if path.ends_with(".json") || content.trim_start().starts_with(['[', '{']) {
            SourceFormat::Json
        } else {
            SourceFormat::Html
        }
    }
}

/// 加载完成的数据源
#[derive(Debug)]
pub struct LoadedSource {
    /// 解析相对图片地址用的基础地址，可能为空
    pub base_url: String,
    pub questions: Vec<Result<Question, SourceError>>,
}

impl LoadedSource {
    pub fn succeeded(&self) -> usize {
        self.questions.iter().filter(|q| q.is_ok()).count()
    }
}

/// 读取并规范化数据源
pub async fn load_source(identifier: &str, fetcher: &dyn ContentFetcher) -> AppResult<LoadedSource> {
    let content = if is_remote(identifier) {
        fetcher.fetch(identifier).await?
    } else {
        let path = Path::new(identifier);
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::file_read_failed(path, e))?
    };

    let format = SourceFormat::detect(identifier, &content);
    debug!("数据源格式: {:?}", format);

    let source = match format {
        SourceFormat::Json => LoadedSource {
            base_url: remote_origin(identifier).unwrap_or_default(),
            questions: parse_json(&content)?,
        },
        SourceFormat::Html => {
            let parsed = parse_html(&content)?;
            let base_url = match parsed.base_href {
                Some(href) => resolve_base_href(identifier, &href),
                None => remote_origin(identifier).unwrap_or_default(),
            };
            LoadedSource {
                base_url,
                questions: parsed.questions,
            }
        }
    };

    for error in source.questions.iter().filter_map(|q| q.as_ref().err()) {
        warn!("⚠️  {}", error);
    }
    info!(
        "📚 数据源 {} 共 {} 道题目, 成功解析 {} 道",
        identifier,
        source.questions.len(),
        source.succeeded()
    );

    Ok(source)
}

/// 远程地址的协议 + 主机部分
fn remote_origin(identifier: &str) -> Option<String> {
    if !is_remote(identifier) {
        return None;
    }
    let url = Url::parse(identifier).ok()?;
    let origin = url.origin();
    origin
        .is_tuple()
        .then(|| format!("{}/", origin.ascii_serialization()))
}

/// `<base href>` 可能是相对地址，相对于远程页面地址解析
fn resolve_base_href(identifier: &str, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    if is_remote(identifier) {
        if let Some(joined) = Url::parse(identifier).ok().and_then(|u| u.join(href).ok()) {
            return joined.to_string();
        }
    }
    href.to_string()
}
