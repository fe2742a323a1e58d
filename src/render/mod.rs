//! 渲染层
//!
//! 纯函数部分：HTML → Markdown、题目卡片 HTML、截图裁剪。
//! 截图本身由 `infrastructure::page_renderer` 完成。

pub mod crop;
pub mod document;
pub mod markdown;

pub use crop::crop_to_content;
pub use document::QuestionDocument;
pub use markdown::{ImageRef, MarkdownConverter};
