//! 题目处理上下文
//!
//! 封装"我正在用哪个模型回答第几题"这一信息

use std::fmt::Display;

use crate::models::model_slug;

/// 题目处理上下文
#[derive(Debug, Clone)]
pub struct QuestionCtx {
    /// 题号（从1开始）
    pub index: usize,

    /// 模型名称
    pub model: String,

    /// 用于文件名的模型名
    pub model_slug: String,
}

impl QuestionCtx {
    pub fn new(index: usize, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            index,
            model_slug: model_slug(&model),
            model,
        }
    }
}

impl Display for QuestionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[题目 #{} 模型 {}]", self.index, self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctx_slug_and_display() {
        let ctx = QuestionCtx::new(3, "google/gemini-2.5-pro:free");
        assert_eq!(ctx.model_slug, "google_gemini-2.5-pro_free");
        assert_eq!(ctx.to_string(), "[题目 #3 模型 google/gemini-2.5-pro:free]");
    }
}
