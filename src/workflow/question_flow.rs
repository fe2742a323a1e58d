//! 题目处理流程 - 流程层
//!
//! 核心职责：定义"一道题"的查询流程
//!
//! 流程顺序：
//! 1. 已有回答 → 跳过
//! 2. 读取 markdown / 图片（按呈现方式）
//! 3. 向模型提问
//! 4. 原样保存回答

use std::sync::Arc;

use regex::Regex;
use tracing::{debug, info};

use crate::error::AppResult;
use crate::infrastructure::workspace::{read_bytes, read_to_string};
use crate::infrastructure::{ResponseStore, Workspace};
use crate::models::PresentationMode;
use crate::services::ModelClient;
use crate::utils::truncate_text;
use crate::workflow::question_ctx::QuestionCtx;

/// 只发送图片时附带的说明
pub const IMAGE_ONLY_PROMPT: &str =
    "Розв'яжи завдання, зображене на малюнку. Дай відповідь і коротко поясни її.";

/// 题目处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// 已查询并保存回答
    Success,
    /// 已有回答，跳过
    Skipped,
}

/// 发送给模型的内容
#[derive(Debug)]
pub struct QueryPayload {
    pub prompt: String,
    pub image: Option<Vec<u8>>,
}

/// 题目处理流程
///
/// - 编排单道题的查询
/// - 不负责并发，不持有浏览器
/// - 只依赖能力（ModelClient / ResponseStore）
pub struct QuestionFlow {
    model_client: Arc<dyn ModelClient>,
    store: Arc<dyn ResponseStore>,
    workspace: Workspace,
    mode: PresentationMode,
    needs_image: Regex,
    verbose_logging: bool,
}

impl QuestionFlow {
    pub fn new(
        model_client: Arc<dyn ModelClient>,
        store: Arc<dyn ResponseStore>,
        workspace: Workspace,
        mode: PresentationMode,
        verbose_logging: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            model_client,
            store,
            workspace,
            mode,
            // 图片引用或表格行
            needs_image: Regex::new(r"(?m)!\[[^\]]*\]\([^)]*\)|^\s*\|.*\|\s*$")?,
            verbose_logging,
        })
    }

    pub async fn run(&self, ctx: &QuestionCtx) -> AppResult<ProcessResult> {
        if self.store.exists(ctx.index, &ctx.model_slug).await {
            debug!("{} 已有回答，跳过", ctx);
            return Ok(ProcessResult::Skipped);
        }

        let payload = self.build_payload(ctx.index).await?;
        info!(
            "{} 🤖 正在提问{}",
            ctx,
            if payload.image.is_some() { " (附图)" } else { "" }
        );
        if self.verbose_logging {
            debug!("{} 提示词: {}", ctx, truncate_text(&payload.prompt, 80));
        }

        let reply = self
            .model_client
            .query(&payload.prompt, payload.image.as_deref(), &ctx.model)
            .await?;

        self.store.write(ctx.index, &ctx.model_slug, &reply).await?;
        info!("{} ✅ 回答已保存 ({} 字符)", ctx, reply.chars().count());

        Ok(ProcessResult::Success)
    }

    /// 按呈现方式组装提示词和图片
    pub async fn build_payload(&self, index: usize) -> AppResult<QueryPayload> {
        let payload = match self.mode {
            PresentationMode::ImageOnly => QueryPayload {
                prompt: IMAGE_ONLY_PROMPT.to_string(),
                image: Some(self.read_image(index).await?),
            },
            PresentationMode::TextOnly => QueryPayload {
                prompt: self.read_markdown(index).await?,
                image: None,
            },
            PresentationMode::TextAndImage => QueryPayload {
                prompt: self.read_markdown(index).await?,
                image: Some(self.read_image(index).await?),
            },
            PresentationMode::ImageWhenNecessary => {
                let prompt = self.read_markdown(index).await?;
                let image = if self.needs_image.is_match(&prompt) {
                    Some(self.read_image(index).await?)
                } else {
                    None
                };
                QueryPayload { prompt, image }
            }
        };
        Ok(payload)
    }

    async fn read_markdown(&self, index: usize) -> AppResult<String> {
        read_to_string(&self.workspace.question_markdown(index)).await
    }

    async fn read_image(&self, index: usize) -> AppResult<Vec<u8>> {
        read_bytes(&self.workspace.question_image(index)).await
    }
}
