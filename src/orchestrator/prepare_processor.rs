//! 题目准备 - 编排层
//!
//! ## 职责
//!
//! 1. **加载数据源**：HTML / JSON → `Vec<Question>`
//! 2. **渲染**：每道题生成 markdown 和裁剪后的 PNG
//! 3. **标准答案**：汇总成 answers.md
//! 4. **统计输出**：成功 / 跳过 / 失败
//!
//! 顺序处理，整个阶段只使用一个浏览器页面。

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppResult, RenderError};
use crate::infrastructure::workspace::{write_file, write_new};
use crate::infrastructure::{Rasterizer, Workspace};
use crate::models::Question;
use crate::render::{crop_to_content, MarkdownConverter, QuestionDocument};
use crate::services::{answer_key_lines, extract_answer};
use crate::sources::{load_source, ContentFetcher, LoadedSource};
use crate::utils::logging::print_final_stats;

/// 准备阶段统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PrepareStats {
    pub total: usize,
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl PrepareStats {
    /// 有题目未能生成时返回 `RenderError::Incomplete`
    pub fn ensure_complete(&self) -> AppResult<()> {
        if self.failed > 0 {
            return Err(RenderError::Incomplete {
                failed: self.failed,
                total: self.total,
            }
            .into());
        }
        Ok(())
    }
}

/// 准备阶段的依赖
pub struct PrepareProcessor<'a> {
    workspace: &'a Workspace,
    rasterizer: &'a dyn Rasterizer,
    render_width: u32,
    crop_margin: u32,
}

impl<'a> PrepareProcessor<'a> {
    pub fn new(workspace: &'a Workspace, rasterizer: &'a dyn Rasterizer, config: &Config) -> Self {
        Self {
            workspace,
            rasterizer,
            render_width: config.render_width,
            crop_margin: config.crop_margin,
        }
    }

    /// 加载数据源并生成所有题目产物
    pub async fn run(&self, identifier: &str, fetcher: &dyn ContentFetcher) -> AppResult<PrepareStats> {
        info!("\n📁 正在加载数据源: {}", identifier);
        let source = load_source(identifier, fetcher).await?;
        let stats = self.process_source(&source).await?;
        print_final_stats("题目准备", stats.success, stats.skipped, stats.failed);
        Ok(stats)
    }

    /// 处理已加载的数据源
    pub async fn process_source(&self, source: &LoadedSource) -> AppResult<PrepareStats> {
        let converter = MarkdownConverter::new(&source.base_url);
        let mut stats = PrepareStats {
            total: source.questions.len(),
            ..Default::default()
        };
        let mut answers = Vec::new();

        for parsed in &source.questions {
            let question = match parsed {
                Ok(question) => question,
                Err(_) => {
                    // 错误在加载时已经记录
                    stats.failed += 1;
                    continue;
                }
            };

            if let Some(correct) = &question.correct {
                answers.push((question.index, extract_answer(correct)));
            }

            if self.workspace.question_pair_exists(question.index).await {
                info!("[题目 {}] ⏭️ 已存在，跳过", question.index);
                stats.skipped += 1;
                continue;
            }

            match self.render_question(question, &converter).await {
                Ok(()) => {
                    info!("[题目 {}] ✅ 已生成 {}", question.index, question.counter);
                    stats.success += 1;
                }
                Err(e) => {
                    error!("[题目 {}] ❌ 生成失败: {}", question.index, e);
                    stats.failed += 1;
                }
            }
        }

        self.write_answer_key(&answers).await?;
        Ok(stats)
    }

    /// 生成一道题的 markdown 和图片，两者都成功后才写入
    async fn render_question(&self, question: &Question, converter: &MarkdownConverter) -> AppResult<()> {
        let document = QuestionDocument::build(question, converter, self.render_width)?;
        let png = self.rasterizer.rasterize(&document.html).await?;
        let png = crop_to_content(&png, self.crop_margin)?;

        // 先写图片；markdown 写入失败时删掉图片，不留下半对产物
        let image_path = self.workspace.question_image(question.index);
        write_file(&image_path, &png).await?;
        let markdown_path = self.workspace.question_markdown(question.index);
        if let Err(e) = write_file(&markdown_path, document.markdown.as_bytes()).await {
            if let Err(remove_err) = tokio::fs::remove_file(&image_path).await {
                warn!("⚠️  无法删除 {}: {}", image_path.display(), remove_err);
            }
            return Err(e);
        }
        Ok(())
    }

    /// answers.md 只写一次
    async fn write_answer_key(&self, answers: &[(usize, String)]) -> AppResult<()> {
        let path = self.workspace.answers();
        let lines = answer_key_lines(answers);
        if write_new(&path, lines.as_bytes()).await? {
            info!("🔑 标准答案已写入: {}", path.display());
        } else {
            warn!("⚠️  {} 已存在, 未覆盖", path.display());
        }
        Ok(())
    }
}
