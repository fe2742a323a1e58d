//! 批量查询 - 编排层
//!
//! ## 职责
//!
//! 1. **发现题目**：从 1 开始连续存在的题目
//! 2. **跳过已回答**：回答文件存在即视为已完成
//! 3. **并发控制**：Semaphore 限制同时进行的查询
//! 4. **汇总结果**：所有任务结束后才报告失败，不取消、不重试
//! 5. **读回回答**：按题号顺序返回

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::error::{AppError, AppResult, LlmError};
use crate::infrastructure::{ResponseStore, Workspace};
use crate::models::model_slug;
use crate::utils::logging::{log_questions_discovered, print_final_stats};
use crate::workflow::{ProcessResult, QuestionCtx, QuestionFlow};

/// 批量查询结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    skipped: usize,
    failed: usize,
    first_error: Option<AppError>,
}

pub struct QueryProcessor {
    flow: Arc<QuestionFlow>,
    store: Arc<dyn ResponseStore>,
    workspace: Workspace,
    max_concurrent: usize,
}

impl QueryProcessor {
    pub fn new(
        flow: Arc<QuestionFlow>,
        store: Arc<dyn ResponseStore>,
        workspace: Workspace,
        max_concurrent: usize,
    ) -> Self {
        Self {
            flow,
            store,
            workspace,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// 回答所有题目，返回按题号排列的回答
    pub async fn run(&self, model: &str) -> AppResult<Vec<String>> {
        let slug = model_slug(model);
        let total = self.workspace.contiguous_question_count().await;

        let mut pending = Vec::new();
        for index in 1..=total {
            if !self.store.exists(index, &slug).await {
                pending.push(index);
            }
        }
        log_questions_discovered(total, pending.len(), model);

        let result = self.process_batch(&pending, model).await?;
        print_final_stats(
            "模型查询",
            result.success,
            total - pending.len() + result.skipped,
            result.failed,
        );

        if let Some(first) = result.first_error {
            return Err(LlmError::BatchFailed {
                failed: result.failed,
                total: pending.len(),
                first: Box::new(first),
            }
            .into());
        }

        let mut responses = Vec::with_capacity(total);
        for index in 1..=total {
            responses.push(self.store.read(index, &slug).await?);
        }
        Ok(responses)
    }

    /// 并发处理待查询的题目，等待全部结束
    async fn process_batch(&self, pending: &[usize], model: &str) -> AppResult<BatchResult> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles = Vec::new();

        for &index in pending {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| AppError::Task(e.to_string()))?;
            let flow = Arc::clone(&self.flow);
            let ctx = QuestionCtx::new(index, model);

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let result = flow.run(&ctx).await;
                if let Err(e) = &result {
                    error!("{} ❌ 查询失败: {}", ctx, e);
                }
                result
            });
            handles.push((index, handle));
        }

        let mut result = BatchResult::default();
        for (index, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("[题目 #{}] 任务执行失败: {}", index, e);
                    Err(AppError::Task(e.to_string()))
                }
            };
            match outcome {
                Ok(ProcessResult::Success) => result.success += 1,
                Ok(ProcessResult::Skipped) => result.skipped += 1,
                Err(e) => {
                    result.failed += 1;
                    result.first_error.get_or_insert(e);
                }
            }
        }

        info!("✓ 查询结束: 成功 {}/{}", result.success, pending.len());
        Ok(result)
    }
}
