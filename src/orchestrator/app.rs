//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：校验配置、创建模型客户端
//! 2. **阶段调度**：清空 → 准备（--url）→ 查询 + 汇总（--model）
//! 3. **资源管理**：只在准备阶段启动浏览器
//! 4. **失败汇报**：准备阶段的单题失败不阻止后续阶段，最后统一返回错误

use std::sync::Arc;

use tracing::{info, warn};

use crate::browser;
use crate::cli::RunOptions;
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{FsResponseStore, PageRenderer, ResponseStore, Workspace};
use crate::orchestrator::prepare_processor::{PrepareProcessor, PrepareStats};
use crate::orchestrator::query_processor::QueryProcessor;
use crate::orchestrator::summary_processor::summarize;
use crate::services::{LlmService, ModelClient};
use crate::sources::HttpFetcher;
use crate::utils::logging::log_startup;
use crate::workflow::QuestionFlow;

/// 应用主结构
pub struct App {
    config: Config,
    options: RunOptions,
    workspace: Workspace,
    model_client: Option<Arc<dyn ModelClient>>,
}

impl App {
    /// 初始化应用，需要查询时在任何工作开始前检查 API 密钥
    pub fn initialize(config: Config, options: RunOptions) -> AppResult<Self> {
        let model_client: Option<Arc<dyn ModelClient>> = match options.model {
            Some(_) => Some(Arc::new(LlmService::new(&config)?)),
            None => None,
        };
        Ok(Self::with_model_client(config, options, model_client))
    }

    /// 使用指定的模型客户端
    pub fn with_model_client(
        config: Config,
        options: RunOptions,
        model_client: Option<Arc<dyn ModelClient>>,
    ) -> Self {
        let workspace = Workspace::new(&options.dataset);
        Self {
            config,
            options,
            workspace,
            model_client,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> AppResult<()> {
        log_startup(
            &self.workspace.root().display().to_string(),
            self.config.max_concurrent_queries,
        );
        self.workspace.ensure_dirs().await?;

        if !self.options.reset.is_empty() {
            info!("🗑️  清空产物: {:?}", self.options.reset);
            self.workspace.reset(&self.options.reset).await?;
        }

        let prepared = match &self.options.source {
            Some(source) => Some(self.prepare(source).await?),
            None => None,
        };

        self.query_and_summarize().await?;

        match prepared {
            Some(stats) => stats.ensure_complete(),
            None => Ok(()),
        }
    }

    /// 准备阶段：启动浏览器，生成题目产物
    async fn prepare(&self, source: &str) -> AppResult<PrepareStats> {
        let (_browser, page) = browser::launch_headless_browser(&self.config).await?;
        let renderer = PageRenderer::new(page, self.config.render_width);

        PrepareProcessor::new(&self.workspace, &renderer, &self.config)
            .run(source, &HttpFetcher::new())
            .await
    }

    /// 查询 + 汇总阶段，没有指定模型时跳过
    pub async fn query_and_summarize(&self) -> AppResult<Option<String>> {
        let (Some(model), Some(client)) = (&self.options.model, &self.model_client) else {
            if self.options.model.is_some() {
                warn!("⚠️ 未配置模型客户端，跳过查询");
            }
            return Ok(None);
        };
        info!("🧠 使用模型 {} ({})", model, self.options.mode.name());

        let store: Arc<dyn ResponseStore> = Arc::new(FsResponseStore::new(self.workspace.clone()));
        let flow = QuestionFlow::new(
            Arc::clone(client),
            Arc::clone(&store),
            self.workspace.clone(),
            self.options.mode,
            self.config.verbose_logging,
        )?;

        let responses = QueryProcessor::new(
            Arc::new(flow),
            store,
            self.workspace.clone(),
            self.config.max_concurrent_queries,
        )
        .run(model)
        .await?;

        summarize(client.as_ref(), &self.workspace, model, &responses).await
    }
}
