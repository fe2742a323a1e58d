//! # znob
//!
//! 考试题目处理流水线：把抓取的 HTML 页面或 JSON 导出转换成逐题的
//! markdown + 图片，交给模型回答，再把回答汇总成一份记录和总结。
//!
//! ## 架构设计
//!
//! 各阶段之间只通过数据集目录交换数据。
//!
//! ### ① 数据层（Models / Sources / Render）
//! - `models/` - 规范化的题目、产物类别、呈现方式
//! - `sources/` - HTML / JSON 数据源 → `Question`
//! - `render/` - `Question` → markdown、截图用 HTML、裁剪
//!
//! ### ② 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源，只暴露能力
//! - `PageRenderer` - 唯一的 page owner，提供 HTML → PNG
//! - `Workspace` / `FsResponseStore` - 数据集目录
//!
//! ### ③ 业务能力层（Services）
//! - `LlmService` - 向模型提问
//! - `answer_key` - 标准答案提取
//!
//! ### ④ 流程层（Workflow）
//! - `QuestionCtx` - 上下文封装（题号 + 模型）
//! - `QuestionFlow` - 单题查询流程（读取 → 提问 → 保存）
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/prepare_processor` - 逐题生成产物
//! - `orchestrator/query_processor` - 并发查询
//! - `orchestrator/summary_processor` - 合并与总结

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod render;
pub mod services;
pub mod sources;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{FsResponseStore, PageRenderer, Rasterizer, ResponseStore, Workspace};
pub use models::{model_slug, ArtifactKind, Correct, PresentationMode, Question};
pub use orchestrator::App;
pub use services::{LlmService, ModelClient};
pub use workflow::{ProcessResult, QuestionCtx, QuestionFlow};
