//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 按命令行选项调度各个阶段
//! - 持有模型客户端，准备阶段期间持有浏览器
//!
//! ### `prepare_processor` - 题目准备
//! - 加载数据源，逐题渲染 markdown + PNG
//! - 写 answers.md
//!
//! ### `query_processor` - 批量查询
//! - 控制并发数量（Semaphore）
//! - 等待所有任务结束后汇报失败
//!
//! ### `summary_processor` - 汇总
//! - 合并回答，生成总结
//!
//! ## 层次关系
//!
//! ```text
//! app
//!     ↓
//! prepare_processor / query_processor / summary_processor
//!     ↓
//! workflow::QuestionFlow (处理单个题目)
//!     ↓
//! services (能力层：llm / answer_key)
//!     ↓
//! infrastructure (基础设施：PageRenderer / Workspace / ResponseStore)
//! ```

pub mod app;
pub mod prepare_processor;
pub mod query_processor;
pub mod summary_processor;

// 重新导出主要类型
pub use app::App;
pub use prepare_processor::{PrepareProcessor, PrepareStats};
pub use query_processor::QueryProcessor;
pub use summary_processor::{build_transcript, summarize, summary_prompt};
