//! 命令行参数

use std::path::PathBuf;

use clap::Parser;

use crate::error::{AppResult, ConfigError};
use crate::models::{ArtifactKind, PresentationMode};

/// 考试题目处理流水线：抓取题目 → 渲染 → 向模型提问 → 汇总
#[derive(Parser, Debug, Clone)]
#[command(name = "znob")]
#[command(about = "Exam question pipeline: normalize, render, query a model, summarize")]
#[command(version)]
pub struct Args {
    /// 数据集目录
    #[arg(short, long)]
    pub dataset: PathBuf,

    /// 题目来源（网址或本地 HTML / JSON 文件）
    #[arg(short, long)]
    pub url: Option<String>,

    /// 模型名称，例如 openai/gpt-4o
    #[arg(short, long)]
    pub model: Option<String>,

    /// 需要清空的产物，逗号分隔或 all
    #[arg(short, long, value_name = "KINDS")]
    pub reset: Option<String>,

    /// 只发送文本
    #[arg(long, conflicts_with_all = ["image_only", "image_when_necessary"])]
    pub text_only: bool,

    /// 只发送图片
    #[arg(long, conflicts_with = "image_when_necessary")]
    pub image_only: bool,

    /// 只在需要时附带图片
    #[arg(long)]
    pub image_when_necessary: bool,
}

/// 校验后的运行选项
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub dataset: PathBuf,
    pub source: Option<String>,
    pub model: Option<String>,
    pub reset: Vec<ArtifactKind>,
    pub mode: PresentationMode,
}

impl RunOptions {
    /// 至少要有一项工作：清空、准备或查询
    pub fn from_args(args: Args) -> AppResult<Self> {
        let reset = match &args.reset {
            Some(list) => ArtifactKind::parse_list(list)?,
            None => Vec::new(),
        };
        let mode =
            PresentationMode::from_flags(args.text_only, args.image_only, args.image_when_necessary)?;

        let model = args.model.filter(|m| !m.trim().is_empty());
        let source = args.url.filter(|u| !u.trim().is_empty());
        if model.is_none() && source.is_none() && reset.is_empty() {
            return Err(ConfigError::ModelRequired.into());
        }

        Ok(Self {
            dataset: args.dataset,
            source,
            model,
            reset,
            mode,
        })
    }
}
