use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, AppResult, ConfigError};

/// 默认配置文件名
const DEFAULT_CONFIG_FILE: &str = "znob.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 同时查询的题目数量上限
    pub max_concurrent_queries: usize,
    /// 渲染题目图片的像素宽度
    pub render_width: u32,
    /// 裁剪时在内容右侧和下方保留的像素
    pub crop_margin: u32,
    /// 浏览器可执行文件（为空时自动查找）
    pub browser_executable: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: Option<String>,
    pub llm_api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_queries: default_concurrency(),
            render_width: 512,
            crop_margin: 8,
            browser_executable: None,
            verbose_logging: false,
            llm_api_key: None,
            llm_api_base_url: "https://openrouter.ai/api/v1".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：默认值 → TOML 配置文件 → 环境变量
    pub fn load() -> AppResult<Self> {
        let base = match config_file_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        base.with_env()
    }

    /// 从 TOML 文件读取配置，缺失的字段使用默认值
    pub fn from_file(path: &Path) -> AppResult<Self> {
        debug!("读取配置文件: {}", path.display());
        let content =
            std::fs::read_to_string(path).map_err(|e| AppError::file_read_failed(path, e))?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    fn from_toml_str(content: &str, origin: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|source| {
            ConfigError::TomlParseFailed {
                path: origin.to_string(),
                source,
            }
            .into()
        })
    }

    /// 用环境变量覆盖配置
    pub fn with_env(mut self) -> AppResult<Self> {
        if let Some(v) = parse_env::<usize>("MAX_CONCURRENT_QUERIES")? {
            self.max_concurrent_queries = v.max(1);
        }
        if let Some(v) = parse_env::<u32>("RENDER_WIDTH")? {
            self.render_width = v;
        }
        if let Some(v) = parse_env::<u32>("CROP_MARGIN")? {
            self.crop_margin = v;
        }
        if let Some(v) = parse_env::<bool>("VERBOSE_LOGGING")? {
            self.verbose_logging = v;
        }
        if let Ok(v) = std::env::var("BROWSER_EXECUTABLE") {
            self.browser_executable = Some(v);
        }
        if let Ok(v) = std::env::var("OPENROUTER_API_KEY") {
            self.llm_api_key = Some(v);
        }
        if let Ok(v) = std::env::var("LLM_API_BASE_URL") {
            self.llm_api_base_url = v;
        }
        Ok(self)
    }

    /// 查询模型前必须有 API 密钥
    pub fn require_api_key(&self) -> AppResult<&str> {
        self.llm_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::EnvVarNotFound {
                    var_name: "OPENROUTER_API_KEY".to_string(),
                }
                .into()
            })
    }
}

fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("ZNOB_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    local.exists().then_some(local)
}

fn parse_env<T: std::str::FromStr>(var_name: &str) -> AppResult<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse::<T>().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            }
            .into()
        }),
        Err(_) => Ok(None),
    }
}

/// 与线程池默认大小一致：min(32, CPU 数 + 4)
fn default_concurrency() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cpus + 4).min(32)
}
