use std::path::Path;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 数据源错误
    #[error("数据源错误: {0}")]
    Source(#[from] SourceError),
    /// 渲染错误
    #[error("渲染错误: {0}")]
    Render(#[from] RenderError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 后台任务异常退出
    #[error("任务执行失败: {0}")]
    Task(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 需要查询但没有指定模型
    #[error("必须指定模型 (--model)")]
    ModelRequired,
    /// 未知的产物类别
    #[error("未知的产物类别: {name}")]
    UnknownArtifact { name: String },
    /// 同时指定了多个呈现模式
    #[error("呈现模式参数互相冲突")]
    ConflictingModes,
}

/// 数据源错误
#[derive(Debug, Error)]
pub enum SourceError {
    /// 网络请求失败
    #[error("无法获取数据源 {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务器返回非成功状态码
    #[error("数据源 {url} 返回状态码 {status}")]
    BadStatus { url: String, status: u16 },
    /// 整个文档无法解析
    #[error("数据源解析失败: {reason}")]
    Parse { reason: String },
    /// 题目缺少必填字段
    #[error("题目 {index} 缺少字段 {field}")]
    MissingField { index: usize, field: String },
    /// 题目记录格式错误
    #[error("题目 {index} 格式错误: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// 渲染错误
#[derive(Debug, Error)]
pub enum RenderError {
    /// 浏览器相关错误
    #[error("浏览器错误: {source}")]
    Browser {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 图片解码/编码失败
    #[error("图片处理失败: {source}")]
    Image {
        #[from]
        source: image::ImageError,
    },
    /// 正则表达式无效
    #[error("正则表达式错误: {0}")]
    Pattern(#[from] regex::Error),
    /// 部分题目未能生成
    #[error("{failed}/{total} 道题目未能生成")]
    Incomplete { failed: usize, total: usize },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: async_openai::error::OpenAIError,
    },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 批量查询中有题目失败
    #[error("{failed}/{total} 道题目查询失败, 首个错误: {first}")]
    BatchFailed {
        failed: usize,
        total: usize,
        first: Box<AppError>,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 删除失败
    #[error("删除失败 ({path}): {source}")]
    DeleteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 创建目录失败
    #[error("创建目录失败 ({path}): {source}")]
    CreateDirFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Render(RenderError::Browser {
            source: Box::new(err),
        })
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Render(RenderError::Image { source: err })
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::Render(RenderError::Pattern(err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: &Path, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.display().to_string(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: &Path, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.display().to_string(),
            source,
        })
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: async_openai::error::OpenAIError,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source,
        })
    }

    /// 创建解析错误
    pub fn parse_failed(reason: impl Into<String>) -> Self {
        AppError::Source(SourceError::Parse {
            reason: reason.into(),
        })
    }

    /// 是否为配置错误（不可重试）
    pub fn is_config(&self) -> bool {
        matches!(self, AppError::Config(_))
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
