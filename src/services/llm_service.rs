//! LLM 服务 - 业务能力层
//!
//! 只负责"向模型提问"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 默认端点为 OpenRouter，可替换为任何兼容 OpenAI API 的服务
//! - 图片以 `data:image/png;base64,...` 形式内联发送

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};

/// 模型调用能力
///
/// 模型名随每次调用传入，同一个客户端可以查询多个模型。
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// 发送提示词（可附带一张 PNG），返回模型原始回答
    async fn query(&self, prompt: &str, image: Option<&[u8]>, model: &str) -> AppResult<String>;
}

/// LLM 服务
///
/// 职责：
/// - 调用兼容 OpenAI 的 chat completions 接口
/// - 只处理单次提问
/// - 不认识题号和文件
pub struct LlmService {
    client: Client<OpenAIConfig>,
}

impl LlmService {
    /// 创建新的 LLM 服务，没有 API 密钥时返回配置错误
    pub fn new(config: &Config) -> AppResult<Self> {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.require_api_key()?)
            .with_api_base(&config.llm_api_base_url);

        Ok(Self {
            client: Client::with_config(openai_config),
        })
    }

    fn user_message(prompt: &str, image: Option<&[u8]>, model: &str) -> AppResult<ChatCompletionRequestMessage> {
        let args = match image {
            Some(png) => {
                let content_parts = vec![
                    ChatCompletionRequestUserMessageContentPart::Text(
                        ChatCompletionRequestMessageContentPartText {
                            text: prompt.to_string(),
                        },
                    ),
                    ChatCompletionRequestUserMessageContentPart::ImageUrl(
                        ChatCompletionRequestMessageContentPartImage {
                            image_url: ImageUrl {
                                url: png_data_url(png),
                                detail: Some(ImageDetail::Auto),
                            },
                        },
                    ),
                ];
                ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
                    .build()
            }
            None => ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build(),
        };
        let message = args.map_err(|e| AppError::llm_api_failed(model, e))?;
        Ok(ChatCompletionRequestMessage::User(message))
    }
}

#[async_trait]
impl ModelClient for LlmService {
    async fn query(&self, prompt: &str, image: Option<&[u8]>, model: &str) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", model);
        debug!("提示词长度: {} 字符", prompt.chars().count());
        if let Some(png) = image {
            debug!("附带图片: {} 字节", png.len());
        }

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(vec![Self::user_message(prompt, image, model)?])
            .build()
            .map_err(|e| AppError::llm_api_failed(model, e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::llm_api_failed(model, e)
        })?;

        debug!("LLM API 调用成功");

        // 回答原样保存，不做 trim
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                LlmError::EmptyContent {
                    model: model.to_string(),
                }
                .into()
            })
    }
}

/// 把 PNG 编码成 data URL
pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}
