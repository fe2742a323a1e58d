//! 远程内容获取
//!
//! 只负责把 URL 变成文本，传输失败与内容解析失败区分开

use async_trait::async_trait;
use tracing::debug;

use crate::error::{AppResult, SourceError};

/// 远程内容获取能力
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> AppResult<String>;
}

/// 基于 reqwest 的获取实现
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> AppResult<String> {
        debug!("正在下载数据源: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| SourceError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.text().await.map_err(|source| SourceError::Fetch {
            url: url.to_string(),
            source,
        })?;
        debug!("下载完成: {} 字节", body.len());
        Ok(body)
    }
}

/// 是否是网络地址
pub fn is_remote(identifier: &str) -> bool {
    identifier.starts_with("http://") || identifier.starts_with("https://")
}
