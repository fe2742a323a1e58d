//! 模型回答存储 - 基础设施层
//!
//! 回答文件存在即表示该题已回答，写入后不再覆盖。

use async_trait::async_trait;

use crate::error::{AppResult, FileError};
use crate::infrastructure::workspace::{self, Workspace};

/// 按 (题号, 模型) 存取模型回答
#[async_trait]
pub trait ResponseStore: Send + Sync {
    async fn exists(&self, index: usize, model_slug: &str) -> bool;

    /// 写入回答，已存在时返回错误
    async fn write(&self, index: usize, model_slug: &str, response: &str) -> AppResult<()>;

    async fn read(&self, index: usize, model_slug: &str) -> AppResult<String>;
}

/// 文件系统实现：`responses/{index}_{slug}.md`
#[derive(Debug, Clone)]
pub struct FsResponseStore {
    workspace: Workspace,
}

impl FsResponseStore {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl ResponseStore for FsResponseStore {
    async fn exists(&self, index: usize, model_slug: &str) -> bool {
        workspace::file_exists(&self.workspace.response(index, model_slug)).await
    }

    async fn write(&self, index: usize, model_slug: &str, response: &str) -> AppResult<()> {
        let path = self.workspace.response(index, model_slug);
        if workspace::write_new(&path, response.as_bytes()).await? {
            Ok(())
        } else {
            Err(FileError::WriteFailed {
                path: path.display().to_string(),
                source: std::io::Error::from(std::io::ErrorKind::AlreadyExists),
            }
            .into())
        }
    }

    async fn read(&self, index: usize, model_slug: &str) -> AppResult<String> {
        workspace::read_to_string(&self.workspace.response(index, model_slug)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_response_is_create_once() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        ws.ensure_dirs().await.unwrap();
        let store = FsResponseStore::new(ws);

        assert!(!store.exists(1, "m").await);
        store.write(1, "m", "  Відповідь: А\n").await.unwrap();
        assert!(store.exists(1, "m").await);
        assert!(store.write(1, "m", "інше").await.is_err());

        // 原样保存，不做 trim
        assert_eq!(store.read(1, "m").await.unwrap(), "  Відповідь: А\n");
    }
}
