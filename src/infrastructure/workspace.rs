//! 数据集目录 - 基础设施层
//!
//! 所有阶段之间只通过这个目录交换数据：
//!
//! ```text
//! {dataset}/
//!   questions/{i}.md, questions/{i}.png
//!   answers.md
//!   responses/{i}_{slug}.md
//!   combined_responses/{slug}.md
//!   summary/{slug}.md
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, FileError};
use crate::models::ArtifactKind;

/// 数据集目录
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn artifact_path(&self, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.name())
    }

    pub fn question_markdown(&self, index: usize) -> PathBuf {
        self.artifact_path(ArtifactKind::Questions)
            .join(format!("{}.md", index))
    }

    pub fn question_image(&self, index: usize) -> PathBuf {
        self.artifact_path(ArtifactKind::Questions)
            .join(format!("{}.png", index))
    }

    pub fn answers(&self) -> PathBuf {
        self.artifact_path(ArtifactKind::Answers)
    }

    pub fn response(&self, index: usize, model_slug: &str) -> PathBuf {
        self.artifact_path(ArtifactKind::Responses)
            .join(format!("{}_{}.md", index, model_slug))
    }

    pub fn combined_responses(&self, model_slug: &str) -> PathBuf {
        self.artifact_path(ArtifactKind::CombinedResponses)
            .join(format!("{}.md", model_slug))
    }

    pub fn summary(&self, model_slug: &str) -> PathBuf {
        self.artifact_path(ArtifactKind::Summary)
            .join(format!("{}.md", model_slug))
    }

    /// 创建所有产物目录
    pub async fn ensure_dirs(&self) -> AppResult<()> {
        for kind in ArtifactKind::ALL.into_iter().filter(|k| k.is_dir()) {
            create_dir(&self.artifact_path(kind)).await?;
        }
        Ok(())
    }

    /// 删除并重建指定类别的产物
    pub async fn reset(&self, kinds: &[ArtifactKind]) -> AppResult<()> {
        for &kind in kinds {
            let path = self.artifact_path(kind);
            let removed = if kind.is_dir() {
                tokio::fs::remove_dir_all(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };
            match removed {
                Ok(()) => info!("🗑️  已删除 {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("{} 不存在, 无需删除", path.display())
                }
                Err(source) => {
                    return Err(FileError::DeleteFailed {
                        path: path.display().to_string(),
                        source,
                    }
                    .into())
                }
            }
            if kind.is_dir() {
                create_dir(&path).await?;
            }
        }
        Ok(())
    }

    /// 题目 markdown 和图片是否都已存在
    pub async fn question_pair_exists(&self, index: usize) -> bool {
        file_exists(&self.question_markdown(index)).await
            && file_exists(&self.question_image(index)).await
    }

    /// 从 1 开始连续存在 markdown + 图片的题目数量，遇到第一个缺口即停止
    pub async fn contiguous_question_count(&self) -> usize {
        let mut count = 0;
        while self.question_pair_exists(count + 1).await {
            count += 1;
        }
        count
    }
}

pub async fn file_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

async fn create_dir(path: &Path) -> AppResult<()> {
    tokio::fs::create_dir_all(path).await.map_err(|source| {
        FileError::CreateDirFailed {
            path: path.display().to_string(),
            source,
        }
        .into()
    })
}

/// 只在文件不存在时写入，已存在的文件保持原样
///
/// 返回 false 表示文件已存在、未写入。
pub async fn write_new(path: &Path, contents: &[u8]) -> AppResult<bool> {
    let mut file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(AppError::file_write_failed(path, e)),
    };
    file.write_all(contents)
        .await
        .map_err(|e| AppError::file_write_failed(path, e))?;
    file.flush()
        .await
        .map_err(|e| AppError::file_write_failed(path, e))?;
    Ok(true)
}

/// 覆盖写入（合并结果和总结每次重新生成）
pub async fn write_file(path: &Path, contents: &[u8]) -> AppResult<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| AppError::file_write_failed(path, e))
}

pub async fn read_to_string(path: &Path) -> AppResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path, e))
}

pub async fn read_bytes(path: &Path) -> AppResult<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(path, e))
}
