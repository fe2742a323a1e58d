use crate::error::{AppResult, ConfigError};

/// 发送给模型的题目呈现方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentationMode {
    /// 文本 + 图片
    #[default]
    TextAndImage,
    /// 只发送 markdown 文本
    TextOnly,
    /// 只发送图片（附带固定说明）
    ImageOnly,
    /// 总是发送文本，只有文本无法完整表达时才附带图片
    ImageWhenNecessary,
}

impl PresentationMode {
    /// 由命令行开关得到呈现方式，最多只能打开一个
    pub fn from_flags(text_only: bool, image_only: bool, image_when_necessary: bool) -> AppResult<Self> {
        match (text_only, image_only, image_when_necessary) {
            (false, false, false) => Ok(PresentationMode::TextAndImage),
            (true, false, false) => Ok(PresentationMode::TextOnly),
            (false, true, false) => Ok(PresentationMode::ImageOnly),
            (false, false, true) => Ok(PresentationMode::ImageWhenNecessary),
            _ => Err(ConfigError::ConflictingModes.into()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PresentationMode::TextAndImage => "文本+图片",
            PresentationMode::TextOnly => "仅文本",
            PresentationMode::ImageOnly => "仅图片",
            PresentationMode::ImageWhenNecessary => "必要时附图",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(
            PresentationMode::from_flags(false, false, false).unwrap(),
            PresentationMode::TextAndImage
        );
        assert_eq!(
            PresentationMode::from_flags(false, false, true).unwrap(),
            PresentationMode::ImageWhenNecessary
        );
        assert!(PresentationMode::from_flags(true, true, false)
            .unwrap_err()
            .is_config());
    }
}
