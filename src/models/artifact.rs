use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, ConfigError};

/// 数据集目录下的产物类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// 题目 markdown 与图片
    Questions,
    /// 标准答案文件
    Answers,
    /// 单题模型回答
    Responses,
    /// 合并后的回答
    CombinedResponses,
    /// 模型总结
    Summary,
}

impl ArtifactKind {
    /// 所有类别
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Questions,
        ArtifactKind::Answers,
        ArtifactKind::Responses,
        ArtifactKind::CombinedResponses,
        ArtifactKind::Summary,
    ];

    /// 获取目录/文件名
    pub fn name(self) -> &'static str {
        match self {
            ArtifactKind::Questions => "questions",
            ArtifactKind::Answers => "answers.md",
            ArtifactKind::Responses => "responses",
            ArtifactKind::CombinedResponses => "combined_responses",
            ArtifactKind::Summary => "summary",
        }
    }

    /// 是否是目录（answers 是单个文件）
    pub fn is_dir(self) -> bool {
        !matches!(self, ArtifactKind::Answers)
    }

    /// 解析逗号分隔的类别列表，`all` 表示全部
    pub fn parse_list(input: &str) -> Result<Vec<ArtifactKind>, AppError> {
        let mut kinds = Vec::new();
        for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if part.eq_ignore_ascii_case("all") {
                return Ok(Self::ALL.to_vec());
            }
            let kind: ArtifactKind = part.parse()?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Ok(kinds)
    }
}

impl FromStr for ArtifactKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "questions" => Ok(ArtifactKind::Questions),
            "answers" | "answers.md" => Ok(ArtifactKind::Answers),
            "responses" => Ok(ArtifactKind::Responses),
            "combined_responses" | "combined" => Ok(ArtifactKind::CombinedResponses),
            "summary" => Ok(ArtifactKind::Summary),
            _ => Err(ConfigError::UnknownArtifact {
                name: s.to_string(),
            }
            .into()),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 把模型名转换成可以用作文件名的形式
pub fn model_slug(model: &str) -> String {
    model.replace(['/', ':'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_slug() {
        assert_eq!(model_slug("openai/gpt-4o"), "openai_gpt-4o");
        assert_eq!(
            model_slug("meta-llama/llama-3:free"),
            "meta-llama_llama-3_free"
        );
        assert_eq!(model_slug("modelx"), "modelx");
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            ArtifactKind::parse_list("responses, summary").unwrap(),
            vec![ArtifactKind::Responses, ArtifactKind::Summary]
        );
        assert_eq!(ArtifactKind::parse_list("all").unwrap().len(), 5);
        assert_eq!(
            ArtifactKind::parse_list("summary,all").unwrap(),
            ArtifactKind::ALL.to_vec()
        );
        assert!(ArtifactKind::parse_list("questions,bogus")
            .unwrap_err()
            .is_config());
    }
}
