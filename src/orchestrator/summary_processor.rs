//! 汇总 - 编排层
//!
//! 把所有回答按题号拼成一份记录，再请模型生成总结。

use tracing::info;

use crate::error::AppResult;
use crate::infrastructure::workspace::write_file;
use crate::infrastructure::Workspace;
use crate::models::model_slug;
use crate::services::ModelClient;

/// 总结提示词前缀
const SUMMARY_INSTRUCTION: &str = "Підсумуй відповіді у форматі:\n\nномер питання) відповідь або номер питання) 1. відповідь, 2. відповідь, 3. відповідь, ...\n\n";

/// 按顺序拼接回答：`## Завдання {j}\n\n{回答}\n\n`
pub fn build_transcript(responses: &[String]) -> String {
    responses
        .iter()
        .enumerate()
        .map(|(i, response)| format!("## Завдання {}\n\n{}\n\n", i + 1, response))
        .collect()
}

pub fn summary_prompt(transcript: &str) -> String {
    format!("{}{}", SUMMARY_INSTRUCTION, transcript)
}

/// 写入合并记录并生成总结
///
/// 没有任何回答时不调用模型，返回 None。
pub async fn summarize(
    client: &dyn ModelClient,
    workspace: &Workspace,
    model: &str,
    responses: &[String],
) -> AppResult<Option<String>> {
    let slug = model_slug(model);
    let transcript = build_transcript(responses);

    let combined_path = workspace.combined_responses(&slug);
    write_file(&combined_path, transcript.as_bytes()).await?;
    info!("📝 合并记录已写入: {}", combined_path.display());

    if responses.is_empty() {
        info!("没有任何回答，跳过总结");
        return Ok(None);
    }

    info!("🤖 正在生成总结 (模型: {})", model);
    let summary = client.query(&summary_prompt(&transcript), None, model).await?;

    let summary_path = workspace.summary(&slug);
    write_file(&summary_path, summary.as_bytes()).await?;
    info!("✅ 总结已写入: {}", summary_path.display());

    Ok(Some(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_sections() {
        let transcript = build_transcript(&["А".to_string(), "Б\n".to_string()]);
        assert_eq!(transcript, "## Завдання 1\n\nА\n\n## Завдання 2\n\nБ\n\n\n");
        assert_eq!(build_transcript(&[]), "");
    }

    #[test]
    fn test_summary_prompt_wraps_transcript() {
        let prompt = summary_prompt("## Завдання 1\n\nА\n\n");
        assert!(prompt.starts_with("Підсумуй відповіді у форматі:\n\n"));
        assert!(prompt.ends_with("3. відповідь, ...\n\n## Завдання 1\n\nА\n\n"));
    }
}
