/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则根据 `verbose` 选择 debug / info 级别
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `dataset`: 数据集目录
/// - `max_concurrent`: 最大并发数
pub fn log_startup(dataset: &str, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 数据集: {}", dataset);
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录待查询题目信息
pub fn log_questions_discovered(total: usize, pending: usize, model: &str) {
    info!("✓ 找到 {} 道题目 (模型: {})", total, model);
    info!("📋 已有回答 {} 道，待查询 {} 道", total - pending, pending);
}

/// 打印阶段统计信息
///
/// # 参数
/// - `stage`: 阶段名称
/// - `success`: 成功数量
/// - `skipped`: 跳过数量
/// - `failed`: 失败数量
pub fn print_final_stats(stage: &str, success: usize, skipped: usize, failed: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 {} 完成统计", stage);
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}", success);
    info!("⏭️ 跳过: {}", skipped);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("Завдання", 3), "Зав...");
        assert_eq!(truncate_text("ok", 3), "ok");
    }
}
