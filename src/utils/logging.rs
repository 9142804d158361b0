/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化日志订阅器
///
/// 默认级别 info，可通过 RUST_LOG 覆盖
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// 记录服务启动信息
pub fn log_startup(config: &Config) {
    tracing::info!("{}", "=".repeat(60));
    tracing::info!("🚀 服务启动 - 自动答题链求解模式");
    tracing::info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    tracing::info!("📊 监听端口: {}", config.listen_port);
    tracing::info!("⏱️ 会话预算: {} 秒 / 单题窗口: {} 秒", config.session_budget_secs, config.window_secs);
    tracing::info!(
        "🖥️ 页面渲染: {}",
        if config.render_enabled { "无头浏览器" } else { "直接抓取" }
    );
    tracing::info!("{}", "=".repeat(60));
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
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdefghij", 5), "abcde...");
    }
}
