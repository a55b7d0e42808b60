/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::config::Config;
use crate::services::LogCounts;

/// 记录程序启动信息
///
/// # 参数
/// - `command`: 当前执行的子命令
/// - `config`: 程序配置
pub fn log_startup(command: &str, config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 报告归档程序启动 - {}", command);
    info!(
        "🕐 启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📁 归档目录: {}", config.output_root.display());
    info!("📥 下载暂存目录: {}", config.staging_dir.display());
    info!("{}", "=".repeat(60));
}

/// 记录本次运行的目标
///
/// # 参数
/// - `keywords`: 关键词列表
/// - `year`: 目标年份
/// - `period`: 目标周期
pub fn log_run_target(keywords: &[String], year: Option<i32>, period: Option<&str>) {
    info!("🔑 关键词: {:?}", keywords);
    match (year, period) {
        (Some(y), Some(p)) => info!("🎯 目标: {} {}", y, p),
        (Some(y), None) => info!("🎯 目标: {} 年全部报告", y),
        _ => info!("🎯 目标: 不限年份"),
    }
}

/// 记录单个报告开始处理
///
/// # 参数
/// - `index`: 当前序号（1-based）
/// - `total`: 总数
/// - `title`: 报告标题
pub fn log_report_start(index: usize, total: usize, title: &str) {
    info!("\n{}", "─".repeat(60));
    info!("📦 处理报告 {}/{}: {}", index, total, truncate_text(title, 80));
}

/// 打印日志文件统计
///
/// # 参数
/// - `counts`: 各日志的条目数
pub fn print_log_counts(counts: &LogCounts) {
    info!("{}", "=".repeat(60));
    info!("📊 日志统计");
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}", counts.success);
    info!("❌ 失败: {}", counts.failed);
    info!("🚫 无关: {}", counts.irrelevant);
    info!("{}", "=".repeat(60));
}

/// 打印运行结束摘要
///
/// # 参数
/// - `summary`: 面向用户的摘要文本
pub fn print_final_summary(summary: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 运行结束");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    for line in summary.lines() {
        info!("{}", line);
    }
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
    fn test_truncate_text() {
        assert_eq!(truncate_text("abc", 5), "abc");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("达拉斯工业报告", 3), "达拉斯...");
    }
}
