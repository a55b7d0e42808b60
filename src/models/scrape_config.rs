use std::time::Duration;

use super::period::Period;

/// 一次抓取的参数
#[derive(Debug, Clone, Default)]
pub struct ScrapeConfig {
    /// 依次应用的筛选项（面板标题, 选项值）
    pub filters: Vec<(String, String)>,
    /// 排序方式（例如 "Most Recent"）
    pub sort_by: Option<String>,
    /// 链接文字必须全部包含的关键词（不区分大小写）
    pub keywords: Vec<String>,
    /// 是否在遇到比目标更早的报告时提前停止
    pub enable_early_stopping: bool,
    pub target_year: Option<i32>,
    pub target_period: Option<Period>,
}

/// 等待与轮询节奏
#[derive(Debug, Clone)]
pub struct Pacing {
    pub consent_wait: Duration,
    pub tab_wait: Duration,
    pub frame_wait: Duration,
    pub filter_wait: Duration,
    pub sort_wait: Duration,
    pub results_wait: Duration,
    pub download_control_wait: Duration,
    /// 下载轮询次数
    pub download_ticks: u32,
    /// 下载轮询间隔
    pub download_tick: Duration,
    /// 点击 cookie 按钮、排序下拉后的等待
    pub settle_short: Duration,
    /// 切换标签页后的等待
    pub settle_medium: Duration,
    /// 进入 iframe、筛选、排序、翻页后的等待
    pub settle_long: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            consent_wait: Duration::from_secs(5),
            tab_wait: Duration::from_secs(10),
            frame_wait: Duration::from_secs(15),
            filter_wait: Duration::from_secs(10),
            sort_wait: Duration::from_secs(5),
            results_wait: Duration::from_secs(15),
            download_control_wait: Duration::from_secs(20),
            download_ticks: 30,
            download_tick: Duration::from_secs(1),
            settle_short: Duration::from_secs(1),
            settle_medium: Duration::from_secs(2),
            settle_long: Duration::from_secs(3),
        }
    }
}

impl Pacing {
    /// 所有等待为零，轮询次数保留（用于测试和模拟会话）
    pub fn immediate() -> Self {
        Self {
            consent_wait: Duration::ZERO,
            tab_wait: Duration::ZERO,
            frame_wait: Duration::ZERO,
            filter_wait: Duration::ZERO,
            sort_wait: Duration::ZERO,
            results_wait: Duration::ZERO,
            download_control_wait: Duration::ZERO,
            download_ticks: 3,
            download_tick: Duration::ZERO,
            settle_short: Duration::ZERO,
            settle_medium: Duration::ZERO,
            settle_long: Duration::ZERO,
        }
    }
}
