//! 报告处理上下文
//!
//! 封装"我正在处理第几个报告、它来自哪个 URL"这一信息

use std::fmt::Display;

/// 报告处理上下文
#[derive(Debug, Clone)]
pub struct ReportCtx {
    /// 报告在本次运行中的序号（从1开始，仅用于日志显示）
    pub index: usize,

    /// 本次运行待处理的报告总数
    pub total: usize,

    /// 报告详情页 URL（日志的键）
    pub url: String,
}

impl ReportCtx {
    /// 创建新的报告上下文
    pub fn new(index: usize, total: usize, url: impl Into<String>) -> Self {
        Self {
            index,
            total,
            url: url.into(),
        }
    }
}

impl Display for ReportCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[报告 {}/{}]", self.index, self.total)
    }
}
