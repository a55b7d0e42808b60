//! 报告处理流程 - 流程层
//!
//! 核心职责：定义"一个报告"的完整处理流程
//!
//! 流程顺序：
//! 1. 下载 → 归档
//! 2. 按结果写入对应日志（成功 / 失败 / 部分成功）

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::browser::BrowserSession;
use crate::error::AppResult;
use crate::models::{DownloadOutcome, ParsedReport};
use crate::services::{DownloadOrganizer, LogStore, PARTIAL_SUCCESS_REASON};
use crate::workflow::report_ctx::ReportCtx;

/// 报告处理流程
///
/// - 编排下载与日志记录
/// - 不持有浏览器会话，只在调用时借用
/// - 只依赖业务能力（services）
pub struct ReportFlow<'a> {
    organizer: DownloadOrganizer<'a>,
    logs: &'a LogStore,
}

impl<'a> ReportFlow<'a> {
    /// 创建新的报告处理流程
    pub fn new(organizer: DownloadOrganizer<'a>, logs: &'a LogStore) -> Self {
        Self { organizer, logs }
    }

    /// 处理单个报告，并把结果写入日志
    ///
    /// 下载失败不会返回 `Err`；`Err` 只表示日志文件无法写入。
    pub async fn run<S: BrowserSession + ?Sized>(
        &self,
        session: &mut S,
        parsed: &ParsedReport,
        ctx: &ReportCtx,
        existing: &BTreeSet<String>,
    ) -> AppResult<DownloadOutcome> {
        info!("{} ⬇️ 开始下载: {}", ctx, parsed.original_title);

        let outcome = self
            .organizer
            .download_and_organize(session, &ctx.url, parsed, existing)
            .await;

        match &outcome {
            DownloadOutcome::Success { filename, .. } => {
                self.logs.record_success(&ctx.url, filename)?;
                info!("{} ✅ 已归档: {}", ctx, filename);
            }
            DownloadOutcome::PartialSuccess {
                original_filename, ..
            } => {
                self.logs.record_failure(&ctx.url, PARTIAL_SUCCESS_REASON)?;
                warn!(
                    "{} ⚠️ 已下载但无法归档，需人工复核: {}",
                    ctx, original_filename
                );
            }
            DownloadOutcome::Error { reason } => {
                self.logs.record_failure(&ctx.url, reason)?;
                warn!("{} ❌ 下载失败: {}", ctx, reason);
            }
        }

        Ok(outcome)
    }
}
