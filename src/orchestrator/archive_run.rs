//! 单次归档运行 - 编排层
//!
//! ## 流程
//!
//! 1. 读取三份日志得到忽略集合，扫描已有文件
//! 2. 抓取报告列表（筛选、排序、分页）
//! 3. 去掉已处理的 URL，若没有新报告直接结束
//! 4. 一次性解析所有新标题
//! 5. 逐个下载归档，并把结果写入日志
//! 6. 汇总成一段面向用户的文字
//!
//! 任何未预料的错误都会被转换成 `FATAL` 文字返回，浏览器会话总是会被关闭。

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::browser::BrowserSession;
use crate::config::Config;
use crate::error::AppError;
use crate::models::{DownloadOutcome, Pacing, Period, SiteProfile};
pub use crate::models::ArchiveRequest;
use crate::services::{
    scan_existing_files, DownloadOrganizer, LogPaths, LogStore, PageCrawler, TitleInterpreter,
};
use crate::utils::logging::{log_report_start, log_run_target};
use crate::workflow::{ReportCtx, ReportFlow};

pub const NO_REPORTS_FOUND: &str = "No reports found on the website matching the criteria.";
pub const SETUP_FAILED: &str = "Error: Could not set up the reports page.";
pub const NOTHING_NEW: &str = "Process complete. No new reports to download.";

/// 运行所需的路径与站点配置
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub start_url: String,
    pub output_root: PathBuf,
    pub staging_dir: PathBuf,
    pub profile: SiteProfile,
    pub pacing: Pacing,
}

impl RunSettings {
    pub fn from_config(config: &Config, profile: SiteProfile) -> Self {
        Self {
            start_url: config.start_url.clone(),
            output_root: config.output_root.clone(),
            staging_dir: config.staging_dir.clone(),
            profile,
            pacing: Pacing::default(),
        }
    }
}

/// 本次运行的结果统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub downloaded: Vec<String>,
    pub partial: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl RunStats {
    fn record(&mut self, url: &str, outcome: DownloadOutcome) {
        match outcome {
            DownloadOutcome::Success { filename, .. } => self.downloaded.push(filename),
            DownloadOutcome::PartialSuccess {
                original_filename, ..
            } => self.partial.push(original_filename),
            DownloadOutcome::Error { reason } => self.failed.push((url.to_string(), reason)),
        }
    }

    /// 每个非空结果各一句，全部为空时返回"没有新报告"
    pub fn summary(&self, output_root: &Path) -> String {
        let mut parts = Vec::new();
        if !self.downloaded.is_empty() {
            parts.push(format!(
                "Successfully downloaded and organized {} new reports.",
                self.downloaded.len()
            ));
        }
        if !self.partial.is_empty() {
            parts.push(format!(
                "{} reports were downloaded but could not be organized. They have been moved to the '{}' folder for your manual review.",
                self.partial.len(),
                output_root.join("failed_downloads").display()
            ));
        }
        if !self.failed.is_empty() {
            parts.push(format!(
                "Failed to download {} reports entirely.",
                self.failed.len()
            ));
        }

        if parts.is_empty() {
            NOTHING_NEW.to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// 执行一次完整的归档运行
///
/// 总是返回一段文字；结束时关闭会话。
pub async fn run_archive<S, T>(
    session: &mut S,
    interpreter: &T,
    settings: &RunSettings,
    request: &ArchiveRequest,
) -> String
where
    S: BrowserSession + ?Sized,
    T: TitleInterpreter + ?Sized,
{
    let result = archive(session, interpreter, settings, request).await;

    if let Err(e) = session.close().await {
        warn!("⚠️ 关闭浏览器会话失败: {}", e);
    }

    match result {
        Ok(summary) => summary,
        Err(e) => {
            let message = fatal_message(&e);
            error!("{}", message);
            message
        }
    }
}

/// 把未预料的错误转换为诊断文字
pub fn fatal_message(e: &anyhow::Error) -> String {
    format!(
        "FATAL: An unexpected error occurred during the archive run.\nError: {}\n\nFull trace:\n{:?}",
        e, e
    )
}

async fn archive<S, T>(
    session: &mut S,
    interpreter: &T,
    settings: &RunSettings,
    request: &ArchiveRequest,
) -> Result<String>
where
    S: BrowserSession + ?Sized,
    T: TitleInterpreter + ?Sized,
{
    std::fs::create_dir_all(&settings.output_root).with_context(|| {
        format!("无法创建归档目录 {}", settings.output_root.display())
    })?;

    // ========== 1. 读取状态 ==========
    let logs = LogStore::new(LogPaths::under(&settings.output_root));
    let counts = logs.counts();
    let ignore = logs.ignore_set();
    info!(
        "🧠 日志中已有 {} 个成功、{} 个失败、{} 个无关报告，将全部跳过",
        counts.success, counts.failed, counts.irrelevant
    );

    let mut existing: BTreeSet<String> =
        scan_existing_files(&settings.output_root).context("扫描已有报告失败")?;

    log_run_target(
        &request.keywords,
        request.year,
        request.period.map(Period::name),
    );

    // ========== 2. 抓取 ==========
    let crawler = PageCrawler::new(&settings.profile, &settings.pacing);
    let crawl = match crawler
        .crawl(session, &settings.start_url, &request.scrape_config())
        .await
    {
        Ok(crawl) => crawl,
        Err(AppError::Crawl(e)) => {
            warn!("❌ 页面准备失败: {}", e);
            return Ok(SETUP_FAILED.to_string());
        }
        Err(e) => return Err(e).context("抓取报告列表失败"),
    };
    info!("抓取结束: {:?}", crawl.stop);

    if crawl.reports.is_empty() {
        return Ok(NO_REPORTS_FOUND.to_string());
    }

    // ========== 3. 去重 ==========
    let new_reports: Vec<_> = crawl
        .reports
        .into_iter()
        .filter(|r| !ignore.contains(&r.url))
        .collect();

    if new_reports.is_empty() {
        return Ok(NOTHING_NEW.to_string());
    }
    info!("\n--- 找到 {} 个新报告待处理 ---", new_reports.len());

    // ========== 4. 解析标题 ==========
    let titles: Vec<String> = new_reports.iter().map(|r| r.raw_title.clone()).collect();
    let parsed_reports = match interpreter.interpret(&titles).await {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("❌ 标题解析失败，本次不下载任何报告: {}", e);
            Vec::new()
        }
    };

    // 同名标题各自对应自己的 URL
    let mut url_queue: HashMap<String, VecDeque<String>> = HashMap::new();
    for report in &new_reports {
        url_queue
            .entry(report.raw_title.clone())
            .or_default()
            .push_back(report.url.clone());
    }

    // ========== 5. 下载归档 ==========
    let organizer = DownloadOrganizer::new(
        &settings.staging_dir,
        &settings.output_root,
        &settings.profile,
        &settings.pacing,
    );
    let flow = ReportFlow::new(organizer, &logs);
    let mut stats = RunStats::default();
    let total = parsed_reports.len();

    for (idx, parsed) in parsed_reports.iter().enumerate() {
        let Some(url) = url_queue
            .get_mut(&parsed.original_title)
            .and_then(|q| q.pop_front())
        else {
            warn!("⚠️ 解析结果中的标题无法对应到链接，跳过: {}", parsed.original_title);
            continue;
        };

        if let (Some(requested), Some(found)) = (request.period, Period::from_token(&parsed.period)) {
            if !requested.is_satisfied_by(found) {
                debug!("周期 {} 不符合请求的 {}，跳过: {}", found, requested, parsed.original_title);
                continue;
            }
        }

        log_report_start(idx + 1, total, &parsed.original_title);
        let ctx = ReportCtx::new(idx + 1, total, url);
        let outcome = flow
            .run(session, parsed, &ctx, &existing)
            .await
            .with_context(|| format!("写入日志失败 ({})", ctx.url))?;

        if let DownloadOutcome::Success { filename, .. } = &outcome {
            existing.insert(filename.clone());
        }
        stats.record(&ctx.url, outcome);
    }

    // ========== 6. 汇总 ==========
    Ok(stats.summary(&settings.output_root))
}
