//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! - 加载站点配置
//! - 按命令创建浏览器会话和 LLM 客户端
//! - 把命令委托给 `archive_run` 或日志 / 扫描服务

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::browser::BrowserSession;
use crate::config::Config;
use crate::infrastructure::ChromeSession;
use crate::models::{load_site_profile_or_default, SiteProfile};
use crate::orchestrator::archive_run::{run_archive, ArchiveRequest, RunSettings};
use crate::services::{
    scan_existing_files, LlmService, LlmTitleInterpreter, LogCounts, LogPaths, LogStore,
    PageCrawler, RequestInterpreter,
};
use crate::utils::logging::{log_startup, print_final_summary, print_log_counts};

/// 应用主结构
pub struct App {
    config: Config,
    profile: SiteProfile,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let profile = load_site_profile_or_default(config.site_profile.as_deref())
            .await
            .context("加载站点配置失败")?;

        Ok(Self { config, profile })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn log_store(&self) -> LogStore {
        LogStore::new(LogPaths::from_config(&self.config))
    }

    /// 抓取、下载并归档新报告，返回摘要
    pub async fn run(&self, request: &ArchiveRequest) -> Result<String> {
        log_startup("run", &self.config);

        if self.config.llm_api_key.is_empty() {
            warn!("⚠️ 未设置 LLM_API_KEY，标题解析很可能失败");
        }
        let interpreter = LlmTitleInterpreter::new(LlmService::new(&self.config));

        let mut session = ChromeSession::open(&self.config)
            .await
            .context("无法打开浏览器会话")?;

        let settings = RunSettings::from_config(&self.config, self.profile.clone());
        let summary = run_archive(&mut session, &interpreter, &settings, request).await;

        print_final_summary(&summary);
        Ok(summary)
    }

    /// 用一句自然语言描述需求，解析成归档请求后执行
    pub async fn ask(&self, text: &str) -> Result<String> {
        if self.config.llm_api_key.is_empty() {
            warn!("⚠️ 未设置 LLM_API_KEY，请求解析很可能失败");
        }
        let interpreter = RequestInterpreter::new(LlmService::new(&self.config));
        let request = interpreter
            .interpret(text)
            .await
            .context("无法把请求解析成归档参数")?;

        self.run(&request).await
    }

    /// 读取可用的筛选项
    pub async fn filters(&self) -> Result<BTreeMap<String, Vec<String>>> {
        log_startup("filters", &self.config);

        let mut session = ChromeSession::open(&self.config)
            .await
            .context("无法打开浏览器会话")?;

        let settings = RunSettings::from_config(&self.config, self.profile.clone());
        let crawler = PageCrawler::new(&settings.profile, &settings.pacing);

        let result = match crawler.setup_page(&mut session, &settings.start_url).await {
            Ok(()) => crawler.discover_filters(&mut session).await,
            Err(e) => Err(e),
        };

        if let Err(e) = session.close().await {
            warn!("⚠️ 关闭浏览器会话失败: {}", e);
        }
        result.context("读取筛选项失败")
    }

    /// 人工修正后把失败记录移到成功日志
    pub fn promote(&self, url: &str, filename: &str) -> Result<()> {
        self.log_store()
            .promote(url, filename)
            .with_context(|| format!("无法把 '{}' 移入成功日志", url))
    }

    /// 把失败记录标记为无关
    pub fn mark_irrelevant(&self, url: &str) -> Result<()> {
        self.log_store()
            .mark_irrelevant(url)
            .with_context(|| format!("无法把 '{}' 移入无关日志", url))
    }

    /// 扫描归档目录中已有的 PDF
    pub fn scan(&self) -> Result<BTreeSet<String>> {
        let existing = scan_existing_files(&self.config.output_root)
            .context("扫描归档目录失败")?;
        Ok(existing)
    }

    /// 三份日志的条目数
    pub fn log_counts(&self) -> LogCounts {
        let counts = self.log_store().counts();
        print_log_counts(&counts);
        info!("日志目录: {}", self.config.output_root.display());
        counts
    }
}
