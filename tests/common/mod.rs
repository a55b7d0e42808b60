//! 集成测试共用的假浏览器会话和固定标题解析器
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use market_report_archiver::browser::{BrowserSession, FacetGroup, FacetQuery, Locator, PageLink};
use market_report_archiver::error::{AppError, AppResult, BrowserError};
use market_report_archiver::models::{Pacing, ParsedReport, SiteProfile};
use market_report_archiver::orchestrator::RunSettings;
use market_report_archiver::services::TitleInterpreter;

pub const START_URL: &str = "https://example.test/insights#market-reports";

/// 按页面列表模拟结果 iframe 的假会话
///
/// 除 `missing` 中的定位器外，所有元素默认存在；下一页按钮只在还有后续页面时存在，
/// 下载按钮只在 `downloads` 中登记过的 URL 上存在。
pub struct FakeSession {
    profile: SiteProfile,
    staging_dir: PathBuf,
    pages: Vec<Vec<PageLink>>,
    current_page: usize,
    current_url: Option<String>,
    /// url → 点击下载后写入暂存目录的文件名（`None` 表示点击后没有文件）
    downloads: HashMap<String, Option<String>>,
    missing: HashSet<Locator>,
    /// 从第 N 页（1-based）开始结果容器不再出现
    content_missing_from: Option<usize>,
    facets: Vec<FacetGroup>,
    fail_navigation: bool,
    pub visited: Vec<String>,
    pub pages_read: Vec<usize>,
    pub clicks: Vec<Locator>,
    pub closed: bool,
}

impl FakeSession {
    pub fn new(staging_dir: &Path, pages: Vec<Vec<PageLink>>) -> Self {
        Self {
            profile: SiteProfile::default(),
            staging_dir: staging_dir.to_path_buf(),
            pages,
            current_page: 0,
            current_url: None,
            downloads: HashMap::new(),
            missing: HashSet::new(),
            content_missing_from: None,
            facets: Vec::new(),
            fail_navigation: false,
            visited: Vec::new(),
            pages_read: Vec::new(),
            clicks: Vec::new(),
            closed: false,
        }
    }

    pub fn with_download(mut self, url: &str, filename: &str) -> Self {
        self.downloads
            .insert(url.to_string(), Some(filename.to_string()));
        self
    }

    pub fn with_stalled_download(mut self, url: &str) -> Self {
        self.downloads.insert(url.to_string(), None);
        self
    }

    pub fn without(mut self, locator: Locator) -> Self {
        self.missing.insert(locator);
        self
    }

    pub fn with_content_missing_from(mut self, page: usize) -> Self {
        self.content_missing_from = Some(page);
        self
    }

    pub fn with_facets(mut self, facets: Vec<FacetGroup>) -> Self {
        self.facets = facets;
        self
    }

    pub fn failing_navigation(mut self) -> Self {
        self.fail_navigation = true;
        self
    }

    /// 把会话恢复到第一页，模拟下一次运行
    pub fn reset(&mut self) {
        self.current_page = 0;
        self.current_url = None;
        self.visited.clear();
        self.pages_read.clear();
        self.clicks.clear();
        self.closed = false;
    }

    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    fn has_next_page(&self) -> bool {
        self.current_page + 1 < self.pages.len()
    }

    fn download_here(&self) -> Option<&Option<String>> {
        self.current_url
            .as_ref()
            .and_then(|url| self.downloads.get(url))
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&mut self, url: &str) -> AppResult<()> {
        if self.fail_navigation {
            return Err(AppError::Browser(BrowserError::ConfigurationFailed {
                message: "simulated navigation failure".to_string(),
            }));
        }
        self.visited.push(url.to_string());
        self.current_url = Some(url.to_string());
        Ok(())
    }

    async fn wait_for(&mut self, locator: &Locator, _timeout: Duration) -> AppResult<bool> {
        if self.missing.contains(locator) {
            return Ok(false);
        }
        if *locator == self.profile.download_locator() {
            return Ok(self.download_here().is_some());
        }
        if *locator == self.profile.content_locator() {
            if let Some(from) = self.content_missing_from {
                return Ok(self.current_page + 1 < from);
            }
        }
        Ok(true)
    }

    async fn click(&mut self, locator: &Locator) -> AppResult<bool> {
        if self.missing.contains(locator) {
            return Ok(false);
        }
        self.clicks.push(locator.clone());

        if *locator == self.profile.next_page_locator() {
            if !self.has_next_page() {
                return Ok(false);
            }
            self.current_page += 1;
            return Ok(true);
        }

        if *locator == self.profile.download_locator() {
            return match self.download_here().cloned() {
                Some(Some(filename)) => {
                    std::fs::create_dir_all(&self.staging_dir)?;
                    std::fs::write(self.staging_dir.join(filename), b"%PDF-1.4 fake")?;
                    Ok(true)
                }
                Some(None) => Ok(true),
                None => Ok(false),
            };
        }

        Ok(true)
    }

    async fn enter_frame(&mut self, locator: &Locator, _timeout: Duration) -> AppResult<bool> {
        Ok(!self.missing.contains(locator))
    }

    async fn links(&mut self, _locator: &Locator) -> AppResult<Vec<PageLink>> {
        self.pages_read.push(self.current_page + 1);
        Ok(self
            .pages
            .get(self.current_page)
            .cloned()
            .unwrap_or_default())
    }

    async fn facets(&mut self, _query: &FacetQuery<'_>) -> AppResult<Vec<FacetGroup>> {
        Ok(self.facets.clone())
    }

    async fn close(&mut self) -> AppResult<()> {
        self.closed = true;
        Ok(())
    }
}

/// 按标题返回预先准备好的解析结果
pub struct CannedInterpreter {
    canned: HashMap<String, ParsedReport>,
    fail: bool,
    pub calls: Mutex<Vec<Vec<String>>>,
}

impl CannedInterpreter {
    pub fn new(reports: Vec<ParsedReport>) -> Self {
        Self {
            canned: reports
                .into_iter()
                .map(|r| (r.original_title.clone(), r))
                .collect(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn seen_titles(&self) -> Vec<String> {
        self.calls.lock().unwrap().concat()
    }
}

#[async_trait]
impl TitleInterpreter for CannedInterpreter {
    async fn interpret(&self, titles: &[String]) -> AppResult<Vec<ParsedReport>> {
        self.calls.lock().unwrap().push(titles.to_vec());
        if self.fail {
            return Err(AppError::Other("simulated interpreter failure".to_string()));
        }
        Ok(titles
            .iter()
            .filter_map(|t| self.canned.get(t).cloned())
            .collect())
    }
}

pub fn link(title: &str, url: &str) -> PageLink {
    PageLink::new(title, url)
}

pub fn settings(root: &Path, staging: &Path) -> RunSettings {
    RunSettings {
        start_url: START_URL.to_string(),
        output_root: root.to_path_buf(),
        staging_dir: staging.to_path_buf(),
        profile: SiteProfile::default(),
        pacing: Pacing::immediate(),
    }
}
