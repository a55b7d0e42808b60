//! 报告列表抓取 - 业务能力层
//!
//! 驱动浏览器完成：cookie 同意 → 报告标签页 → 结果 iframe → 筛选 → 排序 → 逐页提取链接。
//!
//! 提前停止依赖"最新在前"的排序：一旦在某页遇到比目标更早的报告，
//! 本页剩余链接和之后的所有页面都不再处理。

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser::{BrowserSession, FacetQuery, Locator};
use crate::error::{AppError, AppResult, CrawlError};
use crate::models::{
    parse_title_date, parse_title_date_loose, period_value, Pacing, Period, ReportCandidate,
    ScrapeConfig, SiteProfile,
};

/// 抓取结束的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStop {
    /// 没有下一页
    Exhausted,
    /// 在第 `page` 页遇到比目标更早的报告
    EarlyStop { page: usize },
    /// 第 `page` 页的结果容器等待超时
    ContentTimeout { page: usize },
}

/// 抓取结果
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// 按页面顺序排列，同一 URL 只保留第一次出现的标题
    pub reports: Vec<ReportCandidate>,
    pub pages_visited: usize,
    pub stop: CrawlStop,
}

/// 报告列表抓取器
pub struct PageCrawler<'a> {
    profile: &'a SiteProfile,
    pacing: &'a Pacing,
}

impl<'a> PageCrawler<'a> {
    pub fn new(profile: &'a SiteProfile, pacing: &'a Pacing) -> Self {
        Self { profile, pacing }
    }

    /// 完整抓取流程：准备页面 → 筛选 → 排序 → 分页提取
    pub async fn crawl<S: BrowserSession + ?Sized>(
        &self,
        session: &mut S,
        start_url: &str,
        config: &ScrapeConfig,
    ) -> AppResult<CrawlReport> {
        self.setup_page(session, start_url).await?;

        for (name, value) in &config.filters {
            self.apply_filter(session, name, value).await?;
        }

        let mut sort_failed = false;
        if let Some(caption) = &config.sort_by {
            sort_failed = !self.sort_results_by(session, caption).await?;
        }

        let mut config = config.clone();
        if sort_failed && config.enable_early_stopping {
            warn!("⚠️ 排序未生效，无法保证结果按时间倒序，本次关闭提前停止");
            config.enable_early_stopping = false;
        }

        self.extract_links_from_pages(session, &config).await
    }

    /// 打开入口页并进入结果 iframe
    ///
    /// cookie 按钮不存在不算错误；报告标签页或 iframe 不存在时返回 [`CrawlError`]。
    pub async fn setup_page<S: BrowserSession + ?Sized>(
        &self,
        session: &mut S,
        url: &str,
    ) -> AppResult<()> {
        session.navigate(url).await?;

        let consent = self.profile.consent_locator();
        if session.wait_for(&consent, self.pacing.consent_wait).await?
            && session.click(&consent).await?
        {
            info!("✓ 已接受 cookie");
            pause(self.pacing.settle_short).await;
        } else {
            info!("! 未发现 cookie 提示或已接受");
        }

        let tab = self.profile.reports_tab_locator();
        if !(session.wait_for(&tab, self.pacing.tab_wait).await? && session.click(&tab).await?) {
            warn!("❌ 找不到报告标签页");
            return Err(AppError::Crawl(CrawlError::ReportsTabNotFound {
                locator: tab.to_string(),
            }));
        }
        info!("✓ 已打开报告标签页");
        pause(self.pacing.settle_medium).await;

        let frame = self.profile.results_frame_locator();
        if !session.enter_frame(&frame, self.pacing.frame_wait).await? {
            warn!("❌ 找不到或无法进入报告 iframe");
            return Err(AppError::Crawl(CrawlError::ResultsFrameNotFound {
                locator: frame.to_string(),
            }));
        }
        info!("✓ 已进入报告 iframe");
        pause(self.pacing.settle_long).await;

        Ok(())
    }

    /// 点击某个筛选面板中的选项；找不到时只记录警告
    pub async fn apply_filter<S: BrowserSession + ?Sized>(
        &self,
        session: &mut S,
        name: &str,
        value: &str,
    ) -> AppResult<bool> {
        info!("应用筛选: '{}' -> '{}'...", name, value);

        let panel = self.profile.facet_panel_locator(name);
        let option = self.profile.facet_option_locator(name, value);
        let applied = session.wait_for(&panel, self.pacing.filter_wait).await?
            && session.click(&option).await?;

        if applied {
            info!("✓ 筛选已应用");
            pause(self.pacing.settle_long).await;
        } else {
            warn!("❌ 无法找到或应用筛选 '{}' = '{}'", name, value);
        }
        Ok(applied)
    }

    /// 选择排序方式；找不到时只记录警告
    pub async fn sort_results_by<S: BrowserSession + ?Sized>(
        &self,
        session: &mut S,
        caption: &str,
    ) -> AppResult<bool> {
        info!("按 '{}' 排序...", caption);

        let toggle = self.profile.sort_toggle_locator();
        if !session.click(&toggle).await? {
            warn!("❌ 找不到排序下拉框");
            return Ok(false);
        }
        pause(self.pacing.settle_short).await;

        let option = self.profile.sort_option_locator(caption);
        let applied = session.wait_for(&option, self.pacing.sort_wait).await?
            && session.click(&option).await?;

        if applied {
            info!("✓ 排序已应用");
            pause(self.pacing.settle_long).await;
        } else {
            warn!("❌ 无法找到或点击排序选项 '{}'", caption);
        }
        Ok(applied)
    }

    /// 读取所有筛选面板及其可选值
    pub async fn discover_filters<S: BrowserSession + ?Sized>(
        &self,
        session: &mut S,
    ) -> AppResult<BTreeMap<String, Vec<String>>> {
        info!("🔎 正在读取可用的筛选项...");

        let container = Locator::css(&self.profile.facet_container);
        if !session.wait_for(&container, self.pacing.filter_wait).await? {
            warn!("❌ 找不到筛选面板");
            return Ok(BTreeMap::new());
        }

        let query = FacetQuery {
            container: &container,
            title_attr: &self.profile.facet_title_attr,
            option_css: &self.profile.facet_option,
            value_attr: &self.profile.facet_value_attr,
        };
        let groups = session.facets(&query).await?;

        info!("✓ 找到 {} 个筛选面板", groups.len());
        Ok(groups.into_iter().map(|g| (g.title, g.values)).collect())
    }

    /// 逐页提取匹配的报告链接
    pub async fn extract_links_from_pages<S: BrowserSession + ?Sized>(
        &self,
        session: &mut S,
        config: &ScrapeConfig,
    ) -> AppResult<CrawlReport> {
        let keywords: Vec<String> = config.keywords.iter().map(|k| k.to_lowercase()).collect();
        let early_stop_target = match (config.enable_early_stopping, config.target_year) {
            (true, Some(year)) => Some((year, config.target_period)),
            _ => None,
        };

        let content = self.profile.content_locator();
        let link_locator = self.profile.link_locator();
        let next_page = self.profile.next_page_locator();

        let mut reports = Vec::new();
        let mut seen = HashSet::new();
        let mut page = 1;

        let stop = loop {
            info!("📄 正在抓取第 {} 页...", page);

            if !session.wait_for(&content, self.pacing.results_wait).await? {
                warn!("❌ 第 {} 页内容等待超时，停止抓取", page);
                break CrawlStop::ContentTimeout { page };
            }
            let links = session.links(&link_locator).await?;
            debug!("第 {} 页共有 {} 个链接", page, links.len());

            let mut stopped = false;
            for link in links {
                let text_lower = link.text.to_lowercase();
                if !keywords.iter().all(|kw| text_lower.contains(kw.as_str())) {
                    continue;
                }
                let Some(href) = link.href.filter(|h| !h.is_empty()) else {
                    continue;
                };

                if should_keep(&link.text, config.target_year, config.target_period)
                    && seen.insert(href.clone())
                {
                    info!("   ✅ 找到匹配的报告: {}", link.text);
                    reports.push(ReportCandidate::new(href, link.text.clone()));
                }

                if let Some((year, period)) = early_stop_target {
                    if is_older_than_target(&link.text, year, period) {
                        info!("   -- 报告 '{}' 早于目标，提前停止 --", link.text);
                        stopped = true;
                        break;
                    }
                }
            }

            if stopped {
                break CrawlStop::EarlyStop { page };
            }

            if !session.click(&next_page).await? {
                info!("没有下一页按钮，已到最后一页");
                break CrawlStop::Exhausted;
            }
            page += 1;
            info!("   前往第 {} 页...", page);
            pause(self.pacing.settle_long).await;
        };

        info!("✓ 抓取完成: {} 页, {} 个匹配报告", page, reports.len());

        Ok(CrawlReport {
            reports,
            pages_visited: page,
            stop,
        })
    }
}

/// 按目标年份/周期判断是否保留
///
/// - 没有目标年份：总是保留
/// - 有目标年份：标题中必须解析出同一年份，且目标周期为空、相同或被半年报覆盖
pub fn should_keep(title: &str, target_year: Option<i32>, target_period: Option<Period>) -> bool {
    let Some(target_year) = target_year else {
        return true;
    };
    match parse_title_date(title) {
        Some((found_period, found_year)) if found_year == target_year => match target_period {
            None => true,
            Some(target) => target.is_satisfied_by(found_period),
        },
        _ => false,
    }
}

/// 标题日期是否严格早于目标
///
/// 目标周期已知时比较 `year * 4 + 周期序号`，否则只比较年份；标题无法解析时返回 false。
pub fn is_older_than_target(title: &str, target_year: i32, target_period: Option<Period>) -> bool {
    let Some((found_period, found_year)) = parse_title_date_loose(title) else {
        return false;
    };
    match target_period {
        Some(target) => period_value(found_year, found_period) < period_value(target_year, target),
        None => found_year < target_year,
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        sleep(duration).await;
    }
}
