//! 站点选择器配置
//!
//! 所有与目标站点 DOM 结构有关的选择器都集中在这里，默认值对应 CBRE insights 页面。

use serde::{Deserialize, Serialize};

use crate::browser::Locator;

/// 站点选择器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    /// Cookie 同意按钮（CSS）
    pub consent_button: String,
    /// 报告标签页（CSS）
    pub reports_tab: String,
    /// 结果 iframe（CSS）
    pub results_frame: String,
    /// 结果容器（CSS）
    pub content_container: String,
    /// 报告链接（CSS）
    pub report_link: String,
    /// 下一页按钮（CSS）
    pub next_page: String,
    /// 筛选面板容器（CSS，用于发现筛选项）
    pub facet_container: String,
    /// 筛选面板标题属性
    pub facet_title_attr: String,
    /// 筛选选项（CSS，相对于面板）
    pub facet_option: String,
    /// 筛选选项值属性
    pub facet_value_attr: String,
    /// 按标题定位筛选面板（XPath，`{name}` 替换为带引号的 XPath 字符串）
    pub facet_panel_xpath: String,
    /// 面板内的选项按钮（XPath 片段，`{value}` 同上）
    pub facet_option_xpath: String,
    /// 排序下拉按钮（CSS）
    pub sort_toggle: String,
    /// 排序选项（XPath，`{caption}` 同上）
    pub sort_option_xpath: String,
    /// 报告详情页的下载按钮（CSS）
    pub download_control: String,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            consent_button: "#onetrust-accept-btn-handler".to_string(),
            reports_tab: "#tab-market-reports".to_string(),
            results_frame: "iframe[src*='search-market-results']".to_string(),
            content_container: ".coveo-result-list-container".to_string(),
            report_link: ".coveo-result-list-container a".to_string(),
            next_page: "li.coveo-pager-next span[role='button']".to_string(),
            facet_container: "div.CoveoFacet".to_string(),
            facet_title_attr: "data-title".to_string(),
            facet_option: "li.coveo-facet-value".to_string(),
            facet_value_attr: "data-value".to_string(),
            facet_panel_xpath: "//div[contains(@class, 'CoveoFacet') and @data-title={name}]"
                .to_string(),
            facet_option_xpath: "//li[@data-value={value}]//div[@role='button']".to_string(),
            sort_toggle: "div.cbre-sort-toggle".to_string(),
            sort_option_xpath: "//span[contains(@class, 'CoveoSort') and @data-caption={caption}]"
                .to_string(),
            download_control: "a.cbre-c-download".to_string(),
        }
    }
}

impl SiteProfile {
    pub fn consent_locator(&self) -> Locator {
        Locator::css(&self.consent_button)
    }

    pub fn reports_tab_locator(&self) -> Locator {
        Locator::css(&self.reports_tab)
    }

    pub fn results_frame_locator(&self) -> Locator {
        Locator::css(&self.results_frame)
    }

    pub fn content_locator(&self) -> Locator {
        Locator::css(&self.content_container)
    }

    pub fn link_locator(&self) -> Locator {
        Locator::css(&self.report_link)
    }

    pub fn next_page_locator(&self) -> Locator {
        Locator::css(&self.next_page)
    }

    pub fn sort_toggle_locator(&self) -> Locator {
        Locator::css(&self.sort_toggle)
    }

    pub fn download_locator(&self) -> Locator {
        Locator::css(&self.download_control)
    }

    /// 按标题定位筛选面板
    pub fn facet_panel_locator(&self, name: &str) -> Locator {
        Locator::xpath(self.facet_panel_xpath.replace("{name}", &xpath_literal(name)))
    }

    /// 面板内指定值的选项按钮
    pub fn facet_option_locator(&self, name: &str, value: &str) -> Locator {
        let panel = self.facet_panel_xpath.replace("{name}", &xpath_literal(name));
        let option = self.facet_option_xpath.replace("{value}", &xpath_literal(value));
        Locator::xpath(format!("{}{}", panel, option))
    }

    /// 排序选项
    pub fn sort_option_locator(&self, caption: &str) -> Locator {
        Locator::xpath(self.sort_option_xpath.replace("{caption}", &xpath_literal(caption)))
    }
}

/// 把任意文本写成 XPath 字符串字面量
///
/// XPath 1.0 没有转义字符：只含一种引号时换用另一种包裹，两种都有时用 `concat()` 拼接。
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }
    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}
