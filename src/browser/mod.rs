//! 浏览器能力接口
//!
//! 抓取和下载逻辑只依赖 [`BrowserSession`] 这几个原语，真实实现见
//! [`crate::infrastructure::ChromeSession`]，测试中可以用假实现替换。

pub mod connection;
pub mod headless;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;

pub use connection::connect_to_browser_and_page;
pub use headless::launch_headless_browser;

/// 元素定位方式
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css:{}", s),
            Locator::XPath(s) => write!(f, "xpath:{}", s),
        }
    }
}

/// 页面上的一个链接
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub text: String,
    #[serde(default)]
    pub href: Option<String>,
}

impl PageLink {
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: Some(href.into()),
        }
    }
}

/// 筛选面板及其可选值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetGroup {
    pub title: String,
    pub values: Vec<String>,
}

/// 筛选面板的定位描述
#[derive(Debug, Clone)]
pub struct FacetQuery<'a> {
    pub container: &'a Locator,
    pub title_attr: &'a str,
    pub option_css: &'a str,
    pub value_attr: &'a str,
}

/// 浏览器会话能力
///
/// 所有查询都在当前上下文（顶层文档或已进入的 iframe）中执行。
/// 元素不存在不是错误：`wait_for` / `click` / `enter_frame` 返回 `false`，
/// `Err` 只表示浏览器本身出了问题。
#[async_trait]
pub trait BrowserSession: Send {
    /// 导航到 URL，并回到顶层文档上下文
    async fn navigate(&mut self, url: &str) -> AppResult<()>;

    /// 在超时前等待元素出现
    async fn wait_for(&mut self, locator: &Locator, timeout: Duration) -> AppResult<bool>;

    /// 点击第一个匹配的元素
    async fn click(&mut self, locator: &Locator) -> AppResult<bool>;

    /// 等待并进入 iframe 上下文
    async fn enter_frame(&mut self, locator: &Locator, timeout: Duration) -> AppResult<bool>;

    /// 读取所有匹配链接的文字和地址（按页面顺序）
    async fn links(&mut self, locator: &Locator) -> AppResult<Vec<PageLink>>;

    /// 读取筛选面板
    async fn facets(&mut self, query: &FacetQuery<'_>) -> AppResult<Vec<FacetGroup>>;

    /// 关闭会话
    async fn close(&mut self) -> AppResult<()>;
}
