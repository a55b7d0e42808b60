//! 基于 chromiumoxide 的浏览器会话

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::Browser;
use serde::Deserialize;
use serde_json::json;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser::{self, BrowserSession, FacetGroup, FacetQuery, Locator, PageLink};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::JsExecutor;

/// 元素轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 真实浏览器会话
pub struct ChromeSession {
    browser: Browser,
    executor: JsExecutor,
    handler_task: JoinHandle<()>,
    /// 是否由本程序启动（连接到外部浏览器时只关闭自己的页面）
    owned: bool,
    closed: bool,
}

#[derive(Debug, Deserialize)]
struct FrameInfo {
    found: bool,
    #[serde(default)]
    accessible: bool,
    #[serde(default)]
    src: Option<String>,
}

impl ChromeSession {
    /// 按配置启动或连接浏览器
    pub async fn open(config: &Config) -> AppResult<Self> {
        std::fs::create_dir_all(&config.staging_dir).map_err(|e| {
            AppError::file_write_failed(config.staging_dir.display().to_string(), e)
        })?;

        let (browser, page, handler_task, owned) = match config.browser_debug_port {
            Some(port) => {
                let (b, p, h) =
                    browser::connect_to_browser_and_page(port, &config.staging_dir).await?;
                (b, p, h, false)
            }
            None => {
                let (b, p, h) =
                    browser::launch_headless_browser(config, &config.staging_dir).await?;
                (b, p, h, true)
            }
        };

        Ok(Self {
            browser,
            executor: JsExecutor::new(page),
            handler_task,
            owned,
            closed: false,
        })
    }

    async fn count(&self, locator: &Locator) -> AppResult<usize> {
        self.executor
            .eval_in_context(
                "return __all(__root, args.loc).length;",
                json!({ "loc": locator }),
            )
            .await
    }

    /// 在顶层文档中读取 iframe 状态
    async fn frame_info(&self, locator: &Locator) -> AppResult<FrameInfo> {
        self.executor
            .eval_in_context(
                r#"
                const frame = __all(document, args.loc)[0];
                if (!frame) return { found: false };
                let accessible = false;
                try { accessible = !!frame.contentDocument; } catch (e) { accessible = false; }
                return { found: true, accessible, src: frame.src || null };
                "#,
                json!({ "loc": locator }),
            )
            .await
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&mut self, url: &str) -> AppResult<()> {
        self.executor.set_frame(None);
        self.executor
            .page()
            .goto(url)
            .await
            .map_err(|e| AppError::navigation_failed(url, e))?;
        info!("已导航到: {}", url);
        Ok(())
    }

    async fn wait_for(&mut self, locator: &Locator, timeout: Duration) -> AppResult<bool> {
        let started = Instant::now();
        loop {
            if self.count(locator).await? > 0 {
                return Ok(true);
            }
            if started.elapsed() >= timeout {
                debug!("等待 {} 超时 ({:?})", locator, timeout);
                return Ok(false);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn click(&mut self, locator: &Locator) -> AppResult<bool> {
        self.executor
            .eval_in_context(
                r#"
                const el = __all(__root, args.loc)[0];
                if (!el) return false;
                el.scrollIntoView({ block: 'center' });
                el.click();
                return true;
                "#,
                json!({ "loc": locator }),
            )
            .await
    }

    async fn enter_frame(&mut self, locator: &Locator, timeout: Duration) -> AppResult<bool> {
        self.executor.set_frame(None);
        if !self.wait_for(locator, timeout).await? {
            return Ok(false);
        }

        let info = self.frame_info(locator).await?;
        if !info.found {
            return Ok(false);
        }

        if info.accessible {
            self.executor.set_frame(Some(locator.clone()));
            debug!("已进入 iframe 上下文: {}", locator);
            return Ok(true);
        }

        // 跨域 iframe 无法直接访问，改为在顶层打开其地址
        match info.src.filter(|s| !s.is_empty()) {
            Some(src) => {
                warn!("iframe 不可直接访问，改为直接打开: {}", src);
                self.navigate(&src).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn links(&mut self, locator: &Locator) -> AppResult<Vec<PageLink>> {
        self.executor
            .eval_in_context(
                r#"
                return __all(__root, args.loc).map(a => ({
                    text: (a.innerText || a.textContent || '').trim(),
                    href: a.href || a.getAttribute('href') || null,
                }));
                "#,
                json!({ "loc": locator }),
            )
            .await
    }

    async fn facets(&mut self, query: &FacetQuery<'_>) -> AppResult<Vec<FacetGroup>> {
        self.executor
            .eval_in_context(
                r#"
                return __all(__root, args.container)
                    .map(g => ({
                        title: g.getAttribute(args.titleAttr) || '',
                        values: Array.from(g.querySelectorAll(args.option))
                            .map(o => o.getAttribute(args.valueAttr))
                            .filter(v => v),
                    }))
                    .filter(f => f.title && f.values.length > 0);
                "#,
                json!({
                    "container": query.container,
                    "titleAttr": query.title_attr,
                    "option": query.option_css,
                    "valueAttr": query.value_attr,
                }),
            )
            .await
    }

    async fn close(&mut self) -> AppResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if self.owned {
            self.browser.close().await?;
            let _ = self.browser.wait().await;
        } else {
            self.executor.page().clone().close().await?;
        }
        self.handler_task.abort();
        info!("🤖 浏览器会话已关闭");
        Ok(())
    }
}
