use std::path::Path;

use chromiumoxide::{Browser, Page};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use super::headless::{allow_downloads, spawn_handler};
use crate::error::{AppError, AppResult, BrowserError};

/// 连接到已运行的浏览器（远程调试端口），并新建一个页面
pub async fn connect_to_browser_and_page(
    port: u16,
    download_dir: &Path,
) -> AppResult<(Browser, Page, JoinHandle<()>)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        AppError::browser_connection_failed(port, e)
    })?;
    debug!("浏览器连接成功");

    let handler_task = spawn_handler(handler);

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    allow_downloads(&browser, download_dir).await?;

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建新页面失败: {}", e);
        AppError::Browser(BrowserError::PageCreationFailed { source: Box::new(e) })
    })?;
    debug!("已创建空白页面");

    Ok((browser, page, handler_task))
}
