use std::path::Path;

use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::handler::Handler;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{AppError, AppResult, BrowserError};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36";

/// 启动浏览器，下载目录指向暂存目录
///
/// 返回浏览器、空白页面和 CDP 事件处理任务句柄。
pub async fn launch_headless_browser(
    config: &Config,
    download_dir: &Path,
) -> AppResult<(Browser, Page, JoinHandle<()>)> {
    info!("🚀 启动浏览器 (headless={})...", config.headless);

    let mut builder = BrowserConfig::builder().window_size(1920, 1080);
    builder = if config.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(path) = &config.chrome_executable {
        builder = builder.chrome_executable(path);
    }

    let browser_config = builder
        .args(vec![
            "--no-sandbox".to_string(),            // 容器环境下必须禁用沙盒
            "--disable-dev-shm-usage".to_string(), // 防止共享内存不足
            "--disable-gpu".to_string(),
            format!("--user-agent={}", USER_AGENT),
        ])
        .build()
        .map_err(|e| {
            error!("配置浏览器失败: {}", e);
            AppError::Browser(BrowserError::ConfigurationFailed { message: e })
        })?;

    let (browser, handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        AppError::Browser(BrowserError::LaunchFailed { source: Box::new(e) })
    })?;
    debug!("浏览器启动成功");

    let handler_task = spawn_handler(handler);

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    allow_downloads(&browser, download_dir).await?;

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        AppError::Browser(BrowserError::PageCreationFailed { source: Box::new(e) })
    })?;

    info!("✅ 浏览器已就绪，下载目录: {}", download_dir.display());

    Ok((browser, page, handler_task))
}

/// 在后台处理浏览器事件
pub(crate) fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    })
}

/// 允许自动下载并写入指定目录
pub(crate) async fn allow_downloads(browser: &Browser, download_dir: &Path) -> AppResult<()> {
    let download_path = std::fs::canonicalize(download_dir)
        .map_err(|e| AppError::file_read_failed(download_dir.display().to_string(), e))?;

    let params = SetDownloadBehaviorParams::builder()
        .behavior(SetDownloadBehaviorBehavior::Allow)
        .download_path(download_path.to_string_lossy().to_string())
        .build()
        .map_err(|e| AppError::Browser(BrowserError::ConfigurationFailed { message: e }))?;

    browser.execute(params).await?;
    debug!("已设置下载目录: {}", download_path.display());
    Ok(())
}
