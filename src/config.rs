use std::path::PathBuf;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 报告归档根目录（日志文件也保存在这里）
    pub output_root: PathBuf,
    /// 浏览器下载暂存目录
    pub staging_dir: PathBuf,
    /// 报告列表入口 URL
    pub start_url: String,
    /// 是否以无头模式启动浏览器
    pub headless: bool,
    /// 已运行浏览器的调试端口；设置后直接连接而不是启动新浏览器
    pub browser_debug_port: Option<u16>,
    /// Chrome 可执行文件路径（为空时由 chromiumoxide 自动查找）
    pub chrome_executable: Option<PathBuf>,
    /// 站点选择器配置文件（TOML）
    pub site_profile: Option<PathBuf>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("CBRE_Reports"),
            staging_dir: PathBuf::from("temp_downloads"),
            start_url: "https://www.cbre.com/insights#market-reports".to_string(),
            headless: true,
            browser_debug_port: None,
            chrome_executable: None,
            site_profile: None,
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            output_root: std::env::var("OUTPUT_ROOT").map(PathBuf::from).unwrap_or(default.output_root),
            staging_dir: std::env::var("STAGING_DIR").map(PathBuf::from).unwrap_or(default.staging_dir),
            start_url: std::env::var("START_URL").unwrap_or(default.start_url),
            headless: std::env::var("HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).or(default.browser_debug_port),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().map(PathBuf::from).or(default.chrome_executable),
            site_profile: std::env::var("SITE_PROFILE").ok().map(PathBuf::from).or(default.site_profile),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
        }
    }

    /// 成功日志路径
    pub fn success_log_path(&self) -> PathBuf {
        self.output_root.join("download_log.json")
    }

    /// 失败日志路径
    pub fn failed_log_path(&self) -> PathBuf {
        self.output_root.join("failed_log.json")
    }

    /// 无关日志路径
    pub fn irrelevant_log_path(&self) -> PathBuf {
        self.output_root.join("irrelevant_log.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_paths_live_under_output_root() {
        let config = Config {
            output_root: PathBuf::from("/tmp/reports"),
            ..Config::default()
        };
        assert_eq!(config.success_log_path(), PathBuf::from("/tmp/reports/download_log.json"));
        assert_eq!(config.failed_log_path(), PathBuf::from("/tmp/reports/failed_log.json"));
        assert_eq!(config.irrelevant_log_path(), PathBuf::from("/tmp/reports/irrelevant_log.json"));
    }
}
