//! 日志存储服务 - 业务能力层
//!
//! 维护三份 JSON 日志（成功 / 失败 / 无关），每份都是 url → 字符串 的扁平对象。
//! 每次更新都完整读取、修改后整体写回，只适用于单写者。

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LogError};

/// 解析不完整时写入失败日志的原因
pub const PARTIAL_SUCCESS_REASON: &str = "Partial Success - Parsing/Organizing Failed";

/// 用户标记为无关时写入的固定内容
pub const IRRELEVANT_MARKER: &str = "Marked as irrelevant by user.";

/// 单份日志内容
pub type LogMap = BTreeMap<String, String>;

/// 日志种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    Success,
    Failed,
    Irrelevant,
}

impl LogKind {
    pub fn name(self) -> &'static str {
        match self {
            LogKind::Success => "成功日志",
            LogKind::Failed => "失败日志",
            LogKind::Irrelevant => "无关日志",
        }
    }
}

/// 三份日志的文件路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPaths {
    pub success: PathBuf,
    pub failed: PathBuf,
    pub irrelevant: PathBuf,
}

impl LogPaths {
    /// 默认文件名，放在归档根目录下
    pub fn under(root: &Path) -> Self {
        Self {
            success: root.join("download_log.json"),
            failed: root.join("failed_log.json"),
            irrelevant: root.join("irrelevant_log.json"),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            success: config.success_log_path(),
            failed: config.failed_log_path(),
            irrelevant: config.irrelevant_log_path(),
        }
    }

    pub fn path(&self, kind: LogKind) -> &Path {
        match kind {
            LogKind::Success => &self.success,
            LogKind::Failed => &self.failed,
            LogKind::Irrelevant => &self.irrelevant,
        }
    }
}

/// 各日志的条目数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogCounts {
    pub success: usize,
    pub failed: usize,
    pub irrelevant: usize,
}

/// 日志存储
pub struct LogStore {
    paths: LogPaths,
}

impl LogStore {
    pub fn new(paths: LogPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &LogPaths {
        &self.paths
    }

    /// 读取一份日志；文件不存在或内容损坏时返回空表
    ///
    /// 手工编辑留下的非字符串值（如 `null`、数字）不会让整份日志失效，而是转成字符串保留。
    pub fn load(&self, kind: LogKind) -> LogMap {
        let path = self.paths.path(kind);
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return LogMap::new(),
            Err(e) => {
                warn!("读取{}失败 ({}): {}，按空日志处理", kind.name(), path.display(), e);
                return LogMap::new();
            }
        };

        match serde_json::from_str::<BTreeMap<String, Value>>(&content) {
            Ok(raw) => raw
                .into_iter()
                .map(|(url, value)| (url, value_to_string(value)))
                .collect(),
            Err(e) => {
                if !content.trim().is_empty() {
                    warn!("{}内容无法解析 ({}): {}，按空日志处理", kind.name(), path.display(), e);
                }
                LogMap::new()
            }
        }
    }

    /// 整体写回一份日志（4 空格缩进）
    pub fn save(&self, kind: LogKind, map: &LogMap) -> AppResult<()> {
        let path = self.paths.path(kind);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
        }

        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        map.serialize(&mut serializer)?;

        std::fs::write(path, buf)
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        debug!("已写入{}: {} 条", kind.name(), map.len());
        Ok(())
    }

    /// 插入或更新一条记录
    pub fn upsert(&self, kind: LogKind, url: &str, value: &str) -> AppResult<()> {
        let mut map = self.load(kind);
        map.insert(url.to_string(), value.to_string());
        self.save(kind, &map)
    }

    /// 记录下载成功
    pub fn record_success(&self, url: &str, final_filename: &str) -> AppResult<()> {
        self.upsert(LogKind::Success, url, final_filename)
    }

    /// 记录失败（包括部分成功）
    pub fn record_failure(&self, url: &str, reason: &str) -> AppResult<()> {
        self.upsert(LogKind::Failed, url, reason)
    }

    /// 记录无关报告
    pub fn record_irrelevant(&self, url: &str, reason: &str) -> AppResult<()> {
        self.upsert(LogKind::Irrelevant, url, reason)
    }

    /// 三份日志中所有 URL 的并集，运行开始时用来跳过已处理的报告
    pub fn ignore_set(&self) -> HashSet<String> {
        [LogKind::Success, LogKind::Failed, LogKind::Irrelevant]
            .into_iter()
            .flat_map(|kind| self.load(kind).into_keys())
            .collect()
    }

    pub fn counts(&self) -> LogCounts {
        LogCounts {
            success: self.load(LogKind::Success).len(),
            failed: self.load(LogKind::Failed).len(),
            irrelevant: self.load(LogKind::Irrelevant).len(),
        }
    }

    /// 人工修正后，把失败日志中的 URL 移到成功日志
    pub fn promote(&self, url: &str, new_filename: &str) -> AppResult<()> {
        self.move_from_failed(url, LogKind::Success, new_filename)?;
        info!("✅ 已移入成功日志: {}", preview(url));
        Ok(())
    }

    /// 把失败日志中的 URL 标记为无关
    pub fn mark_irrelevant(&self, url: &str) -> AppResult<()> {
        self.move_from_failed(url, LogKind::Irrelevant, IRRELEVANT_MARKER)?;
        info!("✅ 已移入无关日志: {}", preview(url));
        Ok(())
    }

    /// 先从失败日志弹出，再写入目标日志
    ///
    /// 两次写入之间并非原子操作：若中途崩溃，URL 可能暂时两边都不在。
    fn move_from_failed(&self, url: &str, target: LogKind, value: &str) -> AppResult<()> {
        let mut failed = self.load(LogKind::Failed);
        let mut target_map = self.load(target);

        if failed.remove(url).is_none() {
            return Err(AppError::Log(LogError::UrlNotInFailedLog {
                url: url.to_string(),
            }));
        }
        target_map.insert(url.to_string(), value.to_string());

        self.save(LogKind::Failed, &failed)?;
        self.save(target, &target_map)?;
        Ok(())
    }
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn preview(url: &str) -> String {
    crate::utils::logging::truncate_text(url, 50)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn store_in(dir: &Path) -> LogStore {
        LogStore::new(LogPaths::under(dir))
    }

    #[test]
    fn test_missing_and_corrupt_logs_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(store.load(LogKind::Success).is_empty());

        std::fs::write(&store.paths().failed, "{ not json").unwrap();
        assert!(store.load(LogKind::Failed).is_empty());

        std::fs::write(&store.paths().irrelevant, "").unwrap();
        assert!(store.load(LogKind::Irrelevant).is_empty());
    }

    #[test]
    fn test_non_string_values_keep_whole_log() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        std::fs::write(
            &store.paths().success,
            r#"{"https://a": "A 2024 Q1.pdf", "https://b": null, "https://d": 7}"#,
        )
        .unwrap();

        let ignore = store.ignore_set();
        assert!(ignore.contains("https://a"));
        assert!(ignore.contains("https://b"));
        assert!(ignore.contains("https://d"));

        assert_ok!(store.record_success("https://c", "C 2024 Q1.pdf"));
        let success = store.load(LogKind::Success);
        assert_eq!(success.len(), 4);
        assert_eq!(success["https://a"], "A 2024 Q1.pdf");
        assert_eq!(success["https://b"], "");
        assert_eq!(success["https://d"], "7");
    }

    #[test]
    fn test_upsert_overwrites_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert_ok!(store.record_failure("u1", "Download timed out"));
        assert_ok!(store.record_failure("u1", PARTIAL_SUCCESS_REASON));
        let failed = store.load(LogKind::Failed);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed["u1"], PARTIAL_SUCCESS_REASON);
    }

    #[test]
    fn test_written_json_uses_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert_ok!(store.record_success("https://a", "Dallas 2024 Q1.pdf"));
        let raw = std::fs::read_to_string(&store.paths().success).unwrap();
        assert_eq!(raw, "{\n    \"https://a\": \"Dallas 2024 Q1.pdf\"\n}");
    }

    #[test]
    fn test_ignore_set_is_union_of_all_logs() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert_ok!(store.record_success("a", "a.pdf"));
        assert_ok!(store.record_failure("b", "oops"));
        assert_ok!(store.record_irrelevant("c", IRRELEVANT_MARKER));

        let ignore = store.ignore_set();
        assert_eq!(ignore.len(), 3);
        assert!(ignore.contains("a") && ignore.contains("b") && ignore.contains("c"));
    }

    #[test]
    fn test_promote_moves_entry_from_failed_to_success() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert_ok!(store.record_failure("u", PARTIAL_SUCCESS_REASON));

        assert_ok!(store.promote("u", "Jackson MS 2023.pdf"));

        assert!(!store.load(LogKind::Failed).contains_key("u"));
        assert_eq!(store.load(LogKind::Success)["u"], "Jackson MS 2023.pdf");
    }

    #[test]
    fn test_mark_irrelevant_uses_fixed_marker() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert_ok!(store.record_failure("u", "Download timed out"));

        assert_ok!(store.mark_irrelevant("u"));

        assert!(!store.load(LogKind::Failed).contains_key("u"));
        assert_eq!(store.load(LogKind::Irrelevant)["u"], "Marked as irrelevant by user.");
    }

    #[test]
    fn test_promote_absent_url_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert_ok!(store.record_failure("other", "x"));

        let err = assert_err!(store.promote("missing", "f.pdf"));
        assert!(matches!(err, AppError::Log(LogError::UrlNotInFailedLog { .. })));
        assert!(store.load(LogKind::Success).is_empty());
        assert_eq!(store.load(LogKind::Failed).len(), 1);

        assert_err!(store.mark_irrelevant("missing"));
        assert!(!store.paths().irrelevant.exists());
    }

    #[test]
    fn test_counts() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert_ok!(store.record_success("a", "a.pdf"));
        assert_ok!(store.record_success("b", "b.pdf"));
        assert_ok!(store.record_failure("c", "x"));
        assert_eq!(
            store.counts(),
            LogCounts {
                success: 2,
                failed: 1,
                irrelevant: 0
            }
        );
    }
}
