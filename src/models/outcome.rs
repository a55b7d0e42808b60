use std::path::PathBuf;

/// 单个报告下载/整理的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// 下载并按年份/周期归档
    Success { filename: String, path: PathBuf },
    /// 已下载但标题解析不完整，文件移入人工复核目录
    PartialSuccess {
        original_filename: String,
        path: PathBuf,
    },
    /// 下载失败
    Error { reason: String },
}

impl DownloadOutcome {
    pub fn error(reason: impl Into<String>) -> Self {
        DownloadOutcome::Error {
            reason: reason.into(),
        }
    }
}
