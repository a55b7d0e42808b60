//! 报告下载与归档 - 业务能力层
//!
//! 打开报告详情页 → 点击下载 → 等待暂存目录出现 PDF → 按解析结果移动到归档位置。
//! 单个报告的任何失败都转成 [`DownloadOutcome::Error`]，不会中断整批处理。

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser::BrowserSession;
use crate::error::{AppError, AppResult, FileError};
use crate::models::{DownloadOutcome, Pacing, ParsedReport, SiteProfile};
use crate::services::artifact_scanner::is_pdf;
use crate::utils::{archive_dir, archive_filename, review_dir};

/// 浏览器未完成的下载文件后缀
const PARTIAL_DOWNLOAD_EXT: &str = "crdownload";

/// 报告下载器
pub struct DownloadOrganizer<'a> {
    staging_dir: &'a Path,
    output_root: &'a Path,
    profile: &'a SiteProfile,
    pacing: &'a Pacing,
}

/// 暂存目录的状态
enum Staged {
    InProgress,
    Ready(PathBuf),
    Empty,
}

impl<'a> DownloadOrganizer<'a> {
    pub fn new(
        staging_dir: &'a Path,
        output_root: &'a Path,
        profile: &'a SiteProfile,
        pacing: &'a Pacing,
    ) -> Self {
        Self {
            staging_dir,
            output_root,
            profile,
            pacing,
        }
    }

    /// 下载单个报告并归档
    ///
    /// # 参数
    /// - `existing`: 归档目录中已有的文件名，用于提示覆盖
    pub async fn download_and_organize<S: BrowserSession + ?Sized>(
        &self,
        session: &mut S,
        url: &str,
        parsed: &ParsedReport,
        existing: &BTreeSet<String>,
    ) -> DownloadOutcome {
        let staged = match self.fetch(session, url).await {
            Ok(Ok(path)) => path,
            Ok(Err(reason)) => return DownloadOutcome::Error { reason },
            Err(e) => {
                warn!("❌ 下载 {} 时出错: {}", url, e);
                return DownloadOutcome::error(format!("Error downloading from {}: {}", url, e));
            }
        };

        match self.organize(&staged, parsed, existing) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("❌ 归档 {} 失败: {}", staged.display(), e);
                DownloadOutcome::error(format!("Error organizing download from {}: {}", url, e))
            }
        }
    }

    /// 触发下载并等待文件落地
    ///
    /// 外层 `Err` 是浏览器或文件系统错误，内层 `Err` 是可预期的超时原因。
    async fn fetch<S: BrowserSession + ?Sized>(
        &self,
        session: &mut S,
        url: &str,
    ) -> AppResult<Result<PathBuf, String>> {
        session.navigate(url).await?;

        let control = self.profile.download_locator();
        if !session
            .wait_for(&control, self.pacing.download_control_wait)
            .await?
        {
            warn!("❌ 找不到下载按钮: {}", url);
            return Ok(Err(format!(
                "Error: Timed out locating download control on {}",
                url
            )));
        }

        self.clear_staging()?;

        if !session.click(&control).await? {
            warn!("❌ 下载按钮无法点击: {}", url);
            return Ok(Err(format!(
                "Error: Timed out locating download control on {}",
                url
            )));
        }

        for tick in 0..self.pacing.download_ticks {
            match self.inspect_staging()? {
                Staged::Ready(path) => {
                    info!("✓ 下载完成: {}", file_name_of(&path));
                    return Ok(Ok(path));
                }
                Staged::InProgress => debug!("下载进行中... ({}/{})", tick + 1, self.pacing.download_ticks),
                Staged::Empty => debug!("等待下载开始... ({}/{})", tick + 1, self.pacing.download_ticks),
            }
            if !self.pacing.download_tick.is_zero() {
                sleep(self.pacing.download_tick).await;
            }
        }

        warn!("❌ 下载超时: {}", url);
        Ok(Err(format!("Error: Download timed out for {}", url)))
    }

    /// 按解析结果移动文件
    ///
    /// 只有年份、周期、市场名都通过校验才会进入按日期归档的目录，
    /// 其余情况一律移入人工复核目录，已下载的文件不会留在暂存目录里。
    fn organize(
        &self,
        staged: &Path,
        parsed: &ParsedReport,
        existing: &BTreeSet<String>,
    ) -> AppResult<DownloadOutcome> {
        let Some(key) = parsed.archive_key() else {
            warn!(
                "⚠️ 标题解析不完整: market={:?} year={:?} period={:?}",
                parsed.market_name, parsed.year, parsed.period
            );
            return self.move_to_review(staged);
        };

        let filename = archive_filename(&key.market, &key.year, key.period);
        let folder = archive_dir(self.output_root, &key.year, key.period);
        let target = folder.join(&filename);

        if existing.contains(&filename) || target.exists() {
            warn!("⚠️ 已存在同名报告，将被覆盖: {}", filename);
        }
        if let Err(e) = create_dir(&folder).and_then(|_| move_file(staged, &target)) {
            warn!("⚠️ 无法归档到 {}: {}", target.display(), e);
            return self.move_to_review(staged);
        }
        info!("✅ 已保存: {}", target.display());

        Ok(DownloadOutcome::Success {
            filename,
            path: target,
        })
    }

    fn move_to_review(&self, staged: &Path) -> AppResult<DownloadOutcome> {
        let original_filename = file_name_of(staged);
        let folder = review_dir(self.output_root);
        create_dir(&folder)?;
        let target = folder.join(&original_filename);
        move_file(staged, &target)?;
        warn!("⚠️ 已移入人工复核目录: {}", target.display());
        Ok(DownloadOutcome::PartialSuccess {
            original_filename,
            path: target,
        })
    }

    /// 清空暂存目录中残留的文件
    fn clear_staging(&self) -> AppResult<()> {
        create_dir(self.staging_dir)?;
        for path in self.staged_files()? {
            if path.is_file() {
                std::fs::remove_file(&path)
                    .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
                debug!("已清理暂存文件: {}", path.display());
            }
        }
        Ok(())
    }

    fn inspect_staging(&self) -> AppResult<Staged> {
        let files = self.staged_files()?;
        if files.iter().any(|p| has_extension(p, PARTIAL_DOWNLOAD_EXT)) {
            return Ok(Staged::InProgress);
        }
        Ok(files
            .into_iter()
            .find(|p| is_pdf(p))
            .map(Staged::Ready)
            .unwrap_or(Staged::Empty))
    }

    /// 暂存目录中的文件（按名称排序）
    fn staged_files(&self) -> AppResult<Vec<PathBuf>> {
        let entries = match std::fs::read_dir(self.staging_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::file_read_failed(
                    self.staging_dir.display().to_string(),
                    e,
                ))
            }
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        files.sort();
        Ok(files)
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some(ext)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn create_dir(dir: &Path) -> AppResult<()> {
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::file_write_failed(dir.display().to_string(), e))
}

/// 移动文件；跨文件系统时 rename 会失败，退回到复制后删除
pub fn move_file(from: &Path, to: &Path) -> AppResult<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }

    let moved = std::fs::copy(from, to).and_then(|_| std::fs::remove_file(from));
    moved.map_err(|e| {
        AppError::File(FileError::MoveFailed {
            from: from.display().to_string(),
            to: to.display().to_string(),
            source: Box::new(e),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_file_replaces_existing_target() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("a.pdf");
        let to = dir.path().join("b.pdf");
        std::fs::write(&from, b"new").unwrap();
        std::fs::write(&to, b"old").unwrap();

        move_file(&from, &to).unwrap();

        assert!(!from.exists());
        assert_eq!(std::fs::read(&to).unwrap(), b"new");
    }

    #[test]
    fn test_move_missing_file_is_move_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = move_file(&dir.path().join("missing.pdf"), &dir.path().join("x.pdf"))
            .unwrap_err();
        assert!(matches!(err, AppError::File(FileError::MoveFailed { .. })));
    }

    #[test]
    fn test_staging_waits_while_partial_download_present() {
        let dir = tempfile::tempdir().unwrap();
        let profile = SiteProfile::default();
        let pacing = Pacing::immediate();
        let organizer = DownloadOrganizer::new(dir.path(), dir.path(), &profile, &pacing);

        assert!(matches!(organizer.inspect_staging().unwrap(), Staged::Empty));

        std::fs::write(dir.path().join("report.pdf.crdownload"), b"..").unwrap();
        std::fs::write(dir.path().join("old.pdf"), b"%PDF").unwrap();
        assert!(matches!(organizer.inspect_staging().unwrap(), Staged::InProgress));

        std::fs::remove_file(dir.path().join("report.pdf.crdownload")).unwrap();
        match organizer.inspect_staging().unwrap() {
            Staged::Ready(path) => assert_eq!(file_name_of(&path), "old.pdf"),
            _ => panic!("expected a ready pdf"),
        }
    }

    #[test]
    fn test_incomplete_parse_goes_to_review_folder() {
        let staging = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let profile = SiteProfile::default();
        let pacing = Pacing::immediate();
        let organizer = DownloadOrganizer::new(staging.path(), root.path(), &profile, &pacing);

        let staged = staging.path().join("Dallas_Q1.pdf");
        std::fs::write(&staged, b"%PDF").unwrap();
        let parsed = ParsedReport::new("Dallas Industrial Q1", "Dallas", "", "Q1");

        let outcome = organizer.organize(&staged, &parsed, &BTreeSet::new()).unwrap();

        let expected = root
            .path()
            .join("failed_downloads")
            .join("Parsing_Error")
            .join("Dallas_Q1.pdf");
        assert_eq!(
            outcome,
            DownloadOutcome::PartialSuccess {
                original_filename: "Dallas_Q1.pdf".to_string(),
                path: expected.clone(),
            }
        );
        assert!(expected.exists());
        assert!(!root.path().join("2024").exists());
    }

    #[test]
    fn test_complete_parse_goes_to_dated_folder() {
        let staging = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let profile = SiteProfile::default();
        let pacing = Pacing::immediate();
        let organizer = DownloadOrganizer::new(staging.path(), root.path(), &profile, &pacing);

        let staged = staging.path().join("download.pdf");
        std::fs::write(&staged, b"%PDF").unwrap();
        let parsed = ParsedReport::new("t", "Dallas/Ft. Worth", "2024", "Q1");

        let outcome = organizer.organize(&staged, &parsed, &BTreeSet::new()).unwrap();

        let expected = root
            .path()
            .join("2024")
            .join("2024 Q1")
            .join("Dallas-Ft Worth 2024 Q1.pdf");
        assert_eq!(
            outcome,
            DownloadOutcome::Success {
                filename: "Dallas-Ft Worth 2024 Q1.pdf".to_string(),
                path: expected.clone(),
            }
        );
        assert!(expected.exists());
        assert!(!staged.exists());
    }

    #[test]
    fn test_unsafe_year_or_period_goes_to_review_folder() {
        let profile = SiteProfile::default();
        let pacing = Pacing::immediate();
        let cases = [
            ("Dallas", "2024", "Q1/Q2"),
            ("X", "..", "Q1"),
            ("Dallas", "2024", "../Q1"),
            (" . . ", "2024", "Q1"),
        ];

        for (market, year, period) in cases {
            let staging = tempfile::tempdir().unwrap();
            let parent = tempfile::tempdir().unwrap();
            let root = parent.path().join("archive");
            let organizer = DownloadOrganizer::new(staging.path(), &root, &profile, &pacing);

            let staged = staging.path().join("dallas.pdf");
            std::fs::write(&staged, b"%PDF").unwrap();
            let parsed = ParsedReport::new("t", market, year, period);

            let outcome = organizer.organize(&staged, &parsed, &BTreeSet::new()).unwrap();

            let expected = review_dir(&root).join("dallas.pdf");
            assert_eq!(
                outcome,
                DownloadOutcome::PartialSuccess {
                    original_filename: "dallas.pdf".to_string(),
                    path: expected.clone(),
                },
                "{:?}",
                (market, year, period)
            );
            assert!(expected.exists());
            assert!(!staged.exists());
            let siblings: Vec<_> = std::fs::read_dir(parent.path())
                .unwrap()
                .map(|e| e.unwrap().file_name())
                .collect();
            assert_eq!(siblings, vec![std::ffi::OsString::from("archive")]);
        }
    }

    #[test]
    fn test_period_token_is_normalized_in_archive_path() {
        let staging = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let profile = SiteProfile::default();
        let pacing = Pacing::immediate();
        let organizer = DownloadOrganizer::new(staging.path(), root.path(), &profile, &pacing);

        let staged = staging.path().join("download.pdf");
        std::fs::write(&staged, b"%PDF").unwrap();
        let parsed = ParsedReport::new("t", "Reno", " 2023", "year-end");

        let outcome = organizer.organize(&staged, &parsed, &BTreeSet::new()).unwrap();

        let expected = root.path().join("2023").join("2023 YE").join("Reno 2023 YE.pdf");
        assert_eq!(
            outcome,
            DownloadOutcome::Success {
                filename: "Reno 2023 YE.pdf".to_string(),
                path: expected.clone(),
            }
        );
        assert!(expected.exists());
    }
}
