//! 已有文件扫描 - 业务能力层

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// 递归扫描目录，返回所有已保存的 PDF 文件名
///
/// 目录不存在时返回空集合（首次保存时才会创建）。
pub fn scan_existing_files(root: &Path) -> AppResult<BTreeSet<String>> {
    let mut existing = BTreeSet::new();

    if !root.exists() {
        info!("归档目录 '{}' 不存在，保存第一个文件时会自动创建", root.display());
        return Ok(existing);
    }

    walk(root, &mut existing)?;

    info!("在 '{}' 中找到 {} 个已有 PDF 报告", root.display(), existing.len());
    Ok(existing)
}

fn walk(dir: &Path, found: &mut BTreeSet<String>) -> AppResult<()> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| AppError::file_read_failed(dir.display().to_string(), e))?;

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("跳过无法读取的目录项 ({}): {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                warn!("跳过无法识别的文件 ({}): {}", path.display(), e);
                continue;
            }
        };

        if file_type.is_dir() {
            walk(&path, found)?;
        } else if is_pdf(&path) {
            if let Some(name) = path.file_name() {
                found.insert(name.to_string_lossy().to_string());
            }
        }
    }

    Ok(())
}

/// 扩展名是否为 .pdf（区分大小写与原始行为保持一致）
pub fn is_pdf(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let found = scan_existing_files(&dir.path().join("nope")).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_scan_is_recursive_and_pdf_only() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("2024").join("2024 Q1");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("Dallas 2024 Q1.pdf"), b"%PDF").unwrap();
        std::fs::write(dir.path().join("download_log.json"), b"{}").unwrap();
        let review = dir.path().join("failed_downloads").join("Parsing_Error");
        std::fs::create_dir_all(&review).unwrap();
        std::fs::write(review.join("raw.pdf"), b"%PDF").unwrap();

        let found = scan_existing_files(dir.path()).unwrap();
        let names: Vec<_> = found.into_iter().collect();
        assert_eq!(names, vec!["Dallas 2024 Q1.pdf".to_string(), "raw.pdf".to_string()]);
    }
}
