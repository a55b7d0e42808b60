//! 归档文件命名

use std::path::{Path, PathBuf};

use crate::models::Period;

/// 文件名中不允许出现的字符
const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// 清理市场名，使其可以安全用于文件名
///
/// 非法字符和控制字符替换为 `-`，删除 `.`，连续空白（包括换行）合并为一个空格。
pub fn sanitize_market(name: &str) -> String {
    let replaced: String = name
        .chars()
        .filter(|c| *c != '.')
        .map(|c| {
            if c.is_whitespace() {
                ' '
            } else if FORBIDDEN.contains(&c) || c.is_control() {
                '-'
            } else {
                c
            }
        })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 归档文件名：`<市场> <年份> <周期>.pdf`
pub fn archive_filename(market: &str, year: &str, period: Period) -> String {
    format!("{} {} {}.pdf", sanitize_market(market), year.trim(), period.name())
}

/// 归档目录：`<root>/<年份>/<年份> <周期>`
pub fn archive_dir(root: &Path, year: &str, period: Period) -> PathBuf {
    let year = year.trim();
    root.join(year).join(format!("{} {}", year, period.name()))
}

/// 人工复核目录：`<root>/failed_downloads/Parsing_Error`
pub fn review_dir(root: &Path) -> PathBuf {
    root.join("failed_downloads").join("Parsing_Error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_forbidden_and_drops_dots() {
        assert_eq!(sanitize_market("St. Louis"), "St Louis");
        assert_eq!(sanitize_market("Dallas/Ft. Worth"), "Dallas-Ft Worth");
        assert_eq!(sanitize_market("a:b*c?d\"e<f>g|h\\i"), "a-b-c-d-e-f-g-h-i");
    }

    #[test]
    fn test_sanitize_collapses_whitespace() {
        assert_eq!(sanitize_market("  Inland   Empire\t "), "Inland Empire");
        assert_eq!(sanitize_market("Reno\nSparks"), "Reno Sparks");
        assert_eq!(sanitize_market("Reno\u{7}Sparks"), "Reno-Sparks");
        assert_eq!(sanitize_market(" . .\t"), "");
    }

    #[test]
    fn test_archive_layout() {
        let root = Path::new("CBRE_Reports");
        assert_eq!(
            archive_dir(root, "2024", Period::Q1),
            PathBuf::from("CBRE_Reports/2024/2024 Q1")
        );
        assert_eq!(
            archive_filename("Dallas/Ft. Worth", "2024", Period::Q1),
            "Dallas-Ft Worth 2024 Q1.pdf"
        );
        assert_eq!(
            review_dir(root),
            PathBuf::from("CBRE_Reports/failed_downloads/Parsing_Error")
        );
    }
}
