use crate::error::{AppError, AppResult, FileError};
use crate::models::site_profile::SiteProfile;
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载站点选择器配置，缺失的键使用默认值
pub async fn load_site_profile(toml_file_path: &Path) -> AppResult<SiteProfile> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(toml_file_path.display().to_string(), e))?;

    let profile: SiteProfile = toml::from_str(&content).map_err(|e| {
        AppError::File(FileError::TomlParseFailed {
            path: toml_file_path.display().to_string(),
            source: Box::new(e),
        })
    })?;

    tracing::info!("已加载站点配置: {}", toml_file_path.display());

    Ok(profile)
}

/// 有路径时加载配置文件，否则返回默认配置
pub async fn load_site_profile_or_default(path: Option<&Path>) -> AppResult<SiteProfile> {
    match path {
        Some(p) => load_site_profile(p).await,
        None => Ok(SiteProfile::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_site_profile_overrides_selected_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.toml");
        std::fs::write(&path, "next_page = \"a.next\"\nreports_tab = \"#reports\"\n").unwrap();

        let profile = load_site_profile(&path).await.unwrap();
        assert_eq!(profile.next_page, "a.next");
        assert_eq!(profile.reports_tab, "#reports");
        assert_eq!(profile.download_control, SiteProfile::default().download_control);
    }

    #[tokio::test]
    async fn test_invalid_toml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "next_page = ").unwrap();

        let err = load_site_profile(&path).await.unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[tokio::test]
    async fn test_default_profile_without_path() {
        let profile = load_site_profile_or_default(None).await.unwrap();
        assert_eq!(profile, SiteProfile::default());
    }
}
