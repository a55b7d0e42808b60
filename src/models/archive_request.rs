use serde::{Deserialize, Serialize};

use crate::models::{Period, ScrapeConfig};

/// 一次归档请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRequest {
    pub country: String,
    pub property_type: String,
    pub year: Option<i32>,
    pub period: Option<Period>,
    /// 链接文字必须包含的关键词
    pub keywords: Vec<String>,
}

impl Default for ArchiveRequest {
    fn default() -> Self {
        Self {
            country: "United States".to_string(),
            property_type: "Industrial and Logistics".to_string(),
            year: None,
            period: None,
            keywords: Vec::new(),
        }
    }
}

impl ArchiveRequest {
    /// 转换为抓取参数：先筛物业类型再筛国家，按最新排序，指定年份时启用提前停止
    pub fn scrape_config(&self) -> ScrapeConfig {
        ScrapeConfig {
            filters: vec![
                ("Property Type".to_string(), self.property_type.clone()),
                ("Country".to_string(), self.country.clone()),
            ],
            sort_by: Some("Most Recent".to_string()),
            keywords: self.keywords.clone(),
            enable_early_stopping: self.year.is_some(),
            target_year: self.year,
            target_period: self.period,
        }
    }
}
