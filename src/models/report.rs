use serde::{Deserialize, Serialize};

use crate::models::Period;
use crate::utils::sanitize_market;

/// 抓取到的候选报告（仅在一次运行中存在）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCandidate {
    pub url: String,
    pub raw_title: String,
}

impl ReportCandidate {
    pub fn new(url: impl Into<String>, raw_title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            raw_title: raw_title.into(),
        }
    }
}

/// 标题解析结果
///
/// 任意字段为空或无法识别都表示解析不完整，这是一种正常状态而不是需要重试的错误。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReport {
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub market_name: String,
    #[serde(default, deserialize_with = "deserialize_loose_string")]
    pub year: String,
    #[serde(default)]
    pub period: String,
}

impl ParsedReport {
    pub fn new(
        original_title: impl Into<String>,
        market_name: impl Into<String>,
        year: impl Into<String>,
        period: impl Into<String>,
    ) -> Self {
        Self {
            original_title: original_title.into(),
            market_name: market_name.into(),
            year: year.into(),
            period: period.into(),
        }
    }

    /// 校验后的归档字段
    ///
    /// 年份必须是 4 位数字，周期必须是可识别的 token，市场名清理后不能为空。
    /// 这三个值会直接拼进归档路径，任一不满足都返回 `None`。
    pub fn archive_key(&self) -> Option<ArchiveKey> {
        let market = sanitize_market(&self.market_name);
        if market.is_empty() {
            return None;
        }
        let year = self.year.trim();
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let period = Period::from_token(&self.period)?;
        Some(ArchiveKey {
            market,
            year: year.to_string(),
            period,
        })
    }
}

/// 可以安全用于归档路径的市场名、年份和周期
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveKey {
    pub market: String,
    pub year: String,
    pub period: Period,
}

/// 年份既可能是字符串也可能是数字（LLM 输出并不稳定）
fn deserialize_loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}
