//! 报告标题解析 - 业务能力层
//!
//! 把一批原始标题交给 LLM，一次性解析出市场名、年份和周期。
//! 结果是尽力而为的：可能缺字段、可能少条目，调用方不会自动重试。

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, LlmError};
use crate::models::ParsedReport;
use crate::services::llm_service::strip_code_fence;
use crate::services::LlmService;

/// 标题解析能力
#[async_trait]
pub trait TitleInterpreter: Send + Sync {
    /// 批量解析标题，返回的条目数可能少于输入
    async fn interpret(&self, titles: &[String]) -> AppResult<Vec<ParsedReport>>;
}

const SYSTEM_MESSAGE: &str =
    "You extract structured fields from commercial real estate report titles and answer with raw JSON only.";

/// 基于 LLM 的标题解析
pub struct LlmTitleInterpreter {
    llm: LlmService,
}

#[derive(Debug, Deserialize)]
struct ReportList {
    #[serde(default)]
    reports: Vec<ParsedReport>,
}

impl LlmTitleInterpreter {
    pub fn new(llm: LlmService) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl TitleInterpreter for LlmTitleInterpreter {
    async fn interpret(&self, titles: &[String]) -> AppResult<Vec<ParsedReport>> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        info!(
            "🧠 正在把 {} 个标题一次性交给 LLM 解析 (模型: {})...",
            titles.len(),
            self.llm.model_name()
        );

        let prompt = build_prompt(titles);
        let response = self.llm.send_to_llm(&prompt, Some(SYSTEM_MESSAGE)).await?;
        let reports = parse_reports(&response)?;

        info!("✓ LLM 解析完成: {} 条记录", reports.len());
        if reports.len() < titles.len() {
            warn!(
                "⚠️ LLM 只返回了 {}/{} 条记录",
                reports.len(),
                titles.len()
            );
        }
        Ok(reports)
    }
}

/// 构建批量解析 prompt，标题按 1 开始编号
pub fn build_prompt(titles: &[String]) -> String {
    let numbered = titles
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}. {}", i + 1, t))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Analyze each real estate report title from the numbered list below.
For each title, extract the 'original_title', 'market_name', 'year', and 'period'.
- The 'market_name' is the main geographical location.
- The 'year' is the four-digit year of the report.
- The 'period' is the time designation (e.g., 'Q1', 'H1'). Extract it exactly as it appears.
- The 'original_title' must be the exact, unmodified title from the list.
- Exclude generic words like "Industrial", "Figures", "Report", "Snapshot" from the 'market_name'.
- Leave a field as an empty string when it cannot be determined.

List of Titles:
{}

Return ONLY a raw JSON object with a single key "reports" which is a list of objects."#,
        numbered
    )
}

/// 解析 LLM 返回的 JSON，容忍 ``` 代码块包裹
pub fn parse_reports(response: &str) -> AppResult<Vec<ParsedReport>> {
    let body = strip_code_fence(response);
    debug!("LLM 原始响应: {}", body);

    let list: ReportList = serde_json::from_str(body).map_err(|e| {
        AppError::Llm(LlmError::ResponseParseFailed {
            response: crate::utils::logging::truncate_text(response, 200),
            source: Box::new(e),
        })
    })?;
    Ok(list.reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_prompt_numbers_titles() {
        let prompt = build_prompt(&["Dallas Q1 2024".to_string(), "Reno H2 2023".to_string()]);
        assert!(prompt.contains("1. Dallas Q1 2024\n2. Reno H2 2023"));
        assert!(prompt.contains(r#"single key "reports""#));
    }

    #[test]
    fn test_parse_plain_json() {
        let reports = parse_reports(
            r#"{"reports":[{"original_title":"Dallas Industrial Q1 2024","market_name":"Dallas","year":"2024","period":"Q1"}]}"#,
        )
        .unwrap();
        assert_eq!(
            reports,
            vec![ParsedReport::new("Dallas Industrial Q1 2024", "Dallas", "2024", "Q1")]
        );
    }

    #[test]
    fn test_parse_fenced_json_with_missing_fields() {
        let response = "```json\n{\"reports\": [{\"original_title\": \"Jackson MS 2023\", \"market_name\": \"Jackson MS\", \"year\": 2023}]}\n```";
        let reports = parse_reports(response).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].year, "2023");
        assert_eq!(reports[0].period, "");
        assert!(reports[0].archive_key().is_none());
    }

    #[test]
    fn test_parse_garbage_is_error() {
        let err = parse_reports("Sorry, I can't help with that.").unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::ResponseParseFailed { .. })));
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_interpretation() {
        let _ = tracing_subscriber::fmt::try_init();

        let interpreter = LlmTitleInterpreter::new(LlmService::new(&Config::from_env()));
        let reports = interpreter
            .interpret(&["Dallas/Ft. Worth Industrial Figures Q1 2024".to_string()])
            .await
            .unwrap();
        println!("{:#?}", reports);
        assert_eq!(reports.len(), 1);
    }
}
