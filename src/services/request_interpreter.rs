//! 自然语言请求解析 - 业务能力层
//!
//! 把一句自由文本（例如 "帮我下载 2024 年 Q2 的美国工业报告"）交给 LLM，
//! 抽取出国家、物业类型、年份、周期和关键词，得到一个 [`ArchiveRequest`]。
//! 没有提到的字段使用默认值，用户给出的年份不做合理性质疑。

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, LlmError};
use crate::models::{ArchiveRequest, Period};
use crate::services::llm_service::strip_code_fence;
use crate::services::LlmService;

const SYSTEM_MESSAGE: &str = "You are a highly specialized assistant for fetching real estate reports. \
Turn the user's request into search parameters for the report archiver and answer with raw JSON only. \
Do not make assumptions or question the user's input, such as the requested year.";

/// LLM 返回的字段，全部可缺省
#[derive(Debug, Default, Deserialize)]
struct RequestFields {
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    property_type: Option<String>,
    #[serde(default)]
    year: Option<Value>,
    #[serde(default)]
    period: Option<String>,
    #[serde(default)]
    keywords: Option<Vec<String>>,
}

/// 基于 LLM 的请求解析
pub struct RequestInterpreter {
    llm: LlmService,
}

impl RequestInterpreter {
    pub fn new(llm: LlmService) -> Self {
        Self { llm }
    }

    pub async fn interpret(&self, text: &str) -> AppResult<ArchiveRequest> {
        info!("🧠 正在解析请求 (模型: {}): {}", self.llm.model_name(), text);

        let prompt = build_request_prompt(text);
        let response = self.llm.send_to_llm(&prompt, Some(SYSTEM_MESSAGE)).await?;
        let request = parse_request(&response)?;

        info!(
            "✓ 请求解析完成: country={} property_type={} year={:?} period={:?} keywords={:?}",
            request.country, request.property_type, request.year, request.period, request.keywords
        );
        Ok(request)
    }
}

/// 构建请求解析 prompt，默认值与命令行 `run` 保持一致
pub fn build_request_prompt(text: &str) -> String {
    let defaults = ArchiveRequest::default();
    format!(
        r#"Extract search parameters for CBRE market reports from the request below.
- "country": the country filter. Use "{country}" if the request does not name one.
- "property_type": the property type filter. Use "{property_type}" if the request does not name one.
- "year": the four-digit report year as a number, or null if no year is requested.
- "period": one of "Q1", "Q2", "Q3", "Q4", "H1", "H2", "YE", or null if no period is requested.
- "keywords": words every report title must contain (for example a market name), or an empty list.
If the request is broad, keep the defaults and leave year and period null.

Request:
{text}

Return ONLY a raw JSON object with exactly these keys: "country", "property_type", "year", "period", "keywords"."#,
        country = defaults.country,
        property_type = defaults.property_type,
        text = text.trim(),
    )
}

/// 解析 LLM 返回的 JSON，缺省字段回落到默认值
pub fn parse_request(response: &str) -> AppResult<ArchiveRequest> {
    let body = strip_code_fence(response);
    debug!("LLM 原始响应: {}", body);

    let fields: RequestFields = serde_json::from_str(body).map_err(|e| {
        AppError::Llm(LlmError::ResponseParseFailed {
            response: crate::utils::logging::truncate_text(response, 200),
            source: Box::new(e),
        })
    })?;

    let defaults = ArchiveRequest::default();
    Ok(ArchiveRequest {
        country: non_blank(fields.country).unwrap_or(defaults.country),
        property_type: non_blank(fields.property_type).unwrap_or(defaults.property_type),
        year: fields.year.and_then(parse_year),
        period: non_blank(fields.period).and_then(|token| {
            let period = Period::from_token(&token);
            if period.is_none() {
                warn!("⚠️ 无法识别的周期 '{}'，忽略周期条件", token);
            }
            period
        }),
        keywords: fields
            .keywords
            .unwrap_or_default()
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect(),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 年份既可能是数字也可能是字符串
fn parse_year(value: Value) -> Option<i32> {
    let year = match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    if year.is_none() {
        warn!("⚠️ 无法识别的年份，忽略年份条件");
    }
    year
}
