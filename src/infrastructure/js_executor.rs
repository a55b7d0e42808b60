//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"在当前文档上下文执行 JS"的能力

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::browser::Locator;
use crate::error::AppResult;

/// 查询辅助函数：`__all(doc, locator)` 以及当前上下文根文档 `__root`
const DOM_PRELUDE: &str = r#"
const __all = (doc, loc) => {
    if (!doc) return [];
    if (loc.kind === 'css') return Array.from(doc.querySelectorAll(loc.value));
    const snap = doc.evaluate(loc.value, doc, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
    const out = [];
    for (let i = 0; i < snap.snapshotLength; i++) out.push(snap.snapshotItem(i));
    return out;
};
const __root = (() => {
    if (__frame === null) return document;
    const frame = __all(document, __frame)[0];
    return frame && frame.contentDocument ? frame.contentDocument : null;
})();
"#;

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 记录当前所在的 iframe（若有）
/// - 暴露 eval() 能力，不认识报告或日志
pub struct JsExecutor {
    page: Page,
    frame: Option<Locator>,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page, frame: None }
    }

    /// 获取 page 的引用（用于导航等操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 设置当前 iframe 上下文，`None` 表示顶层文档
    pub fn set_frame(&mut self, frame: Option<Locator>) {
        self.frame = frame;
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> AppResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 在当前上下文执行一段函数体
    ///
    /// 函数体中可以使用 `__all(doc, loc)`、`__root` 以及 `args` 中的参数。
    pub async fn eval_in_context<T: DeserializeOwned>(
        &self,
        body: &str,
        args: JsonValue,
    ) -> AppResult<T> {
        let script = build_context_script(self.frame.as_ref(), body, &args)?;
        self.eval_as(script).await
    }
}

/// 拼接完整的 IIFE 脚本
fn build_context_script(
    frame: Option<&Locator>,
    body: &str,
    args: &JsonValue,
) -> AppResult<String> {
    let frame_json = serde_json::to_string(&frame)?;
    let args_json = serde_json::to_string(args)?;
    Ok(format!(
        "(() => {{\nconst __frame = {};\nconst args = {};\n{}\n{}\n}})()",
        frame_json, args_json, DOM_PRELUDE, body
    ))
}
