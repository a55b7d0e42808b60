//! 基础设施层：持有浏览器资源，只暴露能力

pub mod chrome_session;
pub mod js_executor;

pub use chrome_session::ChromeSession;
pub use js_executor::JsExecutor;
