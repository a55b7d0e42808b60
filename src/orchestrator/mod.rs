//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一次运行的资源管理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 加载站点配置
//! - 按命令创建浏览器会话（ChromeSession）和标题解析器
//! - `ask` 命令先把自然语言请求解析成 ArchiveRequest，再走一次归档运行
//! - 日志维护命令（promote / mark-irrelevant）和扫描命令
//!
//! ### `archive_run` - 单次归档运行
//! - 读取日志得到忽略集合
//! - 抓取、去重、批量解析标题
//! - 创建并复用 ReportFlow 逐个下载
//! - 汇总摘要，兜底捕获未预料的错误，总是关闭会话
//!
//! ## 层次关系
//!
//! ```text
//! app (处理命令)
//!     ↓
//! archive_run (处理 Vec<ReportCandidate>)
//!     ↓
//! workflow::ReportFlow (处理单个报告)
//!     ↓
//! services (能力层：crawl / download / logs / llm)
//!     ↓
//! infrastructure (基础设施：ChromeSession / JsExecutor)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源隔离**：只有编排层创建和关闭浏览器会话
//! 2. **向下依赖**：编排层 → workflow → services → infrastructure
//! 3. **顺序执行**：所有浏览器操作依次 await，同一时间只有一个页面在工作

pub mod app;
pub mod archive_run;

// 重新导出主要类型
pub use app::App;
pub use archive_run::{fatal_message, run_archive, ArchiveRequest, RunSettings, RunStats};
