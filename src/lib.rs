//! # Market Report Archiver
//!
//! 自动抓取、下载并归档商业地产市场报告（PDF）的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() 能力
//! - `ChromeSession` - 基于 chromiumoxide 实现 `BrowserSession`
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `PageCrawler` - 筛选、排序、分页提取报告链接
//! - `DownloadOrganizer` - 下载单个报告并按年份/周期归档
//! - `LogStore` - 成功 / 失败 / 无关三份 JSON 日志
//! - `TitleInterpreter` - 用 LLM 批量解析报告标题
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个报告"的完整处理流程
//! - `ReportCtx` - 上下文封装（序号 + url）
//! - `ReportFlow` - 流程编排（download → organize → log）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 命令入口，管理浏览器会话
//! - `orchestrator/archive_run` - 单次归档运行（抓取 → 去重 → 解析 → 下载 → 汇总）
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{BrowserSession, Locator};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ChromeSession, JsExecutor};
pub use models::{DownloadOutcome, ParsedReport, Period, ReportCandidate};
pub use orchestrator::{run_archive, App, ArchiveRequest};
pub use services::{LogStore, TitleInterpreter};
pub use workflow::{ReportCtx, ReportFlow};
