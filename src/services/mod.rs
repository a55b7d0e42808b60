pub mod artifact_scanner;
pub mod downloader;
pub mod llm_service;
pub mod log_store;
pub mod page_crawler;
pub mod request_interpreter;
pub mod title_interpreter;

pub use artifact_scanner::scan_existing_files;
pub use downloader::DownloadOrganizer;
pub use llm_service::LlmService;
pub use log_store::{
    LogCounts, LogKind, LogMap, LogPaths, LogStore, IRRELEVANT_MARKER, PARTIAL_SUCCESS_REASON,
};
pub use page_crawler::{CrawlReport, CrawlStop, PageCrawler};
pub use request_interpreter::RequestInterpreter;
pub use title_interpreter::{LlmTitleInterpreter, TitleInterpreter};
