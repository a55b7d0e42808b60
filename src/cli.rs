use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use market_report_archiver::models::Period;
use market_report_archiver::orchestrator::ArchiveRequest;
use market_report_archiver::Config;

#[derive(Parser, Debug)]
#[command(
    name = "report-archiver",
    version,
    about = "Crawl, download and archive commercial real estate market reports"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Archive root (also holds the three JSON logs)
    #[arg(long, global = true)]
    pub output_root: Option<PathBuf>,

    /// Browser download staging directory
    #[arg(long, global = true)]
    pub staging_dir: Option<PathBuf>,

    /// TOML file overriding the site selectors
    #[arg(long, global = true)]
    pub profile: Option<PathBuf>,

    /// Show the browser window
    #[arg(long, global = true, default_value_t = false)]
    pub headed: bool,

    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl the reports page and archive every new report
    Run(RunArgs),
    /// Describe what to archive in plain language and run it
    Ask(AskArgs),
    /// Move a url from the failed log to the success log
    Promote(PromoteArgs),
    /// Move a url from the failed log to the irrelevant log
    MarkIrrelevant(MarkIrrelevantArgs),
    /// List the filter panels and their options
    Filters,
    /// Count the PDFs already in the archive
    Scan(ScanArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[arg(long, default_value = "United States")]
    pub country: String,

    #[arg(long, default_value = "Industrial and Logistics")]
    pub property_type: String,

    #[arg(long)]
    pub year: Option<i32>,

    /// Q1-Q4, H1, H2 or YE
    #[arg(long)]
    pub period: Option<Period>,

    /// Substring every report title must contain (repeatable)
    #[arg(long = "keyword")]
    pub keywords: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    /// Free-text request, e.g. "Q2 2024 industrial reports for Dallas"
    #[arg(required = true, num_args = 1..)]
    pub request: Vec<String>,
}

impl AskArgs {
    pub fn text(&self) -> String {
        self.request.join(" ")
    }
}

#[derive(Args, Debug, Clone)]
pub struct PromoteArgs {
    pub url: String,
    /// Final filename after manual review
    pub filename: String,
}

#[derive(Args, Debug, Clone)]
pub struct MarkIrrelevantArgs {
    pub url: String,
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Print every filename
    #[arg(long, default_value_t = false)]
    pub list: bool,
}

impl GlobalArgs {
    /// 命令行参数覆盖环境变量配置
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(root) = &self.output_root {
            config.output_root = root.clone();
        }
        if let Some(staging) = &self.staging_dir {
            config.staging_dir = staging.clone();
        }
        if let Some(profile) = &self.profile {
            config.site_profile = Some(profile.clone());
        }
        if self.headed {
            config.headless = false;
        }
        if self.verbose {
            config.verbose_logging = true;
        }
        config
    }
}

impl From<RunArgs> for ArchiveRequest {
    fn from(args: RunArgs) -> Self {
        Self {
            country: args.country,
            property_type: args.property_type,
            year: args.year,
            period: args.period,
            keywords: args.keywords,
        }
    }
}
