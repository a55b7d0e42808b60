mod cli;
mod logger;

use anyhow::Result;
use clap::Parser;
use tracing::error;

use market_report_archiver::{App, Config};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    // 读取 .env（不存在时忽略）
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // 加载配置，命令行参数优先
    let config = cli.global.apply(Config::from_env());

    // 初始化日志
    logger::init(config.verbose_logging);

    if let Err(err) = run(cli.command, config).await {
        error!("❌ 命令执行失败: {}", err);
        for cause in err.chain().skip(1) {
            error!("   原因: {}", cause);
        }
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: Config) -> Result<()> {
    let app = App::initialize(config).await?;

    match command {
        Commands::Run(args) => {
            let summary = app.run(&args.into()).await?;
            println!("{}", summary);
        }
        Commands::Ask(args) => {
            let summary = app.ask(&args.text()).await?;
            println!("{}", summary);
        }
        Commands::Promote(args) => {
            app.promote(&args.url, &args.filename)?;
            println!("Moved '{}' to the success log as '{}'.", args.url, args.filename);
        }
        Commands::MarkIrrelevant(args) => {
            app.mark_irrelevant(&args.url)?;
            println!("Marked '{}' as irrelevant.", args.url);
        }
        Commands::Filters => {
            let filters = app.filters().await?;
            if filters.is_empty() {
                println!("No filter panels found.");
            }
            for (title, values) in filters {
                println!("{}:", title);
                for value in values {
                    println!("  - {}", value);
                }
            }
        }
        Commands::Scan(args) => {
            let existing = app.scan()?;
            app.log_counts();
            println!(
                "{} PDF reports in '{}'.",
                existing.len(),
                app.config().output_root.display()
            );
            if args.list {
                for name in existing {
                    println!("  {}", name);
                }
            }
        }
    }

    Ok(())
}
