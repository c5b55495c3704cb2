use chrono::Utc;
use colored::*;
use ftp_crawler::{Collaborators, CrawlerConfig, Crawler, FtpConnector, StdLog};
use std::sync::Arc;

// Human-readable output goes to stderr; stdout may be carrying index records.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        let program = args.first().map(String::as_str).unwrap_or("ftp_crawler");
        eprintln!("{} Usage: {} <config_file> [ftp-url ...]", "❌".red(), program);
        std::process::exit(1);
    }

    let mut config = CrawlerConfig::load(&args[1])?;
    config.targets.extend(args[2..].iter().cloned());

    eprintln!("{}", "=".repeat(80).blue());
    eprintln!("🚀 {} - FTP directory crawler", "ftp_crawler".bold().green());
    eprintln!("{}", "=".repeat(80).blue());
    eprintln!("📁 Config file: {}", args[1].cyan());
    eprintln!("🎯 Targets: {}", config.targets.len().to_string().cyan());
    eprintln!("🕐 Started at: {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
    eprintln!("{}", "=".repeat(80).blue());

    let collab = Collaborators::new(Arc::new(FtpConnector), config.open_index()?, Arc::new(StdLog));
    let crawler = Arc::new(Crawler::new(config.settings(), collab));

    for url in &config.targets {
        if let Err(e) = crawler.add_target(url) {
            eprintln!("{} Skipping {}: {}", "⚠️".yellow(), url.red(), e);
        }
    }

    let on_signal = Arc::clone(&crawler);
    ctrlc::set_handler(move || {
        eprintln!("{} Received shutdown signal, stopping all targets...", "🛑".red());
        on_signal.shutdown();
    })?;

    let mut failed = 0;
    for outcome in crawler.crawl_all() {
        match outcome.result {
            Ok(stats) => eprintln!(
                "{} {}: {} files, {} directories, {} listing failures, {} index failures",
                "✅".green(),
                outcome.url.cyan(),
                stats.files_emitted,
                stats.directories_listed,
                stats.listing_failures,
                stats.index_failures
            ),
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", "❌".red(), outcome.url.cyan(), e);
            }
        }
    }

    eprintln!("🏁 Finished at {} ({} failed)", Utc::now().format("%H:%M:%S"), failed);
    Ok(())
}
