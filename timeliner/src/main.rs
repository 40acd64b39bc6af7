/*
timeliner - main.rs
Fetches news articles for a topic, prints them, and prints a timeline +
summary produced by the generation service (or the deterministic fallback).
*/

use anyhow::Result;
use clap::Parser;
use common::Config;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use timeliner::fetch::NewsClient;
use timeliner::llm::summarizer::TimelineSummarizer;

#[derive(Parser, Debug)]
#[command(name = "timeliner", about = "Topic timeline builder")]
struct Args {
    /// Event / topic to search for
    topic: String,

    /// Number of articles to fetch (1-12)
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(1..=12))]
    limit: u32,

    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Pick up API keys from a local .env if present
    dotenv::dotenv().ok();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Resolve config paths
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() {
            Some(p)
        } else {
            None
        }
    };

    // Load configuration with defaults
    let config = match Config::load_with_defaults(
        if default_path.exists() { Some(&default_path) } else { None },
        override_path.as_deref(),
    )
    .await
    {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(%e, "failed to load configuration");
            return Err(e);
        }
    };
    info!(default = ?default_path, overrides = ?override_path, "configuration loaded");

    // A missing search credential is fatal; nothing to summarize without articles.
    let news_config = config.news.clone().unwrap_or_default();
    let client = match NewsClient::from_config(&news_config) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "cannot initialize news client");
            return Err(e.into());
        }
    };

    info!(topic = %args.topic, limit = args.limit, "fetching articles");
    let articles = match client.fetch(&args.topic, args.limit).await {
        Ok(a) => a,
        Err(e) => {
            error!(%e, "fetch failed");
            return Err(e.into());
        }
    };
    println!("Fetched {} articles for \"{}\"\n", articles.len(), args.topic);

    for article in &articles {
        println!("{}", article.headline);
        if !article.summary.is_empty() {
            println!("{}", article.summary);
        }
        println!("{} | {}", article.published, article.source);
        if !article.url.is_empty() {
            println!("{}", article.url);
        }
        println!("---");
    }

    let llm_config = config.llm.clone().unwrap_or_default();
    let summarizer = TimelineSummarizer::from_config(&llm_config);
    let summary = summarizer.summarize(&articles).await;

    println!("\nTimeline & Summary\n");
    println!("{}", summary);

    Ok(())
}
