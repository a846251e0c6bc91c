use anyhow::Context;
use clap::Parser;
use crypto_news::config::NewsConfig;
use crypto_news::{ArticleOptions, MemoryArticleStore, NewsService, PgArticleStore};
use interfaces::{ArticleStore, Category};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Crypto news ingestion and lifecycle service", long_about = None)]
struct Cli {
    /// JSON config file; defaults apply when omitted
    #[arg(long, env = "CRYPTO_NEWS_CONFIG")]
    config: Option<String>,
    /// PostgreSQL connection string; the in-memory store is used when absent
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run one ingestion pass
    Ingest,
    /// Run one retention and cap sweep
    Purge,
    /// Per-category counts against their caps
    Stats,
    /// Query the read path
    Articles {
        #[arg(long)]
        network: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        breaking: Option<bool>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Ingest and purge on a fixed interval until interrupted
    Watch {
        #[arg(long, default_value_t = 900)]
        interval_secs: u64,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn open_store(database_url: Option<&str>) -> anyhow::Result<Arc<dyn ArticleStore>> {
    match database_url {
        Some(url) => {
            let store = PgArticleStore::connect(url)
                .await
                .context("Failed to connect to PostgreSQL")?;
            store.ensure_schema().await.context("Failed to prepare schema")?;
            info!("Using PostgreSQL article store");
            Ok(Arc::new(store))
        }
        None => {
            warn!("DATABASE_URL not set, articles are kept in memory only");
            Ok(Arc::new(MemoryArticleStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => NewsConfig::from_file(path).with_context(|| format!("Failed to load config {}", path))?,
        None => NewsConfig::default(),
    };
    let store = open_store(cli.database_url.as_deref()).await?;
    let service = NewsService::builder(config).store(store).build()?;

    match cli.command {
        Commands::Ingest => print_json(&service.run_ingestion_pass().await?)?,
        Commands::Purge => print_json(&service.run_purge().await?)?,
        Commands::Stats => print_json(&service.category_report().await?)?,
        Commands::Articles {
            network,
            category,
            breaking,
            search,
            page,
            limit,
        } => {
            let options = ArticleOptions {
                page,
                limit,
                network,
                category,
                breaking,
                search,
                ..Default::default()
            };
            print_json(&service.get_articles(&options).await?)?;
        }
        Commands::Watch { interval_secs } => {
            let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
            loop {
                ticker.tick().await;
                match service.run_ingestion_pass().await {
                    Ok(report) => print_json(&report)?,
                    Err(e) => error!("Ingestion pass failed: {}", e),
                }
                match service.run_purge().await {
                    Ok(report) => info!(removed = report.total_removed(), "Purge sweep finished"),
                    Err(e) => error!("Purge sweep failed: {}", e),
                }
            }
        }
    }

    Ok(())
}
