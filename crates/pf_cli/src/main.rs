use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use pf_core::{
    ArticleExtractor, ArticleIndexDiscoverer, InferenceModel, UserId, DEFAULT_PAGE_SIZE,
};
use pf_inference::PromptClassifier;
use pf_scanner::{
    http_client, init_logging, BlogScanOrchestrator, HtmlArticleExtractor, HtmlIndexDiscoverer,
    LlmArticleExtractor, LlmIndexDiscoverer, ScanConfig, ThreadGenerator,
};
use pf_storage::Stores;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod duration;

use duration::HumanDuration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Scan blogs for articles that fit a user's interests", long_about = None)]
pub struct Cli {
    /// Storage backend: sqlite or memory
    #[arg(long, env = "PFIT_STORAGE", default_value = "sqlite")]
    storage: String,
    /// Database file for the sqlite backend
    #[arg(long, env = "PFIT_DATABASE")]
    database: Option<String>,
    /// Model backend: openai (any compatible endpoint) or dummy
    #[arg(long, default_value = "openai")]
    backend: String,
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "PFIT_MODEL")]
    model: Option<String>,
    #[arg(long, env = "PFIT_BASE_URL")]
    base_url: Option<String>,
    #[arg(long)]
    temperature: Option<f32>,
    /// Articles classified at the same time
    #[arg(long, env = "PFIT_CONCURRENCY", default_value_t = pf_scanner::config::DEFAULT_CONCURRENCY)]
    concurrency: usize,
    /// Time budget for one article (e.g. 90s, 2m)
    #[arg(long, env = "PFIT_UNIT_TIMEOUT", default_value = "2m", value_parser = duration::positive_duration)]
    unit_timeout: HumanDuration,
    /// Find and read articles with HTML heuristics instead of the model
    #[arg(long)]
    html_only: bool,
    /// More logging (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage a user's interests profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Classify the new articles of a blog index for a user
    Scan {
        blog_url: String,
        #[arg(long)]
        user: UserId,
        /// Run in periodic mode with the specified interval (e.g. 1h, 30m, 1d, 1h15m30s)
        #[arg(long, value_parser = duration::positive_duration)]
        interval: Option<HumanDuration>,
    },
    /// List a user's processed articles, newest first
    Articles {
        #[arg(long)]
        user: UserId,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Write a Twitter thread about an article
    Thread {
        url: String,
        #[arg(long)]
        user: UserId,
    },
    /// List a user's generated threads
    Threads {
        #[arg(long)]
        user: UserId,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommands {
    Set {
        #[arg(long)]
        user: UserId,
        interests: String,
    },
    Show {
        #[arg(long)]
        user: UserId,
    },
}

impl Cli {
    fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            concurrency: self.concurrency,
            unit_timeout: self.unit_timeout.0,
            ..ScanConfig::default()
        }
    }

    fn model(&self) -> pf_core::Result<Arc<dyn InferenceModel>> {
        pf_inference::create_model(Some(pf_inference::Config {
            backend: self.backend.clone(),
            api_key: self.api_key.clone(),
            model_name: self.model.clone(),
            base_url: self.base_url.clone(),
            temperature: self.temperature,
            ..pf_inference::Config::default()
        }))
    }
}

struct Pipeline {
    orchestrator: BlogScanOrchestrator,
    threads: ThreadGenerator,
}

fn build_pipeline(cli: &Cli, stores: &Stores) -> anyhow::Result<Pipeline> {
    let config = cli.scan_config();
    let client = http_client(&config)?;
    let model = cli.model()?;
    info!("🧠 Inference model initialized (using {})", model.name());

    let (discoverer, extractor): (Arc<dyn ArticleIndexDiscoverer>, Arc<dyn ArticleExtractor>) =
        if cli.html_only {
            (
                Arc::new(HtmlIndexDiscoverer::new(client.clone())),
                Arc::new(HtmlArticleExtractor::new(client.clone())),
            )
        } else {
            (
                Arc::new(LlmIndexDiscoverer::index_page(client.clone(), model.clone())),
                Arc::new(LlmArticleExtractor::new(
                    client.clone(),
                    model.clone(),
                    config.max_article_chars,
                )),
            )
        };
    let classifier = PromptClassifier::new(model.clone()).with_max_article_chars(config.max_article_chars);

    let orchestrator = BlogScanOrchestrator::new(
        discoverer,
        extractor.clone(),
        Arc::new(classifier),
        stores.articles.clone(),
        stores.profiles.clone(),
        &config,
    );
    let threads = ThreadGenerator::new(
        extractor,
        Arc::new(LlmIndexDiscoverer::related_links(client, model.clone())),
        pf_inference::ThreadWriter::new(model).with_max_article_chars(config.max_article_chars),
        stores.results.clone(),
        &config,
    );

    Ok(Pipeline {
        orchestrator,
        threads,
    })
}

async fn check_storage(stores: &Stores) -> pf_core::Result<()> {
    stores.articles.exists(0, "pfit://healthcheck").await?;
    Ok(())
}

async fn check_storage_with_retry(stores: &Stores, storage_type: &str, max_retries: u32, timeout: Duration) -> pf_core::Result<()> {
    let mut retries = 0;
    let mut last_error = None;

    while retries < max_retries {
        match tokio::time::timeout(timeout, check_storage(stores)).await {
            Ok(Ok(())) => {
                info!("💾 Storage backend initialized successfully (using {})", storage_type);
                return Ok(());
            }
            Ok(Err(e)) => last_error = Some(e),
            Err(_) => last_error = Some(pf_core::Error::Timeout(timeout)),
        }
        retries += 1;
        if retries < max_retries {
            info!("Storage health check failed, retrying {}/{}...", retries, max_retries);
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
    }

    Err(last_error.unwrap_or_else(|| pf_core::Error::Storage("Storage health check failed after all retries".to_string())))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_scan(pipeline: &Pipeline, blog_url: &str, user: UserId) -> anyhow::Result<()> {
    let result = pipeline.orchestrator.scan(blog_url, user).await?;
    for outcome in result.fitting() {
        info!("👍 {} ({})", outcome.title.as_deref().unwrap_or(""), outcome.url);
    }
    print_json(&result)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    init_logging(level);

    let stores = pf_storage::create_storage(cli.storage.as_str(), cli.database.as_deref())
        .await
        .with_context(|| format!("Failed to open {} storage", cli.storage))?;
    check_storage_with_retry(&stores, &cli.storage, 3, Duration::from_secs(10)).await?;

    match &cli.command {
        Commands::Profile { command } => match command {
            ProfileCommands::Set { user, interests } => {
                if interests.trim().is_empty() {
                    anyhow::bail!("Interests description must not be empty");
                }
                let profile = stores.profiles.save_profile(*user, interests).await?;
                print_json(&profile)?;
            }
            ProfileCommands::Show { user } => match stores.profiles.get_profile(*user).await? {
                Some(profile) => print_json(&profile)?,
                None => anyhow::bail!("No profile for user {}", user),
            },
        },
        Commands::Scan {
            blog_url,
            user,
            interval,
        } => {
            let pipeline = build_pipeline(&cli, &stores)?;
            info!("🦗 Scanning {} for user {}", blog_url, user);

            if let Some(interval) = interval {
                info!("Running in periodic mode with {} interval", interval);
                loop {
                    info!("Starting scan cycle");
                    if let Err(e) = run_scan(&pipeline, blog_url, *user).await {
                        tracing::error!("Error during scan: {:#}", e);
                    }
                    info!("Waiting {} before next scan", interval);
                    tokio::time::sleep(interval.0).await;
                }
            } else {
                run_scan(&pipeline, blog_url, *user).await?;
            }
        }
        Commands::Articles {
            user,
            limit,
            offset,
        } => {
            let articles = stores
                .articles
                .list_by_user(*user, pf_core::storage::page_size(*limit), *offset)
                .await?;
            for article in &articles {
                let fit = match article.fits_profile {
                    Some(true) => "fits",
                    Some(false) => "no fit",
                    None => "error",
                };
                println!(
                    "{}  [{}]  {}  {}",
                    article.created_at.format("%Y-%m-%d %H:%M"),
                    fit,
                    article.title.as_deref().unwrap_or("-"),
                    article.url
                );
            }
        }
        Commands::Thread { url, user } => {
            let pipeline = build_pipeline(&cli, &stores)?;
            let result = pipeline.threads.generate(url, *user).await?;
            print_json(&result)?;
        }
        Commands::Threads { user, limit } => {
            let results = stores
                .results
                .list_results(*user, pf_core::storage::page_size(*limit))
                .await?;
            print_json(&results)?;
        }
        Commands::Serve { addr } => {
            let pipeline = build_pipeline(&cli, &stores)?;
            let state = pf_web::AppState {
                orchestrator: Arc::new(pipeline.orchestrator),
                threads: Arc::new(pipeline.threads),
                articles: stores.articles.clone(),
                profiles: stores.profiles.clone(),
                results: stores.results.clone(),
            };
            info!("🌐 Serving on http://{}", addr);
            pf_web::serve(*addr, state).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let mut argv = vec!["pfit"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv)
    }

    #[test]
    fn zero_unit_timeout_is_rejected() {
        assert!(parse(&["--unit-timeout", "0s", "scan", "https://blog.dev/", "--user", "1"]).is_err());
        assert!(parse(&["--unit-timeout", "0", "scan", "https://blog.dev/", "--user", "1"]).is_err());

        let cli = parse(&["--unit-timeout", "45s", "scan", "https://blog.dev/", "--user", "1"]).unwrap();
        assert_eq!(cli.scan_config().unit_timeout, Duration::from_secs(45));
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(parse(&["scan", "https://blog.dev/", "--user", "1", "--interval", "0s"]).is_err());

        let cli = parse(&["scan", "https://blog.dev/", "--user", "1", "--interval", "30m"]).unwrap();
        match cli.command {
            Commands::Scan { interval, .. } => {
                assert_eq!(interval.map(|i| i.0), Some(Duration::from_secs(1800)));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
