//! # fastnews
//!
//! Command-line front end: prints headlines and search results, manages
//! bookmarks and locale settings, and summarizes articles.
//!
//! ## Usage
//!
//! ```sh
//! fastnews headlines --category science
//! fastnews settings country gb
//! fastnews summarize https://example.com/story
//! ```
//!
//! Logs go to stderr (`RUST_LOG` controls the level); results go to stdout.

use clap::Parser;
use fastnews::cli::{BookmarkCommand, Cli, Command, SettingsCommand};
use fastnews::config::Config;
use fastnews::feed::NewsFeed;
use fastnews::generative::{GeminiClient, Retry};
use fastnews::models::{Article, BookmarkedArticle, Category, validate_country, validate_language};
use fastnews::news::{NewsApiClient, NewsQuery, NewsSource};
use fastnews::outputs::{json, text};
use fastnews::page::PageScraper;
use fastnews::settings::SettingsRepository;
use fastnews::store::PreferenceStore;
use fastnews::summarize::{ContentSummarizer, SummaryCoordinator, SummaryState};
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args.store, ?args.config, json = args.json, "Parsed CLI arguments");

    let config = match &args.config {
        Some(path) => Config::load(path).await?,
        None => Config::default(),
    };
    let store_path = args.store.clone().unwrap_or_else(|| config.store_path());
    let store = Arc::new(PreferenceStore::open(&store_path).await?);
    let settings = SettingsRepository::new(store);
    info!(path = %store_path.display(), "Using preference store");

    let result = run(&args, &config, &settings).await;

    let elapsed = start_time.elapsed();
    info!(?elapsed, "Execution complete");
    result
}

/// Dispatch one command. Failures the user should see as plain text are
/// printed here and reported through the exit code.
async fn run(args: &Cli, config: &Config, settings: &SettingsRepository) -> Result<ExitCode, Box<dyn Error>> {
    match &args.command {
        Command::Headlines { category } => {
            let category: Category = category.parse()?;
            let client = news_client(args, config)?;
            let articles = headlines(client, settings, category).await;
            print_articles(args, settings, &articles)?;
        }
        Command::Search { query } => {
            let client = news_client(args, config)?;
            let query = NewsQuery::Everything {
                query: query.clone(),
                language: settings.language(),
            };
            let articles = client.fetch(&query).await.unwrap_or_else(|e| {
                error!(error = %e, "Search failed");
                Vec::new()
            });
            print_articles(args, settings, &articles)?;
        }
        Command::Summarize { url } => return summarize(args, config, url).await,
        Command::Bookmarks(cmd) => bookmarks(args, settings, cmd).await?,
        Command::Settings(cmd) => settings_cmd(args, settings, cmd).await?,
    }
    Ok(ExitCode::SUCCESS)
}

fn news_client(args: &Cli, config: &Config) -> Result<NewsApiClient, Box<dyn Error>> {
    let key = args
        .news_api_key
        .clone()
        .ok_or(fastnews::Error::MissingApiKey("NEWS_API_KEY"))?;
    Ok(NewsApiClient::with_base_url(key, &config.news.base_url)?.page_size(config.news.page_size))
}

/// Run the feed coordinator until it publishes its first list.
#[instrument(level = "info", skip(client, settings))]
async fn headlines(client: NewsApiClient, settings: &SettingsRepository, category: Category) -> Vec<Article> {
    let feed = NewsFeed::start_with_category(Arc::new(client), settings.clone(), category);
    let mut rx = feed.articles();
    if rx.changed().await.is_err() {
        warn!("News feed stopped before publishing");
        return Vec::new();
    }
    let articles = rx.borrow_and_update().clone();
    feed.shutdown();
    articles
}

async fn summarize(args: &Cli, config: &Config, url: &str) -> Result<ExitCode, Box<dyn Error>> {
    let key = args
        .gemini_api_key
        .clone()
        .ok_or(fastnews::Error::MissingApiKey("GEMINI_API_KEY"))?;
    let gemini = GeminiClient::with_base_url(key, config.model.name.clone(), &config.model.base_url)?
        .generation_config(config.model.generation_config());
    let generator = Retry::new(
        gemini,
        config.model.max_retries,
        Duration::from_millis(config.model.retry_base_delay_ms),
    );
    let summarizer = ContentSummarizer::new(PageScraper::new()?, Arc::new(generator))
        .char_budget(config.summary.char_budget);

    let coordinator = SummaryCoordinator::new(Arc::new(summarizer));
    coordinator.summarize_article(&Article {
        url: Some(url.to_string()),
        ..Default::default()
    });

    match summary_outcome(coordinator.settled().await) {
        Ok(summary) => {
            if args.json {
                println!("{}", json::to_json(&serde_json::json!({ "url": url, "summary": summary }))?);
            } else {
                println!("{summary}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(message) => {
            eprintln!("{message}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Split a settled summary state into stdout text or a stderr message.
///
/// Error states already carry their user-facing `Error: ...` text and are
/// passed through unchanged.
fn summary_outcome(state: SummaryState) -> std::result::Result<String, String> {
    match state {
        SummaryState::Success(summary) => Ok(summary),
        SummaryState::Error(message) => Err(message),
        other => Err(format!("Error: summarization ended in unexpected state {other:?}")),
    }
}

async fn bookmarks(args: &Cli, settings: &SettingsRepository, cmd: &BookmarkCommand) -> Result<(), Box<dyn Error>> {
    match cmd {
        BookmarkCommand::List => {
            let list = settings.bookmarks()?;
            if args.json {
                println!("{}", json::to_json(&list)?);
            } else {
                print!("{}", text::render_bookmarks(&list));
            }
        }
        BookmarkCommand::Add {
            url,
            title,
            image_url,
            source,
        } => {
            let article = BookmarkedArticle {
                title: title.clone().unwrap_or_else(|| "No Title".to_string()),
                url: url.clone(),
                image_url: image_url.clone(),
                source: source.clone(),
            };
            if settings.add_bookmark(article).await? {
                println!("Saved {url}");
            } else {
                println!("Already saved: {url}");
            }
        }
        BookmarkCommand::Remove { url } => {
            if settings.remove_bookmark(url).await? {
                println!("Removed {url}");
            } else {
                println!("Not bookmarked: {url}");
            }
        }
    }
    Ok(())
}

async fn settings_cmd(args: &Cli, settings: &SettingsRepository, cmd: &SettingsCommand) -> Result<(), Box<dyn Error>> {
    match cmd {
        SettingsCommand::Show => {
            let (country, language, dark) = (settings.country(), settings.language(), settings.dark_mode());
            if args.json {
                println!("{}", json::settings_json(&country, &language, dark)?);
            } else {
                print!("{}", text::render_settings(&country, &language, dark));
            }
        }
        SettingsCommand::Country { code } => {
            let code = validate_country(code)?;
            settings.set_preferred_country(&code).await?;
            println!("Preferred country set to {code}");
        }
        SettingsCommand::Language { code } => {
            let code = validate_language(code)?;
            settings.set_preferred_language(&code).await?;
            println!("Preferred language set to {code}");
        }
        SettingsCommand::DarkMode { enabled } => {
            settings.set_dark_mode_enabled(*enabled).await?;
            println!("Dark mode {}", if *enabled { "on" } else { "off" });
        }
        SettingsCommand::Options => print!("{}", text::render_options()),
    }
    Ok(())
}

fn print_articles(args: &Cli, settings: &SettingsRepository, articles: &[Article]) -> Result<(), Box<dyn Error>> {
    if args.json {
        println!("{}", json::to_json(articles)?);
        return Ok(());
    }
    let saved = settings.bookmarks().unwrap_or_else(|e| {
        warn!(error = %e, "Could not read bookmarks; listing without markers");
        Vec::new()
    });
    print!("{}", text::render_articles(articles, &saved));
    Ok(())
}
