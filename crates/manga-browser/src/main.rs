//! Manga browser CLI application.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use manga_browser::filter::{initial_search_from_location, nav_search_location};
use manga_browser::{
    shell, CatalogTransport, FeedConfig, FeedController, FilterInput, JikanClient, TerminalSink,
};
use shared::{Config, LogConfig};
use std::io::Stdout;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse the MyAnimeList manga catalog", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Top-ranked manga
    Top {
        /// Sort selection; only "bypopularity" is sent to the API
        #[arg(long)]
        sort: Option<String>,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// Search the catalog with filters
    Browse {
        /// Free-text query
        #[arg(short, long, default_value = "")]
        query: String,

        /// Genre id
        #[arg(long, default_value = "")]
        genre: String,

        /// Single year (2020) or range (2010_2019)
        #[arg(long, default_value = "")]
        year: String,

        #[arg(long, default_value = "")]
        season: String,

        /// Format (manga, novel, lightnovel, oneshot, ...)
        #[arg(long, default_value = "")]
        format: String,

        /// Publishing status (publishing, complete, hiatus, ...)
        #[arg(long, default_value = "")]
        status: String,

        /// Sort key (score, popularity, title, ...)
        #[arg(long)]
        order_by: Option<String>,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// Header search: open the browse feed for a free-text query
    Search {
        text: String,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// Drive a feed from stdin, one command per line
    Interactive {
        #[arg(value_enum, default_value_t = FeedChoice::Top)]
        feed: FeedChoice,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FeedChoice {
    Top,
    Browse,
}

type Feed = FeedController<JikanClient, TerminalSink<Stdout>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let mut log_config = LogConfig::from_settings("manga-browser", &config.logging);
    if args.verbose {
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    info!(config_file = %args.config.display(), base_url = %config.api.base_url, "Manga browser starting");

    match args.command {
        Command::Top { sort, pages } => {
            let feed = open_feed(FeedConfig::top(&config), &config)?;
            match sort {
                Some(sort) => feed.change_sort(&sort).await,
                None => feed.initial_load().await,
            }
            load_pages(&feed, pages).await;
        }
        Command::Browse {
            query,
            genre,
            year,
            season,
            format,
            status,
            order_by,
            pages,
        } => {
            let feed = open_feed(FeedConfig::browse(&config), &config)?;
            let input = FilterInput {
                search: query,
                genre,
                year,
                season,
                format,
                status,
                sort: order_by.unwrap_or_else(|| config.feeds.browse_order_by.clone()),
            };
            feed.apply_filters(&input)
                .await
                .context("Invalid filter options")?;
            load_pages(&feed, pages).await;
        }
        Command::Search { text, pages } => {
            let Some(location) = nav_search_location(&text) else {
                bail!("Search text is empty");
            };
            info!(location = %location, "Opening browse feed");

            let feed = open_feed(FeedConfig::browse(&config), &config)?;
            match initial_search_from_location(&location) {
                Some(query) => feed.search(&query).await,
                None => feed.initial_load().await,
            }
            load_pages(&feed, pages).await;
        }
        Command::Interactive { feed } => {
            let feed_config = match feed {
                FeedChoice::Top => FeedConfig::top(&config),
                FeedChoice::Browse => FeedConfig::browse(&config),
            };
            let feed = open_feed(feed_config, &config)?;
            feed.initial_load().await;
            shell::run(&feed, BufReader::new(tokio::io::stdin())).await?;
        }
    }

    info!("Manga browser finished");
    Ok(())
}

fn open_feed(feed_config: FeedConfig, config: &Config) -> Result<Feed> {
    let client = JikanClient::new(
        Duration::from_secs(config.api.timeout_secs),
        &config.api.user_agent,
    )
    .context("Failed to create Jikan client")?;

    Ok(FeedController::new(feed_config, client, TerminalSink::stdout()))
}

/// Keep pressing "load more" until `pages` pages are shown or the feed runs out
async fn load_pages<T: CatalogTransport>(
    feed: &FeedController<T, TerminalSink<Stdout>>,
    pages: u32,
) {
    for _ in 1..pages {
        if !feed.with_sink(|sink| sink.load_more_visible()) {
            break;
        }
        feed.load_more().await;
    }
}
